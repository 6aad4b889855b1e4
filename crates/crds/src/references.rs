//! Object references shared by Kyma CRDs

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Reference to another object in the same namespace, by name only
///
/// This follows the Kubernetes `LocalObjectReference` pattern used by the
/// service catalog (`spec.serviceClassRef`, `spec.servicePlanRef`).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct LocalObjectReference {
    /// Name of the referenced object
    pub name: String,
}

impl LocalObjectReference {
    /// Create a reference to `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}
