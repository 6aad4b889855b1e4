//! ApplicationMapping Custom Resource Definition
//!
//! Enables an Application inside one namespace. The mapping carries the
//! application's name and lives in the target namespace.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// ApplicationMappingSpec defines which services of the application are enabled
///
/// An empty service list enables all of them.
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[kube(
    group = "applicationconnector.kyma-project.io",
    version = "v1alpha1",
    kind = "ApplicationMapping",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationMappingSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<ApplicationMappingService>,
}

/// One enabled service, by id
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationMappingService {
    pub id: String,
}
