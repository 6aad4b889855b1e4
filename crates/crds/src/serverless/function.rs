//! Function Custom Resource Definition (kubeless)

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Runtime used for functions deployed from the CLI
pub const DEFAULT_RUNTIME: &str = "nodejs8";
/// Trigger type for functions deployed from the CLI
pub const DEFAULT_TYPE: &str = "HTTP";
/// Entry point for functions deployed from the CLI
pub const DEFAULT_HANDLER: &str = "handler.main";

/// FunctionSpec defines the code and runtime of a kubeless function
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[kube(group = "kubeless.io", version = "v1beta1", kind = "Function", namespaced)]
#[serde(rename_all = "camelCase")]
pub struct FunctionSpec {
    /// Source code of the function
    #[serde(default)]
    pub function: String,

    /// Fingerprint of `function`, `<algorithm>:<hex>`
    #[serde(default)]
    pub checksum: String,

    #[serde(default)]
    pub runtime: String,

    /// Trigger type (`HTTP`, `PubSub`)
    #[serde(default, rename = "type")]
    pub trigger: String,

    /// `<file>.<export>` entry point
    #[serde(default)]
    pub handler: String,

    /// package.json-style dependency document, empty when none
    #[serde(default)]
    pub deps: String,
}
