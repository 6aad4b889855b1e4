//! Application Custom Resource Definition
//!
//! Represents an external system registered with the cluster. The Application
//! controller installs a gateway for it and reports progress in
//! `status.installationStatus`.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Installation state reported once the application's gateway is installed
pub const INSTALLATION_DEPLOYED: &str = "DEPLOYED";

/// ApplicationSpec defines the desired state of an Application
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[kube(
    group = "applicationconnector.kyma-project.io",
    version = "v1alpha1",
    kind = "Application",
    status = "ApplicationStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSpec {
    /// Human readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Labels propagated to the application's services
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,

    /// Register the application without installing its gateway
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_installation: Option<bool>,
}

/// ApplicationStatus defines the observed state of an Application
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationStatus {
    /// Installation progress of the application's gateway
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installation_status: Option<InstallationStatus>,
}

/// Installation progress as reported by the Application controller
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InstallationStatus {
    /// Release status, `DEPLOYED` once installed
    #[serde(default)]
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Application {
    /// True once the gateway installation reached `DEPLOYED`
    #[must_use]
    pub fn is_deployed(&self) -> bool {
        self.status
            .as_ref()
            .and_then(|s| s.installation_status.as_ref())
            .is_some_and(|i| i.status == INSTALLATION_DEPLOYED)
    }
}
