//! TokenRequest Custom Resource Definition
//!
//! Asks the connector service for a one-time pairing URL for an Application.
//! The TokenRequest carries the application's name; the connector fills in
//! `status.url` asynchronously.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// TokenRequestSpec is empty; the request is keyed by its name
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[kube(
    group = "applicationconnector.kyma-project.io",
    version = "v1alpha1",
    kind = "TokenRequest",
    namespaced,
    status = "TokenRequestStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct TokenRequestSpec {}

/// TokenRequestStatus carries the issued connector URL
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TokenRequestStatus {
    /// One-time connector URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Expiry timestamp (RFC 3339)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expire_after: Option<String>,

    /// Application the token was issued for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl TokenRequest {
    /// Connector URL, once issued
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.status.as_ref().and_then(|s| s.url.as_deref())
    }
}
