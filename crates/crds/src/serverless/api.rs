//! Api Custom Resource Definition (API gateway)
//!
//! Exposes an in-cluster service under `<hostname>` through the gateway.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Port functions listen on
pub const FUNCTION_PORT: u16 = 8080;

/// ApiSpec defines the exposed hostname and the backing service
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[kube(group = "gateway.kyma-project.io", version = "v1alpha2", kind = "Api", namespaced)]
#[serde(rename_all = "camelCase")]
pub struct ApiSpec {
    /// Fully qualified hostname, e.g. `orders.foo.example.com`
    pub hostname: String,

    pub service: ApiService,

    /// Authentication rules; empty means unauthenticated
    #[serde(default)]
    pub authentication: Vec<ApiAuthentication>,
}

/// Service the gateway routes to
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApiService {
    pub name: String,
    pub port: u16,
}

/// A single authentication rule
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApiAuthentication {
    /// Rule type, e.g. `JWT`
    #[serde(rename = "type")]
    pub rule: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwt: Option<JwtAuthentication>,
}

/// JWT validation settings
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct JwtAuthentication {
    pub issuer: String,
    pub jwks_uri: String,
}
