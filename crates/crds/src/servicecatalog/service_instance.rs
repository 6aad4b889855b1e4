//! ServiceInstance Custom Resource Definition

use crate::references::LocalObjectReference;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// ServiceInstanceSpec requests provisioning of one namespaced service class
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[kube(
    group = "servicecatalog.k8s.io",
    version = "v1beta1",
    kind = "ServiceInstance",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInstanceSpec {
    /// Namespaced class to provision
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_class_ref: Option<LocalObjectReference>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_class_external_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_plan_external_name: Option<String>,
}
