//! ServiceClass Custom Resource Definition
//!
//! A namespaced class of service offered by a broker. The application broker
//! publishes one class per enabled Application service.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Broker that publishes classes for Application services
pub const APPLICATION_BROKER: &str = "application-broker";

/// Label the application broker puts on the classes of one Application
pub const APPLICATION_LABEL: &str = "applicationconnector.kyma-project.io/application";

/// ServiceClassSpec describes a class as published by its broker
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[kube(
    group = "servicecatalog.k8s.io",
    version = "v1beta1",
    kind = "ServiceClass",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct ServiceClassSpec {
    /// Name of the broker that offers this class
    #[serde(default)]
    pub service_broker_name: String,

    /// Human readable name of the class, unique per broker
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_name: Option<String>,

    /// Broker-side identifier of the class
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ServiceClass {
    /// True when the class was published by the application broker
    #[must_use]
    pub fn is_application_class(&self) -> bool {
        self.spec.service_broker_name == APPLICATION_BROKER
    }

    /// Name for instances of this class: the external name, else the class name
    #[must_use]
    pub fn instance_name(&self) -> Option<&str> {
        self.spec
            .external_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or(self.metadata.name.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_name_prefers_external_name() {
        let mut class = ServiceClass::new(
            "5f3c-uuid",
            ServiceClassSpec {
                service_broker_name: APPLICATION_BROKER.to_string(),
                external_name: Some("erp-orders".to_string()),
                ..ServiceClassSpec::default()
            },
        );
        assert_eq!(class.instance_name(), Some("erp-orders"));
        assert!(class.is_application_class());

        class.spec.external_name = None;
        assert_eq!(class.instance_name(), Some("5f3c-uuid"));
    }
}
