//! Resource kinds addressed through the resource store
//!
//! One `ResourceKind` per group/version/kind the CLI reads or writes. The
//! typed CRDs in this crate describe the same kinds; the tests below keep both
//! in sync.

use crate::applicationconnector::GROUP as APPLICATION_CONNECTOR;
use resource_store::ResourceKind;

/// Core `v1/Namespace`
pub const NAMESPACE: ResourceKind = ResourceKind::cluster("", "v1", "Namespace", "namespaces");

pub const APPLICATION: ResourceKind =
    ResourceKind::cluster(APPLICATION_CONNECTOR, "v1alpha1", "Application", "applications");

pub const APPLICATION_MAPPING: ResourceKind = ResourceKind::namespaced(
    APPLICATION_CONNECTOR,
    "v1alpha1",
    "ApplicationMapping",
    "applicationmappings",
);

pub const TOKEN_REQUEST: ResourceKind =
    ResourceKind::namespaced(APPLICATION_CONNECTOR, "v1alpha1", "TokenRequest", "tokenrequests");

pub const FUNCTION: ResourceKind =
    ResourceKind::namespaced("kubeless.io", "v1beta1", "Function", "functions");

pub const API: ResourceKind =
    ResourceKind::namespaced("gateway.kyma-project.io", "v1alpha2", "Api", "apis");

pub const SERVICE_CLASS: ResourceKind =
    ResourceKind::namespaced("servicecatalog.k8s.io", "v1beta1", "ServiceClass", "serviceclasses");

pub const SERVICE_INSTANCE: ResourceKind = ResourceKind::namespaced(
    "servicecatalog.k8s.io",
    "v1beta1",
    "ServiceInstance",
    "serviceinstances",
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Api, Application, ApplicationMapping, Function, ServiceClass, ServiceInstance, TokenRequest,
    };
    use k8s_openapi::api::core::v1::Namespace;
    use kube::Resource;
    use resource_store::Scope;

    fn assert_matches<K: Resource<DynamicType = ()>>(kind: &ResourceKind, scope: Scope) {
        assert_eq!(kind.group, K::group(&()), "group of {}", kind.kind);
        assert_eq!(kind.version, K::version(&()), "version of {}", kind.kind);
        assert_eq!(kind.kind, K::kind(&()));
        assert_eq!(kind.plural, K::plural(&()), "plural of {}", kind.kind);
        assert_eq!(kind.api_version(), K::api_version(&()));
        assert_eq!(kind.scope, scope, "scope of {}", kind.kind);
    }

    #[test]
    fn test_kinds_match_typed_resources() {
        assert_matches::<Namespace>(&NAMESPACE, Scope::Cluster);
        assert_matches::<Application>(&APPLICATION, Scope::Cluster);
        assert_matches::<ApplicationMapping>(&APPLICATION_MAPPING, Scope::Namespaced);
        assert_matches::<TokenRequest>(&TOKEN_REQUEST, Scope::Namespaced);
        assert_matches::<Function>(&FUNCTION, Scope::Namespaced);
        assert_matches::<Api>(&API, Scope::Namespaced);
        assert_matches::<ServiceClass>(&SERVICE_CLASS, Scope::Namespaced);
        assert_matches::<ServiceInstance>(&SERVICE_INSTANCE, Scope::Namespaced);
    }

    #[test]
    fn test_log_names() {
        assert_eq!(FUNCTION.to_string(), "functions.kubeless.io/v1beta1");
        assert_eq!(NAMESPACE.to_string(), "namespaces/v1");
    }
}
