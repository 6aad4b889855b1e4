//! Function deployment
//!
//! Reconciles a kubeless Function from local source. The stored checksum
//! decides whether the source changed, so redeploying identical source issues
//! no update. With `expose` set, an Api routing `<name>.<clusterDomain>` to the
//! function is created if it does not exist yet and never updated afterwards.

use super::Reconciler;
use crate::checksum::fingerprint;
use crate::error::ReconcileError;
use crate::model::{DesiredResource, FunctionDeployment, ReconciliationOutcome};
use crds::kinds::{API, FUNCTION};
use crds::{
    Api, ApiService, ApiSpec, Function, FunctionSpec, DEFAULT_HANDLER, DEFAULT_RUNTIME,
    DEFAULT_TYPE, FUNCTION_PORT,
};
use resource_store::ResourceRef;
use std::collections::BTreeMap;
use tracing::info;

/// What a deployment did to the function and its Api
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployReport {
    pub function: ReconciliationOutcome,
    /// `None` when the function is not exposed
    pub api: Option<ReconciliationOutcome>,
}

impl FunctionDeployment {
    fn function_ref(&self) -> Result<ResourceRef, ReconcileError> {
        ResourceRef::namespaced(FUNCTION, &self.namespace, self.name.as_str())
            .map_err(|e| ReconcileError::invalid("function", e))
    }

    fn api_ref(&self) -> Result<ResourceRef, ReconcileError> {
        ResourceRef::namespaced(API, &self.namespace, self.name.as_str())
            .map_err(|e| ReconcileError::invalid("api", e))
    }

    /// Cluster domain for the Api hostname, required when exposing
    fn exposed_domain(&self) -> Result<Option<&str>, ReconcileError> {
        if !self.expose {
            return Ok(None);
        }
        match self.cluster_domain.as_deref().map(str::trim) {
            Some(domain) if !domain.is_empty() => Ok(Some(domain)),
            _ => Err(ReconcileError::Validation {
                resource: format!("{API} {}/{}", self.namespace, self.name),
                message: "a cluster domain is required to expose the function".to_string(),
            }),
        }
    }

    fn desired_function(&self) -> Result<DesiredResource, ReconcileError> {
        let mut function = Function::new(
            &self.name,
            FunctionSpec {
                function: self.source.clone(),
                checksum: fingerprint(self.source.as_bytes()),
                runtime: DEFAULT_RUNTIME.to_string(),
                trigger: DEFAULT_TYPE.to_string(),
                handler: DEFAULT_HANDLER.to_string(),
                deps: self.dependencies.clone().unwrap_or_default(),
            },
        );
        function.metadata.labels = Some(BTreeMap::from([("app".to_string(), self.name.clone())]));

        let mut managed = vec!["spec.function", "spec.checksum"];
        let mut drift = vec!["spec.checksum"];
        // Stored deps are left alone when the project declares none
        if self.dependencies.is_some() {
            managed.push("spec.deps");
            drift.push("spec.deps");
        }
        Ok(DesiredResource::from_typed(self.function_ref()?, &function)?
            .managing(managed)
            .drift_keys(drift))
    }

    fn desired_api(&self, domain: &str) -> Result<DesiredResource, ReconcileError> {
        let api = Api::new(
            &self.name,
            ApiSpec {
                hostname: format!("{}.{}", self.name, domain),
                service: ApiService {
                    name: self.name.clone(),
                    port: FUNCTION_PORT,
                },
                authentication: Vec::new(),
            },
        );
        DesiredResource::from_typed(self.api_ref()?, &api)
    }
}

impl Reconciler {
    /// Deploy a function and, if requested, expose it through an Api
    pub async fn deploy_function(&self, deployment: &FunctionDeployment) -> Result<DeployReport, ReconcileError> {
        let domain = deployment.exposed_domain()?;
        let desired_function = deployment.desired_function()?;
        let desired_api = domain.map(|d| deployment.desired_api(d)).transpose()?;

        info!(
            "Deploying function {}/{} ({})",
            deployment.namespace,
            deployment.name,
            fingerprint(deployment.source.as_bytes())
        );
        let function = self.reconcile(&desired_function).await?.outcome;

        let api = match desired_api {
            Some(desired) => Some(self.reconcile(&desired).await?.outcome),
            None => None,
        };
        Ok(DeployReport { function, api })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use resource_store::StoreOp;
    use serde_json::json;

    fn deployment(source: &str) -> FunctionDeployment {
        FunctionDeployment {
            name: "orders".to_string(),
            namespace: "sales".to_string(),
            source: source.to_string(),
            dependencies: None,
            expose: false,
            cluster_domain: None,
        }
    }

    fn function_ref() -> ResourceRef {
        ResourceRef::namespaced(FUNCTION, "sales", "orders").unwrap()
    }

    fn api_ref() -> ResourceRef {
        ResourceRef::namespaced(API, "sales", "orders").unwrap()
    }

    #[tokio::test]
    async fn test_first_deploy_creates_function() {
        let (store, reconciler) = mock_reconciler();
        let report = reconciler.deploy_function(&deployment("v1")).await.unwrap();
        assert_eq!(report.function, ReconciliationOutcome::Created);
        assert_eq!(report.api, None);

        let stored = store.object(&function_ref()).unwrap();
        assert_eq!(stored["spec"]["checksum"], fingerprint(b"v1"));
        assert_eq!(stored["spec"]["runtime"], "nodejs8");
        assert_eq!(stored["spec"]["type"], "HTTP");
        assert_eq!(stored["spec"]["handler"], "handler.main");
        assert_eq!(stored["spec"]["deps"], "");
        assert_eq!(stored["metadata"]["labels"]["app"], "orders");
    }

    #[tokio::test]
    async fn test_unchanged_redeploy_issues_no_update() {
        let (store, reconciler) = mock_reconciler();
        reconciler.deploy_function(&deployment("v1")).await.unwrap();
        store.clear_calls();

        let report = reconciler.deploy_function(&deployment("v1")).await.unwrap();
        assert_eq!(report.function, ReconciliationOutcome::Unchanged);
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_changed_source_updates_function_only() {
        let (store, reconciler) = mock_reconciler();
        store.insert(
            &function_ref(),
            json!({"spec": {"function": "v1", "checksum": fingerprint(b"v1"), "runtime": "nodejs6", "deps": "{\"dependencies\": {}}"}}),
        );

        let report = reconciler.deploy_function(&deployment("v2")).await.unwrap();
        assert_eq!(report.function, ReconciliationOutcome::Updated);
        let stored = store.object(&function_ref()).unwrap();
        assert_eq!(stored["spec"]["function"], "v2");
        assert_eq!(stored["spec"]["checksum"], fingerprint(b"v2"));
        assert_eq!(stored["spec"]["runtime"], "nodejs6");
        assert_eq!(stored["spec"]["deps"], "{\"dependencies\": {}}");
    }

    #[tokio::test]
    async fn test_changed_dependencies_update() {
        let (store, reconciler) = mock_reconciler();
        reconciler.deploy_function(&deployment("v1")).await.unwrap();

        let with_deps = FunctionDeployment {
            dependencies: Some("{\n \"dependencies\": {\"lodash\":\"4\"} \n}".to_string()),
            ..deployment("v1")
        };
        let report = reconciler.deploy_function(&with_deps).await.unwrap();
        assert_eq!(report.function, ReconciliationOutcome::Updated);
        assert!(store.object(&function_ref()).unwrap()["spec"]["deps"]
            .as_str()
            .unwrap()
            .contains("lodash"));
    }

    #[tokio::test]
    async fn test_expose_creates_api_once() {
        let (store, reconciler) = mock_reconciler();
        let exposed = FunctionDeployment {
            expose: true,
            cluster_domain: Some("foo.example.com".to_string()),
            ..deployment("v1")
        };

        let first = reconciler.deploy_function(&exposed).await.unwrap();
        assert_eq!(first.api, Some(ReconciliationOutcome::Created));
        let api = store.object(&api_ref()).unwrap();
        assert_eq!(api["spec"]["hostname"], "orders.foo.example.com");
        assert_eq!(api["spec"]["service"], json!({"name": "orders", "port": 8080}));
        assert_eq!(api["spec"]["authentication"], json!([]));

        let second = reconciler.deploy_function(&exposed).await.unwrap();
        assert_eq!(second.api, Some(ReconciliationOutcome::Unchanged));
        assert_eq!(store.count(StoreOp::Update, &API), 0);
    }

    #[tokio::test]
    async fn test_expose_without_domain_fails_before_any_call() {
        let (store, reconciler) = mock_reconciler();
        let exposed = FunctionDeployment {
            expose: true,
            ..deployment("v1")
        };

        let err = reconciler.deploy_function(&exposed).await.unwrap_err();
        assert!(matches!(err, ReconcileError::Validation { .. }));
        assert!(store.calls().is_empty());
    }
}
