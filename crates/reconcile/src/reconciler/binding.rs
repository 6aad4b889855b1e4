//! Namespace binding
//!
//! Binds a namespace to an application in four strict steps, stopping at the
//! first failure and leaving whatever was already created in place:
//! 1. the application must exist
//! 2. the namespace must exist, or is created when allowed
//! 3. an ApplicationMapping named after the application is created in the namespace
//! 4. every application-broker ServiceClass of the application in the namespace
//!    gets a ServiceInstance (create-if-absent only)

use super::Reconciler;
use crate::error::ReconcileError;
use crate::model::{BindingIntent, DesiredResource, ReconciliationOutcome};
use crds::kinds::{APPLICATION, APPLICATION_MAPPING, NAMESPACE, SERVICE_CLASS, SERVICE_INSTANCE};
use crds::{
    ApplicationMapping, ApplicationMappingSpec, LocalObjectReference, ServiceClass,
    ServiceInstance, ServiceInstanceSpec, APPLICATION_LABEL,
};
use k8s_openapi::api::core::v1::Namespace;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use resource_store::{ListSelector, ResourceRef};
use tracing::{debug, error, info};

/// What a binding run did to each resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingReport {
    pub namespace: ReconciliationOutcome,
    pub mapping: ReconciliationOutcome,
    /// Instance name and outcome, in class-name order
    pub service_instances: Vec<(String, ReconciliationOutcome)>,
}

impl Reconciler {
    /// Bind `intent.namespace` to `intent.application`
    pub async fn bind(&self, intent: &BindingIntent) -> Result<BindingReport, ReconcileError> {
        info!(
            "Binding namespace {} to application {}",
            intent.namespace, intent.application
        );
        let app_ref = ResourceRef::cluster(APPLICATION, intent.application.as_str())
            .map_err(|e| ReconcileError::invalid("application name", e))?;
        let ns_ref = ResourceRef::cluster(NAMESPACE, intent.namespace.as_str())
            .map_err(|e| ReconcileError::invalid("namespace name", e))?;

        if !self.exists(&app_ref).await? {
            return Err(ReconcileError::ApplicationNotFound(intent.application.clone()));
        }

        let namespace = self.ensure_namespace(&ns_ref, intent).await?;
        let mapping = self.ensure_mapping(intent).await?;
        let service_instances = self.ensure_service_instances(intent).await?;

        Ok(BindingReport {
            namespace,
            mapping,
            service_instances,
        })
    }

    async fn ensure_namespace(
        &self,
        ns_ref: &ResourceRef,
        intent: &BindingIntent,
    ) -> Result<ReconciliationOutcome, ReconcileError> {
        if self.exists(ns_ref).await? {
            debug!("Namespace {} already exists", intent.namespace);
            return Ok(ReconciliationOutcome::Unchanged);
        }
        if !intent.create_namespace_if_missing {
            return Err(ReconcileError::NamespaceNotFound(intent.namespace.clone()));
        }
        let namespace = Namespace {
            metadata: ObjectMeta {
                name: Some(intent.namespace.clone()),
                ..ObjectMeta::default()
            },
            ..Namespace::default()
        };
        let desired = DesiredResource::from_typed(ns_ref.clone(), &namespace)?;
        Ok(self.reconcile(&desired).await?.outcome)
    }

    async fn ensure_mapping(&self, intent: &BindingIntent) -> Result<ReconciliationOutcome, ReconcileError> {
        let mapping_ref = ResourceRef::namespaced(
            APPLICATION_MAPPING,
            &intent.namespace,
            intent.application.as_str(),
        )
        .map_err(|e| ReconcileError::invalid("application mapping", e))?;

        if self.exists(&mapping_ref).await? {
            if intent.ignore_if_mapping_exists {
                info!("[SKIP] Mapping already exists - {}", mapping_ref);
                return Ok(ReconciliationOutcome::Skipped("mapping already exists".to_string()));
            }
            return Err(ReconcileError::MappingAlreadyExists {
                application: intent.application.clone(),
                namespace: intent.namespace.clone(),
            });
        }

        let mapping = ApplicationMapping::new(&intent.application, ApplicationMappingSpec::default());
        let desired = DesiredResource::from_typed(mapping_ref, &mapping)?;
        Ok(self.reconcile(&desired).await?.outcome)
    }

    async fn ensure_service_instances(
        &self,
        intent: &BindingIntent,
    ) -> Result<Vec<(String, ReconciliationOutcome)>, ReconcileError> {
        let selector = ListSelector::labels(format!("{APPLICATION_LABEL}={}", intent.application));
        let bodies = self
            .store
            .list(&SERVICE_CLASS, Some(&intent.namespace), &selector)
            .await
            .map_err(|e| {
                error!("Failed to list {} in {}: {}", SERVICE_CLASS, intent.namespace, e);
                ReconcileError::Transport {
                    op: "list",
                    resource: format!("{SERVICE_CLASS} in namespace {}", intent.namespace),
                    source: e,
                }
            })?;

        let mut classes = Vec::with_capacity(bodies.len());
        for body in bodies {
            let class: ServiceClass = serde_json::from_value(body).map_err(|e| ReconcileError::Validation {
                resource: format!("{SERVICE_CLASS} in namespace {}", intent.namespace),
                message: format!("unexpected body: {e}"),
            })?;
            if class.is_application_class() {
                classes.push(class);
            }
        }
        classes.sort_by(|a, b| a.metadata.name.cmp(&b.metadata.name));
        debug!(
            "Found {} application service class(es) for {} in {}",
            classes.len(),
            intent.application,
            intent.namespace
        );

        let mut outcomes = Vec::with_capacity(classes.len());
        for class in &classes {
            let (Some(class_name), Some(instance_name)) =
                (class.metadata.name.as_deref(), class.instance_name())
            else {
                continue;
            };
            let instance_ref = ResourceRef::namespaced(SERVICE_INSTANCE, &intent.namespace, instance_name)
                .map_err(|e| ReconcileError::invalid("service instance", e))?;
            let instance = ServiceInstance::new(
                instance_name,
                ServiceInstanceSpec {
                    service_class_ref: Some(LocalObjectReference::new(class_name)),
                    ..ServiceInstanceSpec::default()
                },
            );
            let desired = DesiredResource::from_typed(instance_ref, &instance)?;
            let outcome = self.reconcile(&desired).await?.outcome;
            outcomes.push((instance_name.to_string(), outcome));
        }
        Ok(outcomes)
    }
}
