//! Application creation

use super::Reconciler;
use crate::error::ReconcileError;
use crate::model::{ConflictPolicy, DesiredResource, Reconciled, ReconciliationOutcome};
use crds::kinds::APPLICATION;
use crds::{Application, ApplicationSpec};
use resource_store::ResourceRef;
use tracing::info;

impl Reconciler {
    /// Create the cluster-scoped Application `name` and wait until it is deployed
    ///
    /// An existing application is an `AlreadyExists` error unless
    /// `ignore_if_existing` is set, in which case it is left untouched and no
    /// readiness wait happens.
    pub async fn create_application(
        &self,
        name: &str,
        spec: ApplicationSpec,
        ignore_if_existing: bool,
    ) -> Result<Reconciled, ReconcileError> {
        let target = ResourceRef::cluster(APPLICATION, name)
            .map_err(|e| ReconcileError::invalid("application name", e))?;
        let policy = if ignore_if_existing {
            ConflictPolicy::IgnoreExisting
        } else {
            ConflictPolicy::Fail
        };
        let desired = DesiredResource::from_typed(target.clone(), &Application::new(name, spec))?
            .conflict_policy(policy);

        let reconciled = self.reconcile(&desired).await?;
        if reconciled.outcome != ReconciliationOutcome::Created {
            info!("[SKIP] Application {} already exists", name);
            return Ok(reconciled);
        }

        let ready = self
            .wait_until_ready(&target, &self.policies.application)
            .await?;
        info!("Application {} is deployed", name);
        Ok(Reconciled {
            outcome: ReconciliationOutcome::Created,
            resource: ready,
        })
    }
}
