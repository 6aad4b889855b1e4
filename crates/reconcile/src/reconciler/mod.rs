//! Reconciler
//!
//! Drives the resource store towards a desired state, one resource at a time.
//! The composite flows (binding, application, token, function) live in the
//! submodules as further `impl Reconciler` blocks.

mod application;
mod binding;
mod exists;
mod function;
mod readiness;
mod token;

pub use binding::BindingReport;
pub use function::DeployReport;
pub use token::TOKEN_NAMESPACE;

use crate::clock::{Clock, TokioClock};
use crate::error::ReconcileError;
use crate::model::{
    ConflictPolicy, DesiredResource, ExistingResource, ReadinessPolicies, Reconciled,
    ReconciliationOutcome,
};
use resource_store::ResourceStore;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Reconciles desired resources against a resource store
pub struct Reconciler {
    store: Arc<dyn ResourceStore>,
    clock: Arc<dyn Clock>,
    cancel: CancellationToken,
    policies: ReadinessPolicies,
}

impl fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reconciler")
            .field("cancelled", &self.cancel.is_cancelled())
            .field("policies", &self.policies)
            .finish_non_exhaustive()
    }
}

impl Reconciler {
    /// Reconciler over `store` with a real clock and default readiness policies
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self {
            store,
            clock: Arc::new(TokioClock),
            cancel: CancellationToken::new(),
            policies: ReadinessPolicies::default(),
        }
    }

    /// Use `clock` for the sleeps between readiness polls
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Abort readiness waits when `cancel` fires
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    #[must_use]
    pub fn with_policies(mut self, policies: ReadinessPolicies) -> Self {
        self.policies = policies;
        self
    }

    /// Create the resource if absent, update it if its managed fields drifted
    ///
    /// Transport failures, conflicting updates and (under `ConflictPolicy::Fail`)
    /// pre-existing resources are returned as errors; nothing is retried.
    pub async fn reconcile(&self, desired: &DesiredResource) -> Result<Reconciled, ReconcileError> {
        desired.validate()?;
        let target = &desired.target;

        let Some(existing) = self.fetch(target).await? else {
            return self.create_or_converge(desired).await;
        };

        match desired.conflict_policy {
            ConflictPolicy::Fail => Err(ReconcileError::AlreadyExists(target.to_string())),
            ConflictPolicy::IgnoreExisting => {
                debug!("[UNCHANGED] {} already exists, leaving it as is", target);
                Ok(Reconciled {
                    outcome: ReconciliationOutcome::Unchanged,
                    resource: existing,
                })
            }
            ConflictPolicy::Converge => self.converge(desired, existing).await,
        }
    }

    async fn create_or_converge(&self, desired: &DesiredResource) -> Result<Reconciled, ReconcileError> {
        let target = &desired.target;
        info!("[CREATE] Creating {}", target);
        match self.store.create(target, &desired.body).await {
            Ok(body) => Ok(Reconciled {
                outcome: ReconciliationOutcome::Created,
                resource: ExistingResource::new(target.clone(), body),
            }),
            Err(e) if e.is_already_exists() => {
                warn!("Lost create race for {}, another writer created it first", target);
                match desired.conflict_policy {
                    ConflictPolicy::Fail => Err(ReconcileError::AlreadyExists(target.to_string())),
                    ConflictPolicy::IgnoreExisting => {
                        let existing = self.require(target).await?;
                        Ok(Reconciled {
                            outcome: ReconciliationOutcome::Unchanged,
                            resource: existing,
                        })
                    }
                    ConflictPolicy::Converge => {
                        let existing = self.require(target).await?;
                        self.converge(desired, existing).await
                    }
                }
            }
            Err(e) => {
                error!("Failed to create {}: {}", target, e);
                Err(ReconcileError::from_store("create", target, e))
            }
        }
    }

    /// Compare managed fields of an existing resource and merge them in on drift
    async fn converge(
        &self,
        desired: &DesiredResource,
        existing: ExistingResource,
    ) -> Result<Reconciled, ReconcileError> {
        let target = &desired.target;
        if desired.is_create_only() {
            info!("[SKIP] {} already exists", target);
            return Ok(Reconciled {
                outcome: ReconciliationOutcome::Unchanged,
                resource: existing,
            });
        }

        let drifted: Vec<String> = desired
            .effective_drift_keys()
            .iter()
            .filter(|path| path.get(&desired.body) != existing.field(path))
            .map(ToString::to_string)
            .collect();
        if drifted.is_empty() {
            debug!("[UNCHANGED] {} is up to date", target);
            return Ok(Reconciled {
                outcome: ReconciliationOutcome::Unchanged,
                resource: existing,
            });
        }

        info!(
            "[UPDATE] Updating {} at resourceVersion {} (changed: {})",
            target,
            existing.resource_version().unwrap_or("<none>"),
            drifted.join(", ")
        );
        let mut body = existing.body;
        for path in &desired.managed_fields {
            if let Some(value) = path.get(&desired.body) {
                path.set(&mut body, value.clone());
            }
        }
        match self.store.update(target, &body).await {
            Ok(updated) => Ok(Reconciled {
                outcome: ReconciliationOutcome::Updated,
                resource: ExistingResource::new(target.clone(), updated),
            }),
            Err(e) => {
                error!("Failed to update {}: {}", target, e);
                Err(ReconcileError::from_store("update", target, e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldPath;
    use crate::test_utils::*;
    use resource_store::{ResourceRef, StoreError, StoreOp};
    use serde_json::json;

    fn function_ref() -> ResourceRef {
        ResourceRef::namespaced(crds::kinds::FUNCTION, "default", "orders").unwrap()
    }

    fn desired_function(checksum: &str) -> DesiredResource {
        DesiredResource::new(
            function_ref(),
            json!({"spec": {"function": "src", "checksum": checksum, "runtime": "nodejs8"}}),
        )
        .managing(["spec.function", "spec.checksum"])
        .drift_keys(["spec.checksum"])
    }

    #[tokio::test]
    async fn test_reconcile_twice_created_then_unchanged() {
        let (store, reconciler) = mock_reconciler();
        let desired = desired_function("sha256:aa");

        let first = reconciler.reconcile(&desired).await.unwrap();
        assert_eq!(first.outcome, ReconciliationOutcome::Created);
        let second = reconciler.reconcile(&desired).await.unwrap();
        assert_eq!(second.outcome, ReconciliationOutcome::Unchanged);

        assert_eq!(store.count(StoreOp::Create, &crds::kinds::FUNCTION), 1);
        assert_eq!(store.count(StoreOp::Update, &crds::kinds::FUNCTION), 0);
    }

    #[tokio::test]
    async fn test_drift_updates_only_managed_fields() {
        let (store, reconciler) = mock_reconciler();
        store.insert(
            &function_ref(),
            json!({
                "metadata": {"labels": {"app": "orders"}},
                "spec": {"function": "old", "checksum": "sha256:old", "runtime": "nodejs6", "topic": "keep"}
            }),
        );

        let before = store.object(&function_ref()).unwrap();
        let result = reconciler.reconcile(&desired_function("sha256:new")).await.unwrap();
        assert_eq!(result.outcome, ReconciliationOutcome::Updated);
        assert!(result.resource.resource_version().is_some());
        assert_ne!(result.resource.resource_version(), resource_store::resource_version(&before));

        let stored = store.object(&function_ref()).unwrap();
        assert_eq!(stored["spec"]["checksum"], "sha256:new");
        assert_eq!(stored["spec"]["function"], "src");
        // Unmanaged fields keep the stored values
        assert_eq!(stored["spec"]["runtime"], "nodejs6");
        assert_eq!(stored["spec"]["topic"], "keep");
        assert_eq!(stored["metadata"]["labels"]["app"], "orders");
    }

    #[tokio::test]
    async fn test_create_only_existing_is_left_unchanged() {
        let (store, reconciler) = mock_reconciler();
        store.insert(&function_ref(), json!({"spec": {"checksum": "x"}}));

        let desired = DesiredResource::new(function_ref(), json!({"spec": {"checksum": "y"}}));
        let result = reconciler.reconcile(&desired).await.unwrap();
        assert_eq!(result.outcome, ReconciliationOutcome::Unchanged);
        assert_eq!(result.resource.field(&FieldPath::parse("spec.checksum")), Some(&json!("x")));
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_create_only_reconciled_twice_created_then_unchanged() {
        let (store, reconciler) = mock_reconciler();
        let mapping = ResourceRef::namespaced(crds::kinds::APPLICATION_MAPPING, "sales", "erp").unwrap();
        let desired = DesiredResource::new(mapping, json!({"spec": {}}));

        let first = reconciler.reconcile(&desired).await.unwrap();
        let second = reconciler.reconcile(&desired).await.unwrap();
        assert_eq!(first.outcome, ReconciliationOutcome::Created);
        assert_eq!(second.outcome, ReconciliationOutcome::Unchanged);
        assert_eq!(store.writes(), 1);
    }

    #[tokio::test]
    async fn test_conflict_policy_fail_and_ignore() {
        let (store, reconciler) = mock_reconciler();
        store.insert(&function_ref(), json!({}));

        let fail = desired_function("sha256:aa").conflict_policy(ConflictPolicy::Fail);
        let err = reconciler.reconcile(&fail).await.unwrap_err();
        assert!(matches!(err, ReconcileError::AlreadyExists(ref r) if r.contains("default/orders")));

        let ignore = desired_function("sha256:aa").conflict_policy(ConflictPolicy::IgnoreExisting);
        let result = reconciler.reconcile(&ignore).await.unwrap();
        assert_eq!(result.outcome, ReconciliationOutcome::Unchanged);
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_lost_create_race_converges() {
        let (store, reconciler) = mock_reconciler();
        store.preempt_create(&function_ref(), json!({"spec": {"function": "theirs", "checksum": "sha256:theirs"}}));

        let result = reconciler.reconcile(&desired_function("sha256:ours")).await.unwrap();
        assert_eq!(result.outcome, ReconciliationOutcome::Updated);
        assert_eq!(store.object(&function_ref()).unwrap()["spec"]["checksum"], "sha256:ours");
    }

    #[tokio::test]
    async fn test_lost_create_race_with_ignore_policy() {
        let (store, reconciler) = mock_reconciler();
        store.preempt_create(&function_ref(), json!({"spec": {"function": "theirs", "checksum": "sha256:theirs"}}));

        let desired = desired_function("sha256:ours").conflict_policy(ConflictPolicy::IgnoreExisting);
        let result = reconciler.reconcile(&desired).await.unwrap();
        assert_eq!(result.outcome, ReconciliationOutcome::Unchanged);
        assert_eq!(result.resource.body["spec"]["checksum"], "sha256:theirs");
        assert_eq!(store.count(StoreOp::Create, &crds::kinds::FUNCTION), 1);
        assert_eq!(store.count(StoreOp::Update, &crds::kinds::FUNCTION), 0);
    }

    #[tokio::test]
    async fn test_lost_create_race_with_fail_policy() {
        let (store, reconciler) = mock_reconciler();
        store.preempt_create(&function_ref(), json!({}));

        let desired = desired_function("sha256:ours").conflict_policy(ConflictPolicy::Fail);
        let err = reconciler.reconcile(&desired).await.unwrap_err();
        assert!(matches!(err, ReconcileError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_stale_update_is_conflict_and_not_retried() {
        let (store, reconciler) = mock_reconciler();
        store.insert(&function_ref(), json!({"spec": {"function": "old", "checksum": "sha256:old"}}));
        store.fail_next(StoreOp::Update, crds::kinds::FUNCTION, StoreError::Conflict);

        let err = reconciler.reconcile(&desired_function("sha256:new")).await.unwrap_err();
        assert!(matches!(err, ReconcileError::Conflict { .. }));
        assert_eq!(store.count(StoreOp::Update, &crds::kinds::FUNCTION), 1);
    }

    #[tokio::test]
    async fn test_transport_failure_on_get_aborts() {
        let (store, reconciler) = mock_reconciler();
        store.fail_next(StoreOp::Get, crds::kinds::FUNCTION, StoreError::Api);

        let err = reconciler.reconcile(&desired_function("sha256:aa")).await.unwrap_err();
        assert!(matches!(err, ReconcileError::Transport { op: "get", .. }));
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_managed_field_missing_from_body_is_validation_error() {
        let (store, reconciler) = mock_reconciler();
        let desired = DesiredResource::new(function_ref(), json!({"spec": {}})).managing(["spec.checksum"]);

        let err = reconciler.reconcile(&desired).await.unwrap_err();
        assert!(matches!(err, ReconcileError::Validation { .. }));
        assert!(store.calls().is_empty());
    }
}
