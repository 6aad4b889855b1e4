//! Readiness waits
//!
//! Polls a resource until the value at the policy's status path is ready.
//! The first poll happens immediately; each further poll follows one sleep,
//! and at most `max_attempts` sleeps happen, none longer than `interval`.

use super::Reconciler;
use crate::backoff::FibonacciBackoff;
use crate::error::ReconcileError;
use crate::model::{ExistingResource, ReadinessPolicy};
use resource_store::ResourceRef;
use serde_json::Value;
use tracing::{debug, info};

impl Reconciler {
    /// Wait until `target` reports ready under `policy`
    ///
    /// Returns the ready resource. Fails with `NotFound` if the resource
    /// disappears, `Exhausted` when the budget is spent, `Cancelled` when the
    /// reconciler's cancellation token fires.
    pub async fn wait_until_ready(
        &self,
        target: &ResourceRef,
        policy: &ReadinessPolicy,
    ) -> Result<ExistingResource, ReconcileError> {
        let mut backoff = FibonacciBackoff::for_policy(policy);
        let mut remaining = policy.max_attempts;
        let mut polls: u32 = 0;

        info!(
            "Waiting for {} ({} to become ready, up to {:?})",
            target,
            policy.status_path,
            policy.worst_case_wait()
        );
        loop {
            if self.cancel.is_cancelled() {
                return Err(ReconcileError::Cancelled(target.to_string()));
            }
            polls += 1;
            let current = self.require(target).await?;
            let observed = current.field(&policy.status_path);
            if policy.ready.matches(observed) {
                info!("{} is ready after {} poll(s)", target, polls);
                return Ok(current);
            }

            let last_status = describe(observed);
            if remaining == 0 {
                return Err(ReconcileError::Exhausted {
                    resource: target.to_string(),
                    attempts: polls,
                    last_status,
                });
            }
            remaining -= 1;

            let delay = backoff.next_backoff();
            debug!("{} not ready ({}), polling again in {:?}", target, last_status, delay);
            tokio::select! {
                () = self.cancel.cancelled() => {
                    return Err(ReconcileError::Cancelled(target.to_string()));
                }
                () = self.clock.sleep(delay) => {}
            }
        }
    }
}

fn describe(observed: Option<&Value>) -> String {
    match observed {
        None | Some(Value::Null) => "<unset>".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
