//! Existence checks
//!
//! A missing resource is a normal answer here, never an error. Any other store
//! failure is returned so the caller aborts instead of assuming absence.

use super::Reconciler;
use crate::error::ReconcileError;
use crate::model::ExistingResource;
use resource_store::ResourceRef;
use tracing::{debug, error};

impl Reconciler {
    /// Current state of `target`, or `None` if it does not exist
    pub async fn fetch(&self, target: &ResourceRef) -> Result<Option<ExistingResource>, ReconcileError> {
        match self.store.get(target).await {
            Ok(body) => Ok(Some(ExistingResource::new(target.clone(), body))),
            Err(e) if e.is_not_found() => {
                debug!("{} does not exist", target);
                Ok(None)
            }
            Err(e) => {
                error!("Failed to get {}: {}", target, e);
                Err(ReconcileError::from_store("get", target, e))
            }
        }
    }

    /// Whether `target` exists
    pub async fn exists(&self, target: &ResourceRef) -> Result<bool, ReconcileError> {
        Ok(self.fetch(target).await?.is_some())
    }

    /// Current state of `target`; absence is `ReconcileError::NotFound`
    pub(crate) async fn require(&self, target: &ResourceRef) -> Result<ExistingResource, ReconcileError> {
        self.fetch(target)
            .await?
            .ok_or_else(|| ReconcileError::NotFound(target.to_string()))
    }
}
