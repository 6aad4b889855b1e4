//! ResourceStore trait for mocking
//!
//! This trait abstracts the cluster's resource store so the reconciliation core
//! can run against the real API server (`KubeStore`) or an in-memory mock.

use crate::error::StoreError;
use crate::models::{ListSelector, ResourceKind, ResourceRef};
use serde_json::Value;

/// Generic CRUD over resources identified by group/version/kind
///
/// A missing resource is reported as `StoreError::NotFound` from `get`,
/// `update` and `delete`; `create` reports `StoreError::AlreadyExists` when the
/// name is taken; `update` reports `StoreError::Conflict` when the body's
/// `resourceVersion` is stale.
#[async_trait::async_trait]
pub trait ResourceStore: Send + Sync {
    async fn get(&self, target: &ResourceRef) -> Result<Value, StoreError>;
    async fn list(
        &self,
        kind: &ResourceKind,
        namespace: Option<&str>,
        selector: &ListSelector,
    ) -> Result<Vec<Value>, StoreError>;
    async fn create(&self, target: &ResourceRef, body: &Value) -> Result<Value, StoreError>;
    async fn update(&self, target: &ResourceRef, body: &Value) -> Result<Value, StoreError>;
    async fn delete(&self, target: &ResourceRef) -> Result<(), StoreError>;
}
