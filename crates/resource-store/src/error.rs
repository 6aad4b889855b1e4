//! Resource store errors

use thiserror::Error;

/// Errors that can occur when talking to the resource store
#[derive(Debug, Error)]
pub enum StoreError {
    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Create rejected because a resource with the same name exists
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Update rejected because the submitted version is stale
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Malformed resource reference (empty name, wrong scope)
    #[error("Invalid resource reference: {0}")]
    InvalidRef(String),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Kubernetes API or transport error
    #[error("Kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    /// Kubeconfig could not be read or resolved
    #[error("Kubeconfig error: {0}")]
    Kubeconfig(#[from] kube::config::KubeconfigError),

    /// Any other failure reported by the store
    #[error("Store API error: {0}")]
    Api(String),
}

impl StoreError {
    /// True when the store reported the resource as absent.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// True when a create lost against an existing resource.
    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists(_))
    }
}
