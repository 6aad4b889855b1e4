//! Reconciliation error types.
//!
//! Every variant names the resource involved so that user-visible failures
//! say which kind and which object went wrong.

use resource_store::{ResourceRef, StoreError};
use thiserror::Error;

/// Errors that can occur while reconciling resources.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Resource was required but does not exist
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Create rejected, or pre-existing resource under a `Fail` conflict policy
    #[error("Resource already exists: {0}")]
    AlreadyExists(String),

    /// Update rejected because the resource changed since it was read
    #[error("Conflict updating {resource}: {message}")]
    Conflict { resource: String, message: String },

    /// Readiness budget spent without reaching the ready state
    #[error("{resource} not ready after {attempts} attempts (last status: {last_status})")]
    Exhausted {
        resource: String,
        attempts: u32,
        last_status: String,
    },

    /// Readiness wait aborted by the caller
    #[error("Wait for {0} was cancelled")]
    Cancelled(String),

    /// Network, auth or server failure talking to the store
    #[error("Failed to {op} {resource}: {source}")]
    Transport {
        op: &'static str,
        resource: String,
        #[source]
        source: StoreError,
    },

    /// Malformed desired-resource input
    #[error("Invalid {resource}: {message}")]
    Validation { resource: String, message: String },

    /// Application named in the request does not exist
    #[error("Application {0} does not exist")]
    ApplicationNotFound(String),

    /// Target namespace does not exist and may not be created
    #[error("Namespace {0} does not exist")]
    NamespaceNotFound(String),

    /// Application is already mapped into the namespace
    #[error("Mapping already exists: application {application} in namespace {namespace}")]
    MappingAlreadyExists {
        application: String,
        namespace: String,
    },
}

impl ReconcileError {
    /// Attach the operation and resource to a store error
    pub(crate) fn from_store(op: &'static str, target: &ResourceRef, err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => Self::NotFound(target.to_string()),
            StoreError::AlreadyExists(_) => Self::AlreadyExists(target.to_string()),
            StoreError::Conflict(message) => Self::Conflict {
                resource: target.to_string(),
                message,
            },
            StoreError::InvalidRef(message) => Self::Validation {
                resource: target.to_string(),
                message,
            },
            other => Self::Transport {
                op,
                resource: target.to_string(),
                source: other,
            },
        }
    }

    /// Reference validation failure for `what`
    pub(crate) fn invalid(what: impl Into<String>, err: StoreError) -> Self {
        Self::Validation {
            resource: what.into(),
            message: err.to_string(),
        }
    }
}
