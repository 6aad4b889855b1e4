//! Resource store for the Kyma CLI
//!
//! Generic get/list/create/update/delete access to Kubernetes resources,
//! addressed by group/version/kind, namespace and name. Bodies are untyped
//! JSON so that custom resources can be handled without compiled-in types.
//!
//! # Example
//!
//! ```no_run
//! use resource_store::{KubeStore, ResourceKind, ResourceRef, ResourceStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! const NAMESPACES: ResourceKind = ResourceKind::cluster("", "v1", "Namespace", "namespaces");
//!
//! let store = KubeStore::try_default().await?;
//! let ns = store.get(&ResourceRef::cluster(NAMESPACES, "default")?).await?;
//! println!("{}", ns["metadata"]["uid"]);
//! # Ok(())
//! # }
//! ```
//!
//! # Error semantics
//!
//! - `get`, `update` and `delete` report a missing resource as `StoreError::NotFound`
//! - `create` reports a taken name as `StoreError::AlreadyExists`
//! - `update` reports a stale `resourceVersion` as `StoreError::Conflict`

pub mod client;
pub mod error;
pub mod models;
#[path = "trait.rs"]
pub mod store_trait;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use client::KubeStore;
pub use error::StoreError;
pub use models::{resource_version, ListSelector, ResourceKind, ResourceRef, Scope};
pub use store_trait::ResourceStore;
#[cfg(any(test, feature = "test-util"))]
pub use mock::{MockResourceStore, StoreCall, StoreOp};
