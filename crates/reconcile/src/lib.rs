//! Kyma resource reconciliation
//!
//! Takes a desired state (an application, a namespace binding, a function
//! with its Api exposure) and drives the cluster's resource store to match it.
//! Each call performs one finite pass: re-runs are idempotent, a resource is
//! created at most once, and waits for asynchronously provisioned resources are
//! bounded.
//!
//! # Example
//!
//! ```no_run
//! use reconcile::{BindingIntent, Reconciler};
//! use resource_store::KubeStore;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = KubeStore::try_default().await?;
//! let reconciler = Reconciler::new(Arc::new(store));
//!
//! let report = reconciler
//!     .bind(&BindingIntent {
//!         application: "erp".to_string(),
//!         namespace: "sales".to_string(),
//!         create_namespace_if_missing: true,
//!         ignore_if_mapping_exists: false,
//!     })
//!     .await?;
//! println!("mapping {}", report.mapping);
//! # Ok(())
//! # }
//! ```
//!
//! # Components
//!
//! - **Existence checks**: `Reconciler::exists` / `Reconciler::fetch`, absence is not an error
//! - **Fingerprints**: `fingerprint` for update-vs-skip decisions on function source
//! - **Reconcile**: `Reconciler::reconcile`, create-if-absent / update-if-drifted
//! - **Readiness**: `Reconciler::wait_until_ready`, bounded polling with cancellation
//! - **Composite flows**: `bind`, `create_application`, `create_token`, `deploy_function`

pub mod backoff;
pub mod checksum;
pub mod clock;
pub mod error;
pub mod model;
pub mod reconciler;
mod test_utils;

pub use checksum::fingerprint;
pub use clock::{Clock, ManualClock, TokioClock};
pub use error::ReconcileError;
pub use model::*;
pub use reconciler::{BindingReport, DeployReport, Reconciler, TOKEN_NAMESPACE};
