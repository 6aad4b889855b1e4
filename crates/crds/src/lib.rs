//! Kyma CRD Definitions
//!
//! Typed custom resources the Kyma CLI reads and writes, and the
//! `ResourceKind` constants used to address them through the resource store.

pub mod applicationconnector;
pub mod kinds;
pub mod references;
pub mod serverless;
pub mod servicecatalog;

pub use applicationconnector::*;
pub use references::*;
pub use serverless::*;
pub use servicecatalog::*;
