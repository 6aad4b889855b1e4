//! Service Catalog CRDs
//!
//! Namespaced service classes (offered by brokers) and the service instances
//! provisioned from them.

pub mod service_class;
pub mod service_instance;

pub use service_class::*;
pub use service_instance::*;
