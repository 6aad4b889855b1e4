//! Application Connector CRDs
//!
//! Resources for connecting external systems to the cluster:
//! - Applications (cluster-scoped representation of an external system)
//! - Application Mappings (enable an application in a namespace)
//! - Token Requests (one-time connector URLs for pairing)

pub mod application;
pub mod application_mapping;
pub mod token_request;

pub use application::*;
pub use application_mapping::*;
pub use token_request::*;

/// API group of every Application Connector resource
pub const GROUP: &str = "applicationconnector.kyma-project.io";
