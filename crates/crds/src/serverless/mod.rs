//! Serverless CRDs
//!
//! - Functions (kubeless lambdas)
//! - Apis (gateway exposure of a service under a hostname)

pub mod api;
pub mod function;

pub use api::*;
pub use function::*;
