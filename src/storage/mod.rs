//! File storage engine
//!
//! Path confinement, destination collision handling, and the six file
//! operations served to clients.

pub mod naming;
pub mod operations;
pub mod results;
pub mod validation;

pub use operations::FileEngine;
pub use results::{FailureKind, OperationRequest, OperationResult};
pub use validation::StorageRoot;
