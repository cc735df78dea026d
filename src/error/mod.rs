//! Error handling
//!
//! Defines error types and their mapping to client-visible status codes.

pub mod handlers;
pub mod types;

pub use types::*;
