//! Wire protocol
//!
//! Newline-delimited JSON: one request per line in, one response per line out.

pub mod commands;
pub mod handlers;
pub mod responses;

pub use commands::{encode_request, parse_request};
pub use handlers::handle_request;
pub use responses::Response;
