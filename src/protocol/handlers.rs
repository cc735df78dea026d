//! Request handlers
//!
//! Turns one raw request line into one response, running the storage
//! operation in between.

use log::{debug, warn};

use crate::error::handlers::protocol_status_code;
use crate::protocol::commands::parse_request;
use crate::protocol::responses::Response;
use crate::storage::FileEngine;

/// Dispatches a received request line to the storage engine.
pub async fn handle_request(engine: &FileEngine, raw: &str) -> Response {
    match parse_request(raw) {
        Ok(request) => {
            debug!("Dispatching {} on {}", request.name(), request.path());
            Response::from(engine.execute(request).await)
        }
        Err(e) => {
            warn!("Rejected request: {e}");
            Response::new(protocol_status_code(&e), e.to_string())
        }
    }
}
