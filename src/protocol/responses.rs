//! Response handling
//!
//! Defines status codes and the response line sent back for every request.

use serde::{Deserialize, Serialize};

use crate::error::handlers::status_code;
use crate::storage::OperationResult;

/// Standard response codes
pub const OK: u16 = 200;
pub const BAD_REQUEST: u16 = 400;
pub const NOT_FOUND: u16 = 404;
pub const PAYLOAD_TOO_LARGE: u16 = 413;
pub const INTERNAL_ERROR: u16 = 500;
pub const SERVICE_UNAVAILABLE: u16 = 503;

/// A single response, sent as one JSON line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub status: u16,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl Response {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            body: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == OK
    }

    /// Encode as a newline-terminated JSON line.
    pub fn to_line(&self) -> String {
        match serde_json::to_string(self) {
            Ok(mut line) => {
                line.push('\n');
                line
            }
            Err(_) => format!(
                "{{\"status\":{INTERNAL_ERROR},\"message\":\"Internal server error\"}}\n"
            ),
        }
    }
}

impl From<OperationResult> for Response {
    fn from(result: OperationResult) -> Self {
        match result {
            OperationResult::Success { message, body } => Self {
                status: OK,
                message,
                body,
            },
            OperationResult::Failure { kind, message } => Self::new(status_code(kind), message),
        }
    }
}
