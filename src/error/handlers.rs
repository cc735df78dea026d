//! Error handlers
//!
//! Maps failures onto the status codes reported to clients.

use crate::error::types::{ProtocolError, StorageError};
use crate::protocol::responses::{
    BAD_REQUEST, INTERNAL_ERROR, NOT_FOUND, PAYLOAD_TOO_LARGE,
};
use crate::storage::FailureKind;
use log::{error, warn};

/// Convert a failure kind to a response status code
pub fn status_code(kind: FailureKind) -> u16 {
    match kind {
        FailureKind::InvalidPath => BAD_REQUEST,
        FailureKind::NotFound => NOT_FOUND,
        FailureKind::Internal => INTERNAL_ERROR,
    }
}

/// Convert a protocol error to a response status code
pub fn protocol_status_code(err: &ProtocolError) -> u16 {
    match err {
        ProtocolError::Malformed(_) | ProtocolError::EmptyPath => BAD_REQUEST,
        ProtocolError::RequestTooLarge(_) => PAYLOAD_TOO_LARGE,
    }
}

/// Log a storage failure at a level matching its severity
pub fn log_storage_error(operation: &str, err: &StorageError) {
    match err {
        StorageError::Io { .. } => error!("{operation} failed: {err}"),
        _ => warn!("{operation} rejected: {err}"),
    }
}
