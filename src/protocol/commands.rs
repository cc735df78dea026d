//! Module `commands`
//!
//! Parses request lines received from clients into storage operations, and
//! encodes them on the client side.

use crate::error::ProtocolError;
use crate::storage::OperationRequest;

/// Parses one raw request line.
///
/// Rejects malformed JSON, unknown operations, missing fields, and requests
/// whose `path` is blank.
pub fn parse_request(raw: &str) -> Result<OperationRequest, ProtocolError> {
    let request: OperationRequest = serde_json::from_str(raw.trim())?;

    if request.path().trim().is_empty() {
        return Err(ProtocolError::EmptyPath);
    }

    Ok(request)
}

/// Encodes a request as a newline-terminated line.
pub fn encode_request(request: &OperationRequest) -> Result<String, ProtocolError> {
    let mut line = serde_json::to_string(request)?;
    line.push('\n');
    Ok(line)
}
