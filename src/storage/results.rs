//! Storage request and result types
//!
//! Defines what callers ask the engine to do and what they get back.

use serde::{Deserialize, Serialize};

/// One file operation, addressed by paths relative to the storage root.
///
/// Serialized with an `"op"` tag, e.g.
/// `{"op":"copy","path":"note.txt","destination":"backup"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum OperationRequest {
    Read { path: String },
    Overwrite { path: String, data: String },
    Append { path: String, data: String },
    Delete { path: String },
    Copy { path: String, destination: String },
    Move { path: String, destination: String },
}

impl OperationRequest {
    /// The source path every operation carries.
    pub fn path(&self) -> &str {
        match self {
            OperationRequest::Read { path }
            | OperationRequest::Overwrite { path, .. }
            | OperationRequest::Append { path, .. }
            | OperationRequest::Delete { path }
            | OperationRequest::Copy { path, .. }
            | OperationRequest::Move { path, .. } => path,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            OperationRequest::Read { .. } => "read",
            OperationRequest::Overwrite { .. } => "overwrite",
            OperationRequest::Append { .. } => "append",
            OperationRequest::Delete { .. } => "delete",
            OperationRequest::Copy { .. } => "copy",
            OperationRequest::Move { .. } => "move",
        }
    }
}

/// Classification of a failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The path cannot be resolved under the storage root
    InvalidPath,
    /// The target or source does not exist
    NotFound,
    /// Any other filesystem failure
    Internal,
}

/// Outcome of a single operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationResult {
    Success {
        message: String,
        body: Option<String>,
    },
    Failure {
        kind: FailureKind,
        message: String,
    },
}

impl OperationResult {
    pub fn success(message: impl Into<String>) -> Self {
        OperationResult::Success {
            message: message.into(),
            body: None,
        }
    }

    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        OperationResult::Failure {
            kind,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, OperationResult::Success { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_shape() {
        let request: OperationRequest = serde_json::from_str(
            r#"{"op":"copy","path":"note.txt","destination":"backup"}"#,
        )
        .unwrap();
        assert_eq!(
            request,
            OperationRequest::Copy {
                path: "note.txt".into(),
                destination: "backup".into(),
            }
        );
        assert_eq!(request.path(), "note.txt");
        assert_eq!(request.name(), "copy");
    }

    #[test]
    fn test_result_constructors() {
        assert!(OperationResult::success("File moved").is_success());
        assert!(!OperationResult::failure(FailureKind::NotFound, "File not found").is_success());
    }

    #[test]
    fn test_request_missing_field_is_rejected() {
        assert!(serde_json::from_str::<OperationRequest>(r#"{"op":"overwrite","path":"a"}"#).is_err());
        assert!(serde_json::from_str::<OperationRequest>(r#"{"op":"rename","path":"a"}"#).is_err());
    }
}
