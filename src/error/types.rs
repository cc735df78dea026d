//! Error types
//!
//! Defines domain-specific error types for each module of the file server.

use std::io;
use thiserror::Error;

use crate::storage::FailureKind;

/// Storage module errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

impl StorageError {
    /// Classifies a filesystem failure on `path`.
    ///
    /// `ErrorKind::NotFound` becomes [`StorageError::NotFound`]; anything else
    /// is an internal I/O failure.
    pub fn from_io(path: impl Into<String>, error: io::Error) -> Self {
        let path = path.into();
        if error.kind() == io::ErrorKind::NotFound {
            StorageError::NotFound(path)
        } else {
            StorageError::Io {
                path,
                source: error,
            }
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            StorageError::InvalidPath(_) => FailureKind::InvalidPath,
            StorageError::NotFound(_) => FailureKind::NotFound,
            StorageError::Io { .. } => FailureKind::Internal,
        }
    }
}

/// Wire protocol errors
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Malformed request: {0}")]
    Malformed(String),

    #[error("Request exceeds {0} bytes")]
    RequestTooLarge(usize),

    #[error("Request path cannot be empty")]
    EmptyPath,
}

impl From<serde_json::Error> for ProtocolError {
    fn from(error: serde_json::Error) -> Self {
        ProtocolError::Malformed(error.to_string())
    }
}

/// Client-side errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Server closed the connection")]
    ConnectionClosed,

    #[error("Invalid response: {0}")]
    InvalidResponse(#[from] serde_json::Error),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Startup and runtime errors of the server process
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
