//! Error types for localblob

use thiserror::Error;

/// Result type alias for localblob operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in localblob operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Container not found: {0}")]
    ContainerNotFound(String),

    #[error("Key not found: {container}/{key}")]
    KeyNotFound { container: String, key: String },

    /// HTTP 412 equivalent
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    /// HTTP 304 equivalent
    #[error("Not modified: {0}")]
    NotModified(String),

    #[error("Illegal range: {0}")]
    IllegalRange(String),

    #[error("Illegal state: {0}")]
    IllegalState(String),

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid index file: {0}")]
    InvalidFile(String),

    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn key_not_found(container: &str, key: &str) -> Self {
        Error::KeyNotFound {
            container: container.to_string(),
            key: key.to_string(),
        }
    }

    /// Whether this error means the target container or blob does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::ContainerNotFound(_) | Error::KeyNotFound { .. }
        )
    }

    /// The HTTP status an adapter layer would answer with, where one applies
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Error::ContainerNotFound(_) | Error::KeyNotFound { .. } => Some(404),
            Error::NotModified(_) => Some(304),
            Error::PreconditionFailed(_) => Some(412),
            Error::IllegalRange(_) => Some(416),
            Error::IllegalState(_) => Some(409),
            Error::InvalidName(_) | Error::InvalidArgument(_) => Some(400),
            _ => None,
        }
    }
}
