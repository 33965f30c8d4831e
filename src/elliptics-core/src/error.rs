use std::fmt;
use std::path::{Path, PathBuf};

/// Low-level failure class of a proxy request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Connection refused, DNS failure or similar
    Connect,
    /// Connection could not be established within the configured timeout
    Timeout,
    /// Failure while reading the response body
    Body,
    InvalidUrl,
    Request,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransportErrorKind::Connect => "connect",
            TransportErrorKind::Timeout => "timeout",
            TransportErrorKind::Body => "body",
            TransportErrorKind::InvalidUrl => "invalid url",
            TransportErrorKind::Request => "request",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("Elliptics transport error ({kind}): {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Cannot connect to Elliptics server")]
    Connectivity,

    #[error("File \"{}\" {}", .path.display(), .reason)]
    InvalidFile { path: PathBuf, reason: String },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),
}

impl StorageError {
    pub fn invalid_file(path: &Path, reason: impl Into<String>) -> Self {
        StorageError::InvalidFile {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;
