//! Elliptics Core Library
//!
//! Shared types for talking to an Elliptics HTTP proxy, including:
//! - Proxy configuration and endpoint selection
//! - Request model and response outcome interpretation
//! - Parsing of the proxy's XML answers
//! - Storage identifier resolution for local files

pub mod config;
pub mod document;
pub mod error;
pub mod models;
pub mod outcome;

// Re-export commonly used types
pub use config::ProxyConfig;
pub use document::DownloadInfo;
pub use error::{Result, StorageError, TransportError, TransportErrorKind};
pub use models::*;
pub use outcome::{RawResponse, RequestOutcome};
