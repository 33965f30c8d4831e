//! Elliptics Client Library
//!
//! HTTP client for storing files through an Elliptics proxy.

mod client;
mod transport;

pub use client::{targets_by_path, StorageClient};
pub use elliptics_core::{
    DownloadInfo, Endpoint, EndpointKind, ProxyConfig, ProxyRequest, RawResponse, RequestMethod,
    RequestOutcome, StorageError, TransportError, TransportErrorKind, UploadTarget,
};
pub use transport::{HttpTransport, Transport};

pub type Result<T> = std::result::Result<T, StorageError>;
