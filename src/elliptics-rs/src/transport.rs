use async_trait::async_trait;
use elliptics_core::{ProxyRequest, RawResponse, RequestMethod, TransportError, TransportErrorKind};
use reqwest::Client as HttpClient;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// One execution context for proxy requests
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform a single HTTP exchange
    async fn send(&self, request: ProxyRequest) -> Result<RawResponse, TransportError>;

    /// A new, independent execution context with the same settings
    fn fork(&self) -> Result<Arc<dyn Transport>, TransportError>;
}

/// reqwest-backed transport with a bounded connect timeout.
///
/// Only connection establishment is bounded; a connected but slow proxy can
/// hold a request open indefinitely.
pub struct HttpTransport {
    client: HttpClient,
    connect_timeout: Duration,
}

impl HttpTransport {
    pub fn new(connect_timeout: Duration) -> Result<Self, TransportError> {
        let client = HttpClient::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(classify)?;

        Ok(Self {
            client,
            connect_timeout,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ProxyRequest) -> Result<RawResponse, TransportError> {
        let url = request.url();
        debug!(
            endpoint = %request.endpoint.kind,
            method = ?request.method,
            "Sending request to {}",
            url
        );

        let mut builder = match request.method {
            RequestMethod::Get => self.client.get(&url),
            RequestMethod::Post => self.client.post(&url),
        };
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(classify)?;
        let status = response.status().as_u16();
        let url = response.url().to_string();
        let body = response.bytes().await.map_err(classify)?;

        Ok(RawResponse {
            url,
            status,
            body: body.to_vec(),
        })
    }

    fn fork(&self) -> Result<Arc<dyn Transport>, TransportError> {
        Ok(Arc::new(HttpTransport::new(self.connect_timeout)?))
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    let kind = if err.is_timeout() {
        TransportErrorKind::Timeout
    } else if err.is_connect() {
        TransportErrorKind::Connect
    } else if err.is_builder() {
        TransportErrorKind::InvalidUrl
    } else if err.is_body() || err.is_decode() {
        TransportErrorKind::Body
    } else {
        TransportErrorKind::Request
    };

    TransportError::new(kind, err.to_string())
}
