use crate::transport::{HttpTransport, Transport};
use crate::{Result, StorageError};
use elliptics_core::{
    document, resolve_storage_file_id, storage_file_path, DownloadInfo, EndpointKind, ProxyConfig,
    ProxyRequest, RequestOutcome, TransportError, UploadTarget,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Elliptics HTTP proxy client
pub struct StorageClient {
    config: ProxyConfig,
    /// Default execution context, reused by sequential single-shot calls
    transport: Arc<dyn Transport>,
}

impl StorageClient {
    /// Create a client talking HTTP to the configured proxy
    pub fn new(config: ProxyConfig) -> Result<Self> {
        let transport = HttpTransport::new(config.connection_timeout())?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client on top of a custom transport
    pub fn with_transport(config: ProxyConfig, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// URL under which users can download a stored file
    pub fn public_file_url(&self, storage_file_id: &str) -> String {
        self.config.public_file_url(storage_file_id)
    }

    /// Run one request on the default execution context
    pub async fn execute(&self, request: ProxyRequest) -> std::result::Result<RequestOutcome, TransportError> {
        execute_on(self.transport.as_ref(), request).await
    }

    /// Ping the proxy on its monitoring port. Failures are logged, never
    /// returned.
    pub async fn ping(&self) -> bool {
        let request = ProxyRequest::get(self.config.endpoint(EndpointKind::Monitor), "ping");
        match self.execute(request).await {
            Ok(outcome) => outcome.is_success(),
            Err(e) => {
                warn!("{}", e);
                false
            }
        }
    }

    /// Fail with `StorageError::Connectivity` unless the proxy answers a ping
    pub async fn check_connectivity(&self) -> Result<()> {
        if self.ping().await {
            Ok(())
        } else {
            Err(StorageError::Connectivity)
        }
    }

    /// Upload a single file. It is stored under `storage_file_id`, or under
    /// its basename when none is given. Returns whether the proxy reported
    /// at least one written copy.
    pub async fn upload(&self, path: impl AsRef<Path>, storage_file_id: Option<&str>) -> Result<bool> {
        let path = path.as_ref();
        self.check_connectivity().await?;

        let storage_file_id = resolve_storage_file_id(path, storage_file_id)?;
        let timestamp = chrono::Utc::now().timestamp();
        let content = read_file(path).await?;

        let request = ProxyRequest::upload(
            self.config.endpoint(EndpointKind::Write),
            &storage_file_id,
            timestamp,
            content,
        );
        let outcome = self.execute(request).await?;
        let stored = outcome.upload_succeeded();

        if stored {
            debug!("Uploaded {:?} as '{}'", path, storage_file_id);
        } else {
            warn!("Upload of {:?} as '{}' was not written", path, storage_file_id);
        }

        Ok(stored)
    }

    /// Upload many files concurrently, one request and one execution
    /// context per file, all stamped with the same timestamp.
    ///
    /// Every input key is present in the result. A transport or read
    /// failure of one file only turns that file's entry to `false`. A
    /// missing local file fails the whole batch before anything is sent.
    pub async fn multi_upload(&self, files: HashMap<String, UploadTarget>) -> Result<HashMap<String, bool>> {
        use futures::stream::{FuturesUnordered, StreamExt};

        self.check_connectivity().await?;

        let timestamp = chrono::Utc::now().timestamp();
        let mut resolved = Vec::with_capacity(files.len());
        for (key, target) in files {
            let storage_file_id = target.storage_file_id()?;
            resolved.push((key, storage_file_id, target.path));
        }

        let started = Instant::now();
        let total = resolved.len();
        let mut results = HashMap::with_capacity(total);
        let mut tasks = FuturesUnordered::new();

        for (key, storage_file_id, path) in resolved {
            let transport = match self.transport.fork() {
                Ok(transport) => transport,
                Err(e) => {
                    warn!("Cannot create transport for '{}': {}", key, e);
                    results.insert(key, false);
                    continue;
                }
            };
            let endpoint = self.config.endpoint(EndpointKind::Write);

            let handle = tokio::spawn(async move {
                let content = read_file(&path).await?;
                let request = ProxyRequest::upload(endpoint, &storage_file_id, timestamp, content);
                let outcome = execute_on(transport.as_ref(), request).await?;
                Ok::<bool, StorageError>(outcome.upload_succeeded())
            });

            tasks.push(async move { (key, handle.await) });
        }

        while let Some((key, joined)) = tasks.next().await {
            let stored = match joined {
                Ok(Ok(stored)) => stored,
                Ok(Err(e)) => {
                    warn!("Upload of '{}' failed: {}", key, e);
                    false
                }
                Err(e) => {
                    warn!("Upload task for '{}' did not complete: {}", key, e);
                    false
                }
            };
            results.insert(key, stored);
        }

        info!(
            "Multi-upload finished: {}/{} stored in {:?}",
            results.values().filter(|stored| **stored).count(),
            total,
            started.elapsed()
        );

        Ok(results)
    }

    /// Fetch a file's content. `None` if it does not exist or is empty.
    pub async fn get(&self, storage_file_id: &str) -> Result<Option<Vec<u8>>> {
        self.check_connectivity().await?;

        let request = ProxyRequest::get(
            self.config.endpoint(EndpointKind::Read),
            storage_file_path(storage_file_id),
        );
        let outcome = self.execute(request).await?;
        Ok(outcome.into_payload())
    }

    /// Download info of a stored file, `None` if there is none
    pub async fn get_download_info(&self, storage_file_id: &str) -> Result<Option<DownloadInfo>> {
        self.check_connectivity().await?;

        let request = ProxyRequest::get(
            self.config.endpoint(EndpointKind::Write),
            format!("download-info/{}", storage_file_path(storage_file_id)),
        );
        let outcome = self.execute(request).await?;

        match outcome.into_payload() {
            Some(body) => document::parse_flat(&body)
                .map(Some)
                .map_err(StorageError::InvalidResponse),
            None => Ok(None),
        }
    }

    /// Whether a file with this identifier is stored
    pub async fn exists(&self, storage_file_id: &str) -> Result<bool> {
        Ok(self.get_download_info(storage_file_id).await?.is_some())
    }

    /// Delete a stored file. Returns `false` if the proxy did not know it.
    pub async fn delete(&self, storage_file_id: &str) -> Result<bool> {
        self.check_connectivity().await?;

        let request = ProxyRequest::get(
            self.config.endpoint(EndpointKind::Write),
            format!("delete/{}", storage_file_path(storage_file_id)),
        );
        let outcome = self.execute(request).await?;
        Ok(outcome.is_success())
    }
}

async fn execute_on(
    transport: &dyn Transport,
    request: ProxyRequest,
) -> std::result::Result<RequestOutcome, TransportError> {
    let response = transport.send(request).await?;
    Ok(RequestOutcome::from_response(response))
}

async fn read_file(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .map_err(|e| StorageError::invalid_file(path, format!("cannot be read: {}", e)))
}

/// Key every target by its own path, as a convenience for callers that
/// have no natural keys of their own.
pub fn targets_by_path<I, P>(paths: I) -> HashMap<String, UploadTarget>
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    paths
        .into_iter()
        .map(|path| {
            let path = path.into();
            (path.to_string_lossy().into_owned(), UploadTarget::from_path(path))
        })
        .collect()
}
