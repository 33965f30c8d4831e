#![allow(dead_code)]

use async_trait::async_trait;
use elliptics_rs::{
    EndpointKind, ProxyConfig, ProxyRequest, RawResponse, RequestMethod, StorageClient, Transport,
    TransportError, TransportErrorKind,
};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// In-memory stand-in for the proxy, shared by every forked context
#[derive(Default)]
pub struct ProxyState {
    pub files: Mutex<HashMap<String, Vec<u8>>>,
    pub timestamps: Mutex<Vec<String>>,
    pub unreachable: Mutex<bool>,
    pub failing_names: Mutex<HashSet<String>>,
    pub panicking_names: Mutex<HashSet<String>>,
    pub write_delay: Mutex<Duration>,
    pub writes: AtomicUsize,
    pub forks: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

#[derive(Clone, Default)]
pub struct FakeProxy {
    pub state: Arc<ProxyState>,
}

impl FakeProxy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        *self.state.unreachable.lock().unwrap() = unreachable;
    }

    pub fn fail_uploads_of(&self, name: &str) {
        self.state.failing_names.lock().unwrap().insert(name.to_string());
    }

    pub fn panic_on_upload_of(&self, name: &str) {
        self.state.panicking_names.lock().unwrap().insert(name.to_string());
    }

    pub fn set_write_delay(&self, delay: Duration) {
        *self.state.write_delay.lock().unwrap() = delay;
    }

    pub fn writes(&self) -> usize {
        self.state.writes.load(Ordering::SeqCst)
    }

    pub fn stored(&self, name: &str) -> Option<Vec<u8>> {
        self.state.files.lock().unwrap().get(name).cloned()
    }

    pub fn client(&self) -> StorageClient {
        StorageClient::with_transport(ProxyConfig::default(), Arc::new(self.clone()))
    }

    fn respond(&self, request: &ProxyRequest, status: u16, body: &[u8]) -> RawResponse {
        RawResponse {
            url: request.url(),
            status,
            body: body.to_vec(),
        }
    }

    async fn write(&self, request: &ProxyRequest) -> Result<RawResponse, TransportError> {
        let name = query_value(request, "name").unwrap_or_default();
        let timestamp = query_value(request, "timestamp").unwrap_or_default();

        let delay = *self.state.write_delay.lock().unwrap();
        let current = self.state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.max_in_flight.fetch_max(current, Ordering::SeqCst);
        tokio::time::sleep(delay).await;
        self.state.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.state.writes.fetch_add(1, Ordering::SeqCst);
        if self.state.panicking_names.lock().unwrap().contains(&name) {
            panic!("proxy connection handler crashed on {}", name);
        }
        if self.state.failing_names.lock().unwrap().contains(&name) {
            return Err(TransportError::new(
                TransportErrorKind::Connect,
                "connection reset by peer",
            ));
        }

        self.state.timestamps.lock().unwrap().push(timestamp);
        self.state
            .files
            .lock()
            .unwrap()
            .insert(name.clone(), request.body.clone().unwrap_or_default());

        let answer = format!(
            r#"<?xml version="1.0" encoding="utf-8"?><post obj="{}" groups="2"><complete addr="10.0.0.1:1025:2" group="1" status="0"/><written>2</written></post>"#,
            name
        );
        Ok(self.respond(request, 200, answer.as_bytes()))
    }
}

#[async_trait]
impl Transport for FakeProxy {
    async fn send(&self, request: ProxyRequest) -> Result<RawResponse, TransportError> {
        if *self.state.unreachable.lock().unwrap() {
            return Err(TransportError::new(
                TransportErrorKind::Connect,
                "connection refused",
            ));
        }

        let path = urlencoding::decode(&request.path)
            .map(|decoded| decoded.into_owned())
            .unwrap_or_else(|_| request.path.clone());
        match (request.endpoint.kind, request.method) {
            (EndpointKind::Monitor, RequestMethod::Get) if path == "ping" => {
                Ok(self.respond(&request, 200, b""))
            }
            (EndpointKind::Write, RequestMethod::Post) => self.write(&request).await,
            (EndpointKind::Write, RequestMethod::Get) => {
                if let Some(id) = path.strip_prefix("download-info/") {
                    if self.stored(id).is_some() {
                        let info = format!(
                            "<download-info><host>storage-01.local</host><path>/srv/data/{}</path><region>-1</region></download-info>",
                            id
                        );
                        return Ok(self.respond(&request, 200, info.as_bytes()));
                    }
                } else if let Some(id) = path.strip_prefix("delete/") {
                    if self.state.files.lock().unwrap().remove(id).is_some() {
                        return Ok(self.respond(&request, 200, b""));
                    }
                }
                Ok(self.respond(&request, 404, b"Not Found"))
            }
            (EndpointKind::Read, RequestMethod::Get) => match self.stored(&path) {
                Some(content) => Ok(self.respond(&request, 200, &content)),
                None => Ok(self.respond(&request, 404, b"Not Found")),
            },
            _ => Ok(self.respond(&request, 400, b"Bad Request")),
        }
    }

    fn fork(&self) -> Result<Arc<dyn Transport>, TransportError> {
        self.state.forks.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(self.clone()))
    }
}

fn query_value(request: &ProxyRequest, key: &str) -> Option<String> {
    request
        .query
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.clone())
}

/// Write `content` to `name` inside `dir` and return the full path
pub fn local_file(dir: &tempfile::TempDir, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}
