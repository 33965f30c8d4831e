use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Result, StorageError};

/// Kind of proxy traffic; each kind is served on its own port
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EndpointKind {
    Write,
    Read,
    Monitor,
}

impl fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointKind::Write => write!(f, "write"),
            EndpointKind::Read => write!(f, "read"),
            EndpointKind::Monitor => write!(f, "monitor"),
        }
    }
}

/// One of the proxy's ports on the private address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub kind: EndpointKind,
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    /// Full URL for a path on this endpoint, without query string
    pub fn url(&self, path: &str) -> String {
        format!(
            "http://{}:{}/{}",
            self.host,
            self.port,
            path.trim_start_matches('/')
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMethod {
    Get,
    Post,
}

/// A single request against the proxy
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    pub endpoint: Endpoint,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub method: RequestMethod,
    pub body: Option<Vec<u8>>,
}

impl ProxyRequest {
    pub fn get(endpoint: Endpoint, path: impl Into<String>) -> Self {
        Self {
            endpoint,
            path: path.into(),
            query: Vec::new(),
            method: RequestMethod::Get,
            body: None,
        }
    }

    pub fn post(endpoint: Endpoint, path: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            endpoint,
            path: path.into(),
            query: Vec::new(),
            method: RequestMethod::Post,
            body: Some(body),
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Upload in extended mode: the timestamp is embedded into the stored
    /// file's metadata so the proxy can answer with a correct Last-Modified.
    pub fn upload(endpoint: Endpoint, storage_file_id: &str, timestamp: i64, body: Vec<u8>) -> Self {
        Self::post(endpoint, "", body)
            .with_query("name", storage_file_id)
            .with_query("timestamp", timestamp)
            .with_query("embed_timestamp", 1)
    }

    pub fn url(&self) -> String {
        self.endpoint.url(&self.path)
    }
}

/// A local file to be stored, optionally under an explicit identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadTarget {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_file_id: Option<String>,
    pub path: PathBuf,
}

impl UploadTarget {
    /// Store the file under its basename
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            storage_file_id: None,
            path: path.into(),
        }
    }

    pub fn with_id(storage_file_id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            storage_file_id: Some(storage_file_id.into()),
            path: path.into(),
        }
    }

    /// Identifier the file will be stored under. Fails if the file is
    /// missing, even when an explicit identifier was given.
    pub fn storage_file_id(&self) -> Result<String> {
        resolve_storage_file_id(&self.path, self.storage_file_id.as_deref())
    }
}

/// Path form of a storage identifier: every `/`-separated segment is
/// percent-encoded, the separators are kept.
pub fn storage_file_path(storage_file_id: &str) -> String {
    storage_file_id
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Resolve the identifier a local file is stored under: the explicit one if
/// present, else the file's basename (name plus extension).
pub fn resolve_storage_file_id(path: &Path, explicit: Option<&str>) -> Result<String> {
    if !path.exists() {
        return Err(StorageError::invalid_file(path, "does not exist"));
    }

    if let Some(id) = explicit.filter(|id| !id.is_empty()) {
        return Ok(id.to_string());
    }

    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| StorageError::invalid_file(path, "has no file name"))
}
