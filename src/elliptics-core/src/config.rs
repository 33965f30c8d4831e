use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::models::{storage_file_path, Endpoint, EndpointKind};

/// Connection settings for an Elliptics HTTP proxy.
///
/// Fixed once a client is built from it.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProxyConfig {
    /// Proxy address used by the application itself for every request
    #[serde(default = "default_private_server_address")]
    pub private_server_address: String,

    /// Proxy address that may be shown to users (e.g. in public file URLs)
    #[serde(default = "default_public_server_address")]
    pub public_server_address: String,

    #[serde(default = "default_write_port")]
    pub write_port: u16,

    #[serde(default = "default_read_port")]
    pub read_port: u16,

    #[serde(default = "default_monitoring_port")]
    pub monitoring_port: u16,

    /// Time (in ms) allowed for establishing a connection with the proxy
    #[serde(default = "default_connection_timeout_ms")]
    pub connection_timeout_ms: u64,
}

fn default_private_server_address() -> String {
    "127.0.0.1".to_string()
}

fn default_public_server_address() -> String {
    "localhost".to_string()
}

fn default_write_port() -> u16 {
    8080
}

fn default_read_port() -> u16 {
    80
}

fn default_monitoring_port() -> u16 {
    81
}

fn default_connection_timeout_ms() -> u64 {
    1000
}

impl ProxyConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: ProxyConfig = serde_json::from_str(&contents)?;
        Ok(config)
    }

    pub fn connection_timeout(&self) -> Duration {
        Duration::from_millis(self.connection_timeout_ms)
    }

    pub fn port(&self, kind: EndpointKind) -> u16 {
        match kind {
            EndpointKind::Write => self.write_port,
            EndpointKind::Read => self.read_port,
            EndpointKind::Monitor => self.monitoring_port,
        }
    }

    /// Endpoint on the private address for the given kind of traffic
    pub fn endpoint(&self, kind: EndpointKind) -> Endpoint {
        Endpoint {
            kind,
            host: self.private_server_address.clone(),
            port: self.port(kind),
        }
    }

    /// Externally visible read URL for a stored file
    pub fn public_file_url(&self, storage_file_id: &str) -> String {
        let storage_file_id = storage_file_path(storage_file_id);
        if self.read_port == 80 {
            format!("http://{}/{}", self.public_server_address, storage_file_id)
        } else {
            format!(
                "http://{}:{}/{}",
                self.public_server_address, self.read_port, storage_file_id
            )
        }
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            private_server_address: default_private_server_address(),
            public_server_address: default_public_server_address(),
            write_port: default_write_port(),
            read_port: default_read_port(),
            monitoring_port: default_monitoring_port(),
            connection_timeout_ms: default_connection_timeout_ms(),
        }
    }
}
