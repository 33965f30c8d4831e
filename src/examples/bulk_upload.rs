//! Bulk upload against a running Elliptics proxy
//!
//! Uploads every file given on the command line in one concurrent batch,
//! then checks, fetches and deletes each of them again.
//!
//! Run with: cargo run -p elliptics-rs --example bulk_upload -- <file>...
//!
//! Proxy settings are read from `elliptics.json` when present.

use anyhow::{bail, Result};
use elliptics_rs::{targets_by_path, ProxyConfig, StorageClient};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("bulk_upload=info,elliptics_rs=debug,elliptics_core=info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false))
        .try_init()?;

    let config = ProxyConfig::load("elliptics.json").unwrap_or_else(|_| {
        tracing::warn!("Failed to load elliptics.json, using defaults");
        ProxyConfig::default()
    });

    tracing::info!("Elliptics proxy");
    tracing::info!("  Private address: {}", config.private_server_address);
    tracing::info!(
        "  Ports: write={}, read={}, monitoring={}",
        config.write_port,
        config.read_port,
        config.monitoring_port
    );

    let paths: Vec<String> = std::env::args().skip(1).collect();
    if paths.is_empty() {
        bail!("usage: bulk_upload <file>...");
    }

    let client = StorageClient::new(config)?;
    if !client.ping().await {
        bail!("proxy does not answer on its monitoring port");
    }
    println!("✓ Proxy is alive");

    let results = client.multi_upload(targets_by_path(&paths)).await?;
    for path in &paths {
        let stored = results.get(path).copied().unwrap_or(false);
        println!("{} {}", if stored { "✓" } else { "✗" }, path);
    }

    for path in &paths {
        let Some(name) = std::path::Path::new(path).file_name() else {
            continue;
        };
        let id = name.to_string_lossy();

        if !client.exists(&id).await? {
            println!("  {} is not stored", id);
            continue;
        }

        let size = client.get(&id).await?.map(|c| c.len()).unwrap_or(0);
        println!("  {} ({} bytes) at {}", id, size, client.public_file_url(&id));

        if client.delete(&id).await? {
            println!("  ✓ Deleted {}", id);
        }
    }

    Ok(())
}
