//! # Proof Node
//!
//! Entry point for the four-proof consensus node.
//!
//! Configuration comes from `PROOF_CONFIG` (JSON) and `PROOF_*` overrides;
//! log filtering from `RUST_LOG` (default `info`).

use anyhow::{Context, Result};
use node_runtime::container::load_config;
use node_runtime::NodeRuntime;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = load_config().context("Failed to load configuration")?;

    let runtime = NodeRuntime::new(config).context("Failed to assemble engine")?;
    runtime.start().await.context("Failed to start node")?;

    info!("Node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    runtime.shutdown().await;
    Ok(())
}
