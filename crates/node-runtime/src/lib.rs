//! # Proof Node Runtime
//!
//! Hosts the four-proof consensus engine in a long-running process.
//!
//! ## Modular Structure
//!
//! - `container/` - Configuration and engine assembly
//! - `genesis/` - Validators registered at startup
//! - `adapters/` - Event bus with in-process subscribers
//! - `handlers/` - Background tasks (retention sweeps)
//!
//! ## Startup Sequence
//!
//! 1. Load and validate configuration
//! 2. Open the journal, register genesis validators
//! 3. Replay the journal into the index and rejection log
//! 4. Start the retention sweeper
//! 5. Signal ready

pub mod adapters;
pub mod container;
pub mod genesis;
pub mod handlers;

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use proof_consensus::{ConsensusError, RestoreSummary};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::adapters::BroadcastEventBus;
use crate::container::{ContainerError, EngineContainer, NodeConfig, NodeService};
use crate::handlers::RetentionSweeper;

/// Runtime errors.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Container(#[from] ContainerError),

    #[error("journal replay failed: {0}")]
    Restore(#[from] ConsensusError),

    #[error("runtime already started")]
    AlreadyStarted,
}

/// The node runtime: the engine plus its background tasks.
pub struct NodeRuntime {
    container: EngineContainer,
    /// Shutdown signal sender.
    shutdown_tx: watch::Sender<bool>,
    /// Shutdown signal receiver.
    shutdown_rx: watch::Receiver<bool>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl NodeRuntime {
    /// Assemble the engine. Nothing runs until [`NodeRuntime::start`].
    pub fn new(config: NodeConfig) -> Result<Self, RuntimeError> {
        let container = EngineContainer::new(config)?;
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Ok(Self {
            container,
            shutdown_tx,
            shutdown_rx,
            tasks: Mutex::new(Vec::new()),
        })
    }

    /// Replay the journal and start background tasks.
    pub async fn start(&self) -> Result<RestoreSummary, RuntimeError> {
        if !self.tasks.lock().is_empty() {
            return Err(RuntimeError::AlreadyStarted);
        }

        info!("===========================================");
        info!("  Proof Node Runtime v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");

        let summary = self.container.service.restore()?;

        let sweeper = RetentionSweeper::new(
            Arc::clone(&self.container.service),
            Duration::from_secs(self.container.config.retention_sweep_secs),
        );
        let shutdown = self.shutdown_rx.clone();
        let handle = tokio::spawn(async move {
            sweeper.run(shutdown).await;
        });
        self.tasks.lock().push(handle);

        info!(
            accepted = summary.accepted,
            rejected = summary.rejected,
            sweep_secs = self.container.config.retention_sweep_secs,
            "Node ready"
        );
        Ok(summary)
    }

    /// Signal shutdown and wait for background tasks within the grace period.
    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown...");

        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }

        let grace = Duration::from_millis(self.container.config.shutdown_grace_ms);
        let tasks: Vec<_> = self.tasks.lock().drain(..).collect();
        for task in tasks {
            match tokio::time::timeout(grace, task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(error = %e, "Background task failed"),
                Err(_) => warn!("Background task did not stop within the grace period"),
            }
        }

        let stats = self.container.service.stats();
        info!(
            total = stats.total,
            accepted = stats.accepted,
            rejected = stats.rejected,
            quarantines = stats.quarantines,
            "Shutdown complete"
        );
    }

    pub fn service(&self) -> Arc<NodeService> {
        Arc::clone(&self.container.service)
    }

    pub fn events(&self) -> Arc<BroadcastEventBus> {
        Arc::clone(&self.container.events)
    }

    pub fn config(&self) -> &NodeConfig {
        &self.container.config
    }
}
