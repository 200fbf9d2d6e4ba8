//! # Engine Container
//!
//! Builds the consensus service from configuration: opens the journal,
//! wires the verifier and the event bus, and registers genesis validators.

pub mod config;

pub use config::{load_config, load_config_with, ConfigError, NodeConfig};

use std::sync::Arc;

use proof_consensus::{
    ConsensusDependencies, ConsensusError, ConsensusService, Ed25519Verifier, FileJournal,
};
use shared_types::StorageError;
use tracing::info;

use crate::adapters::BroadcastEventBus;

/// The service type the node runs.
pub type NodeService = ConsensusService<Ed25519Verifier, FileJournal, BroadcastEventBus>;

/// Errors while assembling the engine.
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("cannot open journal: {0}")]
    Journal(#[from] StorageError),

    #[error("cannot build engine: {0}")]
    Engine(#[from] ConsensusError),
}

/// Long-lived engine components.
pub struct EngineContainer {
    pub config: NodeConfig,
    pub service: Arc<NodeService>,
    pub events: Arc<BroadcastEventBus>,
}

impl EngineContainer {
    pub fn new(config: NodeConfig) -> Result<Self, ContainerError> {
        config.validate()?;

        let journal = Arc::new(FileJournal::open(&config.journal_path)?);
        let events = Arc::new(BroadcastEventBus::default());
        let service = ConsensusService::new(ConsensusDependencies {
            sig_verifier: Arc::new(Ed25519Verifier::new()),
            journal,
            event_bus: events.clone(),
            config: config.consensus.clone(),
        })?;

        for entry in &config.genesis_validators {
            service.register_node(entry.to_validator()?);
        }
        info!(
            journal = %config.journal_path.display(),
            validators = config.genesis_validators.len(),
            "Engine container assembled"
        );

        Ok(Self {
            config,
            service: Arc::new(service),
            events,
        })
    }
}
