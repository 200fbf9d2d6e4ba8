//! # Node Configuration
//!
//! Engine rules plus host parameters.
//!
//! ## Load order
//!
//! 1. Built-in defaults
//! 2. JSON file named by `PROOF_CONFIG`, if set
//! 3. `PROOF_*` environment overrides
//!
//! The result is checked with [`NodeConfig::validate`] before use.

use std::path::{Path, PathBuf};

use proof_consensus::ConsensusConfig;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::genesis::GenesisValidator;

/// Environment variable naming an optional JSON config file.
pub const CONFIG_PATH_ENV: &str = "PROOF_CONFIG";

/// Complete node configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Validation rules, detector and index parameters.
    pub consensus: ConsensusConfig,
    /// Decision journal location.
    pub journal_path: PathBuf,
    /// Interval between retention sweeps.
    pub retention_sweep_secs: u64,
    /// Grace period for background tasks on shutdown.
    pub shutdown_grace_ms: u64,
    /// Validators registered at startup.
    pub genesis_validators: Vec<GenesisValidator>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            consensus: ConsensusConfig::default(),
            journal_path: PathBuf::from("./data/decisions.journal"),
            retention_sweep_secs: 60 * 60,
            shutdown_grace_ms: 2_000,
            genesis_validators: Vec::new(),
        }
    }
}

impl NodeConfig {
    /// Reject incoherent values before anything is opened.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.consensus.validate()?;
        if self.journal_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyJournalPath);
        }
        if self.retention_sweep_secs == 0 {
            return Err(ConfigError::ZeroSweepInterval);
        }
        for validator in &self.genesis_validators {
            validator.public_key()?;
        }
        Ok(())
    }

    /// Apply `PROOF_*` overrides from `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("PROOF_JOURNAL_PATH") {
            self.journal_path = PathBuf::from(path);
        }
        if let Some(v) = parse_env(&lookup, "PROOF_RETENTION_SWEEP_SECS")? {
            self.retention_sweep_secs = v;
        }
        if let Some(v) = parse_env(&lookup, "PROOF_RETENTION_SECS")? {
            self.consensus.index.retention_secs = v;
        }
        if let Some(v) = parse_env(&lookup, "PROOF_VALIDATION_DEADLINE_MS")? {
            self.consensus.validation_deadline_ms = v;
        }
        if let Some(v) = parse_env(&lookup, "PROOF_MIN_STAKE")? {
            self.consensus.stake.min_stake = v;
        }
        if let Some(v) = parse_env(&lookup, "PROOF_MAX_CLOCK_SKEW_MS")? {
            self.consensus.time.max_clock_skew_ms = v;
        }
        if let Some(v) = parse_env(&lookup, "PROOF_QUARANTINE_COOLDOWN_SECS")? {
            self.consensus.byzantine.cooldown_secs = v;
        }
        Ok(())
    }
}

fn parse_env<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv { key, value }),
    }
}

/// Read a JSON config file. Missing fields keep their defaults.
pub fn read_config_file(path: &Path) -> Result<NodeConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load configuration with the given environment lookup.
pub fn load_config_with<F>(lookup: F) -> Result<NodeConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match lookup(CONFIG_PATH_ENV) {
        Some(path) => {
            let path = PathBuf::from(path);
            info!(path = %path.display(), "Loading configuration file");
            read_config_file(&path)?
        }
        None => NodeConfig::default(),
    };
    config.apply_overrides(&lookup)?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from the process environment.
pub fn load_config() -> Result<NodeConfig, ConfigError> {
    load_config_with(|key| std::env::var(key).ok())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid value {value:?} for {key}")]
    InvalidEnv { key: &'static str, value: String },

    #[error("invalid consensus rules: {0}")]
    Consensus(#[from] proof_consensus::domain::ConfigError),

    #[error("journal path must not be empty")]
    EmptyJournalPath,

    #[error("retention sweep interval must be positive")]
    ZeroSweepInterval,

    #[error("genesis validator {node_id}: {reason}")]
    Genesis { node_id: String, reason: String },
}
