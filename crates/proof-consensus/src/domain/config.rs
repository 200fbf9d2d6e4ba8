//! Engine configuration
//!
//! Every threshold the validators and the detector use lives here, with the
//! production defaults. All sections deserialize with `#[serde(default)]` so
//! partial JSON files only override what they name.

use super::WorkloadType;
use serde::{Deserialize, Serialize};
use shared_types::SECS_PER_DAY;

/// Minimum collateral for any operation (base units).
pub const MIN_STAKE: u64 = 5_000;

/// Maximum stake age before renewal is required (30 days).
pub const MAX_STAKE_AGE_SECS: u64 = 30 * SECS_PER_DAY;

/// Maximum tolerated clock skew (60 seconds).
pub const MAX_CLOCK_SKEW_MS: i64 = 60_000;

/// Maximum time-proof age (1 hour).
pub const MAX_TIME_PROOF_AGE_SECS: u64 = 60 * 60;

/// Deadline for the four validators of one submission.
pub const DEFAULT_VALIDATION_DEADLINE_MS: u64 = 200;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsensusConfig {
    pub stake: StakeRules,
    pub time: TimeRules,
    pub space: SpaceRules,
    pub work: WorkRules,
    pub byzantine: ByzantineConfig,
    pub index: IndexConfig,
    /// Deadline for all four validators (milliseconds).
    pub validation_deadline_ms: u64,
    /// Rejected results kept in memory before rotation.
    pub rejection_log_capacity: usize,
    /// Admin actions kept in the audit trail.
    pub audit_log_capacity: usize,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            stake: StakeRules::default(),
            time: TimeRules::default(),
            space: SpaceRules::default(),
            work: WorkRules::default(),
            byzantine: ByzantineConfig::default(),
            index: IndexConfig::default(),
            validation_deadline_ms: DEFAULT_VALIDATION_DEADLINE_MS,
            rejection_log_capacity: 10_000,
            audit_log_capacity: 1_000,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StakeRules {
    pub min_stake: u64,
    pub max_stake_age_secs: u64,
    /// Stake at which access weight reaches 1.0.
    pub weight_saturation: u64,
}

impl Default for StakeRules {
    fn default() -> Self {
        Self {
            min_stake: MIN_STAKE,
            max_stake_age_secs: MAX_STAKE_AGE_SECS,
            weight_saturation: 100_000,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeRules {
    pub max_clock_skew_ms: i64,
    pub max_proof_age_secs: u64,
}

impl Default for TimeRules {
    fn default() -> Self {
        Self {
            max_clock_skew_ms: MAX_CLOCK_SKEW_MS,
            max_proof_age_secs: MAX_TIME_PROOF_AGE_SECS,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpaceRules {
    /// Committed bytes at which storage weight reaches 1.0.
    pub weight_saturation_bytes: u64,
}

impl Default for SpaceRules {
    fn default() -> Self {
        Self {
            weight_saturation_bytes: 1 << 30,
        }
    }
}

/// Plausible compute range for one workload type (1000 units per core).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadBounds {
    pub workload_type: WorkloadType,
    pub min_power: u64,
    pub max_power: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkRules {
    pub bounds: Vec<WorkloadBounds>,
}

impl WorkRules {
    pub fn bounds_for(&self, workload_type: WorkloadType) -> Option<&WorkloadBounds> {
        self.bounds.iter().find(|b| b.workload_type == workload_type)
    }
}

impl Default for WorkRules {
    fn default() -> Self {
        let bound = |workload_type, min_power, max_power| WorkloadBounds {
            workload_type,
            min_power,
            max_power,
        };
        Self {
            bounds: vec![
                bound(WorkloadType::Certificate, 1_000, 100_000),
                bound(WorkloadType::CertificateTransparency, 1_000, 200_000),
                bound(WorkloadType::DnsResolution, 500, 50_000),
                bound(WorkloadType::Compute, 1_000, 1_000_000),
                bound(WorkloadType::Network, 500, 200_000),
                bound(WorkloadType::Storage, 500, 500_000),
            ],
        }
    }
}

/// Rolling-window quarantine policy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ByzantineConfig {
    /// N: most recent verdicts kept per node.
    pub window_size: usize,
    /// T: verdicts older than this drop out of the window.
    pub window_secs: u64,
    /// Strict lower bound on the rejection rate that quarantines.
    pub rejection_threshold: f64,
    pub min_rejections: usize,
    pub min_sample_size: usize,
    pub cooldown_secs: u64,
}

impl Default for ByzantineConfig {
    fn default() -> Self {
        Self {
            window_size: 100,
            window_secs: 60 * 60,
            rejection_threshold: 0.34,
            min_rejections: 10,
            min_sample_size: 20,
            cooldown_secs: 15 * 60,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Accepted entries older than this are evicted by retention sweeps.
    pub retention_secs: u64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            retention_secs: MAX_STAKE_AGE_SECS,
        }
    }
}

/// Incoherent configuration values.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("rejection_threshold must be within (0, 1), got {0}")]
    Threshold(String),

    #[error("workload bounds for {0} are inverted")]
    InvertedBounds(&'static str),

    #[error("no workload bounds configured for {0}")]
    MissingBounds(&'static str),

    #[error("index retention ({retention}s) is shorter than the time-proof age limit ({proof_age}s)")]
    RetentionTooShort { retention: u64, proof_age: u64 },
}

impl ConsensusConfig {
    /// Reject values the engine cannot operate with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let nonzero = [
            ("stake.weight_saturation", self.stake.weight_saturation),
            ("space.weight_saturation_bytes", self.space.weight_saturation_bytes),
            ("validation_deadline_ms", self.validation_deadline_ms),
            ("byzantine.window_size", self.byzantine.window_size as u64),
            ("byzantine.window_secs", self.byzantine.window_secs),
            ("rejection_log_capacity", self.rejection_log_capacity as u64),
            ("audit_log_capacity", self.audit_log_capacity as u64),
        ];
        for (field, value) in nonzero {
            if value == 0 {
                return Err(ConfigError::Zero { field });
            }
        }

        let t = self.byzantine.rejection_threshold;
        if !(t > 0.0 && t < 1.0) {
            return Err(ConfigError::Threshold(t.to_string()));
        }

        for workload_type in WorkloadType::ALL {
            let bounds = self
                .work
                .bounds_for(workload_type)
                .ok_or(ConfigError::MissingBounds(workload_type.as_str()))?;
            if bounds.max_power == 0 || bounds.min_power > bounds.max_power {
                return Err(ConfigError::InvertedBounds(workload_type.as_str()));
            }
        }

        // Nonce replay checks only see what the index still holds.
        if self.index.retention_secs < self.time.max_proof_age_secs {
            return Err(ConfigError::RetentionTooShort {
                retention: self.index.retention_secs,
                proof_age: self.time.max_proof_age_secs,
            });
        }
        Ok(())
    }
}
