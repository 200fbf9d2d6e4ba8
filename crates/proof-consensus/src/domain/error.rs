//! Error types for the proof consensus engine
//!
//! Rejections are not errors: a rejected bundle comes back as
//! `Ok(ConsensusResult { accepted: false, .. })`. Only the conditions below
//! propagate to callers.

use super::ConfigError;
use shared_types::{NodeId, OperationId, StorageError};

/// Errors surfaced by the engine's inbound API.
#[derive(Debug, thiserror::Error)]
pub enum ConsensusError {
    #[error("Journal append failed for operation {operation_id}: {source}")]
    Journal {
        operation_id: OperationId,
        #[source]
        source: StorageError,
    },

    #[error("Journal maintenance failed: {0}")]
    JournalMaintenance(#[source] StorageError),

    #[error("Proof index unavailable: {0}")]
    IndexUnavailable(String),

    #[error("Validator task failed: {0}")]
    ValidatorTask(String),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Submission withdrawn before a decision: {0}")]
    Withdrawn(OperationId),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

impl ConsensusError {
    /// Internal faults leave no trace of the submission.
    pub fn is_internal_fault(&self) -> bool {
        match self {
            ConsensusError::Journal { .. }
            | ConsensusError::JournalMaintenance(_)
            | ConsensusError::IndexUnavailable(_)
            | ConsensusError::ValidatorTask(_)
            | ConsensusError::Codec(_) => true,
            ConsensusError::Withdrawn(_) | ConsensusError::Config(_) => false,
        }
    }

    /// Whether resubmitting the same operation id can succeed.
    ///
    /// Storage and task failures are transient and a withdrawn submission
    /// left nothing behind. Codec and configuration faults repeat on retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            ConsensusError::Journal { .. }
            | ConsensusError::JournalMaintenance(_)
            | ConsensusError::IndexUnavailable(_)
            | ConsensusError::ValidatorTask(_)
            | ConsensusError::Withdrawn(_) => true,
            ConsensusError::Codec(_) | ConsensusError::Config(_) => false,
        }
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, ConsensusError>;

/// Encoding and decoding failures of the canonical codec.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("encoding failed: {0}")]
    Encode(String),

    #[error("decoding failed: {0}")]
    Decode(String),

    #[error("payload of {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },
}

/// Rejected index commits.
///
/// `ReplayedNonce` and `DuplicateOperation` surface races that the
/// validation snapshot could not see; `Persistence` wraps the journal hook.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("nonce {nonce} already recorded for holder {holder}")]
    ReplayedNonce { holder: NodeId, nonce: u64 },

    #[error("operation {0} already recorded")]
    DuplicateOperation(OperationId),

    #[error("persistence failed: {0}")]
    Persistence(#[from] StorageError),
}
