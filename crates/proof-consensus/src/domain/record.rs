//! Persisted decision records

use super::{ConsensusResult, ProofVerdict, ReasonCode};
use serde::{Deserialize, Serialize};
use shared_types::{Hash, NodeId, OperationId, UnixSeconds};

/// One journal entry per decided operation.
///
/// Carries enough to rebuild the `ConsensusResult` and the index entry on
/// restart, so replayed results are identical to the originals.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JournalRecord {
    pub operation_id: OperationId,
    pub stake_holder_id: NodeId,
    pub timestamp: UnixSeconds,
    pub accepted: bool,
    pub block_hash: Option<Hash>,
    pub reasons: Vec<ReasonCode>,
    /// Time-proof nonce; set for accepted records.
    pub nonce: Option<u64>,
    /// Stake timestamp; set for accepted records.
    pub stake_timestamp: Option<UnixSeconds>,
    pub bundle_hash: Option<Hash>,
    pub confidence_score: f64,
    pub verdicts: Vec<ProofVerdict>,
}

impl JournalRecord {
    pub fn accepted(result: &ConsensusResult, nonce: u64, stake_timestamp: UnixSeconds) -> Self {
        Self {
            nonce: Some(nonce),
            stake_timestamp: Some(stake_timestamp),
            ..Self::from_result(result)
        }
    }

    pub fn rejected(result: &ConsensusResult) -> Self {
        Self::from_result(result)
    }

    fn from_result(result: &ConsensusResult) -> Self {
        Self {
            operation_id: result.operation_id.clone(),
            stake_holder_id: result.stake_holder_id.clone(),
            timestamp: result.decided_at,
            accepted: result.accepted,
            block_hash: result.block_hash,
            reasons: result.rejection_reasons.clone(),
            nonce: None,
            stake_timestamp: None,
            bundle_hash: result.bundle_hash,
            confidence_score: result.confidence_score,
            verdicts: result.per_proof_verdicts.clone(),
        }
    }

    /// Rebuild the decision this record was written for.
    pub fn to_result(&self) -> ConsensusResult {
        ConsensusResult {
            operation_id: self.operation_id.clone(),
            stake_holder_id: self.stake_holder_id.clone(),
            accepted: self.accepted,
            per_proof_verdicts: self.verdicts.clone(),
            confidence_score: self.confidence_score,
            block_hash: self.block_hash,
            rejection_reasons: self.reasons.clone(),
            bundle_hash: self.bundle_hash,
            decided_at: self.timestamp,
        }
    }
}
