//! Published events (Outgoing)

use crate::domain::{ConsensusResult, QuarantineDecision, ReasonCode};
use serde::{Deserialize, Serialize};
use shared_types::{Hash, NodeId, OperationId, UnixSeconds};

/// Published after every recorded decision, accepted or rejected.
///
/// Downstream collaborators (certificate issuance, transparency logging)
/// act only on `accepted == true` events.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OperationDecidedEvent {
    pub operation_id: OperationId,
    pub stake_holder_id: NodeId,
    pub accepted: bool,
    pub block_hash: Option<Hash>,
    pub rejection_reasons: Vec<ReasonCode>,
    pub confidence_score: f64,
    pub decided_at: UnixSeconds,
}

impl OperationDecidedEvent {
    pub fn from_result(result: &ConsensusResult) -> Self {
        Self {
            operation_id: result.operation_id.clone(),
            stake_holder_id: result.stake_holder_id.clone(),
            accepted: result.accepted,
            block_hash: result.block_hash,
            rejection_reasons: result.rejection_reasons.clone(),
            confidence_score: result.confidence_score,
            decided_at: result.decided_at,
        }
    }
}

/// How a quarantine came about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuarantineOrigin {
    /// Rejection rate crossed the detector threshold.
    Detector,
    /// Operator action.
    Admin,
}

/// Published when a node enters quarantine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeQuarantinedEvent {
    pub node_id: NodeId,
    pub until: UnixSeconds,
    pub origin: QuarantineOrigin,
    /// Window rejection rate at the time, for detector quarantines.
    pub rejection_rate: Option<f64>,
}

impl NodeQuarantinedEvent {
    pub fn from_decision(decision: &QuarantineDecision) -> Self {
        Self {
            node_id: decision.node_id.clone(),
            until: decision.until,
            origin: QuarantineOrigin::Detector,
            rejection_rate: Some(decision.stats.rejection_rate),
        }
    }
}
