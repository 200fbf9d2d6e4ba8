//! Verdicts, reason codes and consensus results

use super::ProofKind;
use serde::{Deserialize, Serialize};
use shared_types::{Hash, NodeId, OperationId, UnixSeconds};
use std::fmt;

/// Stable rejection reason codes.
///
/// The snake-case strings returned by [`ReasonCode::as_str`] are part of the
/// external contract and must not change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    // Malformed
    IncompleteBundle,
    MalformedBundle,
    // Replay / duplicate
    DuplicateOperation,
    ReplayedNonce,
    // Quarantined
    NodeQuarantined,
    // Timeout
    ValidationTimeout,
    // Stake
    InsufficientStake,
    StakeExpired,
    SignatureInvalid,
    UnbackedStake,
    // Time
    ClockSkew,
    StaleTimeProof,
    HashMismatch,
    // Space
    CapacityExceeded,
    ContentIntegrityFailure,
    // Work
    DifficultyNotMet,
    ImplausiblePower,
}

/// Coarse grouping of reason codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorClass {
    Malformed,
    ProofInvalid,
    Replay,
    Quarantined,
    Timeout,
}

impl ReasonCode {
    pub const ALL: [ReasonCode; 17] = [
        ReasonCode::IncompleteBundle,
        ReasonCode::MalformedBundle,
        ReasonCode::DuplicateOperation,
        ReasonCode::ReplayedNonce,
        ReasonCode::NodeQuarantined,
        ReasonCode::ValidationTimeout,
        ReasonCode::InsufficientStake,
        ReasonCode::StakeExpired,
        ReasonCode::SignatureInvalid,
        ReasonCode::UnbackedStake,
        ReasonCode::ClockSkew,
        ReasonCode::StaleTimeProof,
        ReasonCode::HashMismatch,
        ReasonCode::CapacityExceeded,
        ReasonCode::ContentIntegrityFailure,
        ReasonCode::DifficultyNotMet,
        ReasonCode::ImplausiblePower,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ReasonCode::IncompleteBundle => "incomplete_bundle",
            ReasonCode::MalformedBundle => "malformed_bundle",
            ReasonCode::DuplicateOperation => "duplicate_operation",
            ReasonCode::ReplayedNonce => "replayed_nonce",
            ReasonCode::NodeQuarantined => "node_quarantined",
            ReasonCode::ValidationTimeout => "validation_timeout",
            ReasonCode::InsufficientStake => "insufficient_stake",
            ReasonCode::StakeExpired => "stake_expired",
            ReasonCode::SignatureInvalid => "signature_invalid",
            ReasonCode::UnbackedStake => "unbacked_stake",
            ReasonCode::ClockSkew => "clock_skew",
            ReasonCode::StaleTimeProof => "stale_time_proof",
            ReasonCode::HashMismatch => "hash_mismatch",
            ReasonCode::CapacityExceeded => "capacity_exceeded",
            ReasonCode::ContentIntegrityFailure => "content_integrity_failure",
            ReasonCode::DifficultyNotMet => "difficulty_not_met",
            ReasonCode::ImplausiblePower => "implausible_power",
        }
    }

    pub fn class(self) -> ErrorClass {
        match self {
            ReasonCode::IncompleteBundle | ReasonCode::MalformedBundle => ErrorClass::Malformed,
            ReasonCode::DuplicateOperation | ReasonCode::ReplayedNonce => ErrorClass::Replay,
            ReasonCode::NodeQuarantined => ErrorClass::Quarantined,
            ReasonCode::ValidationTimeout => ErrorClass::Timeout,
            _ => ErrorClass::ProofInvalid,
        }
    }

    /// The proof kind whose validator emits this code, if any.
    pub fn proof_kind(self) -> Option<ProofKind> {
        match self {
            ReasonCode::InsufficientStake
            | ReasonCode::StakeExpired
            | ReasonCode::SignatureInvalid
            | ReasonCode::UnbackedStake => Some(ProofKind::Stake),
            ReasonCode::ClockSkew
            | ReasonCode::StaleTimeProof
            | ReasonCode::ReplayedNonce
            | ReasonCode::HashMismatch => Some(ProofKind::Time),
            ReasonCode::CapacityExceeded | ReasonCode::ContentIntegrityFailure => {
                Some(ProofKind::Space)
            }
            ReasonCode::DifficultyNotMet | ReasonCode::ImplausiblePower => Some(ProofKind::Work),
            _ => None,
        }
    }

    /// Codes that indicate a forged proof rather than an honest mistake.
    pub fn is_forgery_signal(self) -> bool {
        matches!(
            self,
            ReasonCode::SignatureInvalid
                | ReasonCode::HashMismatch
                | ReasonCode::ContentIntegrityFailure
        )
    }

    /// Rejections produced before any validator ran.
    pub fn is_fast_path(self) -> bool {
        matches!(
            self,
            ReasonCode::IncompleteBundle
                | ReasonCode::MalformedBundle
                | ReasonCode::DuplicateOperation
                | ReasonCode::NodeQuarantined
        )
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one sub-validator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProofVerdict {
    pub kind: ProofKind,
    pub valid: bool,
    pub reason: Option<ReasonCode>,
    /// Access, storage or work weight in `[0, 1]`; `None` for time proofs
    /// and for invalid verdicts.
    pub weight: Option<f64>,
}

impl ProofVerdict {
    pub fn valid(kind: ProofKind) -> Self {
        Self {
            kind,
            valid: true,
            reason: None,
            weight: None,
        }
    }

    pub fn weighted(kind: ProofKind, weight: f64) -> Self {
        Self {
            weight: Some(weight.clamp(0.0, 1.0)),
            ..Self::valid(kind)
        }
    }

    pub fn invalid(kind: ProofKind, reason: ReasonCode) -> Self {
        Self {
            kind,
            valid: false,
            reason: Some(reason),
            weight: None,
        }
    }
}

/// Final decision for one operation. Immutable once produced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConsensusResult {
    pub operation_id: OperationId,
    /// Submitter; empty when the bundle carried no stake proof.
    pub stake_holder_id: NodeId,
    pub accepted: bool,
    /// Stake, time, space, work order. Empty when rejected before validation.
    pub per_proof_verdicts: Vec<ProofVerdict>,
    /// Mean of access, storage and work weights. Informational only.
    pub confidence_score: f64,
    /// Present iff `accepted`.
    pub block_hash: Option<Hash>,
    pub rejection_reasons: Vec<ReasonCode>,
    /// Canonical hash of the submitted bundle, when it could be assembled.
    pub bundle_hash: Option<Hash>,
    pub decided_at: UnixSeconds,
}

impl ConsensusResult {
    /// A rejection produced without running validators.
    pub fn rejected_early(
        operation_id: impl Into<OperationId>,
        stake_holder_id: impl Into<NodeId>,
        reason: ReasonCode,
        bundle_hash: Option<Hash>,
        decided_at: UnixSeconds,
    ) -> Self {
        Self {
            operation_id: operation_id.into(),
            stake_holder_id: stake_holder_id.into(),
            accepted: false,
            per_proof_verdicts: Vec::new(),
            confidence_score: 0.0,
            block_hash: None,
            rejection_reasons: vec![reason],
            bundle_hash,
            decided_at,
        }
    }

    pub fn has_reason(&self, reason: ReasonCode) -> bool {
        self.rejection_reasons.contains(&reason)
    }

    pub fn verdict(&self, kind: ProofKind) -> Option<&ProofVerdict> {
        self.per_proof_verdicts.iter().find(|v| v.kind == kind)
    }
}

/// Diagnostic view of a node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeStatus {
    pub node_id: NodeId,
    pub quarantined: bool,
    pub violation_count: u64,
    pub current_stake: u64,
    pub quarantined_until: Option<UnixSeconds>,
}
