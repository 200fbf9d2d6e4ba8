use super::ValidationContext;
use crate::domain::{time_proof_digest, ProofKind, ProofVerdict, ReasonCode, TimeProof};

/// Stateless validation of time proofs.
///
/// Checks, in order: clock skew (offset and future timestamps), freshness,
/// nonce replay against the holder's history, and the proof digest.
pub struct TimeValidator;

impl TimeValidator {
    pub fn validate(proof: &TimeProof, ctx: &ValidationContext) -> ProofVerdict {
        let rules = &ctx.rules.time;
        let invalid = |reason| ProofVerdict::invalid(ProofKind::Time, reason);

        if proof.network_time_offset.unsigned_abs() > rules.max_clock_skew_ms.unsigned_abs() {
            return invalid(ReasonCode::ClockSkew);
        }

        let max_skew_secs = rules.max_clock_skew_ms.unsigned_abs() / 1_000;
        if proof.proof_timestamp > ctx.now.saturating_add(max_skew_secs) {
            return invalid(ReasonCode::ClockSkew);
        }

        if ctx.now.saturating_sub(proof.proof_timestamp) > rules.max_proof_age_secs {
            return invalid(ReasonCode::StaleTimeProof);
        }

        if ctx.history.contains_nonce(proof.nonce) {
            return invalid(ReasonCode::ReplayedNonce);
        }

        let expected = time_proof_digest(proof.nonce, proof.proof_timestamp, &ctx.operation_id);
        if proof.proof_hash != expected {
            return invalid(ReasonCode::HashMismatch);
        }

        ProofVerdict::valid(ProofKind::Time)
    }
}
