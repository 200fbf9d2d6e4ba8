use super::ValidationContext;
use crate::domain::{work_digest, ProofKind, ProofVerdict, ReasonCode, WorkProof};
use shared_types::U256;

/// Stateless validation of work proofs: puzzle solution, then plausibility
/// of the claimed compute power for the workload type.
pub struct WorkValidator;

impl WorkValidator {
    pub fn validate(proof: &WorkProof, ctx: &ValidationContext) -> ProofVerdict {
        let invalid = |reason| ProofVerdict::invalid(ProofKind::Work, reason);

        let digest = work_digest(&proof.workload_id, proof.solution_nonce);
        let value = U256::from_big_endian(&digest);
        let target = U256::from_big_endian(&proof.difficulty_target);
        if value >= target {
            return invalid(ReasonCode::DifficultyNotMet);
        }

        let Some(bounds) = ctx.rules.work.bounds_for(proof.workload_type) else {
            return invalid(ReasonCode::ImplausiblePower);
        };
        if proof.computational_power < bounds.min_power
            || proof.computational_power > bounds.max_power
        {
            return invalid(ReasonCode::ImplausiblePower);
        }

        let weight = proof.computational_power as f64 / bounds.max_power as f64;
        ProofVerdict::weighted(ProofKind::Work, weight)
    }
}
