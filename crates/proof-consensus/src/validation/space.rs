use super::ValidationContext;
use crate::domain::{space_content_digest, ProofKind, ProofVerdict, ReasonCode, SpaceProof};

/// Stateless validation of space proofs: capacity, then content digest.
pub struct SpaceValidator;

impl SpaceValidator {
    pub fn validate(proof: &SpaceProof, ctx: &ValidationContext) -> ProofVerdict {
        if proof.bytes_committed > proof.total_capacity {
            return ProofVerdict::invalid(ProofKind::Space, ReasonCode::CapacityExceeded);
        }

        let expected = space_content_digest(
            &proof.node_id,
            &proof.storage_path,
            proof.bytes_committed,
            proof.content_root.as_ref(),
        );
        if proof.content_hash != expected {
            return ProofVerdict::invalid(ProofKind::Space, ReasonCode::ContentIntegrityFailure);
        }

        let saturation = ctx.rules.space.weight_saturation_bytes as f64;
        ProofVerdict::weighted(ProofKind::Space, proof.bytes_committed as f64 / saturation)
    }
}
