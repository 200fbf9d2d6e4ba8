use super::ValidationContext;
use crate::domain::{stake_signing_message, ProofKind, ProofVerdict, ReasonCode, StakeProof};
use crate::ports::SignatureVerifier;

/// Stateless validation of stake proofs.
///
/// Checks, in order: minimum amount, age, supersession by a newer accepted
/// or registered stake, signature against the registered key, and backing
/// by the holder's registered balance.
pub struct StakeValidator;

/// A stake verdict plus whether the holder's registered key signed it.
#[derive(Clone, Debug, PartialEq)]
pub struct StakeAssessment {
    pub verdict: ProofVerdict,
    /// Only a verified signature ties a rejection to the named holder.
    pub signer_verified: bool,
}

impl StakeValidator {
    pub fn validate(
        proof: &StakeProof,
        ctx: &ValidationContext,
        verifier: &dyn SignatureVerifier,
    ) -> ProofVerdict {
        Self::assess(proof, ctx, verifier).verdict
    }

    /// Validate and report signer authenticity.
    ///
    /// The signature is verified even when an earlier check fails, so every
    /// outcome carries whether the holder actually produced the proof.
    pub fn assess(
        proof: &StakeProof,
        ctx: &ValidationContext,
        verifier: &dyn SignatureVerifier,
    ) -> StakeAssessment {
        let signer_verified = Self::signature_verifies(proof, ctx, verifier);
        StakeAssessment {
            verdict: Self::check(proof, ctx, signer_verified),
            signer_verified,
        }
    }

    fn check(proof: &StakeProof, ctx: &ValidationContext, signer_verified: bool) -> ProofVerdict {
        let rules = &ctx.rules.stake;
        let invalid = |reason| ProofVerdict::invalid(ProofKind::Stake, reason);

        if proof.stake_amount < rules.min_stake {
            return invalid(ReasonCode::InsufficientStake);
        }

        // Future-dated stakes have age zero; the time proof polices clocks.
        let age = ctx.now.saturating_sub(proof.stake_timestamp);
        if age > rules.max_stake_age_secs {
            return invalid(ReasonCode::StakeExpired);
        }

        let registered = ctx.holder.as_ref().and_then(|h| h.last_stake_timestamp);
        let newest = ctx.history.latest_stake_timestamp().max(registered);
        if newest.is_some_and(|newest| proof.stake_timestamp < newest) {
            return invalid(ReasonCode::StakeExpired);
        }

        if !signer_verified {
            return invalid(ReasonCode::SignatureInvalid);
        }

        let current_stake = ctx.holder.as_ref().map_or(0, |h| h.current_stake);
        if proof.stake_amount > current_stake {
            return invalid(ReasonCode::UnbackedStake);
        }

        let weight = proof.stake_amount as f64 / rules.weight_saturation as f64;
        ProofVerdict::weighted(ProofKind::Stake, weight)
    }

    /// False for unregistered holders and holders without a key.
    fn signature_verifies(
        proof: &StakeProof,
        ctx: &ValidationContext,
        verifier: &dyn SignatureVerifier,
    ) -> bool {
        let Some(public_key) = ctx.holder.as_ref().and_then(|h| h.public_key) else {
            return false;
        };
        let message = stake_signing_message(
            &proof.stake_holder_id,
            proof.stake_amount,
            proof.stake_timestamp,
        );
        verifier.verify_ed25519(&message, &proof.signature, &public_key)
    }
}
