//! Sub-proof validators
//!
//! One stateless validator per proof kind. Each is a pure function of the
//! proof and a [`ValidationContext`] snapshot and reports the first failing
//! check. Validators never mutate shared state.

mod space;
mod stake;
mod time;
mod work;

pub use space::SpaceValidator;
pub use stake::{StakeAssessment, StakeValidator};
pub use time::TimeValidator;
pub use work::WorkValidator;

use crate::domain::{ConsensusConfig, PartitionSnapshot, Proof, ProofVerdict, ValidatorNode};
use crate::ports::SignatureVerifier;
use shared_types::{NodeId, OperationId, UnixSeconds};
use std::sync::Arc;

/// Immutable inputs shared by the four validators of one submission.
#[derive(Clone, Debug)]
pub struct ValidationContext {
    pub operation_id: OperationId,
    pub stake_holder_id: NodeId,
    /// Registry record of the holder at submission time.
    pub holder: Option<ValidatorNode>,
    /// The holder's accepted history at submission time.
    pub history: Arc<PartitionSnapshot>,
    pub now: UnixSeconds,
    pub rules: Arc<ConsensusConfig>,
}

/// Route a tagged proof to its validator.
pub fn validate_proof(
    proof: &Proof,
    ctx: &ValidationContext,
    verifier: &dyn SignatureVerifier,
) -> ProofVerdict {
    match proof {
        Proof::Stake(p) => StakeValidator::validate(p, ctx, verifier),
        Proof::Time(p) => TimeValidator::validate(p, ctx),
        Proof::Space(p) => SpaceValidator::validate(p, ctx),
        Proof::Work(p) => WorkValidator::validate(p, ctx),
    }
}
