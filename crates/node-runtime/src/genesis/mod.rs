//! # Genesis Validators
//!
//! Validators known at startup, registered before the journal is replayed.
//! Public keys are 32-byte Ed25519 keys in hex.

use proof_consensus::ValidatorNode;
use serde::{Deserialize, Serialize};
use shared_types::{NodeId, PublicKey, UnixSeconds};

use crate::container::ConfigError;

/// One validator entry in the node configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisValidator {
    pub node_id: NodeId,
    /// Hex-encoded Ed25519 verifying key.
    pub public_key: String,
    pub stake: u64,
    pub stake_timestamp: UnixSeconds,
}

impl GenesisValidator {
    pub fn public_key(&self) -> Result<PublicKey, ConfigError> {
        let invalid = |reason: String| ConfigError::Genesis {
            node_id: self.node_id.clone(),
            reason,
        };
        let bytes = hex::decode(self.public_key.trim()).map_err(|e| invalid(e.to_string()))?;
        PublicKey::try_from(bytes.as_slice())
            .map_err(|_| invalid(format!("public key must be 32 bytes, got {}", bytes.len())))
    }

    pub fn to_validator(&self) -> Result<ValidatorNode, ConfigError> {
        Ok(ValidatorNode::new(
            self.node_id.clone(),
            self.public_key()?,
            self.stake,
            self.stake_timestamp,
        ))
    }
}
