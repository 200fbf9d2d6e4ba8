//! Ed25519 signature verifier adapter

use crate::ports::SignatureVerifier;
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use shared_types::PublicKey;

/// Verifies stake signatures with `ed25519-dalek`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Ed25519Verifier;

impl Ed25519Verifier {
    pub fn new() -> Self {
        Self
    }
}

impl SignatureVerifier for Ed25519Verifier {
    fn verify_ed25519(&self, message: &[u8], signature: &[u8], public_key: &PublicKey) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(public_key) else {
            return false;
        };
        let Ok(signature) = Signature::from_slice(signature) else {
            return false;
        };
        verifying_key.verify(message, &signature).is_ok()
    }
}
