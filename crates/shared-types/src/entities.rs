//! # Core Entities
//!
//! Identifier and hash primitives for the four-proof consensus workspace.

// Re-export U256 from primitive-types for difficulty arithmetic.
pub use primitive_types::U256;

/// A 32-byte hash (SHA3-256 throughout the workspace).
pub type Hash = [u8; 32];

/// The all-zero hash.
pub const ZERO_HASH: Hash = [0u8; 32];

/// A 32-byte Ed25519 public key.
pub type PublicKey = [u8; 32];

/// Identifier of a validating node (also the stake holder identifier).
pub type NodeId = String;

/// Caller-supplied identifier of one logical operation.
///
/// Must be globally unique per operation (certificate issuance, allocation,
/// execution request).
pub type OperationId = String;

/// Unix timestamp in whole seconds.
pub type UnixSeconds = u64;

/// Seconds in one day.
pub const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// Full lowercase hex rendering of a hash.
pub fn hash_to_hex(hash: &Hash) -> String {
    hex::encode(hash)
}

/// Abbreviated hex rendering (first 8 bytes) for log lines.
pub fn short_hex(hash: &Hash) -> String {
    hex::encode(&hash[..8])
}
