//! Canonical encoding and hashing
//!
//! `H` is SHA3-256 everywhere. Variable-length fields in canonical bytes are
//! prefixed with their length as `u32` little-endian; integers are
//! little-endian. Wire bundles and journal records use bincode.

use super::{
    CodecError, ConsensusProof, ConsensusResult, JournalRecord, Proof, ProofBundle, SpaceProof,
    StakeProof, TimeProof, WorkProof,
};
use sha3::{Digest, Sha3_256};
use shared_types::{Hash, UnixSeconds};

/// Upper bound on an encoded bundle accepted by [`decode_bundle`].
pub const MAX_ENCODED_BUNDLE_BYTES: usize = 64 * 1024;

const BUNDLE_DOMAIN: &[u8] = b"four-proof/bundle/v1";
const BLOCK_DOMAIN: &[u8] = b"four-proof/block/v1";

pub fn hash_bytes(data: &[u8]) -> Hash {
    let mut hasher = Sha3_256::new();
    hasher.update(data);
    hasher.finalize().into()
}

fn put_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    buf.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
    buf.extend_from_slice(bytes);
}

fn put_str(buf: &mut Vec<u8>, s: &str) {
    put_bytes(buf, s.as_bytes());
}

/// Message covered by a stake signature: `"stake" ‖ holder ‖ amount ‖ timestamp`.
pub fn stake_signing_message(
    stake_holder_id: &str,
    stake_amount: u64,
    stake_timestamp: UnixSeconds,
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(5 + 4 + stake_holder_id.len() + 16);
    buf.extend_from_slice(b"stake");
    put_str(&mut buf, stake_holder_id);
    buf.extend_from_slice(&stake_amount.to_le_bytes());
    buf.extend_from_slice(&stake_timestamp.to_le_bytes());
    buf
}

/// `H(nonce ‖ proof_timestamp ‖ operation_id)`
pub fn time_proof_digest(nonce: u64, proof_timestamp: UnixSeconds, operation_id: &str) -> Hash {
    let mut hasher = Sha3_256::new();
    hasher.update(nonce.to_le_bytes());
    hasher.update(proof_timestamp.to_le_bytes());
    hasher.update(operation_id.as_bytes());
    hasher.finalize().into()
}

/// `H(workload_id ‖ solution_nonce)`
pub fn work_digest(workload_id: &str, solution_nonce: u64) -> Hash {
    let mut hasher = Sha3_256::new();
    hasher.update(workload_id.as_bytes());
    hasher.update(solution_nonce.to_le_bytes());
    hasher.finalize().into()
}

/// `H(node_id ‖ storage_path ‖ [0, bytes_committed) ‖ content_root?)`
pub fn space_content_digest(
    node_id: &str,
    storage_path: &str,
    bytes_committed: u64,
    content_root: Option<&Hash>,
) -> Hash {
    let mut buf = Vec::with_capacity(node_id.len() + storage_path.len() + 64);
    put_str(&mut buf, node_id);
    put_str(&mut buf, storage_path);
    buf.extend_from_slice(&0u64.to_le_bytes());
    buf.extend_from_slice(&bytes_committed.to_le_bytes());
    match content_root {
        Some(root) => {
            buf.push(1);
            buf.extend_from_slice(root);
        }
        None => buf.push(0),
    }
    hash_bytes(&buf)
}

fn stake_bytes(p: &StakeProof, buf: &mut Vec<u8>) {
    buf.push(b'S');
    put_str(buf, &p.stake_holder_id);
    buf.extend_from_slice(&p.stake_amount.to_le_bytes());
    buf.extend_from_slice(&p.stake_timestamp.to_le_bytes());
    put_bytes(buf, &p.signature);
}

fn time_bytes(p: &TimeProof, buf: &mut Vec<u8>) {
    buf.push(b'T');
    buf.extend_from_slice(&p.network_time_offset.to_le_bytes());
    buf.extend_from_slice(&p.proof_timestamp.to_le_bytes());
    buf.extend_from_slice(&p.nonce.to_le_bytes());
    buf.extend_from_slice(&p.proof_hash);
}

fn space_bytes(p: &SpaceProof, buf: &mut Vec<u8>) {
    buf.push(b'P');
    put_str(buf, &p.node_id);
    put_str(buf, &p.storage_path);
    buf.extend_from_slice(&p.bytes_committed.to_le_bytes());
    buf.extend_from_slice(&p.total_capacity.to_le_bytes());
    match &p.content_root {
        Some(root) => {
            buf.push(1);
            buf.extend_from_slice(root);
        }
        None => buf.push(0),
    }
    buf.extend_from_slice(&p.content_hash);
}

fn work_bytes(p: &WorkProof, buf: &mut Vec<u8>) {
    buf.push(b'W');
    put_str(buf, &p.owner_id);
    put_str(buf, &p.workload_id);
    buf.extend_from_slice(&p.computational_power.to_le_bytes());
    buf.push(p.workload_type.tag());
    buf.extend_from_slice(&p.difficulty_target);
    buf.extend_from_slice(&p.solution_nonce.to_le_bytes());
}

/// Deterministic byte form of a single proof.
pub fn canonical_bytes(proof: &Proof) -> Vec<u8> {
    let mut buf = Vec::with_capacity(128);
    match proof {
        Proof::Stake(p) => stake_bytes(p, &mut buf),
        Proof::Time(p) => time_bytes(p, &mut buf),
        Proof::Space(p) => space_bytes(p, &mut buf),
        Proof::Work(p) => work_bytes(p, &mut buf),
    }
    buf
}

pub fn proof_hash(proof: &Proof) -> Hash {
    hash_bytes(&canonical_bytes(proof))
}

/// Hashes of the four proofs in stake, time, space, work order.
pub fn proof_hashes(bundle: &ConsensusProof) -> [Hash; 4] {
    bundle.proofs().map(|p| proof_hash(&p))
}

/// Identity of a submission; equal bundles for one operation hash equal.
pub fn bundle_hash(bundle: &ConsensusProof) -> Hash {
    let mut hasher = Sha3_256::new();
    hasher.update(BUNDLE_DOMAIN);
    hasher.update((bundle.operation_id.len() as u32).to_le_bytes());
    hasher.update(bundle.operation_id.as_bytes());
    for hash in proof_hashes(bundle) {
        hasher.update(hash);
    }
    hasher.finalize().into()
}

/// `H(operation_id ‖ proof_hash×4 ‖ confidence_score)`
pub fn block_hash(operation_id: &str, proof_hashes: &[Hash; 4], confidence_score: f64) -> Hash {
    let mut hasher = Sha3_256::new();
    hasher.update(BLOCK_DOMAIN);
    hasher.update((operation_id.len() as u32).to_le_bytes());
    hasher.update(operation_id.as_bytes());
    for hash in proof_hashes {
        hasher.update(hash);
    }
    hasher.update(confidence_score.to_bits().to_le_bytes());
    hasher.finalize().into()
}

/// Hash of the encoded result, stored with index entries.
pub fn result_hash(result: &ConsensusResult) -> Result<Hash, CodecError> {
    let bytes = bincode::serialize(result).map_err(|e| CodecError::Encode(e.to_string()))?;
    Ok(hash_bytes(&bytes))
}

pub fn encode_bundle(bundle: &ProofBundle) -> Result<Vec<u8>, CodecError> {
    bincode::serialize(bundle).map_err(|e| CodecError::Encode(e.to_string()))
}

pub fn decode_bundle(bytes: &[u8]) -> Result<ProofBundle, CodecError> {
    if bytes.len() > MAX_ENCODED_BUNDLE_BYTES {
        return Err(CodecError::TooLarge {
            size: bytes.len(),
            limit: MAX_ENCODED_BUNDLE_BYTES,
        });
    }
    bincode::deserialize(bytes).map_err(|e| CodecError::Decode(e.to_string()))
}

pub fn encode_record(record: &JournalRecord) -> Result<Vec<u8>, CodecError> {
    bincode::serialize(record).map_err(|e| CodecError::Encode(e.to_string()))
}

pub fn decode_record(bytes: &[u8]) -> Result<JournalRecord, CodecError> {
    bincode::deserialize(bytes).map_err(|e| CodecError::Decode(e.to_string()))
}
