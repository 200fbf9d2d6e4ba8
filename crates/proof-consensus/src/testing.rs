//! Deterministic fixtures for tests, demos and the integration suite.
//!
//! Keys are derived from a one-byte seed, so every run signs identically.

use crate::domain::{
    space_content_digest, stake_signing_message, time_proof_digest, ConsensusProof, Proof,
    ProofBundle, ProofKind, SpaceProof, StakeProof, TimeProof, ValidatorNode, WorkProof,
    WorkloadType,
};
use crate::ports::TimeSource;
use ed25519_dalek::{Signer, SigningKey};
use shared_types::{Hash, NodeId, PublicKey, UnixSeconds};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Default stake claimed by fixture bundles.
pub const FIXTURE_STAKE: u64 = 50_000;

/// A validator identity with a deterministic Ed25519 key.
#[derive(Clone)]
pub struct TestNode {
    pub id: NodeId,
    key: SigningKey,
}

impl TestNode {
    pub fn new(id: impl Into<NodeId>, seed: u8) -> Self {
        Self {
            id: id.into(),
            key: SigningKey::from_bytes(&[seed; 32]),
        }
    }

    pub fn public_key(&self) -> PublicKey {
        self.key.verifying_key().to_bytes()
    }

    /// Registry record backing `stake` from `stake_timestamp`.
    pub fn validator(&self, stake: u64, stake_timestamp: UnixSeconds) -> ValidatorNode {
        ValidatorNode::new(self.id.clone(), self.public_key(), stake, stake_timestamp)
    }

    pub fn sign_stake(&self, amount: u64, stake_timestamp: UnixSeconds) -> Vec<u8> {
        let message = stake_signing_message(&self.id, amount, stake_timestamp);
        self.key.sign(&message).to_bytes().to_vec()
    }

    /// A bundle that passes all four validators at `now` when the node is
    /// registered with at least [`FIXTURE_STAKE`].
    pub fn bundle(&self, operation_id: &str, nonce: u64, now: UnixSeconds) -> BundleBuilder {
        BundleBuilder {
            node: self.clone(),
            operation_id: operation_id.to_string(),
            stake_amount: FIXTURE_STAKE,
            stake_timestamp: now.saturating_sub(60),
            signature: None,
            network_time_offset: 0,
            proof_timestamp: now,
            nonce,
            time_hash: None,
            storage_path: format!("/var/lib/proof/{}", self.id),
            bytes_committed: 512 << 20,
            total_capacity: 1 << 30,
            content_root: None,
            content_hash: None,
            workload_id: format!("{operation_id}/work"),
            workload_type: WorkloadType::Compute,
            computational_power: 250_000,
            difficulty_target: [0xff; 32],
            solution_nonce: 0,
            omitted: Vec::new(),
        }
    }
}

/// Builder for valid-by-default bundles with targeted defects.
#[derive(Clone)]
pub struct BundleBuilder {
    node: TestNode,
    operation_id: String,
    stake_amount: u64,
    stake_timestamp: UnixSeconds,
    signature: Option<Vec<u8>>,
    network_time_offset: i64,
    proof_timestamp: UnixSeconds,
    nonce: u64,
    time_hash: Option<Hash>,
    storage_path: String,
    bytes_committed: u64,
    total_capacity: u64,
    content_root: Option<Hash>,
    content_hash: Option<Hash>,
    workload_id: String,
    workload_type: WorkloadType,
    computational_power: u64,
    difficulty_target: Hash,
    solution_nonce: u64,
    omitted: Vec<ProofKind>,
}

impl BundleBuilder {
    pub fn stake_amount(mut self, amount: u64) -> Self {
        self.stake_amount = amount;
        self
    }

    pub fn stake_timestamp(mut self, ts: UnixSeconds) -> Self {
        self.stake_timestamp = ts;
        self
    }

    /// Replace the signature with 64 bytes that verify under no key.
    pub fn forge_signature(mut self) -> Self {
        self.signature = Some(vec![0x5a; 64]);
        self
    }

    pub fn clock_offset_ms(mut self, offset: i64) -> Self {
        self.network_time_offset = offset;
        self
    }

    pub fn proof_timestamp(mut self, ts: UnixSeconds) -> Self {
        self.proof_timestamp = ts;
        self
    }

    pub fn tamper_time_hash(mut self) -> Self {
        self.time_hash = Some([0x13; 32]);
        self
    }

    pub fn storage(mut self, bytes_committed: u64, total_capacity: u64) -> Self {
        self.bytes_committed = bytes_committed;
        self.total_capacity = total_capacity;
        self
    }

    pub fn content_root(mut self, root: Hash) -> Self {
        self.content_root = Some(root);
        self
    }

    pub fn tamper_content_hash(mut self) -> Self {
        self.content_hash = Some([0x24; 32]);
        self
    }

    pub fn workload(mut self, workload_type: WorkloadType, power: u64) -> Self {
        self.workload_type = workload_type;
        self.computational_power = power;
        self
    }

    pub fn difficulty_target(mut self, target: Hash) -> Self {
        self.difficulty_target = target;
        self
    }

    pub fn without(mut self, kind: ProofKind) -> Self {
        self.omitted.push(kind);
        self
    }

    pub fn stake_proof(&self) -> StakeProof {
        StakeProof {
            stake_holder_id: self.node.id.clone(),
            stake_amount: self.stake_amount,
            stake_timestamp: self.stake_timestamp,
            signature: self
                .signature
                .clone()
                .unwrap_or_else(|| self.node.sign_stake(self.stake_amount, self.stake_timestamp)),
        }
    }

    pub fn time_proof(&self) -> TimeProof {
        TimeProof {
            network_time_offset: self.network_time_offset,
            proof_timestamp: self.proof_timestamp,
            nonce: self.nonce,
            proof_hash: self.time_hash.unwrap_or_else(|| {
                time_proof_digest(self.nonce, self.proof_timestamp, &self.operation_id)
            }),
        }
    }

    pub fn space_proof(&self) -> SpaceProof {
        SpaceProof {
            node_id: self.node.id.clone(),
            storage_path: self.storage_path.clone(),
            bytes_committed: self.bytes_committed,
            total_capacity: self.total_capacity,
            content_root: self.content_root,
            content_hash: self.content_hash.unwrap_or_else(|| {
                space_content_digest(
                    &self.node.id,
                    &self.storage_path,
                    self.bytes_committed,
                    self.content_root.as_ref(),
                )
            }),
        }
    }

    pub fn work_proof(&self) -> WorkProof {
        WorkProof {
            owner_id: self.node.id.clone(),
            workload_id: self.workload_id.clone(),
            computational_power: self.computational_power,
            workload_type: self.workload_type,
            difficulty_target: self.difficulty_target,
            solution_nonce: self.solution_nonce,
        }
    }

    pub fn build(self) -> ProofBundle {
        let proofs = [
            Proof::Stake(self.stake_proof()),
            Proof::Time(self.time_proof()),
            Proof::Space(self.space_proof()),
            Proof::Work(self.work_proof()),
        ];
        proofs
            .into_iter()
            .filter(|p| !self.omitted.contains(&p.kind()))
            .fold(ProofBundle::new(self.operation_id.clone()), ProofBundle::with)
    }

    /// The assembled form; ignores [`BundleBuilder::without`].
    pub fn consensus_proof(&self) -> ConsensusProof {
        ConsensusProof::new(
            self.operation_id.clone(),
            self.stake_proof(),
            self.time_proof(),
            self.space_proof(),
            self.work_proof(),
        )
    }
}

/// Settable clock shared between a test and the engine.
#[derive(Clone, Debug, Default)]
pub struct ManualClock(Arc<AtomicU64>);

impl ManualClock {
    pub fn new(now: UnixSeconds) -> Self {
        Self(Arc::new(AtomicU64::new(now)))
    }

    pub fn set(&self, now: UnixSeconds) {
        self.0.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, secs: u64) {
        self.0.fetch_add(secs, Ordering::SeqCst);
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> UnixSeconds {
        self.0.load(Ordering::SeqCst)
    }
}
