//! Proof data model
//!
//! Every operation carries four independent proofs:
//!
//! - `StakeProof` (WHO): economic collateral of the submitting node
//! - `TimeProof` (WHEN): clock agreement, freshness and a one-time nonce
//! - `SpaceProof` (WHERE): storage commitment with a content digest
//! - `WorkProof` (WHAT/HOW): hash-puzzle solution plus claimed compute power
//!
//! The proof kinds form a closed set. Adding a kind is a schema change to
//! [`Proof`] and [`ConsensusProof`], never a runtime registration.

use serde::{Deserialize, Serialize};
use shared_types::{Hash, NodeId, OperationId, UnixSeconds};
use std::fmt;

/// Discriminant of the four proof kinds, in canonical order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProofKind {
    Stake,
    Time,
    Space,
    Work,
}

impl ProofKind {
    /// All kinds in canonical (verdict) order.
    pub const ALL: [ProofKind; 4] = [
        ProofKind::Stake,
        ProofKind::Time,
        ProofKind::Space,
        ProofKind::Work,
    ];

    /// Position of this kind in verdict arrays.
    pub fn index(self) -> usize {
        match self {
            ProofKind::Stake => 0,
            ProofKind::Time => 1,
            ProofKind::Space => 2,
            ProofKind::Work => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProofKind::Stake => "stake",
            ProofKind::Time => "time",
            ProofKind::Space => "space",
            ProofKind::Work => "work",
        }
    }
}

impl fmt::Display for ProofKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Proof of Stake: who is accountable for the operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeProof {
    /// Submitting node; also the key for replay and quarantine bookkeeping.
    pub stake_holder_id: NodeId,
    /// Collateral claimed for this operation (base units).
    pub stake_amount: u64,
    /// When the stake was bonded or last renewed.
    pub stake_timestamp: UnixSeconds,
    /// Ed25519 signature over the canonical stake signing message.
    pub signature: Vec<u8>,
}

/// Proof of Time: when the operation happened.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeProof {
    /// Measured offset from network time, in milliseconds (signed).
    pub network_time_offset: i64,
    /// When the proof was produced.
    pub proof_timestamp: UnixSeconds,
    /// One-time value; never reusable by the same stake holder.
    pub nonce: u64,
    /// `H(nonce ‖ proof_timestamp ‖ operation_id)`
    pub proof_hash: Hash,
}

/// Proof of Space: where the operation's data lives.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceProof {
    pub node_id: NodeId,
    pub storage_path: String,
    pub bytes_committed: u64,
    pub total_capacity: u64,
    /// Digest of the committed content, when the storage collaborator has one.
    /// `None` marks a pure commitment over the declared byte range.
    pub content_root: Option<Hash>,
    /// Commitment digest, see [`crate::domain::space_content_digest`].
    pub content_hash: Hash,
}

/// Categories of work with distinct plausible compute ranges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkloadType {
    /// Certificate generation or validation
    Certificate,
    /// Transparency log operations
    CertificateTransparency,
    /// Name resolution
    DnsResolution,
    /// General computation
    Compute,
    /// Network operations
    Network,
    /// Storage operations
    Storage,
}

impl WorkloadType {
    pub const ALL: [WorkloadType; 6] = [
        WorkloadType::Certificate,
        WorkloadType::CertificateTransparency,
        WorkloadType::DnsResolution,
        WorkloadType::Compute,
        WorkloadType::Network,
        WorkloadType::Storage,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WorkloadType::Certificate => "certificate",
            WorkloadType::CertificateTransparency => "certificate_transparency",
            WorkloadType::DnsResolution => "dns_resolution",
            WorkloadType::Compute => "compute",
            WorkloadType::Network => "network",
            WorkloadType::Storage => "storage",
        }
    }

    /// Stable single-byte tag used by the canonical encoding.
    pub(crate) fn tag(self) -> u8 {
        match self {
            WorkloadType::Certificate => 1,
            WorkloadType::CertificateTransparency => 2,
            WorkloadType::DnsResolution => 3,
            WorkloadType::Compute => 4,
            WorkloadType::Network => 5,
            WorkloadType::Storage => 6,
        }
    }
}

/// Proof of Work: what computation backs the operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkProof {
    pub owner_id: NodeId,
    pub workload_id: String,
    /// Claimed compute units (1000 units per CPU core).
    pub computational_power: u64,
    pub workload_type: WorkloadType,
    /// Big-endian 256-bit target; `H(workload_id ‖ solution_nonce)` must be below it.
    pub difficulty_target: Hash,
    pub solution_nonce: u64,
}

/// One tagged sub-proof as carried on the wire.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Proof {
    Stake(StakeProof),
    Time(TimeProof),
    Space(SpaceProof),
    Work(WorkProof),
}

impl Proof {
    pub fn kind(&self) -> ProofKind {
        match self {
            Proof::Stake(_) => ProofKind::Stake,
            Proof::Time(_) => ProofKind::Time,
            Proof::Space(_) => ProofKind::Space,
            Proof::Work(_) => ProofKind::Work,
        }
    }
}

/// Why a [`ProofBundle`] could not become a [`ConsensusProof`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BundleError {
    #[error("bundle is missing its {0} proof")]
    Missing(ProofKind),

    #[error("bundle carries more than one {0} proof")]
    DuplicateKind(ProofKind),

    #[error("bundle operation id {bundle:?} does not match submitted id {submitted:?}")]
    OperationMismatch {
        submitted: OperationId,
        bundle: OperationId,
    },

    #[error("operation id is empty")]
    EmptyOperationId,
}

/// Submission form of a proof bundle: an operation id and its tagged proofs.
///
/// Arrives from callers (or from [`crate::domain::decode_bundle`]) and is
/// checked for shape by [`ProofBundle::assemble`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofBundle {
    pub operation_id: OperationId,
    pub proofs: Vec<Proof>,
}

impl ProofBundle {
    pub fn new(operation_id: impl Into<OperationId>) -> Self {
        Self {
            operation_id: operation_id.into(),
            proofs: Vec::with_capacity(4),
        }
    }

    /// Append a proof (builder style).
    pub fn with(mut self, proof: Proof) -> Self {
        self.proofs.push(proof);
        self
    }

    /// Holder named by the first stake proof, if any.
    pub fn stake_holder_id(&self) -> Option<&str> {
        self.proofs.iter().find_map(|p| match p {
            Proof::Stake(s) => Some(s.stake_holder_id.as_str()),
            _ => None,
        })
    }

    /// Check shape and split into exactly one proof of each kind.
    pub fn assemble(self, operation_id: &str) -> Result<ConsensusProof, BundleError> {
        if operation_id.is_empty() {
            return Err(BundleError::EmptyOperationId);
        }
        if self.operation_id != operation_id {
            return Err(BundleError::OperationMismatch {
                submitted: operation_id.to_string(),
                bundle: self.operation_id,
            });
        }

        let mut stake = None;
        let mut time = None;
        let mut space = None;
        let mut work = None;

        for proof in self.proofs {
            let kind = proof.kind();
            let duplicate = match proof {
                Proof::Stake(p) => stake.replace(p).is_some(),
                Proof::Time(p) => time.replace(p).is_some(),
                Proof::Space(p) => space.replace(p).is_some(),
                Proof::Work(p) => work.replace(p).is_some(),
            };
            if duplicate {
                return Err(BundleError::DuplicateKind(kind));
            }
        }

        Ok(ConsensusProof {
            operation_id: self.operation_id,
            stake: stake.ok_or(BundleError::Missing(ProofKind::Stake))?,
            time: time.ok_or(BundleError::Missing(ProofKind::Time))?,
            space: space.ok_or(BundleError::Missing(ProofKind::Space))?,
            work: work.ok_or(BundleError::Missing(ProofKind::Work))?,
        })
    }
}

/// A complete four-proof bundle for one operation. Immutable once built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusProof {
    pub operation_id: OperationId,
    pub stake: StakeProof,
    pub time: TimeProof,
    pub space: SpaceProof,
    pub work: WorkProof,
}

impl ConsensusProof {
    pub fn new(
        operation_id: impl Into<OperationId>,
        stake: StakeProof,
        time: TimeProof,
        space: SpaceProof,
        work: WorkProof,
    ) -> Self {
        Self {
            operation_id: operation_id.into(),
            stake,
            time,
            space,
            work,
        }
    }

    /// The submitting node.
    pub fn stake_holder_id(&self) -> &str {
        &self.stake.stake_holder_id
    }

    /// Re-tag into the four wire proofs, in canonical order.
    pub fn proofs(&self) -> [Proof; 4] {
        [
            Proof::Stake(self.stake.clone()),
            Proof::Time(self.time.clone()),
            Proof::Space(self.space.clone()),
            Proof::Work(self.work.clone()),
        ]
    }

    /// Back to submission form.
    pub fn into_bundle(self) -> ProofBundle {
        ProofBundle {
            operation_id: self.operation_id,
            proofs: vec![
                Proof::Stake(self.stake),
                Proof::Time(self.time),
                Proof::Space(self.space),
                Proof::Work(self.work),
            ],
        }
    }
}
