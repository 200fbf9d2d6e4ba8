//! # proof-consensus
//!
//! Four-proof consensus validation engine.
//!
//! ## Architecture
//!
//! Every operation submitted to the engine carries a bundle of four proofs:
//!
//! - **Stake**: a signed claim of economic stake, backed by the registry
//! - **Time**: a fresh, single-use timestamp bound to the operation id
//! - **Space**: committed storage, checked against a content digest
//! - **Work**: a puzzle solution plus a plausible compute claim
//!
//! The four validators run concurrently under a shared deadline. An
//! operation is accepted only when all four verdicts are valid and the
//! submitting node is not quarantined.
//!
//! ```text
//! submit ──→ shape / duplicate / quarantine ──→ [stake|time|space|work]
//!                                                        │
//!                  ┌─────────── accepted ────────────────┴── rejected ───────┐
//!                  ↓                                                          ↓
//!        journal → ProofIndex                                 journal → rejection log
//!                  │                                                          │
//!                  └──────────→ ByzantineDetector, OperationDecided ←─────────┘
//! ```
//!
//! ### Block matrix
//!
//! Accepted results are kept per stake holder in an append-only, segmented
//! partition. Readers work on immutable snapshots, so validation never waits
//! on commits from other holders.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use proof_consensus::adapters::{Ed25519Verifier, FileJournal, InMemoryEventBus};
//! use proof_consensus::{ConsensusApi, ConsensusConfig, ConsensusDependencies, ConsensusService};
//!
//! let service = ConsensusService::new(ConsensusDependencies {
//!     sig_verifier: Arc::new(Ed25519Verifier::new()),
//!     journal: Arc::new(FileJournal::open("data/decisions.journal")?),
//!     event_bus: Arc::new(InMemoryEventBus::new()),
//!     config: ConsensusConfig::default(),
//! })?;
//! service.restore()?;
//!
//! let result = service.submit(operation_id, bundle).await?;
//! ```

pub mod adapters;
pub mod domain;
pub mod events;
pub mod metrics;
pub mod ports;
pub mod service;
pub mod state;
pub mod testing;
pub mod validation;

// Re-export main types
pub use adapters::{Ed25519Verifier, FileJournal, InMemoryEventBus, InMemoryJournal};
pub use domain::{
    ConsensusConfig, ConsensusError, ConsensusProof, ConsensusResult, EngineResult, NodeStatus,
    Proof, ProofBundle, ProofKind, ProofVerdict, ReasonCode, ValidatorNode,
};
pub use events::{NodeQuarantinedEvent, OperationDecidedEvent};
pub use metrics::StatsSnapshot;
pub use ports::{AdminApi, ConsensusApi, EventBus, RecordJournal, SignatureVerifier, TimeSource};
pub use service::{ConsensusDependencies, ConsensusService, RestoreSummary, RetentionReport};
