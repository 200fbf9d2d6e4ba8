//! Cross-component scenarios against a fully wired engine.
//!
//! Each test builds its own engine through [`harness`]; nothing is shared
//! between tests.

pub mod byzantine;
pub mod concurrency;
pub mod persistence;
pub mod robustness;
pub mod scenarios;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use proof_consensus::testing::{ManualClock, TestNode};
use proof_consensus::{
    ConsensusConfig, ConsensusDependencies, ConsensusService, Ed25519Verifier, InMemoryEventBus,
    InMemoryJournal, RecordJournal, SignatureVerifier,
};
use shared_types::{PublicKey, UnixSeconds};

/// Fixed start time for scenarios.
pub const T0: UnixSeconds = 1_750_000_000;

/// Ed25519 verifier that counts invocations.
#[derive(Default)]
pub struct CountingVerifier {
    inner: Ed25519Verifier,
    calls: AtomicU64,
}

impl CountingVerifier {
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SignatureVerifier for CountingVerifier {
    fn verify_ed25519(&self, message: &[u8], signature: &[u8], public_key: &PublicKey) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.verify_ed25519(message, signature, public_key)
    }
}

pub type Engine<J = InMemoryJournal> = ConsensusService<CountingVerifier, J, InMemoryEventBus>;

/// A wired engine with handles on its collaborators.
pub struct Harness<J: RecordJournal + 'static = InMemoryJournal> {
    pub engine: Arc<Engine<J>>,
    pub verifier: Arc<CountingVerifier>,
    pub journal: Arc<J>,
    pub events: Arc<InMemoryEventBus>,
    pub clock: ManualClock,
}

impl<J: RecordJournal + 'static> Harness<J> {
    pub fn register(&self, node: &TestNode, stake: u64, stake_timestamp: UnixSeconds) {
        self.engine
            .register_node(node.validator(stake, stake_timestamp));
    }
}

pub fn harness_with<J: RecordJournal + 'static>(
    journal: Arc<J>,
    config: ConsensusConfig,
    now: UnixSeconds,
) -> Harness<J> {
    let verifier = Arc::new(CountingVerifier::default());
    let events = Arc::new(InMemoryEventBus::new());
    let clock = ManualClock::new(now);
    let engine = ConsensusService::new(ConsensusDependencies {
        sig_verifier: verifier.clone(),
        journal: journal.clone(),
        event_bus: events.clone(),
        config,
    })
    .expect("test configuration is coherent")
    .with_time_source(Box::new(clock.clone()));

    Harness {
        engine: Arc::new(engine),
        verifier,
        journal,
        events,
        clock,
    }
}

pub fn harness() -> Harness {
    harness_with(
        Arc::new(InMemoryJournal::new()),
        ConsensusConfig::default(),
        T0,
    )
}
