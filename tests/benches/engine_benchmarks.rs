//! # Four-Proof Engine Benchmarks
//!
//! | Path | Target |
//! |------|--------|
//! | Single validator | < 1ms |
//! | Index commit, one holder | < 100µs |
//! | End-to-end submit | < 200ms deadline, typically < 1ms |

// Allow excessive nesting in benchmark code
#![allow(clippy::excessive_nesting)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use proof_consensus::domain::{
    decode_bundle, encode_bundle, ConsensusResult, IndexEntry, PartitionSnapshot, ProofIndex,
};
use proof_consensus::testing::{ManualClock, TestNode, FIXTURE_STAKE};
use proof_consensus::validation::{validate_proof, ValidationContext};
use proof_consensus::{
    ConsensusApi, ConsensusConfig, ConsensusDependencies, ConsensusService, Ed25519Verifier,
    InMemoryEventBus, InMemoryJournal,
};
use rand::Rng;
use shared_types::SECS_PER_DAY;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

const NOW: u64 = 1_750_000_000;

// ============================================================================
// Validators
// ============================================================================

fn bench_validators(c: &mut Criterion) {
    let mut group = c.benchmark_group("validators");
    group.measurement_time(Duration::from_secs(5));

    let node = TestNode::new("bench-node", 1);
    let proof = node.bundle("bench-op", 1, NOW).consensus_proof();
    let ctx = ValidationContext {
        operation_id: "bench-op".into(),
        stake_holder_id: node.id.clone(),
        holder: Some(node.validator(FIXTURE_STAKE, NOW - SECS_PER_DAY)),
        history: Arc::new(PartitionSnapshot::empty()),
        now: NOW,
        rules: Arc::new(ConsensusConfig::default()),
    };
    let verifier = Ed25519Verifier::new();

    for proof in proof.proofs() {
        group.bench_function(proof.kind().as_str(), |b| {
            b.iter(|| black_box(validate_proof(black_box(&proof), &ctx, &verifier)))
        });
    }

    group.finish();
}

// ============================================================================
// Codec
// ============================================================================

fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");

    let node = TestNode::new("bench-node", 1);
    let bundle = node.bundle("bench-op", 1, NOW).build();
    let encoded = encode_bundle(&bundle).unwrap_or_default();

    group.throughput(Throughput::Bytes(encoded.len() as u64));
    group.bench_function("encode_bundle", |b| {
        b.iter(|| black_box(encode_bundle(black_box(&bundle))))
    });
    group.bench_function("decode_bundle", |b| {
        b.iter(|| black_box(decode_bundle(black_box(&encoded))))
    });

    let mut noise = vec![0u8; 256];
    rand::thread_rng().fill(&mut noise[..]);
    group.bench_function("decode_noise", |b| {
        b.iter(|| black_box(decode_bundle(black_box(&noise)).is_err()))
    });

    group.finish();
}

// ============================================================================
// Block matrix
// ============================================================================

fn entry(holder: &str, seq: u64) -> IndexEntry {
    let operation_id = format!("{holder}-{seq}");
    IndexEntry {
        operation_id: operation_id.clone(),
        stake_holder_id: holder.to_string(),
        recorded_at: NOW + seq,
        sequence: 0,
        result_hash: [0u8; 32],
        nonce: seq,
        stake_timestamp: NOW,
        result: ConsensusResult {
            operation_id,
            stake_holder_id: holder.to_string(),
            accepted: true,
            per_proof_verdicts: Vec::new(),
            confidence_score: 0.5,
            block_hash: Some([1u8; 32]),
            rejection_reasons: Vec::new(),
            bundle_hash: Some([2u8; 32]),
            decided_at: NOW + seq,
        },
    }
}

fn bench_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("proof-index");

    group.bench_function("commit_single_holder", |b| {
        let index = ProofIndex::new();
        let mut seq = 0u64;
        b.iter(|| {
            seq += 1;
            black_box(index.commit(entry("holder", seq), |_| Ok(())).is_ok())
        })
    });

    for history in [100u64, 1_000, 10_000] {
        let index = ProofIndex::new();
        for seq in 0..history {
            let _ = index.commit(entry("holder", seq), |_| Ok(()));
        }
        group.bench_with_input(
            BenchmarkId::new("nonce_lookup", history),
            &history,
            |b, &history| b.iter(|| black_box(index.has_nonce("holder", history / 2))),
        );
        group.bench_with_input(
            BenchmarkId::new("last_10_results", history),
            &history,
            |b, _| b.iter(|| black_box(index.last_results("holder", 10))),
        );
    }

    group.finish();
}

// ============================================================================
// End to end
// ============================================================================

fn bench_submit(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine");
    group.measurement_time(Duration::from_secs(10));

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(_) => return,
    };
    let clock = ManualClock::new(NOW);
    let engine = match ConsensusService::new(ConsensusDependencies {
        sig_verifier: Arc::new(Ed25519Verifier::new()),
        journal: Arc::new(InMemoryJournal::new()),
        event_bus: Arc::new(InMemoryEventBus::new()),
        config: ConsensusConfig::default(),
    }) {
        Ok(engine) => engine.with_time_source(Box::new(clock)),
        Err(_) => return,
    };

    let node = TestNode::new("bench-node", 1);
    engine.register_node(node.validator(FIXTURE_STAKE, NOW - SECS_PER_DAY));
    let counter = AtomicU64::new(0);

    group.bench_function("submit_accepted", |b| {
        b.iter(|| {
            let n = counter.fetch_add(1, Ordering::Relaxed);
            let op = format!("bench-{n}");
            let bundle = node.bundle(&op, n, NOW).build();
            runtime.block_on(async { black_box(engine.submit(op, bundle).await.is_ok()) })
        })
    });

    group.bench_function("submit_rejected_fast", |b| {
        let bundle = node.bundle("mismatch", 0, NOW).build();
        b.iter(|| {
            runtime.block_on(async {
                black_box(engine.submit("other".into(), bundle.clone()).await.is_ok())
            })
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_validators,
    bench_codec,
    bench_index,
    bench_submit,
);
criterion_main!(benches);
