//! # Engine Metrics
//!
//! Prometheus metrics for monitoring decisions, plus always-on counters.
//!
//! ## Usage
//!
//! Enable Prometheus export with the `metrics` feature:
//! ```toml
//! proof-consensus = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `proof_operations_accepted_total` - Counter of accepted operations
//! - `proof_operations_rejected_total` - Counter of rejections (by reason)
//! - `proof_validation_latency_seconds` - Histogram of decision latency
//! - `proof_nodes_quarantined_total` - Counter of quarantines
//!
//! [`EngineStats`] is independent of the feature and backs `stats()`.

use crate::domain::{ProofKind, ReasonCode};
use std::sync::atomic::{AtomicU64, Ordering};

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{
    register_counter_vec, register_histogram, register_int_counter, CounterVec, Histogram,
    IntCounter,
};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Total operations accepted
    pub static ref OPERATIONS_ACCEPTED: IntCounter = register_int_counter!(
        "proof_operations_accepted_total",
        "Total number of operations accepted"
    )
    .expect("Failed to create OPERATIONS_ACCEPTED metric");

    /// Total operations rejected, labeled by reason code
    pub static ref OPERATIONS_REJECTED: CounterVec = register_counter_vec!(
        "proof_operations_rejected_total",
        "Total number of operations rejected",
        &["reason"]
    )
    .expect("Failed to create OPERATIONS_REJECTED metric");

    /// Histogram of submission-to-decision latency
    pub static ref VALIDATION_LATENCY: Histogram = register_histogram!(
        "proof_validation_latency_seconds",
        "Time taken to decide an operation in seconds",
        vec![0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.2, 0.5, 1.0]
    )
    .expect("Failed to create VALIDATION_LATENCY metric");

    /// Total quarantines imposed
    pub static ref NODES_QUARANTINED: IntCounter = register_int_counter!(
        "proof_nodes_quarantined_total",
        "Total number of node quarantines"
    )
    .expect("Failed to create NODES_QUARANTINED metric");
}

/// Record an accepted operation
#[cfg(feature = "metrics")]
pub fn record_accepted() {
    OPERATIONS_ACCEPTED.inc();
}

/// Record a rejected operation with reason
#[cfg(feature = "metrics")]
pub fn record_rejected(reason: &str) {
    OPERATIONS_REJECTED.with_label_values(&[reason]).inc();
}

/// Record decision latency
#[cfg(feature = "metrics")]
pub fn record_validation_latency(seconds: f64) {
    VALIDATION_LATENCY.observe(seconds);
}

/// Record a quarantine
#[cfg(feature = "metrics")]
pub fn record_quarantine() {
    NODES_QUARANTINED.inc();
}

// No-op implementations when metrics feature is disabled
#[cfg(not(feature = "metrics"))]
pub fn record_accepted() {}

#[cfg(not(feature = "metrics"))]
pub fn record_rejected(_reason: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_validation_latency(_seconds: f64) {}

#[cfg(not(feature = "metrics"))]
pub fn record_quarantine() {}

/// Point-in-time copy of [`EngineStats`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub total: u64,
    pub accepted: u64,
    pub rejected: u64,
    /// Rejections decided before any validator ran.
    pub fast_path_rejections: u64,
    pub timeouts: u64,
    /// Rejections not signed by the named holder, left unrecorded.
    pub unattributed: u64,
    pub quarantines: u64,
    /// Invalid verdicts per proof kind, stake/time/space/work order.
    pub proof_failures: [u64; 4],
}

impl StatsSnapshot {
    pub fn failures_for(&self, kind: ProofKind) -> u64 {
        self.proof_failures[kind.index()]
    }
}

/// Lock-free decision counters.
#[derive(Debug, Default)]
pub struct EngineStats {
    total: AtomicU64,
    accepted: AtomicU64,
    rejected: AtomicU64,
    fast_path_rejections: AtomicU64,
    timeouts: AtomicU64,
    unattributed: AtomicU64,
    quarantines: AtomicU64,
    proof_failures: [AtomicU64; 4],
}

impl EngineStats {
    pub fn record_accepted(&self) {
        self.total.fetch_add(1, Ordering::Relaxed);
        self.accepted.fetch_add(1, Ordering::Relaxed);
        record_accepted();
    }

    /// Count a rejection under its primary reason and all failed proof kinds.
    pub fn record_rejected(&self, reasons: &[ReasonCode]) {
        self.total.fetch_add(1, Ordering::Relaxed);
        self.rejected.fetch_add(1, Ordering::Relaxed);

        let Some(primary) = reasons.first() else {
            return;
        };
        if primary.is_fast_path() {
            self.fast_path_rejections.fetch_add(1, Ordering::Relaxed);
        }
        if *primary == ReasonCode::ValidationTimeout {
            self.timeouts.fetch_add(1, Ordering::Relaxed);
        }
        for reason in reasons {
            if let Some(kind) = reason.proof_kind() {
                self.proof_failures[kind.index()].fetch_add(1, Ordering::Relaxed);
            }
            record_rejected(reason.as_str());
        }
    }

    pub fn record_unattributed(&self) {
        self.unattributed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_quarantine(&self) {
        self.quarantines.fetch_add(1, Ordering::Relaxed);
        record_quarantine();
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            total: self.total.load(Ordering::Relaxed),
            accepted: self.accepted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            fast_path_rejections: self.fast_path_rejections.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            unattributed: self.unattributed.load(Ordering::Relaxed),
            quarantines: self.quarantines.load(Ordering::Relaxed),
            proof_failures: std::array::from_fn(|i| self.proof_failures[i].load(Ordering::Relaxed)),
        }
    }
}
