//! # Retention Sweeper
//!
//! Periodically evicts history older than the retention horizon from the
//! proof index and compacts the journal to match.

use std::sync::Arc;
use std::time::Duration;

use proof_consensus::service::RetentionReport;
use proof_consensus::{ConsensusService, EventBus, RecordJournal, SignatureVerifier};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

/// Running totals over the sweeper's lifetime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SweepTotals {
    pub sweeps: u64,
    pub failures: u64,
    pub evicted: u64,
    pub compacted: u64,
    pub forgotten: u64,
}

impl SweepTotals {
    fn absorb(&mut self, report: &RetentionReport) {
        self.sweeps += 1;
        self.evicted += report.evicted.len() as u64;
        self.compacted += report.compacted as u64;
        self.forgotten += report.forgotten as u64;
    }
}

/// Handler for the retention schedule.
pub struct RetentionSweeper<S, J, E>
where
    S: SignatureVerifier,
    J: RecordJournal,
    E: EventBus,
{
    service: Arc<ConsensusService<S, J, E>>,
    interval: Duration,
}

impl<S, J, E> RetentionSweeper<S, J, E>
where
    S: SignatureVerifier + 'static,
    J: RecordJournal,
    E: EventBus,
{
    pub fn new(service: Arc<ConsensusService<S, J, E>>, interval: Duration) -> Self {
        Self { service, interval }
    }

    /// One sweep. Failures are logged and retried on the next tick.
    pub fn sweep(&self) -> Option<RetentionReport> {
        match self.service.run_retention() {
            Ok(report) => {
                let oldest = report.evicted.first().map(|e| e.recorded_at);
                debug!(
                    horizon = report.horizon,
                    evicted = report.evicted.len(),
                    ?oldest,
                    compacted = report.compacted,
                    forgotten = report.forgotten,
                    idle_windows = report.idle_windows,
                    "[retention] Sweep finished"
                );
                Some(report)
            }
            Err(e) => {
                error!(error = %e, "Retention sweep failed");
                None
            }
        }
    }

    /// Run until `shutdown` turns `true` or its sender goes away.
    ///
    /// Returns what the sweeps removed in total.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> SweepTotals {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick fires immediately; startup already ran restore.
        ticker.tick().await;

        let mut totals = SweepTotals::default();
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.sweep() {
                        Some(report) => totals.absorb(&report),
                        None => totals.failures += 1,
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!(
                            sweeps = totals.sweeps,
                            failures = totals.failures,
                            evicted = totals.evicted,
                            compacted = totals.compacted,
                            forgotten = totals.forgotten,
                            "[retention] Shutdown signal received"
                        );
                        return totals;
                    }
                }
            }
        }
    }
}
