//! Consensus Service - Core business logic
//!
//! # Decision flow
//! 1. Shape check: exactly one proof of each kind for the submitted id
//! 2. Duplicate check: an identical bundle returns the recorded result; an
//!    id decided earlier but no longer held in memory is a duplicate
//! 3. Quarantine fast path (expired quarantines are lifted here)
//! 4. Registry and index snapshots for the stake holder
//! 5. Four validators on the blocking pool, under the validation deadline
//! 6. Combination: accepted iff all four verdicts are valid and the holder
//!    is not quarantined at decision time
//! 7. Journal, then index (accepted) or rejection log (rejected)
//! 8. Detector bookkeeping, decision event, metrics
//!
//! Fast-path rejections (steps 1 to 3) are returned without being recorded,
//! so the operation id stays free for a well-formed submission.
//!
//! A rejection is charged to the named holder only when the holder's
//! registered key verified the stake signature. Anything else could have
//! been sent by anyone: it is counted and logged, but not journaled, not
//! held against the holder and not published.

use crate::domain::{
    block_hash, bundle_hash, decode_bundle, proof_hashes, result_hash, AdminAction,
    AdminAuditRecord, BundleError, ConsensusConfig, ConsensusError, ConsensusProof,
    ConsensusResult, DecisionStamp, EngineResult, IndexEntry, IndexError, IndexStats, JournalRecord, NodeStatus,
    Proof, ProofBundle, ProofKind, ProofVerdict, ReasonCode, ValidatorNode,
};
use crate::events::{NodeQuarantinedEvent, OperationDecidedEvent, QuarantineOrigin};
use crate::metrics::{EngineStats, StatsSnapshot};
use crate::ports::{
    AdminApi, ConsensusApi, EventBus, RecordJournal, SignatureVerifier, SystemTimeSource,
    TimeSource,
};
use crate::state::EngineState;
use crate::validation::{validate_proof, StakeValidator, ValidationContext};
use async_trait::async_trait;
use dashmap::DashMap;
use shared_types::{short_hex, Hash, NodeId, OperationId, UnixSeconds};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Consensus Service
pub struct ConsensusService<S, J, E>
where
    S: SignatureVerifier,
    J: RecordJournal,
    E: EventBus,
{
    sig_verifier: Arc<S>,
    journal: Arc<J>,
    event_bus: Arc<E>,
    state: Arc<EngineState>,
    config: Arc<ConsensusConfig>,
    time_source: Box<dyn TimeSource>,
    in_flight: DashMap<OperationId, ()>,
    stats: EngineStats,
}

/// Dependencies for ConsensusService
pub struct ConsensusDependencies<S, J, E> {
    pub sig_verifier: Arc<S>,
    pub journal: Arc<J>,
    pub event_bus: Arc<E>,
    pub config: ConsensusConfig,
}

/// Outcome of a journal replay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RestoreSummary {
    pub accepted: usize,
    pub rejected: usize,
    /// Records older than the retention horizon.
    pub expired: usize,
    /// Records that conflicted with already restored state.
    pub conflicts: usize,
}

/// Outcome of a retention sweep.
#[derive(Debug, Default)]
pub struct RetentionReport {
    pub horizon: UnixSeconds,
    /// Evicted index entries, oldest partitions first, for archiving.
    pub evicted: Vec<Arc<IndexEntry>>,
    /// Journal records dropped by compaction.
    pub compacted: usize,
    /// Decided operation ids released for reuse.
    pub forgotten: usize,
    /// Detector windows with no verdict left inside their horizon.
    pub idle_windows: usize,
}

/// Claim on an operation id while it is being decided.
struct InFlight<'a> {
    claims: &'a DashMap<OperationId, ()>,
    operation_id: OperationId,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.claims.remove(&self.operation_id);
    }
}

/// What the validator phase produced.
///
/// `attributable` is set once the holder's key verified the stake signature.
enum ValidationOutcome {
    Verdicts {
        verdicts: Vec<ProofVerdict>,
        attributable: bool,
    },
    TimedOut {
        attributable: bool,
    },
    Withdrawn,
}

impl<S, J, E> ConsensusService<S, J, E>
where
    S: SignatureVerifier + 'static,
    J: RecordJournal,
    E: EventBus,
{
    /// Create a new ConsensusService
    ///
    /// Fails if the configuration is incoherent.
    pub fn new(deps: ConsensusDependencies<S, J, E>) -> EngineResult<Self> {
        deps.config.validate()?;
        let state = Arc::new(EngineState::new(&deps.config));
        Ok(Self {
            sig_verifier: deps.sig_verifier,
            journal: deps.journal,
            event_bus: deps.event_bus,
            state,
            config: Arc::new(deps.config),
            time_source: Box::new(SystemTimeSource),
            in_flight: DashMap::new(),
            stats: EngineStats::default(),
        })
    }

    /// Set custom time source (for testing)
    pub fn with_time_source(mut self, time_source: Box<dyn TimeSource>) -> Self {
        self.time_source = time_source;
        self
    }

    pub fn config(&self) -> &ConsensusConfig {
        &self.config
    }

    pub fn state(&self) -> &Arc<EngineState> {
        &self.state
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn index_stats(&self) -> IndexStats {
        self.state.index.stats()
    }

    // === REGISTRY MANAGEMENT ===

    pub fn register_node(&self, node: ValidatorNode) {
        self.state.registry.register_node(node);
    }

    /// Returns `false` for unknown nodes.
    pub fn update_stake(&self, node_id: &str, amount: u64, stake_timestamp: UnixSeconds) -> bool {
        self.state.registry.update_stake(node_id, amount, stake_timestamp)
    }

    // === LIFECYCLE ===

    /// Rebuild the index and rejection log from the journal.
    ///
    /// Call once at startup, before accepting submissions.
    pub fn restore(&self) -> EngineResult<RestoreSummary> {
        let records = self
            .journal
            .load()
            .map_err(ConsensusError::JournalMaintenance)?;
        let horizon = self
            .time_source
            .now()
            .saturating_sub(self.config.index.retention_secs);

        let mut summary = RestoreSummary::default();
        for record in records {
            if record.timestamp < horizon {
                summary.expired += 1;
                continue;
            }
            let result = record.to_result();
            let stamp = DecisionStamp::of(&result);
            if self.state.decisions.get(&record.operation_id).is_some() {
                summary.conflicts += 1;
                continue;
            }
            if !record.accepted {
                if self.state.rejections.push(result) {
                    self.state.decisions.record(&record.operation_id, stamp);
                    summary.rejected += 1;
                } else {
                    summary.conflicts += 1;
                }
                continue;
            }

            let (Some(nonce), Some(stake_timestamp)) = (record.nonce, record.stake_timestamp)
            else {
                warn!(operation_id = %record.operation_id, "Accepted journal record lacks nonce");
                summary.conflicts += 1;
                continue;
            };
            let entry = IndexEntry {
                operation_id: record.operation_id.clone(),
                stake_holder_id: record.stake_holder_id.clone(),
                recorded_at: record.timestamp,
                sequence: 0,
                result_hash: result_hash(&result)?,
                nonce,
                stake_timestamp,
                result,
            };
            if self.state.index.restore(entry) {
                self.state.decisions.record(&record.operation_id, stamp);
                self.state
                    .registry
                    .record_stake_use(&record.stake_holder_id, stake_timestamp);
                summary.accepted += 1;
            } else {
                summary.conflicts += 1;
            }
        }

        info!(
            accepted = summary.accepted,
            rejected = summary.rejected,
            expired = summary.expired,
            conflicts = summary.conflicts,
            "[proof-consensus] Journal replay complete"
        );
        Ok(summary)
    }

    /// Evict history older than the retention horizon and compact the journal.
    pub fn run_retention(&self) -> EngineResult<RetentionReport> {
        let horizon = self
            .time_source
            .now()
            .saturating_sub(self.config.index.retention_secs);
        let evicted = self.state.index.evict_before(horizon);
        let compacted = self
            .journal
            .compact_before(horizon)
            .map_err(ConsensusError::JournalMaintenance)?;
        // Ids are released only after the journal no longer holds them.
        let forgotten = self.state.decisions.evict_before(horizon);
        let idle_windows = self.state.detector.evict_idle(self.time_source.now());

        if !evicted.is_empty() || compacted > 0 || forgotten > 0 {
            info!(
                horizon,
                evicted = evicted.len(),
                compacted,
                forgotten,
                idle_windows,
                "[proof-consensus] Retention sweep"
            );
        }
        Ok(RetentionReport {
            horizon,
            evicted,
            compacted,
            forgotten,
            idle_windows,
        })
    }

    // === DECISION PIPELINE ===

    async fn process(
        &self,
        operation_id: OperationId,
        bundle: ProofBundle,
        mut withdraw: Option<watch::Receiver<bool>>,
    ) -> EngineResult<ConsensusResult> {
        let started = Instant::now();
        let now = self.time_source.now();
        let holder_hint = bundle.stake_holder_id().unwrap_or_default().to_string();

        let proof = match bundle.assemble(&operation_id) {
            Ok(proof) => proof,
            Err(err) => {
                debug!(%operation_id, %err, "Bundle rejected on shape");
                let reason = match err {
                    BundleError::Missing(_) => ReasonCode::IncompleteBundle,
                    _ => ReasonCode::MalformedBundle,
                };
                return Ok(self.reject_fast(operation_id, holder_hint, reason, None, now));
            }
        };
        let bundle_hash = bundle_hash(&proof);
        let holder = proof.stake_holder_id().to_string();

        // Concurrent submissions of one id: the later one is a duplicate.
        let Some(_claim) = self.claim(&operation_id) else {
            return Ok(self.reject_fast(
                operation_id,
                holder,
                ReasonCode::DuplicateOperation,
                Some(bundle_hash),
                now,
            ));
        };

        if let Some(recorded) = self.state.recorded_result(&operation_id) {
            if recorded.bundle_hash == Some(bundle_hash) {
                debug!(%operation_id, "Identical resubmission, returning recorded result");
                return Ok(recorded);
            }
            return Ok(self.reject_fast(
                operation_id,
                holder,
                ReasonCode::DuplicateOperation,
                Some(bundle_hash),
                now,
            ));
        }
        if let Some(stamp) = self.state.decisions.get(&operation_id) {
            debug!(
                %operation_id,
                accepted = stamp.accepted,
                identical = stamp.bundle_hash == Some(bundle_hash),
                decided_at = stamp.decided_at,
                "Decided operation no longer held in memory"
            );
            return Ok(self.reject_fast(
                operation_id,
                holder,
                ReasonCode::DuplicateOperation,
                Some(bundle_hash),
                now,
            ));
        }

        if !self
            .state
            .detector
            .admit(&holder, now, &self.state.registry)
        {
            return Ok(self.reject_fast(
                operation_id,
                holder,
                ReasonCode::NodeQuarantined,
                Some(bundle_hash),
                now,
            ));
        }

        let ctx = ValidationContext {
            operation_id: operation_id.clone(),
            stake_holder_id: holder.clone(),
            holder: self.state.registry.snapshot(&holder),
            history: self.state.index.snapshot(&holder),
            now,
            rules: self.config.clone(),
        };

        let outcome = self.run_validators(&proof, ctx, withdraw.as_mut()).await?;
        if is_withdrawn(withdraw.as_ref()) {
            return Err(self.withdrawn(operation_id));
        }

        let decided_at = self.time_source.now();
        let (result, recorded) = match outcome {
            ValidationOutcome::Withdrawn => return Err(self.withdrawn(operation_id)),
            ValidationOutcome::TimedOut { attributable } => {
                warn!(%operation_id, holder = %holder, "Validation deadline exceeded");
                let result = ConsensusResult::rejected_early(
                    operation_id,
                    holder,
                    ReasonCode::ValidationTimeout,
                    Some(bundle_hash),
                    decided_at,
                );
                (self.record_rejection(result, attributable).await?, attributable)
            }
            ValidationOutcome::Verdicts {
                verdicts,
                attributable,
            } => {
                let result = self
                    .decide(&proof, bundle_hash, verdicts, attributable, decided_at)
                    .await?;
                let recorded = result.accepted || attributable;
                (result, recorded)
            }
        };

        if recorded {
            self.publish_decision(&result).await;
        }
        crate::metrics::record_validation_latency(started.elapsed().as_secs_f64());
        Ok(result)
    }

    fn claim(&self, operation_id: &str) -> Option<InFlight<'_>> {
        match self.in_flight.entry(operation_id.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(_) => None,
            dashmap::mapref::entry::Entry::Vacant(vacant) => {
                vacant.insert(());
                Some(InFlight {
                    claims: &self.in_flight,
                    operation_id: operation_id.to_string(),
                })
            }
        }
    }

    fn withdrawn(&self, operation_id: OperationId) -> ConsensusError {
        debug!(%operation_id, "Submission withdrawn, nothing recorded");
        ConsensusError::Withdrawn(operation_id)
    }

    /// Run the four validators concurrently under the deadline.
    async fn run_validators(
        &self,
        proof: &ConsensusProof,
        ctx: ValidationContext,
        withdraw: Option<&mut watch::Receiver<bool>>,
    ) -> EngineResult<ValidationOutcome> {
        let ctx = Arc::new(ctx);
        let signer_verified = Arc::new(AtomicBool::new(false));
        let handles: Vec<_> = proof
            .proofs()
            .into_iter()
            .map(|p| {
                let ctx = ctx.clone();
                let verifier = self.sig_verifier.clone();
                let signer_verified = signer_verified.clone();
                tokio::task::spawn_blocking(move || match &p {
                    Proof::Stake(stake) => {
                        let assessed = StakeValidator::assess(stake, &ctx, &*verifier);
                        signer_verified.store(assessed.signer_verified, Ordering::Release);
                        assessed.verdict
                    }
                    other => validate_proof(other, &ctx, &*verifier),
                })
            })
            .collect();

        // Dropping the handles detaches the tasks; they finish on their own.
        let joined = async move {
            let mut verdicts = Vec::with_capacity(ProofKind::ALL.len());
            for handle in handles {
                verdicts.push(handle.await);
            }
            verdicts
        };
        let deadline = Duration::from_millis(self.config.validation_deadline_ms);
        let timed = tokio::time::timeout(deadline, joined);

        let joined = match withdraw {
            Some(rx) => tokio::select! {
                res = timed => res,
                _ = wait_for_withdrawal(rx) => return Ok(ValidationOutcome::Withdrawn),
            },
            None => timed.await,
        };

        // A stake task still running at the deadline leaves this unset.
        let attributable = signer_verified.load(Ordering::Acquire);
        let Ok(results) = joined else {
            return Ok(ValidationOutcome::TimedOut { attributable });
        };
        let verdicts = results
            .into_iter()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ConsensusError::ValidatorTask(e.to_string()))?;
        Ok(ValidationOutcome::Verdicts {
            verdicts,
            attributable,
        })
    }

    /// Apply the combination rule and record the outcome.
    async fn decide(
        &self,
        proof: &ConsensusProof,
        bundle_hash: Hash,
        mut verdicts: Vec<ProofVerdict>,
        attributable: bool,
        decided_at: UnixSeconds,
    ) -> EngineResult<ConsensusResult> {
        let operation_id = proof.operation_id.clone();
        let holder = proof.stake_holder_id().to_string();
        let confidence_score = confidence(&verdicts);

        let mut reasons: Vec<ReasonCode> = verdicts.iter().filter_map(|v| v.reason).collect();
        if self.state.registry.is_quarantined(&holder, decided_at) {
            reasons.push(ReasonCode::NodeQuarantined);
        }

        if reasons.is_empty() {
            let hashes = proof_hashes(proof);
            let result = ConsensusResult {
                operation_id: operation_id.clone(),
                stake_holder_id: holder.clone(),
                accepted: true,
                per_proof_verdicts: verdicts.clone(),
                confidence_score,
                block_hash: Some(block_hash(&operation_id, &hashes, confidence_score)),
                rejection_reasons: Vec::new(),
                bundle_hash: Some(bundle_hash),
                decided_at,
            };
            let result_hash = result_hash(&result)?;
            match self.record_acceptance(proof, &result, result_hash) {
                Ok(()) => return Ok(result),
                Err(IndexError::ReplayedNonce { .. }) => {
                    // A concurrent acceptance used the same nonce first.
                    verdicts[ProofKind::Time.index()] =
                        ProofVerdict::invalid(ProofKind::Time, ReasonCode::ReplayedNonce);
                    reasons.push(ReasonCode::ReplayedNonce);
                }
                Err(IndexError::DuplicateOperation(op)) => {
                    return Err(ConsensusError::IndexUnavailable(format!(
                        "operation {op} appeared in the index while being decided"
                    )))
                }
                Err(IndexError::Persistence(source)) => {
                    return Err(ConsensusError::Journal {
                        operation_id,
                        source,
                    })
                }
            }
        }

        let result = ConsensusResult {
            operation_id,
            stake_holder_id: holder,
            accepted: false,
            per_proof_verdicts: verdicts,
            confidence_score,
            block_hash: None,
            rejection_reasons: reasons,
            bundle_hash: Some(bundle_hash),
            decided_at,
        };
        self.record_rejection(result, attributable).await
    }

    /// Journal, then index. The entry is visible only once durable.
    fn record_acceptance(
        &self,
        proof: &ConsensusProof,
        result: &ConsensusResult,
        result_hash: Hash,
    ) -> Result<(), IndexError> {
        let nonce = proof.time.nonce;
        let stake_timestamp = proof.stake.stake_timestamp;
        let entry = IndexEntry {
            operation_id: result.operation_id.clone(),
            stake_holder_id: result.stake_holder_id.clone(),
            recorded_at: result.decided_at,
            sequence: 0,
            result_hash,
            nonce,
            stake_timestamp,
            result: result.clone(),
        };
        let record = JournalRecord::accepted(result, nonce, stake_timestamp);
        self.state
            .index
            .commit(entry, |_| self.journal.append(&record))?;
        self.state
            .decisions
            .record(&result.operation_id, DecisionStamp::of(result));

        self.state
            .registry
            .record_stake_use(&result.stake_holder_id, stake_timestamp);
        self.state
            .detector
            .record(&result.stake_holder_id, result.decided_at, false, &self.state.registry);
        self.stats.record_accepted();
        debug!(
            operation_id = %result.operation_id,
            holder = %result.stake_holder_id,
            confidence = result.confidence_score,
            block_hash = %result.block_hash.as_ref().map(short_hex).unwrap_or_default(),
            "Operation accepted"
        );
        Ok(())
    }

    /// Journal and log an attributable rejection and charge it to the holder.
    ///
    /// An unattributable one is only counted and logged.
    async fn record_rejection(
        &self,
        result: ConsensusResult,
        attributable: bool,
    ) -> EngineResult<ConsensusResult> {
        let holder = result.stake_holder_id.as_str();
        if !attributable {
            self.stats.record_rejected(&result.rejection_reasons);
            self.stats.record_unattributed();
            debug!(
                operation_id = %result.operation_id,
                holder,
                reasons = ?result.rejection_reasons,
                "Rejection not signed by the named holder, not recorded"
            );
            return Ok(result);
        }

        self.journal
            .append(&JournalRecord::rejected(&result))
            .map_err(|source| ConsensusError::Journal {
                operation_id: result.operation_id.clone(),
                source,
            })?;
        self.state
            .decisions
            .record(&result.operation_id, DecisionStamp::of(&result));
        self.state.rejections.push(result.clone());
        self.stats.record_rejected(&result.rejection_reasons);

        for reason in result.rejection_reasons.iter().filter(|r| r.is_forgery_signal()) {
            warn!(
                operation_id = %result.operation_id,
                holder,
                reason = %reason,
                "[proof-consensus] Forgery signal"
            );
        }

        let counts_as_failure = result
            .rejection_reasons
            .iter()
            .any(|r| r.class() != crate::domain::ErrorClass::Quarantined);
        if counts_as_failure {
            let violations = self.state.registry.record_violation(holder);
            debug!(
                operation_id = %result.operation_id,
                holder,
                ?violations,
                reasons = ?result.rejection_reasons,
                "Operation rejected"
            );
            if let Some(decision) =
                self.state
                    .detector
                    .record(holder, result.decided_at, true, &self.state.registry)
            {
                self.stats.record_quarantine();
                if let Err(e) = self
                    .event_bus
                    .publish_quarantine(NodeQuarantinedEvent::from_decision(&decision))
                    .await
                {
                    warn!(node_id = %decision.node_id, error = %e, "Failed to publish quarantine");
                }
            }
        }
        Ok(result)
    }

    /// A rejection decided before validation. Never recorded.
    fn reject_fast(
        &self,
        operation_id: OperationId,
        holder: NodeId,
        reason: ReasonCode,
        bundle_hash: Option<Hash>,
        now: UnixSeconds,
    ) -> ConsensusResult {
        debug!(%operation_id, holder = %holder, %reason, "Fast-path rejection");
        self.stats.record_rejected(&[reason]);
        ConsensusResult::rejected_early(operation_id, holder, reason, bundle_hash, now)
    }

    async fn publish_decision(&self, result: &ConsensusResult) {
        if let Err(e) = self
            .event_bus
            .publish_decision(OperationDecidedEvent::from_result(result))
            .await
        {
            warn!(operation_id = %result.operation_id, error = %e, "Failed to publish decision");
        }
    }

    /// Admin calls are synchronous; the event goes out on the ambient runtime.
    fn publish_admin_quarantine(&self, node_id: &str, until: UnixSeconds)
    where
        E: 'static,
    {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            debug!(node_id, "No runtime, admin quarantine event not published");
            return;
        };
        let bus = self.event_bus.clone();
        let event = NodeQuarantinedEvent {
            node_id: node_id.to_string(),
            until,
            origin: QuarantineOrigin::Admin,
            rejection_rate: None,
        };
        handle.spawn(async move {
            if let Err(e) = bus.publish_quarantine(event).await {
                warn!(error = %e, "Failed to publish quarantine");
            }
        });
    }

    fn status_or_default(&self, node_id: &str, now: UnixSeconds) -> NodeStatus {
        self.state
            .registry
            .status(node_id, now)
            .unwrap_or_else(|| NodeStatus {
                node_id: node_id.to_string(),
                quarantined: false,
                violation_count: 0,
                current_stake: 0,
                quarantined_until: None,
            })
    }
}

/// Mean of access, storage and work weights; invalid or missing count as 0.
fn confidence(verdicts: &[ProofVerdict]) -> f64 {
    let weighted = [ProofKind::Stake, ProofKind::Space, ProofKind::Work];
    let sum: f64 = weighted
        .iter()
        .map(|kind| {
            verdicts
                .iter()
                .find(|v| v.kind == *kind && v.valid)
                .and_then(|v| v.weight)
                .unwrap_or(0.0)
        })
        .sum();
    (sum / weighted.len() as f64).clamp(0.0, 1.0)
}

fn is_withdrawn(withdraw: Option<&watch::Receiver<bool>>) -> bool {
    withdraw.is_some_and(|rx| *rx.borrow())
}

/// Resolves once the flag reads `true`; never resolves if the sender goes
/// away without withdrawing.
async fn wait_for_withdrawal(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[async_trait]
impl<S, J, E> ConsensusApi for ConsensusService<S, J, E>
where
    S: SignatureVerifier + 'static,
    J: RecordJournal + 'static,
    E: EventBus + 'static,
{
    async fn submit(
        &self,
        operation_id: OperationId,
        bundle: ProofBundle,
    ) -> EngineResult<ConsensusResult> {
        self.process(operation_id, bundle, None).await
    }

    async fn submit_encoded(
        &self,
        operation_id: OperationId,
        encoded: &[u8],
    ) -> EngineResult<ConsensusResult> {
        match decode_bundle(encoded) {
            Ok(bundle) => self.process(operation_id, bundle, None).await,
            Err(err) => {
                debug!(%operation_id, %err, "Undecodable bundle");
                let now = self.time_source.now();
                Ok(self.reject_fast(
                    operation_id,
                    String::new(),
                    ReasonCode::MalformedBundle,
                    None,
                    now,
                ))
            }
        }
    }

    async fn submit_cancellable(
        &self,
        operation_id: OperationId,
        bundle: ProofBundle,
        withdraw: watch::Receiver<bool>,
    ) -> EngineResult<ConsensusResult> {
        if *withdraw.borrow() {
            return Err(self.withdrawn(operation_id));
        }
        self.process(operation_id, bundle, Some(withdraw)).await
    }

    fn get_result(&self, operation_id: &str) -> Option<ConsensusResult> {
        self.state.index.get_result(operation_id)
    }

    fn get_node_status(&self, node_id: &str) -> Option<NodeStatus> {
        self.state
            .registry
            .status(node_id, self.time_source.now())
    }

    fn recent_results(&self, stake_holder_id: &str, k: usize) -> Vec<ConsensusResult> {
        self.state.index.last_results(stake_holder_id, k)
    }
}

impl<S, J, E> AdminApi for ConsensusService<S, J, E>
where
    S: SignatureVerifier + 'static,
    J: RecordJournal + 'static,
    E: EventBus + 'static,
{
    fn force_quarantine(&self, node_id: &str, duration: Duration) -> NodeStatus {
        let now = self.time_source.now();
        let until = now.saturating_add(duration.as_secs().max(1));
        let previous_until = self.state.registry.quarantined_until(node_id);
        self.state.registry.quarantine(node_id, until);
        self.stats.record_quarantine();
        self.publish_admin_quarantine(node_id, until);

        info!(
            target: "audit",
            node_id,
            until,
            ?previous_until,
            "Forced quarantine"
        );
        self.state.audit.push(AdminAuditRecord {
            action: AdminAction::ForceQuarantine,
            node_id: node_id.to_string(),
            at: now,
            quarantined_until: Some(until),
            previous_until,
        });
        self.status_or_default(node_id, now)
    }

    fn lift_quarantine(&self, node_id: &str) -> Option<NodeStatus> {
        let now = self.time_source.now();
        self.state.registry.snapshot(node_id)?;

        let previous_until = self.state.registry.lift_quarantine(node_id);
        self.state.detector.reset(node_id);

        info!(target: "audit", node_id, ?previous_until, "Quarantine lifted");
        self.state.audit.push(AdminAuditRecord {
            action: AdminAction::LiftQuarantine,
            node_id: node_id.to_string(),
            at: now,
            quarantined_until: None,
            previous_until,
        });
        Some(self.status_or_default(node_id, now))
    }

    fn audit_trail(&self) -> Vec<AdminAuditRecord> {
        self.state.audit.records()
    }
}
