//! Proof index (block matrix)
//!
//! History of accepted operations, partitioned by stake holder.
//!
//! Each partition is an immutable [`PartitionSnapshot`] built from sorted
//! segments. Appends add a one-entry segment and merge equal-or-smaller
//! neighbours like a binary counter, so a partition of `n` entries has
//! O(log n) segments and appends cost O(log n) amortized.
//!
//! Writers serialize on a per-holder mutex, build the next snapshot and swap
//! it in. Readers clone the current `Arc` and never see a partial write.

use super::{ConsensusResult, IndexError};
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use shared_types::{Hash, NodeId, OperationId, StorageError, UnixSeconds};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// One accepted operation.
#[derive(Clone, Debug, PartialEq)]
pub struct IndexEntry {
    pub operation_id: OperationId,
    pub stake_holder_id: NodeId,
    pub recorded_at: UnixSeconds,
    /// Insertion order; breaks ties between equal `recorded_at`.
    pub sequence: u64,
    pub result_hash: Hash,
    pub nonce: u64,
    pub stake_timestamp: UnixSeconds,
    pub result: ConsensusResult,
}

impl IndexEntry {
    fn key(&self) -> (UnixSeconds, u64) {
        (self.recorded_at, self.sequence)
    }
}

/// Sorted run of entries with a nonce set for O(1) membership.
#[derive(Debug)]
struct Segment {
    entries: Vec<Arc<IndexEntry>>,
    nonces: HashSet<u64>,
    max_stake_timestamp: UnixSeconds,
}

impl Segment {
    fn from_sorted(entries: Vec<Arc<IndexEntry>>) -> Self {
        let nonces = entries.iter().map(|e| e.nonce).collect();
        let max_stake_timestamp = entries.iter().map(|e| e.stake_timestamp).max().unwrap_or(0);
        Self {
            entries,
            nonces,
            max_stake_timestamp,
        }
    }

    fn merge(older: &Segment, newer: &Segment) -> Segment {
        let mut merged = Vec::with_capacity(older.len() + newer.len());
        let (mut i, mut j) = (0, 0);
        while i < older.len() && j < newer.len() {
            if older.entries[i].key() <= newer.entries[j].key() {
                merged.push(older.entries[i].clone());
                i += 1;
            } else {
                merged.push(newer.entries[j].clone());
                j += 1;
            }
        }
        merged.extend_from_slice(&older.entries[i..]);
        merged.extend_from_slice(&newer.entries[j..]);
        Segment::from_sorted(merged)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn min_recorded_at(&self) -> Option<UnixSeconds> {
        self.entries.first().map(|e| e.recorded_at)
    }

    fn max_recorded_at(&self) -> Option<UnixSeconds> {
        self.entries.last().map(|e| e.recorded_at)
    }
}

/// Immutable, versioned view of one holder's history.
#[derive(Debug, Default)]
pub struct PartitionSnapshot {
    version: u64,
    segments: Vec<Arc<Segment>>,
    len: usize,
    latest_stake_timestamp: Option<UnixSeconds>,
}

impl PartitionSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn contains_nonce(&self, nonce: u64) -> bool {
        self.segments.iter().any(|s| s.nonces.contains(&nonce))
    }

    /// Newest stake timestamp among accepted operations.
    pub fn latest_stake_timestamp(&self) -> Option<UnixSeconds> {
        self.latest_stake_timestamp
    }

    /// The `k` most recent entries, newest first.
    pub fn latest(&self, k: usize) -> Vec<Arc<IndexEntry>> {
        let mut candidates: Vec<Arc<IndexEntry>> = self
            .segments
            .iter()
            .flat_map(|s| s.entries.iter().rev().take(k).cloned())
            .collect();
        candidates.sort_by_key(|e| std::cmp::Reverse(e.key()));
        candidates.truncate(k);
        candidates
    }

    /// Entries with `from <= recorded_at < to`, oldest first.
    pub fn range(&self, from: UnixSeconds, to: UnixSeconds) -> Vec<Arc<IndexEntry>> {
        let mut out = Vec::new();
        for segment in &self.segments {
            let start = segment.entries.partition_point(|e| e.recorded_at < from);
            let end = segment.entries.partition_point(|e| e.recorded_at < to);
            if start < end {
                out.extend_from_slice(&segment.entries[start..end]);
            }
        }
        out.sort_by_key(|e| e.key());
        out
    }

    fn rebuild(version: u64, segments: Vec<Arc<Segment>>) -> Self {
        let len = segments.iter().map(|s| s.len()).sum();
        let latest_stake_timestamp = segments
            .iter()
            .filter(|s| s.len() > 0)
            .map(|s| s.max_stake_timestamp)
            .max();
        Self {
            version,
            segments,
            len,
            latest_stake_timestamp,
        }
    }

    fn with_entry(&self, entry: Arc<IndexEntry>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Arc::new(Segment::from_sorted(vec![entry])));

        // Binary-counter carry: merge while the older run is not larger.
        while segments.len() >= 2 {
            let n = segments.len();
            if segments[n - 2].len() > segments[n - 1].len() {
                break;
            }
            let (Some(newer), Some(older)) = (segments.pop(), segments.pop()) else {
                break;
            };
            segments.push(Arc::new(Segment::merge(&older, &newer)));
        }

        Self::rebuild(self.version + 1, segments)
    }

    /// Split into (kept snapshot, evicted entries) at `horizon`.
    fn evict_before(&self, horizon: UnixSeconds) -> (Self, Vec<Arc<IndexEntry>>) {
        let mut kept = Vec::with_capacity(self.segments.len());
        let mut evicted = Vec::new();

        for segment in &self.segments {
            match (segment.min_recorded_at(), segment.max_recorded_at()) {
                (Some(min), _) if min >= horizon => kept.push(segment.clone()),
                (Some(_), Some(max)) if max < horizon => {
                    evicted.extend_from_slice(&segment.entries)
                }
                (Some(_), Some(_)) => {
                    let split = segment.entries.partition_point(|e| e.recorded_at < horizon);
                    evicted.extend_from_slice(&segment.entries[..split]);
                    kept.push(Arc::new(Segment::from_sorted(
                        segment.entries[split..].to_vec(),
                    )));
                }
                _ => {}
            }
        }

        if evicted.is_empty() {
            return (Self::rebuild(self.version, self.segments.clone()), evicted);
        }
        (Self::rebuild(self.version + 1, kept), evicted)
    }
}

#[derive(Debug, Default)]
struct HolderSlot {
    current: RwLock<Arc<PartitionSnapshot>>,
    writer: Mutex<()>,
}

/// Aggregate counters for diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IndexStats {
    pub partitions: usize,
    pub entries: usize,
    pub operations: usize,
    pub max_segments: usize,
}

#[derive(Debug, Default)]
pub struct ProofIndex {
    partitions: DashMap<NodeId, Arc<HolderSlot>>,
    operations: DashMap<OperationId, Arc<IndexEntry>>,
    sequence: AtomicU64,
}

impl ProofIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot of a holder's partition; empty for unknown holders.
    pub fn snapshot(&self, holder: &str) -> Arc<PartitionSnapshot> {
        self.partitions
            .get(holder)
            .map(|slot| slot.current.read().clone())
            .unwrap_or_default()
    }

    pub fn has_nonce(&self, holder: &str, nonce: u64) -> bool {
        self.snapshot(holder).contains_nonce(nonce)
    }

    pub fn latest_stake_timestamp(&self, holder: &str) -> Option<UnixSeconds> {
        self.snapshot(holder).latest_stake_timestamp()
    }

    /// The holder's `k` most recent accepted results, newest first.
    pub fn last_results(&self, holder: &str, k: usize) -> Vec<ConsensusResult> {
        self.snapshot(holder)
            .latest(k)
            .into_iter()
            .map(|e| e.result.clone())
            .collect()
    }

    pub fn range(&self, holder: &str, from: UnixSeconds, to: UnixSeconds) -> Vec<Arc<IndexEntry>> {
        self.snapshot(holder).range(from, to)
    }

    pub fn get_entry(&self, operation_id: &str) -> Option<Arc<IndexEntry>> {
        self.operations.get(operation_id).map(|e| e.clone())
    }

    pub fn get_result(&self, operation_id: &str) -> Option<ConsensusResult> {
        self.operations.get(operation_id).map(|e| e.result.clone())
    }

    pub fn contains_operation(&self, operation_id: &str) -> bool {
        self.operations.contains_key(operation_id)
    }

    fn slot(&self, holder: &str) -> Arc<HolderSlot> {
        self.partitions
            .entry(holder.to_string())
            .or_default()
            .clone()
    }

    /// Append an accepted entry.
    ///
    /// Under the holder's write lock the nonce and the operation id are
    /// checked again, then `persist` runs; the entry becomes visible only
    /// if it succeeds. No operation-map guard is held while `persist` runs,
    /// so lookups on any id proceed during a slow journal write. Commits of
    /// one operation id must not race; the service claims the id first.
    pub fn commit<F>(&self, mut entry: IndexEntry, persist: F) -> Result<Arc<IndexEntry>, IndexError>
    where
        F: FnOnce(&IndexEntry) -> Result<(), StorageError>,
    {
        let slot = self.slot(&entry.stake_holder_id);
        let _writer = slot.writer.lock();
        let current = slot.current.read().clone();

        if current.contains_nonce(entry.nonce) {
            return Err(IndexError::ReplayedNonce {
                holder: entry.stake_holder_id,
                nonce: entry.nonce,
            });
        }
        if self.operations.contains_key(&entry.operation_id) {
            return Err(IndexError::DuplicateOperation(entry.operation_id));
        }

        persist(&entry)?;
        entry.sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let entry = Arc::new(entry);
        let next = current.with_entry(entry.clone());
        debug!(
            holder = %entry.stake_holder_id,
            operation_id = %entry.operation_id,
            version = next.version(),
            segments = next.segment_count(),
            "Index entry committed"
        );
        *slot.current.write() = Arc::new(next);
        self.operations.insert(entry.operation_id.clone(), entry.clone());
        Ok(entry)
    }

    /// Re-insert an entry replayed from the journal. Conflicts are skipped.
    pub fn restore(&self, entry: IndexEntry) -> bool {
        match self.commit(entry, |_| Ok(())) {
            Ok(_) => true,
            Err(err) => {
                warn!(%err, "Skipping conflicting journal entry during restore");
                false
            }
        }
    }

    /// Drop entries recorded before `horizon`; returns them for archiving.
    pub fn evict_before(&self, horizon: UnixSeconds) -> Vec<Arc<IndexEntry>> {
        let slots: Vec<(NodeId, Arc<HolderSlot>)> = self
            .partitions
            .iter()
            .map(|kv| (kv.key().clone(), kv.value().clone()))
            .collect();

        let mut evicted_all = Vec::new();
        for (holder, slot) in slots {
            {
                let _writer = slot.writer.lock();
                let current = slot.current.read().clone();
                let (next, evicted) = current.evict_before(horizon);
                if !evicted.is_empty() {
                    *slot.current.write() = Arc::new(next);
                    for entry in &evicted {
                        self.operations.remove(&entry.operation_id);
                    }
                    evicted_all.extend(evicted);
                }
            }
            drop(slot);
            // Only drop an empty partition nobody else is holding.
            self.partitions.remove_if(&holder, |_, slot| {
                Arc::strong_count(slot) == 1 && slot.current.read().is_empty()
            });
        }
        evicted_all
    }

    pub fn stats(&self) -> IndexStats {
        let mut stats = IndexStats {
            partitions: self.partitions.len(),
            operations: self.operations.len(),
            ..IndexStats::default()
        };
        for slot in self.partitions.iter() {
            let snapshot = slot.current.read().clone();
            stats.entries += snapshot.len();
            stats.max_segments = stats.max_segments.max(snapshot.segment_count());
        }
        stats
    }
}
