//! In-memory logs: rejected results, decided operation ids and admin actions.

use super::ConsensusResult;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use shared_types::{Hash, NodeId, OperationId, UnixSeconds};
use std::collections::{HashMap, VecDeque};

#[derive(Debug, Default)]
struct RejectionLogInner {
    order: VecDeque<OperationId>,
    by_operation: HashMap<OperationId, ConsensusResult>,
    rotated: u64,
}

/// Most recent rejected results, oldest rotated out first.
#[derive(Debug)]
pub struct RejectionLog {
    capacity: usize,
    inner: Mutex<RejectionLogInner>,
}

impl RejectionLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: Mutex::new(RejectionLogInner::default()),
        }
    }

    /// Returns `false` if the operation is already logged.
    pub fn push(&self, result: ConsensusResult) -> bool {
        let mut inner = self.inner.lock();
        if inner.by_operation.contains_key(&result.operation_id) {
            return false;
        }
        while inner.order.len() >= self.capacity {
            if let Some(oldest) = inner.order.pop_front() {
                inner.by_operation.remove(&oldest);
                inner.rotated += 1;
            }
        }
        inner.order.push_back(result.operation_id.clone());
        inner.by_operation.insert(result.operation_id.clone(), result);
        true
    }

    pub fn get(&self, operation_id: &str) -> Option<ConsensusResult> {
        self.inner.lock().by_operation.get(operation_id).cloned()
    }

    /// Up to `k` rejections, newest first.
    pub fn recent(&self, k: usize) -> Vec<ConsensusResult> {
        let inner = self.inner.lock();
        inner
            .order
            .iter()
            .rev()
            .take(k)
            .filter_map(|op| inner.by_operation.get(op).cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries dropped by rotation since start.
    pub fn rotated(&self) -> u64 {
        self.inner.lock().rotated
    }
}

/// What outlives a decision once its full result leaves memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecisionStamp {
    pub accepted: bool,
    pub bundle_hash: Option<Hash>,
    pub decided_at: UnixSeconds,
}

impl DecisionStamp {
    pub fn of(result: &ConsensusResult) -> Self {
        Self {
            accepted: result.accepted,
            bundle_hash: result.bundle_hash,
            decided_at: result.decided_at,
        }
    }
}

/// Every recorded operation id inside the retention horizon.
///
/// The rejection log rotates and the index evicts; this ledger keeps an id
/// claimed until the journal forgets it too.
#[derive(Debug, Default)]
pub struct DecisionLedger {
    stamps: DashMap<OperationId, DecisionStamp>,
}

impl DecisionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the operation already has a stamp.
    pub fn record(&self, operation_id: &str, stamp: DecisionStamp) -> bool {
        match self.stamps.entry(operation_id.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(_) => false,
            dashmap::mapref::entry::Entry::Vacant(vacant) => {
                vacant.insert(stamp);
                true
            }
        }
    }

    pub fn get(&self, operation_id: &str) -> Option<DecisionStamp> {
        self.stamps.get(operation_id).map(|s| *s)
    }

    /// Forget decisions older than `horizon`. Returns how many.
    pub fn evict_before(&self, horizon: UnixSeconds) -> usize {
        let before = self.stamps.len();
        self.stamps.retain(|_, stamp| stamp.decided_at >= horizon);
        before.saturating_sub(self.stamps.len())
    }

    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdminAction {
    ForceQuarantine,
    LiftQuarantine,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminAuditRecord {
    pub action: AdminAction,
    pub node_id: NodeId,
    pub at: UnixSeconds,
    /// Deadline after the action.
    pub quarantined_until: Option<UnixSeconds>,
    /// Deadline before the action.
    pub previous_until: Option<UnixSeconds>,
}

#[derive(Debug)]
pub struct AuditLog {
    capacity: usize,
    records: Mutex<VecDeque<AdminAuditRecord>>,
}

impl AuditLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            records: Mutex::new(VecDeque::new()),
        }
    }

    pub fn push(&self, record: AdminAuditRecord) {
        let mut records = self.records.lock();
        if records.len() >= self.capacity {
            records.pop_front();
        }
        records.push_back(record);
    }

    /// All retained records, oldest first.
    pub fn records(&self) -> Vec<AdminAuditRecord> {
        self.records.lock().iter().cloned().collect()
    }
}
