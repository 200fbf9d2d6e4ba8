//! Validator registry
//!
//! Known nodes, their public keys, stake balances and quarantine state.
//! Records are sharded by node id; updates to one node never block another.
//! Validators only ever see cloned snapshots.

use super::NodeStatus;
use dashmap::DashMap;
use shared_types::{NodeId, PublicKey, UnixSeconds};
use tracing::{debug, info};

/// Registry record for one node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatorNode {
    pub node_id: NodeId,
    /// `None` for nodes only known through an admin quarantine.
    pub public_key: Option<PublicKey>,
    pub current_stake: u64,
    /// Most recent stake bonding/renewal or accepted stake timestamp.
    pub last_stake_timestamp: Option<UnixSeconds>,
    pub violation_count: u64,
    pub quarantined_until: Option<UnixSeconds>,
}

impl ValidatorNode {
    pub fn new(
        node_id: impl Into<NodeId>,
        public_key: PublicKey,
        current_stake: u64,
        stake_timestamp: UnixSeconds,
    ) -> Self {
        Self {
            node_id: node_id.into(),
            public_key: Some(public_key),
            current_stake,
            last_stake_timestamp: Some(stake_timestamp),
            violation_count: 0,
            quarantined_until: None,
        }
    }

    /// Placeholder for a node quarantined before it registered.
    fn observed(node_id: &str) -> Self {
        Self {
            node_id: node_id.to_string(),
            public_key: None,
            current_stake: 0,
            last_stake_timestamp: None,
            violation_count: 0,
            quarantined_until: None,
        }
    }

    pub fn is_quarantined(&self, now: UnixSeconds) -> bool {
        self.quarantined_until.is_some_and(|until| now < until)
    }

    fn status(&self, now: UnixSeconds) -> NodeStatus {
        NodeStatus {
            node_id: self.node_id.clone(),
            quarantined: self.is_quarantined(now),
            violation_count: self.violation_count,
            current_stake: self.current_stake,
            quarantined_until: self.quarantined_until,
        }
    }
}

#[derive(Debug, Default)]
pub struct ValidatorRegistry {
    nodes: DashMap<NodeId, ValidatorNode>,
}

impl ValidatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or re-key a node.
    ///
    /// Violation history and any quarantine of an existing record survive
    /// re-registration.
    pub fn register_node(&self, node: ValidatorNode) {
        info!(
            node_id = %node.node_id,
            stake = node.current_stake,
            "[proof-consensus] Registering validator node"
        );
        self.nodes
            .entry(node.node_id.clone())
            .and_modify(|existing| {
                existing.public_key = node.public_key;
                existing.current_stake = node.current_stake;
                existing.last_stake_timestamp =
                    existing.last_stake_timestamp.max(node.last_stake_timestamp);
            })
            .or_insert(node);
    }

    /// Set the bonded stake of a known node. Returns `false` for unknown nodes.
    pub fn update_stake(&self, node_id: &str, amount: u64, stake_timestamp: UnixSeconds) -> bool {
        match self.nodes.get_mut(node_id) {
            Some(mut node) => {
                node.current_stake = amount;
                node.last_stake_timestamp = node.last_stake_timestamp.max(Some(stake_timestamp));
                debug!(node_id, amount, stake_timestamp, "Stake updated");
                true
            }
            None => false,
        }
    }

    pub fn snapshot(&self, node_id: &str) -> Option<ValidatorNode> {
        self.nodes.get(node_id).map(|n| n.clone())
    }

    /// Note the stake timestamp of an accepted operation.
    pub fn record_stake_use(&self, node_id: &str, stake_timestamp: UnixSeconds) {
        if let Some(mut node) = self.nodes.get_mut(node_id) {
            node.last_stake_timestamp = node.last_stake_timestamp.max(Some(stake_timestamp));
        }
    }

    /// Increment the violation count of a known node. Unknown ids are ignored.
    pub fn record_violation(&self, node_id: &str) -> Option<u64> {
        let mut node = self.nodes.get_mut(node_id)?;
        node.violation_count += 1;
        Some(node.violation_count)
    }

    /// Quarantine a node until `until`, creating a placeholder if needed.
    pub fn quarantine(&self, node_id: &str, until: UnixSeconds) {
        let mut node = self
            .nodes
            .entry(node_id.to_string())
            .or_insert_with(|| ValidatorNode::observed(node_id));
        node.quarantined_until = Some(until);
    }

    /// Clear any quarantine; returns the deadline that was set.
    pub fn lift_quarantine(&self, node_id: &str) -> Option<UnixSeconds> {
        self.nodes
            .get_mut(node_id)
            .and_then(|mut node| node.quarantined_until.take())
    }

    pub fn quarantined_until(&self, node_id: &str) -> Option<UnixSeconds> {
        self.nodes.get(node_id).and_then(|n| n.quarantined_until)
    }

    pub fn is_quarantined(&self, node_id: &str, now: UnixSeconds) -> bool {
        self.nodes
            .get(node_id)
            .is_some_and(|n| n.is_quarantined(now))
    }

    pub fn status(&self, node_id: &str, now: UnixSeconds) -> Option<NodeStatus> {
        self.nodes.get(node_id).map(|n| n.status(now))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn total_stake(&self) -> u128 {
        self.nodes.iter().map(|n| n.current_stake as u128).sum()
    }
}
