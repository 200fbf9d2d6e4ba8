//! Byzantine fault detection
//!
//! Each node has a rolling window of its most recent verdicts, bounded by
//! count (N) and age (T). A node is quarantined when its rejection rate in
//! the window exceeds the threshold with enough evidence behind it.
//! Quarantine is recorded in the [`ValidatorRegistry`] and lifted lazily the
//! first time the node is seen after the deadline.

use super::{ByzantineConfig, ValidatorRegistry};
use dashmap::DashMap;
use shared_types::{NodeId, UnixSeconds};
use std::collections::VecDeque;
use tracing::{info, warn};

#[derive(Debug, Default)]
struct VerdictWindow {
    /// (decided_at, failed), oldest first.
    entries: VecDeque<(UnixSeconds, bool)>,
    rejections: usize,
}

impl VerdictWindow {
    fn prune(&mut self, now: UnixSeconds, config: &ByzantineConfig) {
        let horizon = now.saturating_sub(config.window_secs);
        while let Some(&(at, failed)) = self.entries.front() {
            if at >= horizon && self.entries.len() <= config.window_size {
                break;
            }
            self.entries.pop_front();
            if failed {
                self.rejections -= 1;
            }
        }
    }

    fn push(&mut self, now: UnixSeconds, failed: bool, config: &ByzantineConfig) {
        self.entries.push_back((now, failed));
        if failed {
            self.rejections += 1;
        }
        self.prune(now, config);
    }

    fn rate(&self) -> f64 {
        if self.entries.is_empty() {
            0.0
        } else {
            self.rejections as f64 / self.entries.len() as f64
        }
    }
}

/// Snapshot of one node's window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindowStats {
    pub len: usize,
    pub rejections: usize,
    pub rejection_rate: f64,
}

/// Emitted when a verdict pushes a node into quarantine.
#[derive(Clone, Debug, PartialEq)]
pub struct QuarantineDecision {
    pub node_id: NodeId,
    pub until: UnixSeconds,
    pub stats: WindowStats,
}

#[derive(Debug)]
pub struct ByzantineDetector {
    windows: DashMap<NodeId, VerdictWindow>,
    config: ByzantineConfig,
}

impl ByzantineDetector {
    pub fn new(config: ByzantineConfig) -> Self {
        Self {
            windows: DashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &ByzantineConfig {
        &self.config
    }

    /// Whether `node_id` may be validated now.
    ///
    /// An expired quarantine is lifted here and the node's window cleared.
    pub fn admit(&self, node_id: &str, now: UnixSeconds, registry: &ValidatorRegistry) -> bool {
        match registry.quarantined_until(node_id) {
            Some(until) if now < until => false,
            Some(until) => {
                registry.lift_quarantine(node_id);
                self.reset(node_id);
                info!(node_id, until, "[proof-consensus] Quarantine expired, node released");
                true
            }
            None => true,
        }
    }

    /// Record one verdict for `node_id` and quarantine it if the window
    /// crosses the threshold.
    pub fn record(
        &self,
        node_id: &str,
        now: UnixSeconds,
        failed: bool,
        registry: &ValidatorRegistry,
    ) -> Option<QuarantineDecision> {
        let mut window = self.windows.entry(node_id.to_string()).or_default();
        window.push(now, failed, &self.config);

        if !failed || registry.is_quarantined(node_id, now) {
            return None;
        }

        let stats = WindowStats {
            len: window.entries.len(),
            rejections: window.rejections,
            rejection_rate: window.rate(),
        };
        let breached = stats.len >= self.config.min_sample_size
            && stats.rejections >= self.config.min_rejections
            && stats.rejection_rate > self.config.rejection_threshold;
        if !breached {
            return None;
        }

        let until = now.saturating_add(self.config.cooldown_secs);
        registry.quarantine(node_id, until);
        warn!(
            node_id,
            until,
            rejections = stats.rejections,
            window = stats.len,
            rate = stats.rejection_rate,
            "[proof-consensus] Node quarantined"
        );
        Some(QuarantineDecision {
            node_id: node_id.to_string(),
            until,
            stats,
        })
    }

    /// Forget a node's window.
    pub fn reset(&self, node_id: &str) {
        self.windows.remove(node_id);
    }

    /// Drop windows whose verdicts have all aged out. Returns how many.
    pub fn evict_idle(&self, now: UnixSeconds) -> usize {
        let before = self.windows.len();
        self.windows.retain(|_, window| {
            window.prune(now, &self.config);
            !window.entries.is_empty()
        });
        before.saturating_sub(self.windows.len())
    }

    /// Number of nodes with a live window.
    pub fn tracked_nodes(&self) -> usize {
        self.windows.len()
    }

    pub fn window_stats(&self, node_id: &str, now: UnixSeconds) -> Option<WindowStats> {
        let mut window = self.windows.get_mut(node_id)?;
        window.prune(now, &self.config);
        Some(WindowStats {
            len: window.entries.len(),
            rejections: window.rejections,
            rejection_rate: window.rate(),
        })
    }
}
