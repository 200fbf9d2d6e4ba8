//! # Event Bus Adapter
//!
//! Logs every decision and fans it out to in-process subscribers over a
//! `tokio::sync::broadcast` channel. Slow subscribers lag and lose events;
//! the engine never waits on them.

use async_trait::async_trait;
use proof_consensus::{EventBus, NodeQuarantinedEvent, OperationDecidedEvent};
use shared_types::short_hex;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Default subscriber buffer.
pub const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Events delivered to subscribers.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeEvent {
    Decided(OperationDecidedEvent),
    Quarantined(NodeQuarantinedEvent),
}

pub struct BroadcastEventBus {
    sender: broadcast::Sender<NodeEvent>,
}

impl BroadcastEventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NodeEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    fn fan_out(&self, event: NodeEvent) {
        // No subscribers is not an error.
        if self.sender.send(event).is_err() {
            debug!("No event subscribers");
        }
    }
}

impl Default for BroadcastEventBus {
    fn default() -> Self {
        Self::new(EVENT_CHANNEL_CAPACITY)
    }
}

#[async_trait]
impl EventBus for BroadcastEventBus {
    async fn publish_decision(&self, event: OperationDecidedEvent) -> Result<(), String> {
        if event.accepted {
            info!(
                operation_id = %event.operation_id,
                holder = %event.stake_holder_id,
                confidence = event.confidence_score,
                block_hash = %event.block_hash.as_ref().map(short_hex).unwrap_or_default(),
                "Operation accepted"
            );
        } else {
            info!(
                operation_id = %event.operation_id,
                holder = %event.stake_holder_id,
                reasons = ?event.rejection_reasons,
                "Operation rejected"
            );
        }
        self.fan_out(NodeEvent::Decided(event));
        Ok(())
    }

    async fn publish_quarantine(&self, event: NodeQuarantinedEvent) -> Result<(), String> {
        warn!(
            node_id = %event.node_id,
            until = event.until,
            origin = ?event.origin,
            rate = ?event.rejection_rate,
            "Node quarantined"
        );
        self.fan_out(NodeEvent::Quarantined(event));
        Ok(())
    }
}
