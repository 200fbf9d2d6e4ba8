//! Event Bus adapter
//!
//! Implements the EventBus port for decision and quarantine events

use crate::events::{NodeQuarantinedEvent, OperationDecidedEvent};
use crate::ports::EventBus;
use async_trait::async_trait;

/// In-memory event bus adapter for testing
pub struct InMemoryEventBus {
    decisions: parking_lot::RwLock<Vec<OperationDecidedEvent>>,
    quarantines: parking_lot::RwLock<Vec<NodeQuarantinedEvent>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self {
            decisions: parking_lot::RwLock::new(Vec::new()),
            quarantines: parking_lot::RwLock::new(Vec::new()),
        }
    }

    pub fn get_decisions(&self) -> Vec<OperationDecidedEvent> {
        self.decisions.read().clone()
    }

    pub fn get_quarantines(&self) -> Vec<NodeQuarantinedEvent> {
        self.quarantines.read().clone()
    }

    pub fn event_count(&self) -> usize {
        self.decisions.read().len() + self.quarantines.read().len()
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventBus for InMemoryEventBus {
    async fn publish_decision(&self, event: OperationDecidedEvent) -> Result<(), String> {
        self.decisions.write().push(event);
        Ok(())
    }

    async fn publish_quarantine(&self, event: NodeQuarantinedEvent) -> Result<(), String> {
        self.quarantines.write().push(event);
        Ok(())
    }
}
