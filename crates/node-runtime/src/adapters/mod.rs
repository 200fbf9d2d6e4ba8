//! # Adapters
//!
//! Host-side implementations of the engine's outbound ports.

pub mod event_bus;

pub use event_bus::{BroadcastEventBus, NodeEvent};
