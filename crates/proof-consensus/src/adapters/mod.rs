//! Adapters layer (Hexagonal Architecture)

mod ed25519;
mod event_bus;
mod journal;

pub use ed25519::*;
pub use event_bus::*;
pub use journal::*;
