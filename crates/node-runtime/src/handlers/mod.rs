//! # Background Handlers
//!
//! Long-running tasks spawned by the runtime.

pub mod retention;

pub use retention::{RetentionSweeper, SweepTotals};
