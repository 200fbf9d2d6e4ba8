//! # Shared Types Crate
//!
//! Primitive types used across the four-proof workspace.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: identifiers and hash types are defined once
//!   here and re-used by the consensus core, the runtime and the tests.
//! - **No behaviour**: this crate carries data shapes and error types only.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
