//! Domain layer for the proof consensus engine
//!
//! - proof: the four proof types and bundles
//! - codec: canonical bytes, hashing, wire and journal encoding
//! - verdict: reason codes, per-proof verdicts, consensus results
//! - validator: the validator registry
//! - byzantine: rolling-window quarantine detector
//! - index: holder-partitioned history of accepted operations
//! - audit: bounded rejection log and admin audit trail

mod audit;
mod byzantine;
mod codec;
mod config;
mod error;
mod index;
mod proof;
mod record;
mod validator;
mod verdict;

pub use audit::*;
pub use byzantine::*;
pub use codec::*;
pub use config::*;
pub use error::*;
pub use index::*;
pub use proof::*;
pub use record::*;
pub use validator::*;
pub use verdict::*;
