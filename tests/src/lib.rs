//! # Four-Proof Consensus Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── scenarios.rs    # Acceptance rules end to end
//!     ├── byzantine.rs    # Quarantine and release
//!     ├── concurrency.rs  # Parallel submissions and races
//!     ├── persistence.rs  # File journal, restart, retention
//!     └── robustness.rs   # Hostile wire input
//! benches/
//! └── engine_benchmarks.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p proof-tests
//! cargo test -p proof-tests integration::byzantine
//! cargo bench -p proof-tests
//! ```

pub mod integration;
