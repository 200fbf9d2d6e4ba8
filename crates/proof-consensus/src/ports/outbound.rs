//! Driven ports (Outbound dependencies)

use crate::domain::JournalRecord;
use crate::events::{NodeQuarantinedEvent, OperationDecidedEvent};
use async_trait::async_trait;
use shared_types::{PublicKey, StorageError, UnixSeconds};

/// Signature verification for stake proofs.
///
/// Implementations must be pure in-memory checks; they run inside
/// validator tasks under the validation deadline.
pub trait SignatureVerifier: Send + Sync {
    /// Verify a 64-byte Ed25519 signature. Any other length is invalid.
    fn verify_ed25519(&self, message: &[u8], signature: &[u8], public_key: &PublicKey) -> bool;
}

/// Time source for freshness, aging and quarantine deadlines
pub trait TimeSource: Send + Sync {
    /// Current unix timestamp in seconds
    fn now(&self) -> UnixSeconds;
}

/// Default time source using system time
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> UnixSeconds {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}

/// Append-only durable log of decisions.
///
/// `append` must be durable when it returns `Ok`. `load` returns every
/// complete record in append order.
pub trait RecordJournal: Send + Sync {
    fn append(&self, record: &JournalRecord) -> Result<(), StorageError>;

    fn load(&self) -> Result<Vec<JournalRecord>, StorageError>;

    /// Drop records decided before `horizon`; returns how many were dropped.
    fn compact_before(&self, horizon: UnixSeconds) -> Result<usize, StorageError>;
}

/// Event bus for downstream collaborators (certificate authority, audit sinks).
///
/// Publication is best effort: a failure is logged and never changes the
/// decision.
#[async_trait]
pub trait EventBus: Send + Sync {
    async fn publish_decision(&self, event: OperationDecidedEvent) -> Result<(), String>;

    async fn publish_quarantine(&self, event: NodeQuarantinedEvent) -> Result<(), String>;
}
