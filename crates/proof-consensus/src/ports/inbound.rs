//! Driving ports (Inbound API)

use crate::domain::{AdminAuditRecord, ConsensusResult, EngineResult, NodeStatus, ProofBundle};
use async_trait::async_trait;
use shared_types::OperationId;
use std::time::Duration;
use tokio::sync::watch;

/// Primary consensus API
#[async_trait]
pub trait ConsensusApi: Send + Sync {
    /// Validate a four-proof bundle and decide the operation.
    ///
    /// Rejections are returned as `Ok` with `accepted == false`. Resubmitting
    /// an identical bundle returns the recorded result without re-validation.
    async fn submit(
        &self,
        operation_id: OperationId,
        bundle: ProofBundle,
    ) -> EngineResult<ConsensusResult>;

    /// Same as [`ConsensusApi::submit`] for a bincode-encoded bundle.
    ///
    /// Undecodable input is rejected with `malformed_bundle`.
    async fn submit_encoded(
        &self,
        operation_id: OperationId,
        encoded: &[u8],
    ) -> EngineResult<ConsensusResult>;

    /// Submit with a withdrawal signal.
    ///
    /// If `withdraw` turns `true` before a decision, nothing is recorded and
    /// `ConsensusError::Withdrawn` is returned.
    async fn submit_cancellable(
        &self,
        operation_id: OperationId,
        bundle: ProofBundle,
        withdraw: watch::Receiver<bool>,
    ) -> EngineResult<ConsensusResult>;

    /// Accepted result for an operation, from the proof index.
    fn get_result(&self, operation_id: &str) -> Option<ConsensusResult>;

    fn get_node_status(&self, node_id: &str) -> Option<NodeStatus>;

    /// A holder's most recent accepted results, newest first.
    fn recent_results(&self, stake_holder_id: &str, k: usize) -> Vec<ConsensusResult>;
}

/// Operator controls. Every call is audited.
pub trait AdminApi: Send + Sync {
    /// Quarantine a node for `duration` from now, regardless of its window.
    fn force_quarantine(&self, node_id: &str, duration: Duration) -> NodeStatus;

    /// Lift a quarantine and reset the node's detector window.
    ///
    /// Returns `None` for unknown nodes.
    fn lift_quarantine(&self, node_id: &str) -> Option<NodeStatus>;

    fn audit_trail(&self) -> Vec<AdminAuditRecord>;
}
