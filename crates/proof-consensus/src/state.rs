use crate::domain::{
    AuditLog, ByzantineDetector, ConsensusConfig, DecisionLedger, ProofIndex, RejectionLog,
    ValidatorRegistry,
};

/// Encapsulates the mutable state of the consensus service.
/// Every store is internally synchronized and keyed by node or operation,
/// so submissions for different holders never contend on a shared lock.
pub struct EngineState {
    pub index: ProofIndex,
    pub registry: ValidatorRegistry,
    pub detector: ByzantineDetector,
    pub rejections: RejectionLog,
    /// Ids of every recorded decision within retention.
    pub decisions: DecisionLedger,
    pub audit: AuditLog,
}

impl EngineState {
    pub fn new(config: &ConsensusConfig) -> Self {
        Self {
            index: ProofIndex::new(),
            registry: ValidatorRegistry::new(),
            detector: ByzantineDetector::new(config.byzantine.clone()),
            rejections: RejectionLog::new(config.rejection_log_capacity),
            decisions: DecisionLedger::new(),
            audit: AuditLog::new(config.audit_log_capacity),
        }
    }

    /// A decided result for `operation_id`, accepted or rejected.
    pub fn recorded_result(&self, operation_id: &str) -> Option<crate::domain::ConsensusResult> {
        self.index
            .get_result(operation_id)
            .or_else(|| self.rejections.get(operation_id))
    }
}
