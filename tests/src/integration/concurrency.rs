//! # Concurrency
//!
//! Holders validate in parallel; races on one nonce or one operation id
//! resolve to a single recorded decision.

#[cfg(test)]
mod tests {
    use crate::integration::{harness, T0};
    use proof_consensus::testing::{TestNode, FIXTURE_STAKE};
    use proof_consensus::{ConsensusApi, ConsensusResult, ReasonCode};
    use shared_types::SECS_PER_DAY;
    use tokio::task::JoinSet;

    async fn collect(mut set: JoinSet<ConsensusResult>) -> Vec<ConsensusResult> {
        let mut results = Vec::new();
        while let Some(joined) = set.join_next().await {
            results.push(joined.unwrap());
        }
        results
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_parallel_holders_are_all_accepted() {
        let h = harness();
        let nodes: Vec<_> = (0..16u8)
            .map(|i| TestNode::new(format!("holder-{i}"), i + 1))
            .collect();
        for node in &nodes {
            h.register(node, FIXTURE_STAKE, T0 - SECS_PER_DAY);
        }

        let mut set = JoinSet::new();
        for node in &nodes {
            for n in 0..4u64 {
                let engine = h.engine.clone();
                let op = format!("{}-{n}", node.id);
                let bundle = node.bundle(&op, n, T0).build();
                set.spawn(async move { engine.submit(op, bundle).await.unwrap() });
            }
        }

        let results = collect(set).await;
        assert_eq!(results.len(), 64);
        assert!(results.iter().all(|r| r.accepted));
        assert_eq!(h.engine.index_stats().entries, 64);
        assert_eq!(h.journal.len(), 64);
        for node in &nodes {
            assert_eq!(h.engine.recent_results(&node.id, 10).len(), 4);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_nonce_race_admits_one_operation() {
        let h = harness();
        let node = TestNode::new("racer", 5);
        h.register(&node, FIXTURE_STAKE, T0 - SECS_PER_DAY);

        let mut set = JoinSet::new();
        for i in 0..8 {
            let engine = h.engine.clone();
            let op = format!("race-{i}");
            let bundle = node.bundle(&op, 42, T0).build();
            set.spawn(async move { engine.submit(op, bundle).await.unwrap() });
        }

        let results = collect(set).await;
        let accepted = results.iter().filter(|r| r.accepted).count();
        assert_eq!(accepted, 1);
        assert!(results
            .iter()
            .filter(|r| !r.accepted)
            .all(|r| r.rejection_reasons == vec![ReasonCode::ReplayedNonce]));
        assert_eq!(h.engine.recent_results("racer", 10).len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_same_operation_race_records_once() {
        let h = harness();
        let node = TestNode::new("twin", 6);
        h.register(&node, FIXTURE_STAKE, T0 - SECS_PER_DAY);
        let bundle = node.bundle("twin-op", 1, T0).build();

        let mut set = JoinSet::new();
        for _ in 0..8 {
            let engine = h.engine.clone();
            let bundle = bundle.clone();
            set.spawn(async move { engine.submit("twin-op".into(), bundle).await.unwrap() });
        }

        let results = collect(set).await;
        assert!(results.iter().any(|r| r.accepted));
        assert!(results.iter().all(|r| {
            r.accepted || r.rejection_reasons == vec![ReasonCode::DuplicateOperation]
        }));
        assert_eq!(h.journal.len(), 1);
        assert_eq!(h.verifier.calls(), 1);

        // Once settled, resubmission is answered from the record.
        let settled = h.engine.submit("twin-op".into(), bundle).await.unwrap();
        assert!(settled.accepted);
    }
}
