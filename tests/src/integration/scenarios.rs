//! # Acceptance Scenarios
//!
//! The combination rule end to end: a bundle is accepted only when all four
//! proofs hold, and each defect is reported under its own reason code.

#[cfg(test)]
mod tests {
    use crate::integration::{harness, T0};
    use proof_consensus::domain::{MAX_STAKE_AGE_SECS, MIN_STAKE};
    use proof_consensus::testing::{BundleBuilder, TestNode, FIXTURE_STAKE};
    use proof_consensus::{ConsensusApi, ProofKind, ReasonCode};
    use shared_types::SECS_PER_DAY;

    fn node() -> TestNode {
        TestNode::new("ca-node-1", 1)
    }

    // =============================================================================
    // ACCEPTANCE
    // =============================================================================

    #[tokio::test]
    async fn test_minimum_stake_bundle_is_accepted() {
        let h = harness();
        let node = node();
        h.register(&node, MIN_STAKE, T0 - SECS_PER_DAY);

        let bundle = node.bundle("cert-0001", 1, T0).stake_amount(MIN_STAKE).build();
        let result = h.engine.submit("cert-0001".into(), bundle).await.unwrap();

        assert!(result.accepted, "rejected: {:?}", result.rejection_reasons);
        assert!(result.confidence_score > 0.0 && result.confidence_score <= 1.0);
        assert!(result.block_hash.is_some());
        assert!(result.per_proof_verdicts.iter().all(|v| v.valid));

        let decided = h.events.get_decisions();
        assert_eq!(decided.len(), 1);
        assert!(decided[0].accepted);
        assert_eq!(decided[0].block_hash, result.block_hash);
    }

    #[tokio::test]
    async fn test_stake_below_minimum_is_rejected() {
        let h = harness();
        let node = node();
        h.register(&node, FIXTURE_STAKE, T0 - SECS_PER_DAY);

        let bundle = node.bundle("cert-0002", 1, T0).stake_amount(MIN_STAKE - 1).build();
        let result = h.engine.submit("cert-0002".into(), bundle).await.unwrap();

        assert!(!result.accepted);
        assert_eq!(result.rejection_reasons, vec![ReasonCode::InsufficientStake]);
        assert!(h.engine.get_result("cert-0002").is_none());
    }

    #[tokio::test]
    async fn test_stake_age_boundary() {
        let h = harness();
        let node = node();
        h.register(&node, FIXTURE_STAKE, T0 - MAX_STAKE_AGE_SECS - SECS_PER_DAY);

        let at_limit = node
            .bundle("age-limit", 1, T0)
            .stake_timestamp(T0 - MAX_STAKE_AGE_SECS)
            .build();
        let result = h.engine.submit("age-limit".into(), at_limit).await.unwrap();
        assert!(result.accepted, "rejected: {:?}", result.rejection_reasons);

        // Fresh holder so the accepted stake above does not supersede.
        let other = TestNode::new("ca-node-2", 2);
        h.register(&other, FIXTURE_STAKE, T0 - MAX_STAKE_AGE_SECS - SECS_PER_DAY);
        let past_limit = other
            .bundle("age-past", 1, T0)
            .stake_timestamp(T0 - MAX_STAKE_AGE_SECS - 1)
            .build();
        let result = h.engine.submit("age-past".into(), past_limit).await.unwrap();
        assert_eq!(result.rejection_reasons, vec![ReasonCode::StakeExpired]);
    }

    #[tokio::test]
    async fn test_superseded_stake_is_expired() {
        let h = harness();
        let node = node();
        h.register(&node, FIXTURE_STAKE, T0 - SECS_PER_DAY);

        let newer = node.bundle("op-new", 1, T0).stake_timestamp(T0 - 100).build();
        assert!(h.engine.submit("op-new".into(), newer).await.unwrap().accepted);

        let older = node.bundle("op-old", 2, T0).stake_timestamp(T0 - 200).build();
        let result = h.engine.submit("op-old".into(), older).await.unwrap();
        assert_eq!(result.rejection_reasons, vec![ReasonCode::StakeExpired]);
    }

    // =============================================================================
    // ALL-OR-NOTHING
    // =============================================================================

    #[tokio::test]
    async fn test_any_single_defect_rejects() {
        type Defect = fn(BundleBuilder) -> BundleBuilder;
        let cases: [(&str, Defect, ReasonCode, ProofKind); 10] = [
            ("forged", |b| b.forge_signature(), ReasonCode::SignatureInvalid, ProofKind::Stake),
            ("unbacked", |b| b.stake_amount(FIXTURE_STAKE + 1), ReasonCode::UnbackedStake, ProofKind::Stake),
            ("skew", |b| b.clock_offset_ms(60_001), ReasonCode::ClockSkew, ProofKind::Time),
            ("future", |b| b.proof_timestamp(T0 + 61), ReasonCode::ClockSkew, ProofKind::Time),
            ("stale", |b| b.proof_timestamp(T0 - 3_601), ReasonCode::StaleTimeProof, ProofKind::Time),
            ("tampered-time", |b| b.tamper_time_hash(), ReasonCode::HashMismatch, ProofKind::Time),
            ("overcommit", |b| b.storage(2 << 30, 1 << 30), ReasonCode::CapacityExceeded, ProofKind::Space),
            ("tampered-space", |b| b.tamper_content_hash(), ReasonCode::ContentIntegrityFailure, ProofKind::Space),
            ("hard-target", |b| b.difficulty_target([0u8; 32]), ReasonCode::DifficultyNotMet, ProofKind::Work),
            ("overclaim", |b| b.workload(proof_consensus::domain::WorkloadType::Certificate, 100_001), ReasonCode::ImplausiblePower, ProofKind::Work),
        ];

        let h = harness();
        for (i, (name, defect, reason, kind)) in cases.into_iter().enumerate() {
            // One holder per case keeps violations from piling onto one window.
            let node = TestNode::new(format!("node-{name}"), i as u8 + 10);
            h.register(&node, FIXTURE_STAKE, T0 - SECS_PER_DAY);

            let op = format!("defect-{name}");
            let bundle = defect(node.bundle(&op, 1, T0)).build();
            let result = h.engine.submit(op.clone(), bundle).await.unwrap();

            assert!(!result.accepted, "{name} was accepted");
            assert_eq!(result.rejection_reasons, vec![reason], "{name}");
            let failed: Vec<_> = result
                .per_proof_verdicts
                .iter()
                .filter(|v| !v.valid)
                .map(|v| v.kind)
                .collect();
            assert_eq!(failed, vec![kind], "{name}");
            assert!(h.engine.get_result(&op).is_none());
        }
        assert_eq!(h.engine.stats().rejected, 10);
    }

    #[tokio::test]
    async fn test_time_tolerances_are_inclusive() {
        let h = harness();
        let node = node();
        h.register(&node, FIXTURE_STAKE, T0 - SECS_PER_DAY);

        let edges = [
            node.bundle("edge-1", 1, T0).clock_offset_ms(-60_000),
            node.bundle("edge-2", 2, T0).proof_timestamp(T0 + 60),
            node.bundle("edge-3", 3, T0).proof_timestamp(T0 - 3_600),
        ];
        for (i, builder) in edges.into_iter().enumerate() {
            let op = format!("edge-{}", i + 1);
            let result = h.engine.submit(op, builder.build()).await.unwrap();
            assert!(result.accepted, "edge {} rejected: {:?}", i + 1, result.rejection_reasons);
        }
    }

    // =============================================================================
    // IDEMPOTENCE AND REPLAY
    // =============================================================================

    #[tokio::test]
    async fn test_resubmission_returns_identical_result() {
        let h = harness();
        let node = node();
        h.register(&node, FIXTURE_STAKE, T0 - SECS_PER_DAY);

        let accepted = node.bundle("op-a", 1, T0).build();
        let rejected = node.bundle("op-r", 2, T0).tamper_content_hash().build();
        let first_a = h.engine.submit("op-a".into(), accepted.clone()).await.unwrap();
        let first_r = h.engine.submit("op-r".into(), rejected.clone()).await.unwrap();
        let calls = h.verifier.calls();

        h.clock.advance(120);
        assert_eq!(h.engine.submit("op-a".into(), accepted).await.unwrap(), first_a);
        assert_eq!(h.engine.submit("op-r".into(), rejected).await.unwrap(), first_r);
        assert_eq!(h.verifier.calls(), calls);
    }

    #[tokio::test]
    async fn test_nonce_is_single_use_per_holder() {
        let h = harness();
        let alice = TestNode::new("alice", 1);
        let bob = TestNode::new("bob", 2);
        h.register(&alice, FIXTURE_STAKE, T0 - SECS_PER_DAY);
        h.register(&bob, FIXTURE_STAKE, T0 - SECS_PER_DAY);

        let first = h
            .engine
            .submit("a-1".into(), alice.bundle("a-1", 77, T0).build())
            .await
            .unwrap();
        assert!(first.accepted);

        let replay = h
            .engine
            .submit("a-2".into(), alice.bundle("a-2", 77, T0).build())
            .await
            .unwrap();
        assert_eq!(replay.rejection_reasons, vec![ReasonCode::ReplayedNonce]);

        // Nonces are scoped to the holder.
        let other = h
            .engine
            .submit("b-1".into(), bob.bundle("b-1", 77, T0).build())
            .await
            .unwrap();
        assert!(other.accepted);
    }

    #[tokio::test]
    async fn test_time_proof_is_bound_to_operation() {
        let h = harness();
        let node = node();
        h.register(&node, FIXTURE_STAKE, T0 - SECS_PER_DAY);

        // A proof minted for one operation, submitted under another id.
        let minted = node.bundle("op-minted", 5, T0).consensus_proof();
        let mut stolen = minted.into_bundle();
        stolen.operation_id = "op-stolen".into();

        let result = h.engine.submit("op-stolen".into(), stolen).await.unwrap();
        assert_eq!(result.rejection_reasons, vec![ReasonCode::HashMismatch]);
    }

    #[tokio::test]
    async fn test_recent_results_lists_accepted_history() {
        let h = harness();
        let node = node();
        h.register(&node, FIXTURE_STAKE, T0 - SECS_PER_DAY);

        for i in 0..5u64 {
            h.clock.set(T0 + i);
            let op = format!("hist-{i}");
            let bundle = node.bundle(&op, i, T0 + i).build();
            h.engine.submit(op, bundle).await.unwrap();
        }
        let bad = node.bundle("hist-bad", 99, T0 + 5).tamper_time_hash().build();
        h.engine.submit("hist-bad".into(), bad).await.unwrap();

        let recent = h.engine.recent_results("ca-node-1", 3);
        let ids: Vec<_> = recent.iter().map(|r| r.operation_id.as_str()).collect();
        assert_eq!(ids, vec!["hist-4", "hist-3", "hist-2"]);
        assert!(recent.iter().all(|r| r.accepted));
    }
}
