//! # Byzantine Behaviour
//!
//! Rolling-window quarantine: a node whose rejection rate crosses the
//! threshold stops being validated until its cooldown passes.

#[cfg(test)]
mod tests {
    use crate::integration::{harness, T0};
    use proof_consensus::events::QuarantineOrigin;
    use proof_consensus::testing::{TestNode, FIXTURE_STAKE};
    use proof_consensus::{AdminApi, ConsensusApi, ReasonCode};
    use shared_types::SECS_PER_DAY;
    use std::time::Duration;

    const COOLDOWN: u64 = 15 * 60;

    /// 25 honest operations followed by 15 with tampered space proofs.
    async fn misbehave(h: &crate::integration::Harness, node: &TestNode) -> Vec<bool> {
        let mut accepted = Vec::new();
        for i in 0..40u64 {
            let op = format!("{}-op-{i}", node.id);
            let builder = node.bundle(&op, i, T0);
            let bundle = if i < 25 {
                builder.build()
            } else {
                builder.tamper_content_hash().build()
            };
            let result = h.engine.submit(op, bundle).await.unwrap();
            accepted.push(result.accepted);
        }
        accepted
    }

    #[tokio::test]
    async fn test_sustained_forgery_quarantines_node() {
        let h = harness();
        let node = TestNode::new("mallory", 66);
        h.register(&node, FIXTURE_STAKE, T0 - SECS_PER_DAY);

        let accepted = misbehave(&h, &node).await;
        assert!(accepted[..25].iter().all(|a| *a));
        assert!(accepted[25..].iter().all(|a| !*a));

        // 13 rejections in 38 verdicts is the first rate above 0.34.
        let status = h.engine.get_node_status("mallory").unwrap();
        assert!(status.quarantined);
        assert_eq!(status.quarantined_until, Some(T0 + COOLDOWN));
        assert_eq!(status.violation_count, 13);
        assert_eq!(h.verifier.calls(), 38);

        let quarantines = h.events.get_quarantines();
        assert_eq!(quarantines.len(), 1);
        assert_eq!(quarantines[0].origin, QuarantineOrigin::Detector);

        // Even a valid bundle is refused without validation.
        let result = h
            .engine
            .submit("mallory-op-40".into(), node.bundle("mallory-op-40", 40, T0).build())
            .await
            .unwrap();
        assert_eq!(result.rejection_reasons, vec![ReasonCode::NodeQuarantined]);
        assert!(result.per_proof_verdicts.is_empty());
        assert_eq!(h.verifier.calls(), 38);
        assert_eq!(h.engine.stats().quarantines, 1);
    }

    #[tokio::test]
    async fn test_quarantine_expires_after_cooldown() {
        let h = harness();
        let node = TestNode::new("mallory", 66);
        h.register(&node, FIXTURE_STAKE, T0 - SECS_PER_DAY);
        misbehave(&h, &node).await;

        h.clock.advance(COOLDOWN - 1);
        let now = T0 + COOLDOWN - 1;
        let early = h
            .engine
            .submit("retry-1".into(), node.bundle("retry-1", 100, now).build())
            .await
            .unwrap();
        assert_eq!(early.rejection_reasons, vec![ReasonCode::NodeQuarantined]);

        h.clock.advance(1);
        let now = T0 + COOLDOWN;
        let released = h
            .engine
            .submit("retry-2".into(), node.bundle("retry-2", 101, now).build())
            .await
            .unwrap();
        assert!(released.accepted, "rejected: {:?}", released.rejection_reasons);

        let status = h.engine.get_node_status("mallory").unwrap();
        assert!(!status.quarantined);
        assert_eq!(status.quarantined_until, None);
    }

    #[tokio::test]
    async fn test_quarantine_is_per_node() {
        let h = harness();
        let mallory = TestNode::new("mallory", 66);
        let honest = TestNode::new("honest", 67);
        h.register(&mallory, FIXTURE_STAKE, T0 - SECS_PER_DAY);
        h.register(&honest, FIXTURE_STAKE, T0 - SECS_PER_DAY);

        misbehave(&h, &mallory).await;

        let result = h
            .engine
            .submit("honest-1".into(), honest.bundle("honest-1", 1, T0).build())
            .await
            .unwrap();
        assert!(result.accepted);
        let status = h.engine.get_node_status("honest").unwrap();
        assert!(!status.quarantined);
        assert_eq!(status.violation_count, 0);
    }

    #[tokio::test]
    async fn test_occasional_failures_stay_below_threshold() {
        let h = harness();
        let node = TestNode::new("flaky", 68);
        h.register(&node, FIXTURE_STAKE, T0 - SECS_PER_DAY);

        // One failure in four keeps the rate at 0.25.
        for i in 0..60u64 {
            let op = format!("flaky-{i}");
            let builder = node.bundle(&op, i, T0);
            let bundle = if i % 4 == 3 {
                builder.tamper_time_hash().build()
            } else {
                builder.build()
            };
            h.engine.submit(op, bundle).await.unwrap();
        }

        let status = h.engine.get_node_status("flaky").unwrap();
        assert!(!status.quarantined);
        assert_eq!(status.violation_count, 15);
        assert!(h.events.get_quarantines().is_empty());
    }

    #[tokio::test]
    async fn test_forced_quarantine_refuses_then_lift_restores() {
        let h = harness();
        let node = TestNode::new("suspect", 69);
        h.register(&node, FIXTURE_STAKE, T0 - SECS_PER_DAY);

        let status = h.engine.force_quarantine("suspect", Duration::from_secs(3_600));
        assert!(status.quarantined);

        let refused = h
            .engine
            .submit("s-1".into(), node.bundle("s-1", 1, T0).build())
            .await
            .unwrap();
        assert_eq!(refused.rejection_reasons, vec![ReasonCode::NodeQuarantined]);
        // Refusals do not count against the node.
        assert_eq!(h.engine.get_node_status("suspect").unwrap().violation_count, 0);

        h.engine.lift_quarantine("suspect").unwrap();
        let accepted = h
            .engine
            .submit("s-1".into(), node.bundle("s-1", 1, T0).build())
            .await
            .unwrap();
        assert!(accepted.accepted);
        assert_eq!(h.engine.audit_trail().len(), 2);
    }

    #[tokio::test]
    async fn test_impersonation_cannot_quarantine_an_honest_node() {
        let h = harness();
        let honest = TestNode::new("victim", 70);
        h.register(&honest, FIXTURE_STAKE, T0 - SECS_PER_DAY);
        let impostor = TestNode::new("victim", 71);

        for i in 0..40u64 {
            let op = format!("spoof-{i}");
            let bundle = impostor.bundle(&op, i, T0).tamper_content_hash().build();
            let result = h.engine.submit(op, bundle).await.unwrap();
            assert!(!result.accepted);
        }

        let status = h.engine.get_node_status("victim").unwrap();
        assert!(!status.quarantined);
        assert_eq!(status.violation_count, 0);
        assert!(h.events.get_quarantines().is_empty());
        assert!(h.journal.is_empty());

        let result = h
            .engine
            .submit("real-1".into(), honest.bundle("real-1", 1, T0).build())
            .await
            .unwrap();
        assert!(result.accepted, "rejected: {:?}", result.rejection_reasons);
    }
}
