//! # Hostile Input
//!
//! Arbitrary wire bytes and malformed bundles are rejected without
//! touching validation, the journal or the detector.

#[cfg(test)]
mod tests {
    use crate::integration::{harness, T0};
    use proof_consensus::domain::{encode_bundle, Proof, ProofBundle};
    use proof_consensus::testing::{TestNode, FIXTURE_STAKE};
    use proof_consensus::{ConsensusApi, ProofKind, ReasonCode};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use shared_types::SECS_PER_DAY;

    fn fast_rejection(reasons: &[ReasonCode]) -> bool {
        reasons.len() == 1 && reasons[0].is_fast_path()
    }

    #[tokio::test]
    async fn test_random_bytes_are_never_accepted() {
        let h = harness();
        let mut rng = StdRng::seed_from_u64(0x5eed);

        for i in 0..500 {
            let len = rng.gen_range(0..512);
            let bytes: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
            let result = h
                .engine
                .submit_encoded(format!("noise-{i}"), &bytes)
                .await
                .unwrap();
            assert!(!result.accepted);
            assert!(fast_rejection(&result.rejection_reasons), "{:?}", result.rejection_reasons);
        }
        assert_eq!(h.verifier.calls(), 0);
        assert!(h.journal.is_empty());
        assert_eq!(h.events.event_count(), 0);
    }

    #[tokio::test]
    async fn test_truncated_encodings_are_malformed() {
        let h = harness();
        let node = TestNode::new("wire", 3);
        h.register(&node, FIXTURE_STAKE, T0 - SECS_PER_DAY);

        let encoded = encode_bundle(&node.bundle("wire-op", 1, T0).build()).unwrap();
        for cut in (0..encoded.len()).step_by(7) {
            let result = h
                .engine
                .submit_encoded("wire-op".into(), &encoded[..cut])
                .await
                .unwrap();
            assert_eq!(result.rejection_reasons, vec![ReasonCode::MalformedBundle]);
        }

        // The id was never consumed by the malformed attempts.
        let result = h.engine.submit_encoded("wire-op".into(), &encoded).await.unwrap();
        assert!(result.accepted, "rejected: {:?}", result.rejection_reasons);
    }

    #[tokio::test]
    async fn test_shape_defects_are_fast_rejections() {
        let h = harness();
        let node = TestNode::new("shape", 4);
        h.register(&node, FIXTURE_STAKE, T0 - SECS_PER_DAY);

        let builder = node.bundle("shape-op", 1, T0);

        let missing = builder.clone().without(ProofKind::Work).build();
        let result = h.engine.submit("shape-op".into(), missing).await.unwrap();
        assert_eq!(result.rejection_reasons, vec![ReasonCode::IncompleteBundle]);

        let doubled = ProofBundle::new("shape-op")
            .with(Proof::Stake(builder.stake_proof()))
            .with(Proof::Stake(builder.stake_proof()))
            .with(Proof::Time(builder.time_proof()))
            .with(Proof::Space(builder.space_proof()))
            .with(Proof::Work(builder.work_proof()));
        let result = h.engine.submit("shape-op".into(), doubled).await.unwrap();
        assert_eq!(result.rejection_reasons, vec![ReasonCode::MalformedBundle]);

        let mislabelled = node.bundle("other-op", 1, T0).build();
        let result = h.engine.submit("shape-op".into(), mislabelled).await.unwrap();
        assert_eq!(result.rejection_reasons, vec![ReasonCode::MalformedBundle]);

        let empty = ProofBundle::new("shape-op");
        let result = h.engine.submit("shape-op".into(), empty).await.unwrap();
        assert_eq!(result.rejection_reasons, vec![ReasonCode::IncompleteBundle]);

        assert_eq!(h.verifier.calls(), 0);
        assert_eq!(h.engine.get_node_status("shape").unwrap().violation_count, 0);
        assert!(h.journal.is_empty());
    }
}
