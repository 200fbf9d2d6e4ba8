//! # Persistence
//!
//! Decisions written to the file journal survive a restart; torn tails are
//! cut on open; retention sweeps drop old history from memory and disk.

#[cfg(test)]
mod tests {
    use crate::integration::{harness_with, Harness, T0};
    use proof_consensus::testing::{TestNode, FIXTURE_STAKE};
    use proof_consensus::{ConsensusApi, ConsensusConfig, FileJournal, ReasonCode, RecordJournal};
    use shared_types::SECS_PER_DAY;
    use std::io::Write;
    use std::path::Path;
    use std::sync::Arc;

    fn open(path: &Path, now: u64) -> Harness<FileJournal> {
        let journal = Arc::new(FileJournal::open(path).unwrap());
        let h = harness_with(journal, ConsensusConfig::default(), now);
        h.register(&node(), FIXTURE_STAKE, T0 - SECS_PER_DAY);
        h
    }

    fn node() -> TestNode {
        TestNode::new("archivist", 21)
    }

    async fn decide_some(h: &Harness<FileJournal>) {
        let node = node();
        for i in 0..3u64 {
            let op = format!("keep-{i}");
            let bundle = node.bundle(&op, i, T0).build();
            assert!(h.engine.submit(op, bundle).await.unwrap().accepted);
        }
        let bad = node.bundle("bad-0", 9, T0).tamper_time_hash().build();
        assert!(!h.engine.submit("bad-0".into(), bad).await.unwrap().accepted);
    }

    #[tokio::test]
    async fn test_restart_restores_index_and_rejections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("decisions.journal");

        let before = {
            let h = open(&path, T0);
            decide_some(&h).await;
            h.engine.get_result("keep-1").unwrap()
        };

        let h = open(&path, T0 + 10);
        let summary = h.engine.restore().unwrap();
        assert_eq!(summary.accepted, 3);
        assert_eq!(summary.rejected, 1);
        assert_eq!(summary.expired, 0);
        assert_eq!(summary.conflicts, 0);

        assert_eq!(h.engine.get_result("keep-1").unwrap(), before);
        assert_eq!(h.engine.recent_results("archivist", 10).len(), 3);

        // Rejected decisions are still answered idempotently.
        let node = node();
        let bad = node.bundle("bad-0", 9, T0).tamper_time_hash().build();
        let again = h.engine.submit("bad-0".into(), bad).await.unwrap();
        assert_eq!(again.rejection_reasons, vec![ReasonCode::HashMismatch]);
        assert_eq!(again.decided_at, T0);

        // Nonce history is restored with the index.
        let replay = node.bundle("keep-new", 1, T0 + 10).build();
        let result = h.engine.submit("keep-new".into(), replay).await.unwrap();
        assert_eq!(result.rejection_reasons, vec![ReasonCode::ReplayedNonce]);
    }

    #[tokio::test]
    async fn test_torn_tail_is_discarded_on_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("decisions.journal");
        {
            let h = open(&path, T0);
            decide_some(&h).await;
        }
        let intact_len = std::fs::metadata(&path).unwrap().len();

        // A frame header promising more bytes than were written.
        let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(&[0x40, 0, 0, 0, 0xde, 0xad]).unwrap();
        drop(file);

        let h = open(&path, T0 + 1);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), intact_len);
        let summary = h.engine.restore().unwrap();
        assert_eq!(summary.accepted + summary.rejected, 4);

        // New decisions append cleanly after the cut.
        let bundle = node().bundle("after-cut", 50, T0 + 1).build();
        assert!(h.engine.submit("after-cut".into(), bundle).await.unwrap().accepted);
        assert_eq!(h.journal.load().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_retention_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("decisions.journal");
        let retention = ConsensusConfig::default().index.retention_secs;
        {
            let h = open(&path, T0);
            decide_some(&h).await;

            h.clock.set(T0 + retention + 1);
            let report = h.engine.run_retention().unwrap();
            assert_eq!(report.evicted.len(), 3);
            assert_eq!(report.compacted, 4);
            assert!(h.engine.get_result("keep-0").is_none());
        }

        let h = open(&path, T0 + retention + 1);
        assert!(h.journal.load().unwrap().is_empty());
        let summary = h.engine.restore().unwrap();
        assert_eq!(summary.accepted, 0);
        assert!(h.engine.recent_results("archivist", 10).is_empty());
    }

    #[tokio::test]
    async fn test_restore_skips_records_past_retention() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("decisions.journal");
        let retention = ConsensusConfig::default().index.retention_secs;
        {
            let h = open(&path, T0);
            decide_some(&h).await;
        }

        let h = open(&path, T0 + retention + 1);
        let summary = h.engine.restore().unwrap();
        assert_eq!(summary.expired, 4);
        assert_eq!(summary.accepted, 0);
        assert!(h.engine.get_result("keep-2").is_none());
    }
}
