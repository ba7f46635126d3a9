use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::warn;
use updater_store::PendingStore;
use updater_types::SweepStats;

use crate::error::DaemonResult;
use crate::processor::RecordProcessor;

/// Walks one device's pending records, bucket by bucket.
pub struct DeviceSweeper {
    processor: Arc<RecordProcessor>,
    slowdown: Duration,
}

impl DeviceSweeper {
    pub fn new(processor: Arc<RecordProcessor>, slowdown: Duration) -> Self {
        Self {
            processor,
            slowdown,
        }
    }

    /// Sweep a device and return its session counters.
    ///
    /// A device without a pending root has nothing to do. Failing to list
    /// the pending root aborts the device; failing to list one bucket only
    /// skips that bucket.
    pub async fn sweep(&self, device: &Path) -> DaemonResult<SweepStats> {
        let begin = Instant::now();
        let mut stats = SweepStats::new();
        let store = PendingStore::new(device);

        if store.has_pending_root() {
            for bucket in store.buckets()? {
                let records = match store.records(&bucket) {
                    Ok(records) => records,
                    Err(e) => {
                        warn!(bucket = %bucket.display(), error = %e, "cannot list bucket; skipping");
                        continue;
                    }
                };
                for record in records {
                    self.processor
                        .process_record(&store, &record, &mut stats)
                        .await;
                    if !self.slowdown.is_zero() {
                        tokio::time::sleep(self.slowdown).await;
                    }
                }
                store.remove_bucket(&bucket);
            }
        }

        stats.elapsed = begin.elapsed();
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{pending_store, persist, ring_of, ScriptedClient};
    use updater_ring::RingSource;
    use updater_types::SYNTHETIC_FAILURE_STATUS;

    fn sweeper(replicas: usize, client: Arc<ScriptedClient>, slowdown: Duration) -> DeviceSweeper {
        let ring = ring_of(replicas).reload().unwrap();
        DeviceSweeper::new(Arc::new(RecordProcessor::new(ring, client)), slowdown)
    }

    #[tokio::test]
    async fn device_without_pending_root_is_untouched() {
        let (_dir, store) = pending_store();
        let client = Arc::new(ScriptedClient::always(204));
        let stats = sweeper(2, client.clone(), Duration::ZERO)
            .sweep(store.device())
            .await
            .unwrap();
        assert_eq!((stats.successes, stats.failures), (0, 0));
        assert!(client.calls().is_empty());
        assert!(!store.has_pending_root());
    }

    #[tokio::test]
    async fn delivered_record_and_empty_bucket_are_removed() {
        let (_dir, store) = pending_store();
        let path = persist(&store, "o");
        let bucket = path.parent().unwrap().to_path_buf();
        let client = Arc::new(ScriptedClient::always(204));

        let stats = sweeper(2, client.clone(), Duration::ZERO)
            .sweep(store.device())
            .await
            .unwrap();

        assert_eq!(stats.successes, 1);
        assert_eq!(stats.failures, 0);
        assert!(!path.exists());
        assert!(!bucket.exists());
        assert!(store.has_pending_root());
        assert_eq!(client.calls().len(), 2);
    }

    #[tokio::test]
    async fn timed_out_replica_keeps_record_and_bucket() {
        let (_dir, store) = pending_store();
        let path = persist(&store, "o");
        let client = Arc::new(ScriptedClient::per_node(&[(1, SYNTHETIC_FAILURE_STATUS)]));
        let sweeper = sweeper(2, client.clone(), Duration::ZERO);

        let stats = sweeper.sweep(store.device()).await.unwrap();
        assert_eq!(stats.failures, 1);
        assert_eq!(stats.successes, 0);
        assert!(path.exists());

        // Next sweep retries both replicas.
        client.clear_overrides();
        let stats = sweeper.sweep(store.device()).await.unwrap();
        assert_eq!(stats.successes, 1);
        assert!(!path.exists());
        let nodes: Vec<u32> = client.calls().iter().map(|c| c.node).collect();
        assert_eq!(nodes, vec![0, 1, 0, 1]);
    }

    #[tokio::test]
    async fn corrupt_record_goes_to_quarantine() {
        let (_dir, store) = pending_store();
        let bucket = store.pending_root().join("b02");
        std::fs::create_dir_all(&bucket).unwrap();
        std::fs::write(bucket.join("bad-1"), b"not a record").unwrap();
        let client = Arc::new(ScriptedClient::always(204));

        let stats = sweeper(2, client.clone(), Duration::ZERO)
            .sweep(store.device())
            .await
            .unwrap();

        assert_eq!((stats.successes, stats.failures), (0, 0));
        assert!(store.quarantine_root().join("bad-1").exists());
        assert!(!bucket.exists());
        assert!(client.calls().is_empty());

        // Nothing left for a second pass.
        sweeper(2, client.clone(), Duration::ZERO)
            .sweep(store.device())
            .await
            .unwrap();
        assert!(store.quarantine_root().join("bad-1").exists());
        assert_eq!(std::fs::read_dir(store.quarantine_root()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn stray_entries_are_ignored() {
        let (_dir, store) = pending_store();
        let path = persist(&store, "o");
        std::fs::write(store.pending_root().join("not-a-bucket"), b"x").unwrap();
        std::fs::create_dir(path.parent().unwrap().join("not-a-record")).unwrap();
        let client = Arc::new(ScriptedClient::always(204));

        let stats = sweeper(1, client, Duration::ZERO)
            .sweep(store.device())
            .await
            .unwrap();
        assert_eq!(stats.successes, 1);
        assert!(store.pending_root().join("not-a-bucket").exists());
        // Bucket still holds the directory, so it stays.
        assert!(path.parent().unwrap().exists());
    }

    #[tokio::test]
    async fn many_records_across_buckets() {
        let (_dir, store) = pending_store();
        let paths: Vec<_> = (0..10).map(|i| persist(&store, &format!("obj-{i}"))).collect();
        let client = Arc::new(ScriptedClient::always(201));

        let stats = sweeper(3, client.clone(), Duration::ZERO)
            .sweep(store.device())
            .await
            .unwrap();
        assert_eq!(stats.successes, 10);
        assert!(paths.iter().all(|p| !p.exists()));
        assert_eq!(client.calls().len(), 30);
        assert_eq!(std::fs::read_dir(store.pending_root()).unwrap().count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn slowdown_is_applied_after_each_record() {
        let (_dir, store) = pending_store();
        for i in 0..3 {
            persist(&store, &format!("obj-{i}"));
        }
        let client = Arc::new(ScriptedClient::always(204));
        let sweeper = sweeper(1, client, Duration::from_secs(1));

        let begin = tokio::time::Instant::now();
        let stats = sweeper.sweep(store.device()).await.unwrap();
        assert_eq!(stats.successes, 3);
        assert!(begin.elapsed() >= Duration::from_secs(3));
    }
}
