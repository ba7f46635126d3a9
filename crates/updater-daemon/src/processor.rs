use std::path::Path;
use std::sync::Arc;

use tracing::{debug, error, warn};
use updater_client::ReplicaClient;
use updater_ring::RingResolver;
use updater_store::{PendingStore, StoreError};
use updater_types::{is_acceptable, SweepStats};

/// What happened to one record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Every replica accepted; the record was deleted.
    Retired,
    /// At least one replica refused, or the container could not be placed.
    /// The record stays for the next sweep.
    Retained,
    /// The record could not be decoded and was moved to quarantine.
    Quarantined,
    /// The record could not be decoded and could not be moved either.
    Unreadable,
    /// The record was already gone.
    Vanished,
}

/// Delivers single pending records to every replica of their container.
pub struct RecordProcessor {
    ring: Arc<dyn RingResolver>,
    client: Arc<dyn ReplicaClient>,
}

impl RecordProcessor {
    /// `ring` is the snapshot for the current sweep.
    pub fn new(ring: Arc<dyn RingResolver>, client: Arc<dyn ReplicaClient>) -> Self {
        Self { ring, client }
    }

    /// Process the record at `path` on the device behind `store`.
    ///
    /// Increments `stats.successes` when the record is retired and
    /// `stats.failures` when it is kept. Quarantine and vanished records
    /// leave the counters alone.
    pub async fn process_record(
        &self,
        store: &PendingStore,
        path: &Path,
        stats: &mut SweepStats,
    ) -> RecordOutcome {
        let record = match store.load(path) {
            Ok(record) => record,
            Err(StoreError::Vanished(_)) => {
                debug!(record = %path.display(), "pending update already gone");
                return RecordOutcome::Vanished;
            }
            Err(e) => {
                let at = store.locate(path);
                error!(
                    device = %at.device.display(),
                    bucket = %at.bucket,
                    record = %at.path.display(),
                    error = %e,
                    "ERROR problem loading pending update, quarantining"
                );
                return match store.quarantine(path) {
                    Ok(dest) => {
                        warn!(record = %at.path.display(), quarantined = %dest.display(), "pending update quarantined");
                        RecordOutcome::Quarantined
                    }
                    Err(e) => {
                        error!(device = %at.device.display(), record = %at.path.display(), error = %e, "ERROR could not quarantine pending update");
                        RecordOutcome::Unreadable
                    }
                };
            }
        };

        let obj = record.object_path();
        let placement = match self.ring.get_nodes(&record.account, &record.container) {
            Ok(placement) => placement,
            Err(e) => {
                error!(object = %obj, error = %e, "ERROR no replicas for container");
                stats.record_failure();
                return RecordOutcome::Retained;
            }
        };

        let mut success = true;
        for node in &placement.nodes {
            let status = self
                .client
                .deliver(node, placement.partition, record.op, &obj, &record.headers)
                .await;
            if !is_acceptable(status) {
                debug!(object = %obj, node = %node, status, "replica refused update");
                success = false;
            }
        }

        if !success {
            stats.record_failure();
            debug!(object = %obj, record = %path.display(), "Update failed");
            return RecordOutcome::Retained;
        }

        match store.retire(path) {
            Ok(()) => {
                stats.record_success();
                debug!(object = %obj, record = %path.display(), "Update sent");
                RecordOutcome::Retired
            }
            Err(e) => {
                error!(record = %path.display(), error = %e, "ERROR update sent but record not removed");
                stats.record_failure();
                RecordOutcome::Retained
            }
        }
    }
}
