use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::time::Instant;
use tracing::{error, info, warn};
use updater_client::{HttpReplicaClient, ReplicaClient};
use updater_ring::{FileRing, RingSource};
use updater_store::{is_mount, list_devices, Device};
use updater_types::SweepStats;

use crate::config::UpdaterConfig;
use crate::error::{DaemonError, DaemonResult};
use crate::processor::RecordProcessor;
use crate::walker::DeviceSweeper;

/// Summary of one concurrent sweep. Record counters stay with each device
/// worker and are only logged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Devices whose worker finished.
    pub devices_swept: usize,
    /// Devices passed over by the mount check.
    pub devices_skipped: usize,
    /// Devices whose worker returned an error or panicked.
    pub devices_failed: usize,
    pub elapsed: Duration,
}

/// Sweeps every local device for pending container updates.
pub struct ObjectUpdater {
    config: UpdaterConfig,
    ring: Arc<dyn RingSource>,
    client: Arc<dyn ReplicaClient>,
}

impl ObjectUpdater {
    pub fn new(
        config: UpdaterConfig,
        ring: Arc<dyn RingSource>,
        client: Arc<dyn ReplicaClient>,
    ) -> Self {
        Self {
            config,
            ring,
            client,
        }
    }

    /// Updater with the on-disk ring and the HTTP client from `config`.
    pub fn from_config(config: UpdaterConfig) -> DaemonResult<Self> {
        config.validate()?;
        let ring = Arc::new(FileRing::new(&config.ring_path));
        let client = Arc::new(HttpReplicaClient::new(
            config.conn_timeout(),
            config.node_timeout(),
        ));
        Ok(Self::new(config, ring, client))
    }

    /// Refresh the ring and build the sweeper every device of this sweep
    /// shares.
    fn sweeper(&self) -> DaemonResult<Arc<DeviceSweeper>> {
        let ring = self.ring.reload()?;
        let processor = Arc::new(RecordProcessor::new(ring, self.client.clone()));
        Ok(Arc::new(DeviceSweeper::new(
            processor,
            self.config.slowdown(),
        )))
    }

    /// Devices to sweep, plus how many the mount check skipped.
    fn devices(&self) -> DaemonResult<(Vec<Device>, usize)> {
        let mut skipped = 0;
        let mut devices = Vec::new();
        for device in list_devices(&self.config.devices)? {
            if self.config.mount_check && !is_mount(&device.path) {
                warn!(device = %device.name, "Skipping {} as it is not mounted", device.name);
                skipped += 1;
                continue;
            }
            devices.push(device);
        }
        Ok((devices, skipped))
    }

    /// Run sweeps until the process is stopped.
    ///
    /// The first sweep starts after a random fraction of the interval so
    /// that updaters started together drift apart. A sweep that fails to
    /// start (ring or devices unreadable) is logged and tried again next
    /// interval.
    pub async fn run_forever(&self) {
        let interval = self.config.interval();
        tokio::time::sleep(interval.mul_f64(rand::random::<f64>())).await;
        loop {
            info!("Begin object update sweep");
            let begin = Instant::now();
            match self.sweep_devices().await {
                Ok(report) => info!(
                    devices = report.devices_swept,
                    skipped = report.devices_skipped,
                    failed = report.devices_failed,
                    "Object update sweep completed: {:.02}s",
                    report.elapsed.as_secs_f64()
                ),
                Err(e) => error!(error = %e, "ERROR object update sweep could not start"),
            }
            let elapsed = begin.elapsed();
            if elapsed < interval {
                tokio::time::sleep(interval - elapsed).await;
            }
        }
    }

    /// One sweep with each device in its own task, at most
    /// `concurrency` at a time.
    pub async fn sweep_devices(&self) -> DaemonResult<SweepReport> {
        let begin = Instant::now();
        let sweeper = self.sweeper()?;
        let (devices, skipped) = self.devices()?;
        let slots = Arc::new(Semaphore::new(self.config.concurrency));

        let mut workers = Vec::with_capacity(devices.len());
        for device in devices {
            let permit = slots
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| DaemonError::Internal(e.to_string()))?;
            let sweeper = sweeper.clone();
            let name = device.name.clone();
            let handle = tokio::spawn(async move {
                let _permit = permit;
                match sweeper.sweep(&device.path).await {
                    Ok(stats) => {
                        info!(
                            device = %device.name,
                            successes = stats.successes,
                            failures = stats.failures,
                            "Object update sweep of {} completed: {stats}",
                            device.name
                        );
                        true
                    }
                    Err(e) => {
                        error!(device = %device.name, error = %e, "ERROR object update sweep of device failed");
                        false
                    }
                }
            });
            workers.push((name, handle));
        }

        let mut report = SweepReport {
            devices_skipped: skipped,
            ..SweepReport::default()
        };
        for (name, handle) in workers {
            match handle.await {
                Ok(true) => report.devices_swept += 1,
                Ok(false) => report.devices_failed += 1,
                Err(e) => {
                    error!(device = %name, error = %e, "ERROR device worker died");
                    report.devices_failed += 1;
                }
            }
        }
        report.elapsed = begin.elapsed();
        Ok(report)
    }

    /// One sweep of every device in turn, in the calling task. Meant for
    /// manual runs; returns the counters summed over all devices.
    pub async fn run_once(&self) -> DaemonResult<SweepStats> {
        info!("Begin object update single threaded sweep");
        let begin = Instant::now();
        let sweeper = self.sweeper()?;
        let (devices, _skipped) = self.devices()?;

        let mut total = SweepStats::new();
        for device in devices {
            match sweeper.sweep(&device.path).await {
                Ok(stats) => total.absorb(&stats),
                Err(e) => {
                    error!(device = %device.name, error = %e, "ERROR object update sweep of device failed")
                }
            }
        }
        total.elapsed = begin.elapsed();
        info!(
            successes = total.successes,
            failures = total.failures,
            "Object update single threaded sweep completed: {total}"
        );
        Ok(total)
    }
}
