use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DaemonError, DaemonResult};

/// Updater settings, read from a TOML file.
/// Every key is optional.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdaterConfig {
    /// Directory holding one subdirectory per storage device.
    pub devices: PathBuf,
    /// Skip devices that are not mount points.
    pub mount_check: bool,
    /// JSON container ring.
    pub ring_path: PathBuf,
    /// Minimum time between the starts of two sweeps.
    pub interval_secs: u64,
    /// Devices swept at the same time.
    pub concurrency: usize,
    /// Pause after each record.
    pub slowdown_secs: f64,
    /// Limit for connecting to a replica.
    pub conn_timeout_secs: f64,
    /// Limit for a replica's response once connected.
    pub node_timeout_secs: f64,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            devices: PathBuf::from("/srv/node"),
            mount_check: true,
            ring_path: PathBuf::from("/etc/object-updater/container.ring.json"),
            interval_secs: 300,
            concurrency: 1,
            slowdown_secs: 0.01,
            conn_timeout_secs: 0.5,
            node_timeout_secs: 10.0,
        }
    }
}

impl UpdaterConfig {
    /// Read and validate a TOML config file.
    pub fn load(path: &Path) -> DaemonResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| DaemonError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> DaemonResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| DaemonError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> DaemonResult<()> {
        if self.concurrency == 0 {
            return Err(DaemonError::Config("concurrency must be at least 1".into()));
        }
        if self.interval_secs == 0 {
            return Err(DaemonError::Config("interval_secs must be at least 1".into()));
        }
        for (name, value) in [
            ("slowdown_secs", self.slowdown_secs),
            ("conn_timeout_secs", self.conn_timeout_secs),
            ("node_timeout_secs", self.node_timeout_secs),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(DaemonError::Config(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn slowdown(&self) -> Duration {
        secs(self.slowdown_secs)
    }

    pub fn conn_timeout(&self) -> Duration {
        secs(self.conn_timeout_secs)
    }

    pub fn node_timeout(&self) -> Duration {
        secs(self.node_timeout_secs)
    }
}

fn secs(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or_default()
}
