use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::time::SystemTime;

use tracing::{info, warn};

use crate::data::RingData;
use crate::error::{RingError, RingResult};
use crate::traits::{RingResolver, RingSource};

struct Loaded {
    data: Arc<RingData>,
    mtime: Option<SystemTime>,
}

/// Ring backed by a JSON file.
///
/// Nothing is read until the first [`RingSource::reload`], and that first
/// load must succeed. Later reloads re-read the file only when its
/// modification time has changed. If the file has since been removed or no
/// longer parses, the last good ring keeps being served.
pub struct FileRing {
    path: PathBuf,
    loaded: RwLock<Option<Loaded>>,
}

impl FileRing {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            loaded: RwLock::new(None),
        }
    }

    fn read_file(&self) -> RingResult<(RingData, Option<SystemTime>)> {
        let read_err = |source| RingError::Read {
            path: self.path.clone(),
            source,
        };
        let mtime = std::fs::metadata(&self.path)
            .map_err(read_err)?
            .modified()
            .ok();
        let bytes = std::fs::read(&self.path).map_err(read_err)?;
        let data = RingData::from_json(&bytes, &self.path)?;
        Ok((data, mtime))
    }
}

impl RingSource for FileRing {
    fn reload(&self) -> RingResult<Arc<dyn RingResolver>> {
        let current_mtime = std::fs::metadata(&self.path)
            .ok()
            .and_then(|m| m.modified().ok());

        {
            let guard = self
                .loaded
                .read()
                .map_err(|e| RingError::Poisoned(e.to_string()))?;
            if let Some(loaded) = guard.as_ref() {
                if current_mtime.is_none() || loaded.mtime == current_mtime {
                    return Ok(loaded.data.clone());
                }
            }
        }

        let mut guard = self
            .loaded
            .write()
            .map_err(|e| RingError::Poisoned(e.to_string()))?;
        let (data, mtime) = match (self.read_file(), guard.as_ref()) {
            (Ok(read), _) => read,
            (Err(e), None) => return Err(e),
            (Err(e), Some(loaded)) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "container ring changed but cannot be loaded; keeping previous ring"
                );
                return Ok(loaded.data.clone());
            }
        };
        if guard.is_some() {
            info!(
                path = %self.path.display(),
                partitions = data.partition_count(),
                replicas = data.replica_count(),
                "container ring changed on disk; reloaded"
            );
        }
        let data = Arc::new(data);
        *guard = Some(Loaded {
            data: data.clone(),
            mtime,
        });
        Ok(data)
    }
}
