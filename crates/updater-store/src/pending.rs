use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::debug;
use updater_types::{RecordLocation, UpdateRecord};

use crate::codec::{decode_record, encode_record};
use crate::error::{StoreError, StoreResult};
use crate::layout::{
    bucket_for, record_name, ASYNC_DIR, QUARANTINE_DIR, QUARANTINE_OBJECTS_DIR, TMP_DIR,
};

/// Pending updates on one device.
#[derive(Clone, Debug)]
pub struct PendingStore {
    device: PathBuf,
}

impl PendingStore {
    /// Open the pending layout rooted at a device directory. No I/O happens
    /// until a method needs it.
    pub fn new(device: impl Into<PathBuf>) -> Self {
        Self {
            device: device.into(),
        }
    }

    pub fn device(&self) -> &Path {
        &self.device
    }

    pub fn pending_root(&self) -> PathBuf {
        self.device.join(ASYNC_DIR)
    }

    pub fn quarantine_root(&self) -> PathBuf {
        self.device.join(QUARANTINE_DIR).join(QUARANTINE_OBJECTS_DIR)
    }

    /// Returns `false` if this device has never had a pending update.
    pub fn has_pending_root(&self) -> bool {
        self.pending_root().is_dir()
    }

    /// Bucket directories under the pending root. Stray files are skipped.
    pub fn buckets(&self) -> StoreResult<Vec<PathBuf>> {
        list_dir(&self.pending_root(), |p| p.is_dir())
    }

    /// Record files in a bucket. Anything that is not a regular file is
    /// skipped.
    pub fn records(&self, bucket: &Path) -> StoreResult<Vec<PathBuf>> {
        list_dir(bucket, |p| p.is_file())
    }

    /// Try to remove a bucket. Returns whether it was removed; a bucket a
    /// producer has just written into stays, and that is fine.
    pub fn remove_bucket(&self, bucket: &Path) -> bool {
        match std::fs::remove_dir(bucket) {
            Ok(()) => true,
            Err(e) => {
                debug!(bucket = %bucket.display(), error = %e, "bucket not removed");
                false
            }
        }
    }

    /// Describe a record path found under this device's pending root.
    pub fn locate(&self, path: &Path) -> RecordLocation {
        let bucket = path
            .parent()
            .and_then(Path::file_name)
            .map(|b| b.to_string_lossy().into_owned())
            .unwrap_or_default();
        RecordLocation {
            device: self.device.clone(),
            bucket,
            path: path.to_path_buf(),
        }
    }

    /// Read and decode a record.
    ///
    /// Returns [`StoreError::Vanished`] if the file is gone and
    /// [`StoreError::Malformed`] if it cannot be decoded or validated.
    pub fn load(&self, path: &Path) -> StoreResult<UpdateRecord> {
        let bytes = std::fs::read(path).map_err(|e| StoreError::io(path, e))?;
        decode_record(&bytes).map_err(|reason| StoreError::Malformed {
            path: path.to_path_buf(),
            reason,
        })
    }

    /// Delete a delivered record. Already gone counts as done.
    pub fn retire(&self, path: &Path) -> StoreResult<()> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    /// Move a record into `quarantined/objects/`, keeping its file name.
    ///
    /// If a record with that name is already quarantined, a random suffix is
    /// added so the earlier one is kept. Returns the new location.
    pub fn quarantine(&self, path: &Path) -> StoreResult<PathBuf> {
        let name = path
            .file_name()
            .ok_or_else(|| StoreError::InvalidPath(path.to_path_buf()))?;
        let root = self.quarantine_root();
        std::fs::create_dir_all(&root).map_err(|e| StoreError::io(&root, e))?;

        let mut target = root.join(name);
        if target.exists() {
            target = root.join(format!(
                "{}-{}",
                name.to_string_lossy(),
                uuid::Uuid::new_v4().simple()
            ));
        }
        std::fs::rename(path, &target).map_err(|e| StoreError::io(path, e))?;
        Ok(target)
    }

    /// Write a new pending record and return its path.
    ///
    /// The record is staged in the device's `tmp/` directory and renamed into
    /// its bucket, so the walker never sees a partial file.
    pub fn persist(&self, record: &UpdateRecord, at: SystemTime) -> StoreResult<PathBuf> {
        let bytes = encode_record(record)?;
        let path = record.object_path();

        let tmp_dir = self.device.join(TMP_DIR);
        std::fs::create_dir_all(&tmp_dir).map_err(|e| StoreError::io(&tmp_dir, e))?;
        let bucket = self.pending_root().join(bucket_for(&path));
        std::fs::create_dir_all(&bucket).map_err(|e| StoreError::io(&bucket, e))?;

        let mut tmp =
            tempfile::NamedTempFile::new_in(&tmp_dir).map_err(|e| StoreError::io(&tmp_dir, e))?;
        tmp.write_all(&bytes)
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| StoreError::io(tmp.path(), e))?;

        let target = bucket.join(record_name(&path, at));
        tmp.persist(&target)
            .map_err(|e| StoreError::io(&target, e.error))?;
        debug!(record = %target.display(), object = %path, "persisted pending update");
        Ok(target)
    }
}

fn list_dir(dir: &Path, keep: impl Fn(&Path) -> bool) -> StoreResult<Vec<PathBuf>> {
    let mut out = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| StoreError::io(dir, e))? {
        let path = entry.map_err(|e| StoreError::io(dir, e))?.path();
        if keep(&path) {
            out.push(path);
        }
    }
    Ok(out)
}
