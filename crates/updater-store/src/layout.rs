//! Directory names and naming rules for the pending layout.

use std::time::{SystemTime, UNIX_EPOCH};

use updater_types::ObjectPath;

/// Per-device directory holding pending record buckets.
pub const ASYNC_DIR: &str = "async_pending";
/// Per-device quarantine root.
pub const QUARANTINE_DIR: &str = "quarantined";
/// Subdirectory of [`QUARANTINE_DIR`] for object-side records.
pub const QUARANTINE_OBJECTS_DIR: &str = "objects";
/// Per-device scratch directory for in-progress writes.
pub const TMP_DIR: &str = "tmp";

/// Length of a bucket name, in hex characters.
pub const BUCKET_LEN: usize = 3;

/// Bucket for an object: the last [`BUCKET_LEN`] hex characters of its
/// path hash. Spreads records over at most 4096 directories per device.
pub fn bucket_for(path: &ObjectPath) -> String {
    let hash = path.hash_hex();
    hash[hash.len() - BUCKET_LEN..].to_string()
}

/// Unique record file name: `<path hash>-<seconds>.<micros>`.
pub fn record_name(path: &ObjectPath, at: SystemTime) -> String {
    let since = at.duration_since(UNIX_EPOCH).unwrap_or_default();
    format!(
        "{}-{}.{:06}",
        path.hash_hex(),
        since.as_secs(),
        since.subsec_micros()
    )
}
