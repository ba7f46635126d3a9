use std::path::{Path, PathBuf};

use crate::error::{StoreError, StoreResult};

/// A storage device directory under the devices root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Device {
    /// Directory name, e.g. `sdb1`.
    pub name: String,
    /// Full path, e.g. `/srv/node/sdb1`.
    pub path: PathBuf,
}

/// List the entries of the devices root, sorted by name.
///
/// Every entry is returned; whether it is a usable device is decided by the
/// mount check and by the walker.
pub fn list_devices(root: &Path) -> StoreResult<Vec<Device>> {
    let mut devices = Vec::new();
    for entry in std::fs::read_dir(root).map_err(|e| StoreError::io(root, e))? {
        let entry = entry.map_err(|e| StoreError::io(root, e))?;
        devices.push(Device {
            name: entry.file_name().to_string_lossy().into_owned(),
            path: entry.path(),
        });
    }
    devices.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(devices)
}

/// Returns `true` if `path` is a mount point.
///
/// A directory is a mount point when it lives on a different filesystem
/// than its parent, or is its own parent (`/`). Symlinks never count.
#[cfg(unix)]
pub fn is_mount(path: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    let Ok(meta) = std::fs::symlink_metadata(path) else {
        return false;
    };
    if meta.file_type().is_symlink() || !meta.is_dir() {
        return false;
    }
    let Ok(parent) = std::fs::metadata(path.join("..")) else {
        return false;
    };
    meta.dev() != parent.dev() || meta.ino() == parent.ino()
}

#[cfg(not(unix))]
pub fn is_mount(path: &Path) -> bool {
    path.is_dir()
}
