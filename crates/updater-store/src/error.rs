use std::path::PathBuf;

/// Errors from pending-record storage.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The record disappeared before it could be read.
    #[error("record vanished: {0}")]
    Vanished(PathBuf),

    /// The record cannot be decoded or fails validation. It must be
    /// quarantined, never retried.
    #[error("malformed record {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },

    /// Encoding a record for persistence failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A record file name could not be derived.
    #[error("invalid record path: {0}")]
    InvalidPath(PathBuf),

    /// I/O error from the filesystem.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            return Self::Vanished(path.into());
        }
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
