use std::path::PathBuf;

/// Errors from ring loading and lookup.
#[derive(Debug, thiserror::Error)]
pub enum RingError {
    /// The ring file could not be read.
    #[error("cannot read ring {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The ring file is not valid JSON ring data.
    #[error("cannot parse ring {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    /// The ring data is structurally inconsistent.
    #[error("invalid ring: {0}")]
    Invalid(String),

    /// The partition has no assigned devices.
    #[error("no replicas for partition {0}")]
    NoReplicas(u32),

    /// A lock guarding the ring snapshot was poisoned.
    #[error("ring lock poisoned: {0}")]
    Poisoned(String),
}

/// Result alias for ring operations.
pub type RingResult<T> = Result<T, RingError>;
