use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("ring error: {0}")]
    Ring(#[from] updater_ring::RingError),

    #[error("store error: {0}")]
    Store(#[from] updater_store::StoreError),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type DaemonResult<T> = Result<T, DaemonError>;
