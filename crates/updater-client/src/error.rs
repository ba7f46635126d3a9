use std::time::Duration;

use thiserror::Error;

/// Reasons a delivery attempt produced no status.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("connect timed out after {0:?}")]
    ConnectTimeout(Duration),

    #[error("no response within {0:?}")]
    ResponseTimeout(Duration),

    #[error("connection error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] hyper::Error),

    #[error("invalid request: {0}")]
    Request(#[from] ::http::Error),
}

pub type ClientResult<T> = Result<T, ClientError>;
