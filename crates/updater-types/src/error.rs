use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    #[error("invalid header {name:?}: {reason}")]
    InvalidHeader { name: String, reason: String },
}
