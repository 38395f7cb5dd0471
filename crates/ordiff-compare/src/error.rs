//! Error types for ordiff-compare

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompareError {
    #[error("network error: {0}")]
    Network(String),

    #[error("indexer API error: {0}")]
    Api(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("operation failed after {attempts} attempts: {last}")]
    RetryExhausted { attempts: u32, last: String },

    #[error("cancelled by shutdown")]
    Cancelled,

    #[error("generic error: {0}")]
    Generic(#[from] anyhow::Error),
}

pub type CompareResult<T> = Result<T, CompareError>;
