use thiserror::Error;

/// Rejections raised before any provider work starts.
#[derive(Debug, Error, PartialEq)]
pub enum BenchmarkError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Unsupported chain: {0}")]
    UnsupportedChain(String),
}
