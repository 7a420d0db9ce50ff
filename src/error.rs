// src/error.rs
//! Error types for the record store and the fetch seam.

use thiserror::Error;

/// Record store failures. Write-side errors are surfaced to the caller;
/// read-side errors during dedup are absorbed by the store (fail-open).
#[derive(Error, Debug)]
pub enum StoreError {
    /// File system error (open, append, flush)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV encoding/decoding error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Errors a `ReviewSource` may report. "No data" is `Ok(vec![])`, not an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Retryable (timeouts, rate limits, flaky upstream)
    #[error("transient fetch failure: {0}")]
    Transient(String),

    /// Not retryable (missing key, malformed source config)
    #[error("fatal fetch configuration error: {0}")]
    Fatal(String),
}

impl FetchError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Transient(_))
    }
}
