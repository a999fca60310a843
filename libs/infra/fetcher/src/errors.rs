// [libs/infra/fetcher/src/errors.rs]
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("http transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("http status {status} for {url}")]
    UnexpectedStatus { status: u16, url: String },
    #[error("expected content-type {expected}, got {actual:?} for {url}")]
    UnexpectedContentType { expected: &'static str, actual: Option<String>, url: String },
    #[error("stream aborted: throughput below slow-stream threshold for {url}")]
    SlowStream { url: String },
    #[error("local filesystem error: {0}")]
    Io(#[from] std::io::Error),
    #[error("request cancelled by user")]
    Cancelled,
    #[error("max retries ({0}) exhausted")]
    RetriesExhausted(u32),
}

impl FetchError {
    /// Cancellation is the one case that must never be retried, per the
    /// fetcher's contract: it surfaces as a fatal error, not a retry.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, FetchError::Cancelled)
    }
}
