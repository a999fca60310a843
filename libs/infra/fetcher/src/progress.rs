// [libs/infra/fetcher/src/progress.rs]
//! Narrow sink the fetcher credits while it streams a file to disk and
//! reverses if the stream fails partway through, so a failed download never
//! leaves the UI's byte counter ahead of what is actually on disk.

pub trait ProgressSink: Send + Sync {
    fn credit(&self, bytes: u64);
    fn reverse(&self, bytes: u64);
}

/// No-op sink for callers that do not track byte-level progress (tests,
/// one-off requests like version checks).
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn credit(&self, _bytes: u64) {}
    fn reverse(&self, _bytes: u64) {}
}
