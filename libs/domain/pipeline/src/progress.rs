// [libs/domain/pipeline/src/progress.rs]
//! The progress total is reassigned dynamically while verify is running:
//! `total = verify_queue.size + download_queue.size`, so a UI reading this
//! counter sees the true remaining work rather than a number fixed at
//! startup.

use caravan_infra_fetcher::ProgressSink;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub struct ProgressCounters {
    total: AtomicU64,
    done: AtomicU64,
    bytes_credited: AtomicU64,
}

impl ProgressCounters {
    pub fn set_total(&self, total: u64) {
        self.total.store(total, Ordering::SeqCst);
    }

    pub fn total(&self) -> u64 {
        self.total.load(Ordering::SeqCst)
    }

    pub fn increment_done(&self) {
        self.done.fetch_add(1, Ordering::SeqCst);
    }

    pub fn done(&self) -> u64 {
        self.done.load(Ordering::SeqCst)
    }

    pub fn bytes_credited(&self) -> u64 {
        self.bytes_credited.load(Ordering::SeqCst)
    }
}

impl ProgressSink for ProgressCounters {
    fn credit(&self, bytes: u64) {
        self.bytes_credited.fetch_add(bytes, Ordering::SeqCst);
    }

    fn reverse(&self, bytes: u64) {
        self.bytes_credited.fetch_sub(bytes, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverse_undoes_a_partial_credit_on_a_failed_stream() {
        let counters = ProgressCounters::default();
        counters.credit(4096);
        counters.credit(2048);
        counters.reverse(2048);
        assert_eq!(counters.bytes_credited(), 4096);
    }

    #[test]
    fn total_can_be_reassigned_mid_run() {
        let counters = ProgressCounters::default();
        counters.set_total(10);
        counters.set_total(17);
        assert_eq!(counters.total(), 17);
    }
}
