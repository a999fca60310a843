// [libs/domain/pipeline/src/download.rs]
//! Dynamic scaling heuristic: when the next queued entry is small, request
//! additional workers so the tail of tiny files doesn't bottleneck on a
//! pool sized for the large ones at the head.

use caravan_domain_catalog::CatalogEntry;
use caravan_infra_fetcher::{FetchRequest, Fetcher};
use std::path::Path;
use std::sync::Mutex;
use tracing::warn;

const SCALE_SIZE_CEILING: u64 = 1024 * 1024;
const SCALE_NUMERATOR: f64 = 2_097_152.0; // 8^7
const SCALE_EPSILON: f64 = 1.0;

pub fn scaled_target_workers(base_threads: usize, next_entry_size: u64) -> usize {
    if next_entry_size > SCALE_SIZE_CEILING {
        return base_threads;
    }
    let bonus = SCALE_NUMERATOR / (next_entry_size as f64 + SCALE_EPSILON);
    base_threads + bonus.floor() as usize
}

pub struct DownloadOutcome {
    pub entry: CatalogEntry,
    pub succeeded: bool,
}

pub fn download_entry(
    fetcher: &Fetcher,
    entry: &CatalogEntry,
    raw_dir: &Path,
    progress: &dyn caravan_infra_fetcher::ProgressSink,
    max_retries: u32,
) -> bool {
    let dest = raw_dir.join(&entry.path);
    let request = FetchRequest::get(&entry.url).with_max_retries(max_retries);
    match fetcher.save_file(&request, &dest, progress) {
        Ok(()) => true,
        Err(error) => {
            warn!(path = entry.path, error = %error, "download failed");
            false
        }
    }
}

/// `failed_catalog` is appended under a lock, per the shared-resource
/// policy: multiple download workers can fail concurrently.
pub struct FailedCatalog {
    entries: Mutex<Vec<CatalogEntry>>,
}

impl Default for FailedCatalog {
    fn default() -> Self {
        Self { entries: Mutex::new(Vec::new()) }
    }
}

impl FailedCatalog {
    pub fn push(&self, entry: CatalogEntry) {
        self.entries.lock().unwrap().push(entry);
    }

    pub fn take_all(&self) -> Vec<CatalogEntry> {
        std::mem::take(&mut *self.entries.lock().unwrap())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_trailing_files_request_many_more_workers() {
        let target = scaled_target_workers(4, 1024);
        assert!(target > 2000, "expected an aggressive fan-out for a 1KB tail file, got {target}");
    }

    #[test]
    fn large_files_get_no_bonus_workers() {
        assert_eq!(scaled_target_workers(4, 50 * 1024 * 1024), 4);
    }

    #[test]
    fn failed_catalog_accumulates_across_concurrent_pushes() {
        let failed = FailedCatalog::default();
        failed.push(CatalogEntry::new("u", "p", 1, "c", caravan_domain_catalog::CheckType::Md5, caravan_domain_catalog::ResourceType::Bundle));
        failed.push(CatalogEntry::new("u2", "p2", 1, "c", caravan_domain_catalog::CheckType::Md5, caravan_domain_catalog::ResourceType::Bundle));
        assert_eq!(failed.take_all().len(), 2);
        assert!(failed.is_empty());
    }
}
