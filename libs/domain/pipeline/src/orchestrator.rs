// [libs/domain/pipeline/src/orchestrator.rs]
//! Strings verify -> download -> extract into one run: three worker pools
//! sharing a fetcher and a progress sink, wired so each stage's shutdown
//! waits on the one feeding it. A run that ends with failed downloads is
//! retried whole, against only the entries that failed, up to a fixed
//! number of passes.

use crate::config::PipelineConfig;
use crate::download::{download_entry, scaled_target_workers, FailedCatalog};
use crate::errors::PipelineError;
use crate::extract::{extract_media, extract_table, BundleBusyFlag, BundleExtractor};
use crate::progress::ProgressCounters;
use crate::verify::{verify_entry, VerifyOutcome};
use caravan_core_taskqueue::TaskManager;
use caravan_domain_catalog::{Catalog, CatalogEntry, ResourceType, SchemaRegistry};
use caravan_infra_fetcher::Fetcher;
use std::sync::Arc;
use tracing::{info, warn};

const MAX_RETRY_PASSES: u32 = 3;

pub struct PipelineOutcome {
    pub succeeded: u64,
    pub failed: Vec<CatalogEntry>,
    pub retry_passes_used: u32,
}

/// Runs the full verify/download/extract pipeline, retrying entries that
/// failed to download (whole-pass, not per-request) up to a fixed number
/// of times before giving up and reporting them.
pub fn run(
    config: &PipelineConfig,
    fetcher: Fetcher,
    schema_registry: SchemaRegistry,
    bundle_extractor: Arc<dyn BundleExtractor>,
    catalog: Catalog,
) -> Result<PipelineOutcome, PipelineError> {
    if catalog.is_empty() {
        return Err(PipelineError::EmptyCatalog);
    }

    let fetcher = Arc::new(fetcher);
    let progress = Arc::new(ProgressCounters::default());
    let mut pending = catalog.filter_by_type(&config.resource_types);
    let mut succeeded: u64 = 0;
    let mut retry_pass = 0;
    let mut last_failed: Vec<CatalogEntry> = Vec::new();

    loop {
        pending.sorted_by_size_desc();
        progress.set_total(pending.len() as u64);

        let failed = Arc::new(FailedCatalog::default());
        let bundle_busy = Arc::new(BundleBusyFlag::default());

        let extract_manager: Arc<TaskManager<CatalogEntry>> = {
            let extract_dir = config.extract_dir.clone();
            let raw_dir = config.raw_dir.clone();
            let schema_registry = schema_registry.clone();
            let bundle_busy = bundle_busy.clone();
            let bundle_extractor = bundle_extractor.clone();
            Arc::new(TaskManager::new(config.extract_workers, config.extract_workers, move |ctx| {
                let Some(entry) = ctx.next() else { return };
                extract_one(ctx, &entry, &raw_dir, &extract_dir, &schema_registry, bundle_extractor.as_ref(), &bundle_busy);
            }))
        };

        let download_manager: Arc<TaskManager<CatalogEntry>> = {
            let raw_dir = config.raw_dir.clone();
            let fetcher = fetcher.clone();
            let progress = progress.clone();
            let max_retries = config.max_retries;
            let base_threads = config.download_workers;
            let failed = failed.clone();
            let extract_manager = extract_manager.clone();
            let downloading_extract = config.downloading_extract;
            Arc::new(TaskManager::new(config.download_workers, config.max_workers, move |ctx: &caravan_core_taskqueue::WorkerContext<CatalogEntry>| {
                if let Some(next) = ctx.peek_next_size() {
                    if scaled_target_workers(base_threads, next.size) > base_threads {
                        ctx.increase_worker();
                    }
                }
                let Some(entry) = ctx.next() else { return };
                if download_entry(&fetcher, &entry, &raw_dir, progress.as_ref(), max_retries) {
                    progress.increment_done();
                    if downloading_extract {
                        extract_manager.push_task(entry);
                    }
                } else {
                    failed.push(entry);
                }
            }))
        };

        let verify_manager: Arc<TaskManager<CatalogEntry>> = {
            let raw_dir = config.raw_dir.clone();
            let download_manager = download_manager.clone();
            Arc::new(TaskManager::new(config.verify_workers, config.verify_workers, move |ctx| {
                let Some(entry) = ctx.next() else { return };
                match verify_entry(&entry, &raw_dir) {
                    VerifyOutcome::Skipped => {}
                    VerifyOutcome::NeedsDownload => download_manager.push_task(entry),
                }
            }))
        };
        download_manager.set_relation_shut(&*verify_manager);
        extract_manager.set_relation_shut(&*download_manager);

        verify_manager.import_tasks(pending.clone());

        verify_manager.run_without_block();
        download_manager.run_without_block();
        if config.downloading_extract {
            extract_manager.run_without_block();
        }

        verify_manager.join();
        download_manager.join();
        if config.downloading_extract {
            extract_manager.join();
        } else {
            extract_remaining_sequentially(&pending, &config.raw_dir, &config.extract_dir, &schema_registry, bundle_extractor.as_ref());
        }

        succeeded += progress.done();
        last_failed = failed.take_all();
        retry_pass += 1;

        if last_failed.is_empty() || retry_pass >= MAX_RETRY_PASSES {
            break;
        }
        info!(retry_pass, remaining = last_failed.len(), "retrying failed entries");
        pending = last_failed.clone().into_iter().collect();
    }

    Ok(PipelineOutcome { succeeded, failed: last_failed, retry_passes_used: retry_pass })
}

/// Used by a live extract worker: a busy bundle writer means requeue and
/// let another worker (or this one, later) pick the entry back up.
fn extract_one(
    ctx: &caravan_core_taskqueue::WorkerContext<CatalogEntry>,
    entry: &CatalogEntry,
    raw_dir: &std::path::Path,
    extract_dir: &std::path::Path,
    schema_registry: &SchemaRegistry,
    bundle_extractor: &dyn BundleExtractor,
    bundle_busy: &BundleBusyFlag,
) {
    let zip_path = raw_dir.join(&entry.path);
    let result = match entry.resource_type {
        ResourceType::Media => extract_media(&zip_path, extract_dir),
        ResourceType::Table => extract_table(&zip_path, extract_dir, schema_registry),
        ResourceType::Bundle => {
            if !bundle_busy.try_acquire() {
                ctx.requeue(entry.clone());
                return;
            }
            let outcome = bundle_extractor.extract_bundle(&zip_path);
            bundle_busy.release();
            outcome
        }
    };
    if let Err(error) = result {
        warn!(path = entry.path, error = %error, "extraction failed");
    }
}

/// Deferred-extraction mode runs one entry at a time after the whole
/// download stage has drained, so there is never more than one writer and
/// the busy flag never contends.
fn extract_remaining_sequentially(
    pending: &Catalog,
    raw_dir: &std::path::Path,
    extract_dir: &std::path::Path,
    schema_registry: &SchemaRegistry,
    bundle_extractor: &dyn BundleExtractor,
) {
    for entry in pending.iter() {
        let zip_path = raw_dir.join(&entry.path);
        if !zip_path.exists() {
            continue;
        }
        let result = match entry.resource_type {
            ResourceType::Media => extract_media(&zip_path, extract_dir),
            ResourceType::Table => extract_table(&zip_path, extract_dir, schema_registry),
            ResourceType::Bundle => bundle_extractor.extract_bundle(&zip_path),
        };
        if let Err(error) = result {
            warn!(path = entry.path, error = %error, "extraction failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caravan_domain_catalog::{Addition, CheckType};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingExtractor(AtomicUsize);

    impl BundleExtractor for CountingExtractor {
        fn extract_bundle(&self, _path: &std::path::Path) -> Result<(), PipelineError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn empty_catalog_is_rejected_up_front() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig {
            raw_dir: dir.path().join("raw"),
            extract_dir: dir.path().join("extract"),
            temp_dir: dir.path().join("temp"),
            downloading_extract: false,
            resource_types: vec![ResourceType::Bundle],
            verify_workers: 1,
            download_workers: 1,
            max_workers: 1,
            extract_workers: 1,
            max_retries: 0,
            proxy: None,
        };
        let fetcher = Fetcher::new(None).unwrap();
        let extractor = Arc::new(CountingExtractor(AtomicUsize::new(0)));
        let result = run(&config, fetcher, SchemaRegistry::new(), extractor, Catalog::new());
        assert!(matches!(result, Err(PipelineError::EmptyCatalog)));
    }

    #[test]
    fn already_present_entries_skip_download_and_still_extract() {
        let dir = tempfile::tempdir().unwrap();
        let raw_dir = dir.path().join("raw");
        let extract_dir = dir.path().join("extract");
        std::fs::create_dir_all(&raw_dir).unwrap();
        let bytes = b"payload";
        let local_path = raw_dir.join("a.bundle");
        std::fs::write(&local_path, bytes).unwrap();
        let checksum = format!("{:x}", caravan_core_obfuscation::file_crc32(&local_path).unwrap());

        let mut catalog = Catalog::new();
        catalog.add(
            "https://example.invalid/a.bundle",
            "a.bundle",
            bytes.len() as u64,
            checksum,
            CheckType::Crc32,
            ResourceType::Bundle,
            Addition::default(),
        );

        let config = PipelineConfig {
            raw_dir,
            extract_dir,
            temp_dir: dir.path().join("temp"),
            downloading_extract: false,
            resource_types: vec![ResourceType::Bundle],
            verify_workers: 1,
            download_workers: 1,
            max_workers: 1,
            extract_workers: 1,
            max_retries: 0,
            proxy: None,
        };
        let fetcher = Fetcher::new(None).unwrap();
        let extractor = Arc::new(CountingExtractor(AtomicUsize::new(0)));
        let outcome = run(&config, fetcher, SchemaRegistry::new(), extractor.clone(), catalog).unwrap();

        assert!(outcome.failed.is_empty());
        assert_eq!(extractor.0.load(Ordering::SeqCst), 1);
    }
}
