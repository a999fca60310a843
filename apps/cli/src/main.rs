// [apps/cli/src/main.rs]
//! Entry point: parse arguments, resolve the region driver, run the
//! pipeline, then answer any search keywords against what landed on disk.

mod cli_args;
mod unity_adapter;

use anyhow::{Context, Result};
use caravan_domain_catalog::SchemaRegistry;
use caravan_domain_pipeline::PipelineConfig;
use caravan_domain_region::{CnDriver, GlDriver, JpDriver};
use caravan_infra_fetcher::Fetcher;
use clap::Parser;
use cli_args::{CliArgs, Region, RunConfig};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;
use unity_adapter::{UnimplementedBundleExtractor, UnimplementedUnityAssetReader};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    caravan_shared_heimdall::init_tracing("caravan-cli");

    let config = RunConfig::from_args(CliArgs::parse()).context("invalid CLI configuration")?;

    let cancelled = Arc::new(AtomicBool::new(false));
    let cancelled_for_handler = cancelled.clone();
    ctrlc::set_handler(move || {
        tracing::warn!("interrupt received, winding the pipeline down");
        cancelled_for_handler.store(true, Ordering::SeqCst);
    })
    .context("failed to install Ctrl+C handler")?;

    let fetcher = Fetcher::with_cancellation_flag(config.proxy.as_deref(), cancelled.clone())
        .context("failed to build HTTP client")?;

    info!(region = ?config.region, "resolving catalog");
    let catalog = match config.region {
        Region::Cn => CnDriver::new(&fetcher, config.temp_dir.clone()).run()?,
        Region::Gl => GlDriver::new(&fetcher, config.version.clone()).run()?,
        Region::Jp => {
            let asset_reader = UnimplementedUnityAssetReader;
            JpDriver::new(&fetcher, config.temp_dir.clone(), &asset_reader, config.version.clone()).run()?
        }
    };
    info!(entries = catalog.len(), "catalog resolved");

    let pipeline_config = PipelineConfig {
        raw_dir: config.raw_dir.clone(),
        extract_dir: config.extract_dir.clone(),
        temp_dir: config.temp_dir.clone(),
        downloading_extract: config.downloading_extract,
        resource_types: config.resource_types.clone(),
        verify_workers: config.threads,
        download_workers: config.threads,
        max_workers: config.max_threads,
        extract_workers: config.threads,
        max_retries: config.max_retries,
        proxy: config.proxy.clone(),
    };

    let outcome = caravan_domain_pipeline::run(
        &pipeline_config,
        fetcher,
        SchemaRegistry::new(),
        Arc::new(UnimplementedBundleExtractor),
        catalog.clone(),
    )?;

    info!(
        succeeded = outcome.succeeded,
        failed = outcome.failed.len(),
        retry_passes = outcome.retry_passes_used,
        "pipeline finished"
    );
    for entry in &outcome.failed {
        tracing::warn!(path = entry.path, "entry never downloaded successfully");
    }

    if !config.search_keywords.is_empty() || !config.advanced_search_keywords.is_empty() {
        let region_prefix = match config.region {
            Region::Cn => "CN",
            Region::Gl => "GL",
            Region::Jp => "JP",
        };
        let relation_path = config.extract_dir.join(format!("{region_prefix}CharacterRelation.json"));
        let mut keywords = config.search_keywords.clone();
        keywords.extend(config.advanced_search_keywords.clone());
        let results = caravan_domain_pipeline::search(&catalog, &relation_path, &keywords);
        for path in results {
            println!("{path}");
        }
    }

    Ok(())
}
