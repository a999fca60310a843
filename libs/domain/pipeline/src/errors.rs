// [libs/domain/pipeline/src/errors.rs]
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] caravan_infra_fetcher::FetchError),

    #[error("storage error: {0}")]
    Storage(#[from] caravan_infra_storage::StorageError),

    #[error("obfuscation error: {0}")]
    Obfuscation(#[from] caravan_core_obfuscation::ObfuscationError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("format error: {0}")]
    Format(String),

    #[error("the merged catalog came back empty")]
    EmptyCatalog,

    #[error("user interrupt")]
    Cancelled,
}
