// [libs/domain/region/src/errors.rs]
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegionError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] caravan_infra_fetcher::FetchError),

    #[error("manifest decode failed: {0}")]
    Manifest(#[from] caravan_domain_manifest::ManifestError),

    #[error("json decode failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("missing field in server response: {0}")]
    MissingField(&'static str),

    #[error("could not resolve a version number from any source")]
    VersionNotFound,

    #[error("downloaded package size {actual} does not match expected {expected}")]
    PackageSizeMismatch { expected: u64, actual: u64 },

    #[error("the merged catalog came back empty")]
    EmptyCatalog,

    #[error("user-supplied version is not accepted by this region")]
    VersionOverrideRejected,
}
