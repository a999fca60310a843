// [libs/domain/manifest/src/errors.rs]
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("manifest json malformed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("manifest binary framing truncated at offset {offset}")]
    TruncatedBinary { offset: usize },
    #[error("manifest binary string at offset {offset} is not valid utf-8")]
    InvalidUtf8 { offset: usize },
    #[error("manifest feed missing expected field: {0}")]
    MissingField(&'static str),
}
