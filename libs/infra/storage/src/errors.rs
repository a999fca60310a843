// [libs/infra/storage/src/errors.rs]
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("invalid utf-8 entry name in archive")]
    InvalidEntryName,
}
