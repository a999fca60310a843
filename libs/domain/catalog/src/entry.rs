// [libs/domain/catalog/src/entry.rs]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckType {
    Crc32,
    Md5,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceType {
    Bundle,
    Media,
    Table,
}

/// Region-specific hints that do not belong on every entry. Modeled as an
/// explicit struct of optional fields rather than a free-form map, per the
/// re-architecture guidance: each region's intermediate record flattens
/// into this one shape instead of carrying a bag of untyped values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Addition {
    pub media_type: Option<String>,
    pub includes: Option<Vec<String>>,
    pub is_prologue: Option<bool>,
    pub is_split_download: Option<bool>,
    /// JP binary records carry a file name distinct from the directory path.
    pub file_name: Option<String>,
}

/// The single normalized entity every manifest decoder produces.
///
/// Invariants enforced at construction: `url` non-empty, `path` non-empty
/// and forward-slash normalized. An entry is immutable once built; the
/// catalog treats `path` as the on-disk key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub url: String,
    pub path: String,
    pub size: u64,
    pub checksum: String,
    pub check_type: CheckType,
    pub resource_type: ResourceType,
    pub addition: Addition,
}

impl CatalogEntry {
    pub fn new(
        url: impl Into<String>,
        path: impl Into<String>,
        size: u64,
        checksum: impl Into<String>,
        check_type: CheckType,
        resource_type: ResourceType,
    ) -> Self {
        let path = path.into().replace('\\', "/");
        Self {
            url: url.into(),
            path,
            size,
            checksum: checksum.into(),
            check_type,
            resource_type,
            addition: Addition::default(),
        }
    }

    pub fn with_addition(mut self, addition: Addition) -> Self {
        self.addition = addition;
        self
    }
}
