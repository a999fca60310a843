// [libs/domain/pipeline/src/verify.rs]
//! Stats the on-disk copy of an entry; a size mismatch skips the checksum
//! entirely, since a short or truncated file can never pass it.

use caravan_core_obfuscation::{file_crc32, file_md5};
use caravan_domain_catalog::{CatalogEntry, CheckType};
use std::path::Path;

#[derive(Debug, PartialEq, Eq)]
pub enum VerifyOutcome {
    Skipped,
    NeedsDownload,
}

pub fn verify_entry(entry: &CatalogEntry, raw_dir: &Path) -> VerifyOutcome {
    let local_path = raw_dir.join(&entry.path);
    let metadata = match std::fs::metadata(&local_path) {
        Ok(metadata) => metadata,
        Err(_) => return VerifyOutcome::NeedsDownload,
    };
    if metadata.len() != entry.size {
        return VerifyOutcome::NeedsDownload;
    }

    let matches = match entry.check_type {
        CheckType::Crc32 => file_crc32(&local_path).map(|v| format!("{v:x}")).ok(),
        CheckType::Md5 => file_md5(&local_path).ok(),
    };
    match matches {
        Some(computed) if computed.eq_ignore_ascii_case(&entry.checksum) => VerifyOutcome::Skipped,
        _ => VerifyOutcome::NeedsDownload,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caravan_domain_catalog::ResourceType;
    use std::io::Write;

    #[test]
    fn missing_file_needs_download() {
        let dir = tempfile::tempdir().unwrap();
        let entry = CatalogEntry::new("http://x/y", "Bundle/missing.bundle", 10, "abc", CheckType::Crc32, ResourceType::Bundle);
        assert_eq!(verify_entry(&entry, dir.path()), VerifyOutcome::NeedsDownload);
    }

    #[test]
    fn size_mismatch_skips_the_checksum_and_needs_download() {
        let dir = tempfile::tempdir().unwrap();
        let local_path = dir.path().join("Bundle/x.bundle");
        std::fs::create_dir_all(local_path.parent().unwrap()).unwrap();
        std::fs::write(&local_path, b"short").unwrap();
        let entry = CatalogEntry::new("http://x/y", "Bundle/x.bundle", 9999, "abc", CheckType::Crc32, ResourceType::Bundle);
        assert_eq!(verify_entry(&entry, dir.path()), VerifyOutcome::NeedsDownload);
    }

    #[test]
    fn matching_size_and_checksum_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let local_path = dir.path().join("Bundle/x.bundle");
        std::fs::create_dir_all(local_path.parent().unwrap()).unwrap();
        let mut file = std::fs::File::create(&local_path).unwrap();
        file.write_all(b"hello world").unwrap();
        drop(file);
        let checksum = format!("{:x}", caravan_core_obfuscation::file_crc32(&local_path).unwrap());
        let entry = CatalogEntry::new("http://x/y", "Bundle/x.bundle", 11, checksum, CheckType::Crc32, ResourceType::Bundle);
        assert_eq!(verify_entry(&entry, dir.path()), VerifyOutcome::Skipped);
    }

    #[test]
    fn checksum_mismatch_despite_matching_size_needs_download() {
        let dir = tempfile::tempdir().unwrap();
        let local_path = dir.path().join("Bundle/x.bundle");
        std::fs::create_dir_all(local_path.parent().unwrap()).unwrap();
        std::fs::write(&local_path, b"hello world").unwrap();
        let entry = CatalogEntry::new("http://x/y", "Bundle/x.bundle", 11, "deadbeef", CheckType::Crc32, ResourceType::Bundle);
        assert_eq!(verify_entry(&entry, dir.path()), VerifyOutcome::NeedsDownload);
    }
}
