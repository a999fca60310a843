// [libs/infra/storage/src/zip_archive.rs]
//! Password-protected zip extraction, grounded in the original's
//! `ZipUtils.extract_zip` / `xtractor/media.py`.

use crate::errors::StorageError;
use std::fs::File;
use std::io::copy;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Extracts every member of `zip_path` into `dest_dir`, decrypting with
/// `password` where the archive demands it. Returns the paths written.
/// A member the zip can't decrypt or that is malformed is skipped with a
/// warning rather than aborting the whole archive.
pub fn extract_zip_with_password(zip_path: &Path, password: &[u8], dest_dir: &Path) -> Result<Vec<PathBuf>, StorageError> {
    std::fs::create_dir_all(dest_dir)?;
    let file = File::open(zip_path)?;
    let mut archive = zip::ZipArchive::new(file)?;

    let mut written = Vec::new();
    for i in 0..archive.len() {
        let mut entry = match archive.by_index_decrypt(i, password) {
            Ok(Ok(entry)) => entry,
            Ok(Err(_)) => {
                warn!(index = i, "wrong password for archive member, skipping");
                continue;
            }
            Err(error) => {
                warn!(index = i, error = %error, "could not read archive member, skipping");
                continue;
            }
        };
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();
        let dest_path = dest_dir.join(&name);
        if let Some(parent) = dest_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut out_file = File::create(&dest_path)?;
        copy(&mut entry, &mut out_file)?;
        written.push(dest_path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_plain_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::FileOptions::default();
        for (name, data) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn extracts_every_member_without_a_password() {
        let dir = tempfile::tempdir().unwrap();
        let zip_path = dir.path().join("sample.zip");
        write_plain_zip(&zip_path, &[("a.txt", b"hello"), ("nested/b.txt", b"world")]);

        let dest = dir.path().join("out");
        let written = extract_zip_with_password(&zip_path, b"", &dest).unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(std::fs::read_to_string(dest.join("a.txt")).unwrap(), "hello");
        assert_eq!(std::fs::read_to_string(dest.join("nested/b.txt")).unwrap(), "world");
    }
}
