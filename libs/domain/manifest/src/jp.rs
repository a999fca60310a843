// [libs/domain/manifest/src/jp.rs]
//! JP manifest decoder: a custom little-endian, length-prefixed binary
//! format for media and table catalogs, plus a JSON bundle feed identical
//! in shape to CN's. All JP entries are checked by CRC32, never MD5.

use crate::binreader::BinReader;
use crate::cn::decode_bundle_feed as decode_bundle_feed_json_shape;
use crate::errors::ManifestError;
use caravan_domain_catalog::{Addition, Catalog, CatalogEntry, CheckType, ResourceType};

struct MediaRecord {
    path: String,
    file_name: String,
    size: i64,
    crc: i64,
    is_prologue: bool,
    is_split_download: bool,
    media_type: i32,
}

struct TableRecord {
    name: String,
    size: i64,
    crc: i64,
    in_build: bool,
    changed: bool,
    prologue: bool,
    split: bool,
    includes: Vec<String>,
}

fn read_includes_list(reader: &mut BinReader) -> Result<Vec<String>, ManifestError> {
    let size = reader.read_i32()?;
    if size == -1 {
        return Ok(Vec::new());
    }
    let _sentinel = reader.read_i32()?;
    let mut includes = Vec::with_capacity(size.max(0) as usize);
    for i in 0..size {
        includes.push(reader.read_string()?);
        if i < size - 1 {
            let _between_sentinel = reader.read_i32()?;
        }
    }
    Ok(includes)
}

fn read_media_record(reader: &mut BinReader) -> Result<MediaRecord, ManifestError> {
    let _discarded_i32 = reader.read_i32()?;
    let _key = reader.read_string()?;
    let _discarded_i8 = reader.read_i8()?;
    let path = reader.read_string()?.replace('\\', "/");
    let file_name = reader.read_string()?;
    let size = reader.read_i64()?;
    let crc = reader.read_i64()?;
    let is_prologue = reader.read_bool()?;
    let is_split_download = reader.read_bool()?;
    let media_type = reader.read_i32()?;
    Ok(MediaRecord { path, file_name, size, crc, is_prologue, is_split_download, media_type })
}

fn read_table_record(reader: &mut BinReader) -> Result<TableRecord, ManifestError> {
    let _discarded_i32 = reader.read_i32()?;
    let _key = reader.read_string()?;
    let _discarded_i8 = reader.read_i8()?;
    let name = reader.read_string()?;
    let size = reader.read_i64()?;
    let crc = reader.read_i64()?;
    let in_build = reader.read_bool()?;
    let changed = reader.read_bool()?;
    let prologue = reader.read_bool()?;
    let split = reader.read_bool()?;
    let includes = read_includes_list(reader)?;
    Ok(TableRecord { name, size, crc, in_build, changed, prologue, split, includes })
}

/// Decodes the JP media catalog framing: one leading `i8`, an `i32` item
/// count, then that many media records.
pub fn decode_media_catalog(bytes: &[u8], catalog_root: &str) -> Result<Catalog, ManifestError> {
    let mut reader = BinReader::new(bytes);
    let _leading_version = reader.read_i8()?;
    let count = reader.read_i32()?;
    let catalog_root = catalog_root.trim_end_matches('/');

    let mut catalog = Catalog::new();
    for _ in 0..count.max(0) {
        let record = read_media_record(&mut reader)?;
        catalog.push(CatalogEntry::new(
            format!("{catalog_root}/{}", record.path),
            format!("Media/{}", record.path),
            record.size.max(0) as u64,
            record.crc.to_string(),
            CheckType::Crc32,
            ResourceType::Media,
        ).with_addition(Addition {
            media_type: Some(record.media_type.to_string()),
            is_prologue: Some(record.is_prologue),
            is_split_download: Some(record.is_split_download),
            includes: None,
            file_name: Some(record.file_name),
        }));
    }
    Ok(catalog)
}

/// Decodes the JP table catalog framing, sharing the leading-version/count
/// shape with the media catalog but a different per-record layout.
pub fn decode_table_catalog(bytes: &[u8], catalog_root: &str) -> Result<Catalog, ManifestError> {
    let mut reader = BinReader::new(bytes);
    let _leading_version = reader.read_i8()?;
    let count = reader.read_i32()?;
    let catalog_root = catalog_root.trim_end_matches('/');

    let mut catalog = Catalog::new();
    for _ in 0..count.max(0) {
        let record = read_table_record(&mut reader)?;
        catalog.push(CatalogEntry::new(
            format!("{catalog_root}/{}", record.name),
            format!("Table/{}", record.name),
            record.size.max(0) as u64,
            record.crc.to_string(),
            CheckType::Crc32,
            ResourceType::Table,
        ).with_addition(Addition {
            includes: Some(record.includes),
            is_prologue: Some(record.prologue),
            is_split_download: Some(record.split),
            media_type: None,
            file_name: None,
        }));
        // in_build / changed drive incremental diffing upstream; this pipeline
        // only ever does a full verify/download pass, so they have no sink here.
        let _ = (record.in_build, record.changed);
    }
    Ok(catalog)
}

/// JP bundle feed shares CN's JSON shape, but JP checksums are always CRC32.
pub fn decode_bundle_feed(bytes: &[u8], base: &str) -> Result<Catalog, ManifestError> {
    let decoded = decode_bundle_feed_json_shape(bytes, base)?;
    let mut retagged = Catalog::new();
    for mut entry in decoded.into_vec() {
        entry.check_type = CheckType::Crc32;
        retagged.push(entry);
    }
    Ok(retagged)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec_scenario_bytes() -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0i8.to_le_bytes()); // leading version
        bytes.extend_from_slice(&1i32.to_le_bytes()); // item count
        bytes.extend_from_slice(&0i32.to_le_bytes()); // discarded i32
        bytes.extend_from_slice(&3i32.to_le_bytes());
        bytes.extend_from_slice(b"abc"); // key
        bytes.extend_from_slice(&0i8.to_le_bytes()); // discarded i8
        bytes.extend_from_slice(&3i32.to_le_bytes());
        bytes.extend_from_slice(b"d\\e"); // path
        bytes.extend_from_slice(&1i32.to_le_bytes());
        bytes.extend_from_slice(b"f"); // file_name
        bytes.extend_from_slice(&10i64.to_le_bytes()); // size
        bytes.extend_from_slice(&99i64.to_le_bytes()); // crc
        bytes.push(1); // is_prologue
        bytes.push(0); // is_split_download
        bytes.extend_from_slice(&2i32.to_le_bytes()); // media_type
        bytes
    }

    #[test]
    fn jp_binary_media_record_matches_spec_scenario() {
        let bytes = spec_scenario_bytes();
        let catalog = decode_media_catalog(&bytes, "https://cdn/jp").unwrap();
        assert_eq!(catalog.len(), 1);
        let entry = &catalog[0];
        assert_eq!(entry.path, "Media/d/e");
        assert_eq!(entry.size, 10);
        assert_eq!(entry.checksum, "99");
        assert_eq!(entry.addition.is_prologue, Some(true));
        assert_eq!(entry.addition.is_split_download, Some(false));
        assert_eq!(entry.addition.media_type.as_deref(), Some("2"));
        assert_eq!(entry.check_type, CheckType::Crc32);
        assert_eq!(entry.resource_type, ResourceType::Media);
    }

    #[test]
    fn includes_list_of_negative_one_is_empty() {
        let bytes = (-1i32).to_le_bytes().to_vec();
        let mut reader = BinReader::new(&bytes);
        assert_eq!(read_includes_list(&mut reader).unwrap(), Vec::<String>::new());
    }

    #[test]
    fn includes_list_has_no_trailing_sentinel_after_last_entry() {
        let mut bytes = 2i32.to_le_bytes().to_vec();
        bytes.extend_from_slice(&0i32.to_le_bytes()); // leading sentinel
        bytes.extend_from_slice(&1i32.to_le_bytes());
        bytes.extend_from_slice(b"a");
        bytes.extend_from_slice(&0i32.to_le_bytes()); // between-entry sentinel
        bytes.extend_from_slice(&1i32.to_le_bytes());
        bytes.extend_from_slice(b"b");
        let mut reader = BinReader::new(&bytes);
        assert_eq!(read_includes_list(&mut reader).unwrap(), vec!["a".to_string(), "b".to_string()]);
        assert!(!reader.has_remaining());
    }
}
