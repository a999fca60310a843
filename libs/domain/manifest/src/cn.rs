// [libs/domain/manifest/src/cn.rs]
//! CN manifest decoder: three independently fetched feeds merged into one
//! catalog. Bundle and table feeds are JSON; the media feed is a CSV-like
//! text blob the server emits line by line.

use crate::errors::ManifestError;
use caravan_domain_catalog::{Addition, Catalog, CheckType, ResourceType};
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Deserialize)]
struct BundleFeed {
    #[serde(rename = "BundleFiles")]
    bundle_files: Vec<BundleFileEntry>,
}

#[derive(Deserialize)]
struct BundleFileEntry {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Size")]
    size: u64,
    #[serde(rename = "Crc")]
    crc: String,
    #[serde(rename = "IsPrologue")]
    is_prologue: bool,
    #[serde(rename = "IsSplitDownload")]
    is_split_download: bool,
}

#[derive(Deserialize)]
struct TableFeed {
    #[serde(rename = "Table")]
    table: HashMap<String, TableFeedEntry>,
}

#[derive(Deserialize)]
struct TableFeedEntry {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Crc")]
    crc: String,
    #[serde(rename = "Size")]
    size: u64,
    #[serde(rename = "Includes")]
    includes: Option<Vec<String>>,
}

/// `BundleFiles` array JSON, each emitted under `{base}/AssetBundles/Android/{Name}`.
pub fn decode_bundle_feed(bytes: &[u8], base: &str) -> Result<Catalog, ManifestError> {
    let feed: BundleFeed = serde_json::from_slice(bytes)?;
    let base = base.trim_end_matches('/');
    let mut catalog = Catalog::new();
    for item in feed.bundle_files {
        catalog.add(
            format!("{base}/AssetBundles/Android/{}", item.name),
            format!("Bundle/{}", item.name),
            item.size,
            item.crc,
            CheckType::Md5,
            ResourceType::Bundle,
            Addition {
                is_prologue: Some(item.is_prologue),
                is_split_download: Some(item.is_split_download),
                ..Default::default()
            },
        );
    }
    Ok(catalog)
}

fn media_extension(media_type: i64) -> Option<&'static str> {
    match media_type {
        1 => Some("ogg"),
        2 => Some("mp4"),
        3 => Some("jpg"),
        4 => Some("png"),
        5 => Some("acb"),
        6 => Some("awb"),
        _ => None,
    }
}

/// Line-oriented `path,md5,mediaType,size,_` feed.
pub fn decode_media_feed(text: &str, media_root: &str) -> Catalog {
    let media_root = media_root.trim_end_matches('/');
    let mut catalog = Catalog::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() < 4 {
            tracing::warn!(line, "skipping malformed cn media line");
            continue;
        }
        let (path, md5, media_type_raw, size_raw) = (fields[0], fields[1], fields[2], fields[3]);
        let media_type: i64 = match media_type_raw.parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!(media_type_raw, "skipping cn media line with non-numeric media type");
                continue;
            }
        };
        let size: u64 = match size_raw.parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!(size_raw, "skipping cn media line with non-numeric size");
                continue;
            }
        };

        let extension = media_extension(media_type);
        let local_path = match extension {
            Some(ext) => format!("{path}.{ext}"),
            None => {
                tracing::info!(media_type, path, "cn media line has unknown media type, leaving path bare");
                path.to_string()
            }
        };

        let checksum_prefix = &md5[..md5.len().min(2)];
        catalog.add(
            format!("{media_root}/{checksum_prefix}/{md5}"),
            format!("Media/{local_path}"),
            size,
            md5,
            CheckType::Md5,
            ResourceType::Media,
            Addition {
                media_type: extension.map(str::to_string),
                ..Default::default()
            },
        );
    }

    catalog
}

/// `{"Table": {key: {Name, Crc, Size, Includes}}}` feed.
pub fn decode_table_feed(bytes: &[u8], table_root: &str) -> Result<Catalog, ManifestError> {
    let feed: TableFeed = serde_json::from_slice(bytes)?;
    let table_root = table_root.trim_end_matches('/');
    let mut catalog = Catalog::new();

    for entry in feed.table.into_values() {
        let checksum_prefix = &entry.crc[..entry.crc.len().min(2)];
        catalog.add(
            format!("{table_root}/{checksum_prefix}/{}", entry.crc),
            format!("Table/{}", entry.name),
            entry.size,
            entry.crc.clone(),
            CheckType::Md5,
            ResourceType::Table,
            Addition {
                includes: entry.includes,
                ..Default::default()
            },
        );
    }

    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_line_from_spec_scenario_decodes_as_documented() {
        let line = "effect/foo,abcdef0123456789abcdef0123456789,4,2048,\n";
        let catalog = decode_media_feed(line, "https://cdn/x/pool/MediaResources/");
        assert_eq!(catalog.len(), 1);
        let entry = &catalog[0];
        assert_eq!(entry.url, "https://cdn/x/pool/MediaResources/ab/abcdef0123456789abcdef0123456789");
        assert_eq!(entry.path, "Media/effect/foo.png");
        assert_eq!(entry.size, 2048);
        assert_eq!(entry.checksum, "abcdef0123456789abcdef0123456789");
        assert_eq!(entry.resource_type, ResourceType::Media);
        assert_eq!(entry.addition.media_type.as_deref(), Some("png"));
    }

    #[test]
    fn bundle_feed_decodes_each_element_into_one_entry() {
        let json = br#"{"BundleFiles":[{"Name":"a.bundle","Size":10,"Crc":"deadbeefdeadbeefdeadbeefdeadbeef","IsPrologue":true,"IsSplitDownload":false}]}"#;
        let catalog = decode_bundle_feed(json, "https://cdn/x").unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[0].url, "https://cdn/x/AssetBundles/Android/a.bundle");
        assert_eq!(catalog[0].path, "Bundle/a.bundle");
        assert_eq!(catalog[0].addition.is_prologue, Some(true));
    }

    #[test]
    fn table_feed_preserves_includes() {
        let json = br#"{"Table":{"k1":{"Name":"CharacterTable","Crc":"11223344112233441122334411223344","Size":5,"Includes":["a","b"]}}}"#;
        let catalog = decode_table_feed(json, "https://cdn/x/table").unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[0].path, "Table/CharacterTable");
        assert_eq!(catalog[0].addition.includes, Some(vec!["a".to_string(), "b".to_string()]));
    }
}
