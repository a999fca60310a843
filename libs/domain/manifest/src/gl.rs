// [libs/domain/manifest/src/gl.rs]
//! GL manifest decoder: one JSON payload, routed to bundle/media/table by
//! substring match on `resource_path`. Simplest of the three regions, and
//! the only one the original client classified without an explicit field.

use crate::errors::ManifestError;
use caravan_domain_catalog::{Addition, Catalog, CheckType, ResourceType};
use serde::Deserialize;

#[derive(Deserialize)]
struct ResourceFeed {
    resources: Vec<ResourceEntry>,
}

#[derive(Deserialize)]
struct ResourceEntry {
    #[allow(dead_code)]
    group: String,
    resource_path: String,
    resource_size: u64,
    resource_hash: String,
}

fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

pub fn decode_resources(bytes: &[u8], base: &str) -> Result<Catalog, ManifestError> {
    let feed: ResourceFeed = serde_json::from_slice(bytes)?;
    let base = base.trim_end_matches('/');
    let mut catalog = Catalog::new();

    for item in feed.resources {
        let url = format!("{base}/{}", item.resource_path.trim_start_matches('/'));
        let (local_path, resource_type) = if item.resource_path.contains("TableBundles") {
            (format!("Table/{}", basename(&item.resource_path)), ResourceType::Table)
        } else if item.resource_path.contains("MediaResources") {
            (format!("Media/{}", basename(&item.resource_path)), ResourceType::Media)
        } else if item.resource_path.ends_with(".bundle") {
            (format!("Bundle/{}", basename(&item.resource_path)), ResourceType::Bundle)
        } else {
            tracing::warn!(path = %item.resource_path, "gl resource path did not match any known routing rule, treating as bundle");
            (format!("Bundle/{}", basename(&item.resource_path)), ResourceType::Bundle)
        };

        catalog.add(
            url,
            local_path,
            item.resource_size,
            item.resource_hash,
            CheckType::Md5,
            resource_type,
            Addition::default(),
        );
    }

    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_table_bundles_media_and_plain_bundle_by_substring() {
        let json = br#"{"resources":[
            {"group":"g","resource_path":"TableBundles/CharacterTable.bytes","resource_size":10,"resource_hash":"a"},
            {"group":"g","resource_path":"MediaResources/effect/foo.png","resource_size":20,"resource_hash":"b"},
            {"group":"g","resource_path":"AssetBundles/weapon.bundle","resource_size":30,"resource_hash":"c"}
        ]}"#;
        let catalog = decode_resources(json, "https://cdn/gl").unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog[0].resource_type, ResourceType::Table);
        assert_eq!(catalog[0].path, "Table/CharacterTable.bytes");
        assert_eq!(catalog[1].resource_type, ResourceType::Media);
        assert_eq!(catalog[2].resource_type, ResourceType::Bundle);
        assert_eq!(catalog[2].path, "Bundle/weapon.bundle");
    }
}
