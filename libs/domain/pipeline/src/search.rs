// [libs/domain/pipeline/src/search.rs]
//! Consumption-side lookup: resolve keyword(s) to asset paths. A region
//! ships a character-relation table naming specific entries; when that
//! file is missing (a fresh region or a version still mid-download) the
//! search degrades to a plain substring match over the catalog paths.

use caravan_domain_catalog::Catalog;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct CharacterRelation {
    #[serde(flatten)]
    entries: HashMap<String, Vec<String>>,
}

/// `{region}CharacterRelation.json` maps a character or keyword name to the
/// asset paths that belong to it. When present it is authoritative; a
/// keyword not listed there still falls through to substring search so a
/// typo or a newly added asset is not invisible.
pub fn search(catalog: &Catalog, relation_path: &Path, keywords: &[String]) -> Vec<String> {
    let relation = std::fs::read_to_string(relation_path)
        .ok()
        .and_then(|text| serde_json::from_str::<CharacterRelation>(&text).ok());

    let mut results = Vec::new();
    for keyword in keywords {
        let mut matched_via_relation = false;
        if let Some(relation) = &relation {
            if let Some(paths) = relation.entries.get(keyword) {
                results.extend(paths.iter().cloned());
                matched_via_relation = true;
            }
        }
        if !matched_via_relation {
            results.extend(catalog.search_by_path(keyword).iter().map(|entry| entry.path.clone()));
        }
    }
    results.sort();
    results.dedup();
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use caravan_domain_catalog::{CheckType, ResourceType};

    fn sample_catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.push(caravan_domain_catalog::CatalogEntry::new(
            "https://cdn/a",
            "Bundle/Hoshino.bundle",
            10,
            "abc",
            CheckType::Md5,
            ResourceType::Bundle,
        ));
        catalog.push(caravan_domain_catalog::CatalogEntry::new(
            "https://cdn/b",
            "Bundle/Hoshino_Live2D.bundle",
            10,
            "abc",
            CheckType::Md5,
            ResourceType::Bundle,
        ));
        catalog
    }

    #[test]
    fn falls_back_to_substring_search_when_relation_file_is_absent() {
        let catalog = sample_catalog();
        let results = search(&catalog, Path::new("/nonexistent/CNCharacterRelation.json"), &["hoshino".to_string()]);
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn relation_file_entries_take_precedence_over_substring_search() {
        let dir = tempfile::tempdir().unwrap();
        let relation_path = dir.path().join("CNCharacterRelation.json");
        std::fs::write(&relation_path, r#"{"hoshino": ["Bundle/Hoshino.bundle"]}"#).unwrap();

        let catalog = sample_catalog();
        let results = search(&catalog, &relation_path, &["hoshino".to_string()]);
        assert_eq!(results, vec!["Bundle/Hoshino.bundle".to_string()]);
    }

    #[test]
    fn an_unlisted_keyword_still_falls_through_to_substring_search() {
        let dir = tempfile::tempdir().unwrap();
        let relation_path = dir.path().join("CNCharacterRelation.json");
        std::fs::write(&relation_path, r#"{"other": ["Bundle/Other.bundle"]}"#).unwrap();

        let catalog = sample_catalog();
        let results = search(&catalog, &relation_path, &["hoshino".to_string()]);
        assert_eq!(results.len(), 2);
    }
}
