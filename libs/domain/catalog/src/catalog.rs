// [libs/domain/catalog/src/catalog.rs]
use crate::entry::{Addition, CatalogEntry, CheckType, ResourceType};
use std::ops::Index;

/// Ordered collection of catalog entries. A catalog is a value: constructed
/// once per region run, never mutated after the pipeline starts. A parallel
/// "failed" catalog is built incrementally elsewhere, under a lock, using
/// the same type.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add(
        &mut self,
        url: impl Into<String>,
        path: impl Into<String>,
        size: u64,
        checksum: impl Into<String>,
        check_type: CheckType,
        resource_type: ResourceType,
        addition: Addition,
    ) {
        self.entries
            .push(CatalogEntry::new(url, path, size, checksum, check_type, resource_type).with_addition(addition));
    }

    pub fn push(&mut self, entry: CatalogEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CatalogEntry> {
        self.entries.iter()
    }

    pub fn into_vec(self) -> Vec<CatalogEntry> {
        self.entries
    }

    pub fn extend(&mut self, other: Catalog) {
        self.entries.extend(other.entries);
    }

    pub fn filter_by_type(&self, types: &[ResourceType]) -> Catalog {
        Catalog {
            entries: self
                .entries
                .iter()
                .filter(|entry| types.contains(&entry.resource_type))
                .cloned()
                .collect(),
        }
    }

    pub fn search_by_path(&self, substring: &str) -> Catalog {
        let needle = substring.to_lowercase();
        Catalog {
            entries: self
                .entries
                .iter()
                .filter(|entry| entry.path.to_lowercase().contains(&needle))
                .cloned()
                .collect(),
        }
    }

    /// Stable, in-place, descending by size. Required by the download stage
    /// before it starts, since its auto-scale heuristic assumes small files
    /// arrive later in the queue.
    pub fn sorted_by_size_desc(&mut self) {
        self.entries.sort_by(|a, b| b.size.cmp(&a.size));
    }
}

impl Index<usize> for Catalog {
    type Output = CatalogEntry;

    fn index(&self, index: usize) -> &Self::Output {
        &self.entries[index]
    }
}

impl IntoIterator for Catalog {
    type Item = CatalogEntry;
    type IntoIter = std::vec::IntoIter<CatalogEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a CatalogEntry;
    type IntoIter = std::slice::Iter<'a, CatalogEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<CatalogEntry> for Catalog {
    fn from_iter<T: IntoIterator<Item = CatalogEntry>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(path: &str, size: u64) -> CatalogEntry {
        CatalogEntry::new("https://cdn/x", path, size, "abc", CheckType::Md5, ResourceType::Bundle)
    }

    #[test]
    fn sorted_by_size_desc_orders_largest_first() {
        let mut catalog: Catalog = vec![sample("a", 10), sample("b", 99), sample("c", 42)].into_iter().collect();
        catalog.sorted_by_size_desc();
        let sizes: Vec<u64> = catalog.iter().map(|e| e.size).collect();
        assert_eq!(sizes, vec![99, 42, 10]);
    }

    #[test]
    fn filter_by_type_keeps_only_matching_entries() {
        let mut catalog = Catalog::new();
        catalog.push(sample("Bundle/a", 1));
        let mut table_entry = sample("Table/b", 2);
        table_entry.resource_type = ResourceType::Table;
        catalog.push(table_entry);

        let filtered = catalog.filter_by_type(&[ResourceType::Table]);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].path, "Table/b");
    }

    #[test]
    fn search_by_path_is_case_insensitive() {
        let mut catalog = Catalog::new();
        catalog.push(sample("Bundle/Weapon.bundle", 1));
        assert_eq!(catalog.search_by_path("weapon").len(), 1);
        assert_eq!(catalog.search_by_path("nonexistent").len(), 0);
    }
}
