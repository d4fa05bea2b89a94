//! Route key to document mapping.

use std::collections::BTreeMap;

use docmap_storage::DocumentPath;
use serde::Serialize;

/// Where a route table entry came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteSource {
    /// Natural path of a document not referenced by the navigation spec.
    Fallback,
    /// Alias of a document under the hidden root.
    Alias,
    /// Declared by the navigation spec.
    Curated,
}

impl RouteSource {
    /// Lowercase label, as serialized.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fallback => "fallback",
            Self::Alias => "alias",
            Self::Curated => "curated",
        }
    }
}

/// One route table entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RouteEntry {
    /// Target document.
    pub path: DocumentPath,
    /// Origin of the mapping.
    pub source: RouteSource,
}

/// Mapping from normalized route keys to documents.
///
/// Built once per page-map build and immutable afterwards. Several keys may
/// point at the same document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RouteTable {
    entries: BTreeMap<String, RouteEntry>,
}

impl RouteTable {
    /// Document stored under a normalized key.
    pub fn get(&self, key: &str) -> Option<&DocumentPath> {
        self.entries.get(key).map(|e| &e.path)
    }

    /// Full entry for a normalized key.
    pub fn entry(&self, key: &str) -> Option<&RouteEntry> {
        self.entries.get(key)
    }

    /// True if `key` is mapped.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no keys are mapped.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by key.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RouteEntry)> {
        self.entries.iter().map(|(k, e)| (k.as_str(), e))
    }

    /// Map `key` to `path`.
    ///
    /// A higher-ranked source always wins. Within one source an index
    /// document beats a non-index one; otherwise the later insert wins.
    /// Returns `true` if the entry was stored.
    pub(crate) fn insert(&mut self, key: String, path: DocumentPath, source: RouteSource) -> bool {
        if let Some(existing) = self.entries.get(&key) {
            let keep_existing = match existing.source.cmp(&source) {
                std::cmp::Ordering::Greater => true,
                std::cmp::Ordering::Less => false,
                std::cmp::Ordering::Equal => existing.path.is_index() && !path.is_index(),
            };
            if keep_existing {
                return false;
            }
        }
        self.entries.insert(key, RouteEntry { path, source });
        true
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn doc(path: &str) -> DocumentPath {
        DocumentPath::parse(path).unwrap()
    }

    #[test]
    fn test_index_wins_within_source() {
        let mut table = RouteTable::default();
        table.insert("guide".into(), doc("guide/README.md"), RouteSource::Fallback);
        table.insert("guide".into(), doc("guide.md"), RouteSource::Fallback);

        assert_eq!(table.get("guide"), Some(&doc("guide/README.md")));
    }

    #[test]
    fn test_index_replaces_plain_document() {
        let mut table = RouteTable::default();
        table.insert("guide".into(), doc("guide.md"), RouteSource::Fallback);
        table.insert("guide".into(), doc("guide/index.md"), RouteSource::Fallback);

        assert_eq!(table.get("guide"), Some(&doc("guide/index.md")));
    }

    #[test]
    fn test_last_writer_wins_between_equals() {
        let mut table = RouteTable::default();
        table.insert("a".into(), doc("x.md"), RouteSource::Curated);
        table.insert("a".into(), doc("y.md"), RouteSource::Curated);

        assert_eq!(table.get("a"), Some(&doc("y.md")));
    }

    #[test]
    fn test_curated_never_overwritten_by_fallback() {
        let mut table = RouteTable::default();
        table.insert("setup".into(), doc("docs/install.md"), RouteSource::Curated);

        let stored = table.insert("setup".into(), doc("setup/README.md"), RouteSource::Fallback);

        assert!(!stored);
        assert_eq!(table.get("setup"), Some(&doc("docs/install.md")));
        assert_eq!(table.entry("setup").unwrap().source, RouteSource::Curated);
    }

    #[test]
    fn test_curated_replaces_fallback() {
        let mut table = RouteTable::default();
        table.insert("setup".into(), doc("setup.md"), RouteSource::Fallback);
        table.insert("setup".into(), doc("guide/setup.md"), RouteSource::Curated);

        assert_eq!(table.get("setup"), Some(&doc("guide/setup.md")));
        assert_eq!(table.len(), 1);
    }
}
