//! Recursive tree listing payload and filtering.

use serde::Deserialize;

use docmap_storage::DocumentPath;

/// Response body of a recursive tree listing.
#[derive(Debug, Deserialize)]
pub struct TreeResponse {
    /// Entries in the tree, directories and files interleaved.
    #[serde(default)]
    pub tree: Vec<TreeEntry>,
    /// Set when the listing was cut short by the origin.
    #[serde(default)]
    pub truncated: bool,
}

/// One entry of a tree listing.
#[derive(Debug, Deserialize)]
pub struct TreeEntry {
    /// Path relative to the repository root.
    pub path: String,
    /// Entry kind: `blob`, `tree` or `commit`.
    #[serde(rename = "type")]
    pub kind: String,
}

/// Keep file entries below `base_path` that carry a document extension.
///
/// Returned paths are relative to `base_path` and sorted.
pub fn filter_tree(entries: &[TreeEntry], base_path: &str) -> Vec<DocumentPath> {
    let base = base_path.trim_matches('/');
    let mut documents: Vec<DocumentPath> = entries
        .iter()
        .filter(|entry| entry.kind == "blob")
        .filter_map(|entry| DocumentPath::parse(&entry.path))
        .filter_map(|path| path.strip_prefix(base))
        .filter(|path| {
            !path
                .as_str()
                .split('/')
                .any(|segment| segment.starts_with('.'))
        })
        .collect();
    documents.sort();
    documents.dedup();
    documents
}
