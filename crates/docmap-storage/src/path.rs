//! Normalized document paths.

use std::borrow::Borrow;
use std::fmt;

use serde::Serialize;

/// Markup file extensions recognized as documents (compared case-insensitively).
pub const DOCUMENT_EXTENSIONS: &[&str] = &["md", "mdx", "markdown"];

/// Normalized relative path to one source document.
///
/// Always forward-slash separated, never starts with `/`, never contains `.`
/// or `..` segments, and always ends in one of [`DOCUMENT_EXTENSIONS`].
///
/// # Examples
///
/// ```
/// use docmap_storage::DocumentPath;
///
/// let path = DocumentPath::parse("./guide\\setup.md").unwrap();
/// assert_eq!(path.as_str(), "guide/setup.md");
/// assert_eq!(path.without_extension(), "guide/setup");
/// assert!(DocumentPath::parse("image.png").is_none());
/// assert!(DocumentPath::parse("../secret.md").is_none());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct DocumentPath(String);

impl DocumentPath {
    /// Parse and normalize a relative path.
    ///
    /// Returns `None` for paths that escape the base (`..`), are empty, or do
    /// not carry a document extension.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.replace('\\', "/");
        let mut segments = Vec::new();
        for segment in normalized.split('/') {
            match segment {
                "" | "." => {}
                ".." => return None,
                s => segments.push(s),
            }
        }

        let path = segments.join("/");
        if !has_document_extension(&path) {
            return None;
        }
        Some(Self(path))
    }

    /// Path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name (last segment), e.g. `"setup.md"`.
    pub fn file_name(&self) -> &str {
        self.0.rsplit_once('/').map_or(self.0.as_str(), |(_, name)| name)
    }

    /// File name without extension, e.g. `"setup"`.
    pub fn file_stem(&self) -> &str {
        let name = self.file_name();
        name.rsplit_once('.').map_or(name, |(stem, _)| stem)
    }

    /// Extension without the dot, as written in the path.
    pub fn extension(&self) -> &str {
        self.file_name()
            .rsplit_once('.')
            .map_or("", |(_, ext)| ext)
    }

    /// Full path with the extension removed, e.g. `"guide/setup"`.
    pub fn without_extension(&self) -> &str {
        let ext_len = self.extension().len() + 1;
        &self.0[..self.0.len() - ext_len]
    }

    /// Parent directory (`""` for top-level documents).
    pub fn parent(&self) -> &str {
        self.0.rsplit_once('/').map_or("", |(parent, _)| parent)
    }

    /// True for README/index-style documents addressed by their folder alone.
    pub fn is_index(&self) -> bool {
        let stem = self.file_stem();
        stem.eq_ignore_ascii_case("readme") || stem.eq_ignore_ascii_case("index")
    }

    /// Re-root this path below `prefix`, returning the remainder.
    ///
    /// `prefix` is a directory path without trailing slash; an empty prefix
    /// returns the path unchanged.
    pub fn strip_prefix(&self, prefix: &str) -> Option<Self> {
        let prefix = prefix.trim_matches('/');
        if prefix.is_empty() {
            return Some(self.clone());
        }
        let rest = self.0.strip_prefix(prefix)?.strip_prefix('/')?;
        Some(Self(rest.to_owned()))
    }

    /// Place this path below the directory `prefix`.
    #[must_use]
    pub fn with_prefix(&self, prefix: &str) -> Self {
        let prefix = prefix.trim_matches('/');
        if prefix.is_empty() {
            self.clone()
        } else {
            Self(format!("{prefix}/{}", self.0))
        }
    }
}

fn has_document_extension(path: &str) -> bool {
    let name = path.rsplit_once('/').map_or(path, |(_, name)| name);
    let Some((stem, ext)) = name.rsplit_once('.') else {
        return false;
    };
    !stem.is_empty()
        && DOCUMENT_EXTENSIONS
            .iter()
            .any(|known| ext.eq_ignore_ascii_case(known))
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DocumentPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for DocumentPath {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use pretty_assertions::assert_eq;

    use super::*;

    fn path(raw: &str) -> DocumentPath {
        DocumentPath::parse(raw).unwrap()
    }

    #[test]
    fn test_parse_normalizes_separators() {
        assert_eq!(path("a\\b\\c.md").as_str(), "a/b/c.md");
        assert_eq!(path("/a//b/./c.mdx").as_str(), "a/b/c.mdx");
    }

    #[test]
    fn test_parse_rejects_traversal() {
        assert!(DocumentPath::parse("a/../b.md").is_none());
    }

    #[test]
    fn test_parse_rejects_other_extensions() {
        assert!(DocumentPath::parse("a/b.txt").is_none());
        assert!(DocumentPath::parse("a/README").is_none());
        assert!(DocumentPath::parse("a/.md").is_none());
        assert!(DocumentPath::parse("").is_none());
    }

    #[test]
    fn test_parse_extension_case_insensitive() {
        let doc = path("Guide/Intro.MD");
        assert_eq!(doc.extension(), "MD");
        assert_eq!(doc.without_extension(), "Guide/Intro");
    }

    #[test]
    fn test_components() {
        let doc = path("guide/setup/install.mdx");
        assert_eq!(doc.file_name(), "install.mdx");
        assert_eq!(doc.file_stem(), "install");
        assert_eq!(doc.parent(), "guide/setup");
        assert_eq!(path("top.md").parent(), "");
    }

    #[test]
    fn test_is_index() {
        assert!(path("a/README.md").is_index());
        assert!(path("a/readme.md").is_index());
        assert!(path("index.mdx").is_index());
        assert!(!path("a/readme-first.md").is_index());
    }

    #[test]
    fn test_strip_and_with_prefix() {
        let doc = path("docs/guide/a.md");
        let stripped = doc.strip_prefix("docs").unwrap();
        assert_eq!(stripped.as_str(), "guide/a.md");
        assert_eq!(stripped.with_prefix("docs/"), doc);
        assert!(doc.strip_prefix("doc").is_none());
        assert_eq!(doc.strip_prefix(""), Some(doc.clone()));
    }

    #[test]
    fn test_borrow_allows_str_lookup() {
        let set: BTreeSet<DocumentPath> = [path("a.md"), path("b/c.md")].into_iter().collect();
        assert!(set.contains("b/c.md"));
        assert!(!set.contains("c.md"));
    }
}
