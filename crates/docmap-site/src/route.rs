//! Route key helpers.
//!
//! A route key is a `/`-separated string without leading or trailing
//! separator. The empty key addresses the project root.

use docmap_storage::DocumentPath;

/// Convert a display title to a route segment.
///
/// Lowercases letters, collapses every run of non-alphanumeric characters
/// into a single `-` and trims separators from both ends. Non-ASCII letters
/// are kept, as in heading ids.
///
/// # Examples
///
/// ```
/// use docmap_site::slugify;
///
/// assert_eq!(slugify("Getting Started"), "getting-started");
/// assert_eq!(slugify("  C++ / FFI  "), "c-ffi");
/// ```
#[must_use]
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Route segment for a title, if it yields one that survives normalization.
///
/// Titles that slugify to nothing, or to `readme`/`index`, would collapse a
/// child route onto its parent.
pub(crate) fn segment(title: &str) -> Option<String> {
    let slug = slugify(title);
    (!slug.is_empty() && !matches!(slug.as_str(), "readme" | "index")).then_some(slug)
}

/// Canonical form of a route key.
///
/// Trims separators and repeatedly strips a trailing `readme` or `index`
/// segment (case-insensitive), so `"guide/readme"` and `"guide"` collapse to
/// the same key. Idempotent.
#[must_use]
pub fn normalize_route(key: &str) -> String {
    let mut key = key.trim_matches('/');
    loop {
        let (parent, last) = key.rsplit_once('/').unwrap_or(("", key));
        if last.eq_ignore_ascii_case("readme") || last.eq_ignore_ascii_case("index") {
            key = parent.trim_end_matches('/');
        } else {
            return key.to_owned();
        }
    }
}

/// Natural route key of a document: its path minus extension, normalized.
pub(crate) fn natural_key(path: &DocumentPath) -> String {
    normalize_route(path.without_extension())
}

/// Join a child segment onto a parent route.
pub(crate) fn join(parent: &str, segment: &str) -> String {
    match (parent.is_empty(), segment.is_empty()) {
        (_, true) => parent.to_owned(),
        (true, false) => segment.to_owned(),
        (false, false) => format!("{parent}/{segment}"),
    }
}

/// Display title derived from a document path.
///
/// `getting-started.md` becomes "Getting Started". Index documents take their
/// folder's name; a root index is titled "Home".
pub(crate) fn title_from_path(path: &DocumentPath) -> String {
    let name = if path.is_index() {
        path.parent().rsplit('/').next().unwrap_or_default()
    } else {
        path.file_stem()
    };
    if name.is_empty() {
        return "Home".to_owned();
    }
    title_case(name)
}

/// Title-case a file or folder name, treating `-` and `_` as spaces.
pub(crate) fn title_case(name: &str) -> String {
    name.split(['-', '_', ' '])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn doc(path: &str) -> DocumentPath {
        DocumentPath::parse(path).unwrap()
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Getting Started"), "getting-started");
        assert_eq!(slugify("API Reference (v2)"), "api-reference-v2");
        assert_eq!(slugify("--Already--slugged--"), "already-slugged");
        assert_eq!(slugify("Ünïcode Title"), "ünïcode-title");
        assert_eq!(slugify("Быстрый старт"), "быстрый-старт");
        assert_eq!(slugify("入门"), "入门");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_segment_rejects_collapsing_titles() {
        assert_eq!(segment("Setup Guide").as_deref(), Some("setup-guide"));
        assert_eq!(segment("README"), None);
        assert_eq!(segment("Index"), None);
        assert_eq!(segment("!!!"), None);
        assert_eq!(segment("入门").as_deref(), Some("入门"));
    }

    #[test]
    fn test_normalize_route_strips_index_forms() {
        assert_eq!(normalize_route("guide/readme"), "guide");
        assert_eq!(normalize_route("guide/README"), "guide");
        assert_eq!(normalize_route("guide/Index"), "guide");
        assert_eq!(normalize_route("/guide/setup/"), "guide/setup");
        assert_eq!(normalize_route("readme"), "");
        assert_eq!(normalize_route("index"), "");
        assert_eq!(normalize_route(""), "");
    }

    #[test]
    fn test_normalize_route_is_idempotent() {
        for key in ["a/index/readme", "readme/index", "x/readmes", "a//b/", "Index/x"] {
            let once = normalize_route(key);
            assert_eq!(normalize_route(&once), once, "not idempotent for {key:?}");
        }
        assert_eq!(normalize_route("a/index/readme"), "a");
        assert_eq!(normalize_route("x/readmes"), "x/readmes");
    }

    #[test]
    fn test_natural_key() {
        assert_eq!(natural_key(&doc("a/readme.md")), "a");
        assert_eq!(natural_key(&doc("a/guide.mdx")), "a/guide");
        assert_eq!(natural_key(&doc("index.md")), "");
    }

    #[test]
    fn test_join() {
        assert_eq!(join("", "guide"), "guide");
        assert_eq!(join("guide", "setup"), "guide/setup");
        assert_eq!(join("guide", ""), "guide");
    }

    #[test]
    fn test_title_from_path() {
        assert_eq!(title_from_path(&doc("guide/getting-started.md")), "Getting Started");
        assert_eq!(title_from_path(&doc("tools/cli_reference.mdx")), "Cli Reference");
        assert_eq!(title_from_path(&doc("deploy/README.md")), "Deploy");
        assert_eq!(title_from_path(&doc("README.md")), "Home");
    }
}
