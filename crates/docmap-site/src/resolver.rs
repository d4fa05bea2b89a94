//! Request path to document resolution.

use docmap_storage::DocumentPath;

use crate::page_map::PageMap;
use crate::route::normalize_route;

/// Candidates tried for the root key when the route table misses.
const ROOT_CANDIDATES: [&str; 4] = ["README.md", "readme.md", "index.mdx", "index.md"];

/// Suffixes appended to a key when the route table misses, in order.
const KEY_SUFFIXES: [&str; 6] = [
    ".mdx",
    ".md",
    "/README.md",
    "/readme.md",
    "/index.mdx",
    "/index.md",
];

/// Outcome of resolving a request path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// The request maps to this document.
    Found(DocumentPath),
    /// No document matches.
    NotFound,
}

impl Resolution {
    /// The resolved document, if any.
    pub fn found(self) -> Option<DocumentPath> {
        match self {
            Self::Found(path) => Some(path),
            Self::NotFound => None,
        }
    }
}

/// Join request segments into a route key.
///
/// Empty segments are dropped. Returns `None` if any segment is `.` or `..`.
pub fn route_key<S: AsRef<str>>(segments: &[S]) -> Option<String> {
    let mut parts = Vec::with_capacity(segments.len());
    for segment in segments {
        for part in segment.as_ref().split('/') {
            match part {
                "" => {}
                "." | ".." => return None,
                p => parts.push(p),
            }
        }
    }
    Some(parts.join("/"))
}

pub(crate) fn resolve<S: AsRef<str>>(map: &PageMap, segments: &[S]) -> Resolution {
    let Some(raw) = route_key(segments) else {
        return Resolution::NotFound;
    };
    let key = normalize_route(&raw);

    if let Some(path) = map.routes().get(&key) {
        return Resolution::Found(path.clone());
    }

    let documents = map.documents();
    let found = if key.is_empty() {
        ROOT_CANDIDATES
            .iter()
            .find_map(|c| documents.get(*c).cloned())
    } else {
        KEY_SUFFIXES
            .iter()
            .find_map(|suffix| documents.get(format!("{key}{suffix}").as_str()).cloned())
    };

    match found {
        Some(path) => Resolution::Found(path),
        None => {
            tracing::debug!(route = %key, "No document for route");
            Resolution::NotFound
        }
    }
}
