//! Minimal HTML tag parsing shared by the rewrite rules.
//!
//! Only the surface syntax is modelled: tag name, attribute list with raw
//! values, and the self-closing flag. A tag is written back only when a rule
//! changed it, so untouched markup keeps its original spelling.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Opening or self-closing tag.
pub(crate) static OPEN_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"<([A-Za-z][A-Za-z0-9:._-]*)((?:\s+[^\s"'<>/=]+(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s"'<>=`]+))?)*)\s*(/?)>"#,
    )
    .unwrap()
});

/// Closing tag.
pub(crate) static CLOSE_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</([A-Za-z][A-Za-z0-9:._-]*)\s*>").unwrap());

/// Single attribute inside an opening tag.
static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s"'<>/=]+)(?:\s*=\s*("[^"]*"|'[^']*'|[^\s"'<>=`]+))?"#).unwrap()
});

/// HTML void elements.
pub(crate) const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// True if `name` is a void element (case-insensitive).
pub(crate) fn is_void(name: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(name))
}

/// One attribute with its raw value (quotes included).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Attr {
    pub name: String,
    pub value: Option<String>,
}

impl Attr {
    /// True if the value is wrapped in single or double quotes.
    pub fn is_quoted(&self) -> bool {
        self.value
            .as_deref()
            .is_some_and(|v| v.starts_with('"') || v.starts_with('\''))
    }
}

/// Parsed opening tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OpenTag {
    pub name: String,
    pub attrs: Vec<Attr>,
    pub self_closing: bool,
}

impl OpenTag {
    /// Parse the captures of [`OPEN_TAG_RE`].
    pub fn from_captures(caps: &Captures<'_>) -> Self {
        let attrs = caps.get(2).map_or("", |m| m.as_str());
        Self {
            name: caps[1].to_owned(),
            attrs: ATTR_RE
                .captures_iter(attrs)
                .map(|a| Attr {
                    name: a[1].to_owned(),
                    value: a.get(2).map(|v| v.as_str().to_owned()),
                })
                .collect(),
            self_closing: caps.get(3).is_some_and(|m| !m.is_empty()),
        }
    }

    /// Write the tag back as markup.
    pub fn render(&self) -> String {
        let mut out = format!("<{}", self.name);
        for attr in &self.attrs {
            out.push(' ');
            out.push_str(&attr.name);
            if let Some(value) = &attr.value {
                out.push('=');
                out.push_str(value);
            }
        }
        out.push_str(if self.self_closing { " />" } else { ">" });
        out
    }
}

/// Rewrite every opening tag in `text` with `f`.
///
/// `f` returns `true` when it changed the tag; unchanged tags keep their
/// original text.
pub(crate) fn rewrite_open_tags(text: &str, mut f: impl FnMut(&mut OpenTag) -> bool) -> String {
    OPEN_TAG_RE
        .replace_all(text, |caps: &Captures<'_>| {
            let mut tag = OpenTag::from_captures(caps);
            if f(&mut tag) {
                tag.render()
            } else {
                caps[0].to_owned()
            }
        })
        .into_owned()
}

/// Escape angle brackets so a token renders as literal text.
pub(crate) fn escape_brackets(token: &str) -> String {
    token.replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn parse(tag: &str) -> OpenTag {
        let caps = OPEN_TAG_RE.captures(tag).unwrap();
        OpenTag::from_captures(&caps)
    }

    #[test]
    fn test_parse_attributes() {
        let tag = parse(r#"<a href=/x title='T' data-x="1" hidden>"#);

        assert_eq!(tag.name, "a");
        assert_eq!(
            tag.attrs,
            vec![
                Attr { name: "href".into(), value: Some("/x".into()) },
                Attr { name: "title".into(), value: Some("'T'".into()) },
                Attr { name: "data-x".into(), value: Some("\"1\"".into()) },
                Attr { name: "hidden".into(), value: None },
            ]
        );
        assert!(!tag.self_closing);
    }

    #[test]
    fn test_parse_self_closing() {
        assert!(parse("<br/>").self_closing);
        assert!(parse(r#"<img src="a.png" />"#).self_closing);
    }

    #[test]
    fn test_render() {
        let tag = parse(r#"<img   src="a.png"   alt=x>"#);
        assert_eq!(tag.render(), r#"<img src="a.png" alt=x>"#);
    }

    #[test]
    fn test_rewrite_keeps_untouched_tags_verbatim() {
        let text = r#"<div   class="a">x</div>"#;
        assert_eq!(rewrite_open_tags(text, |_| false), text);
    }

    #[test]
    fn test_not_a_tag() {
        assert!(OPEN_TAG_RE.captures("a < b > c").is_none());
        assert!(OPEN_TAG_RE.captures("<3 hearts>").is_none());
    }

    #[test]
    fn test_is_void() {
        assert!(is_void("BR"));
        assert!(!is_void("div"));
    }
}
