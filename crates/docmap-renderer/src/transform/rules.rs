//! Rewrite rules applied to unprotected text.
//!
//! Each rule is a pure `&str -> String` function and a fixed point of itself:
//! applying it to its own output changes nothing.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::protect::{has_block_placeholder, placeholders_in};
use super::tags::{CLOSE_TAG_RE, OPEN_TAG_RE, OpenTag, escape_brackets, is_void, rewrite_open_tags};

/// Unescaped templating regions, plain and entity-encoded.
static TEMPLATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\{\{.*?\}\}|\{%.*?%\}|\{#.*?#\}|\{&#37;.*?&#37;\}|\{&percnt;.*?&percnt;\}")
        .unwrap()
});

/// HTML comments; an unterminated opener runs to end of text.
static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?(?:-->|\z)").unwrap());

/// Script and style elements, self-closing forms, unterminated openers and
/// stray closers.
static SCRIPT_STYLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)<script\b[^>]*/>|<style\b[^>]*/>|<script\b[^>]*>.*?(?:</script\s*>|\z)|<style\b[^>]*>.*?(?:</style\s*>|\z)|</script\s*>|</style\s*>",
    )
    .unwrap()
});

/// `<` that can never start a tag: before a digit, `=` or whitespace.
static BARE_LT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<([0-9=\s])").unwrap());

/// Paragraph wrapper and its content.
static PARAGRAPH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<p(\s[^>]*)?>(.*?)</p\s*>").unwrap());

/// Block elements that may not sit inside a paragraph.
static BLOCK_OPEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<(?:div|iframe|table|pre|section|article|ul|ol|h[1-6])\b").unwrap()
});

/// Attribute renames to component-syntax names, keyed by lowercase name.
const RENAMES: &[(&str, &str)] = &[
    ("class", "className"),
    ("for", "htmlFor"),
    ("frameborder", "frameBorder"),
    ("tabindex", "tabIndex"),
    ("crossorigin", "crossOrigin"),
    ("srcset", "srcSet"),
    ("maxlength", "maxLength"),
    ("minlength", "minLength"),
];

/// Boolean attributes, keyed by lowercase name.
const BOOLEANS: &[(&str, &str)] = &[
    ("allowfullscreen", "allowFullScreen"),
    ("async", "async"),
    ("autofocus", "autoFocus"),
    ("autoplay", "autoPlay"),
    ("checked", "checked"),
    ("controls", "controls"),
    ("default", "default"),
    ("defer", "defer"),
    ("disabled", "disabled"),
    ("hidden", "hidden"),
    ("loop", "loop"),
    ("multiple", "multiple"),
    ("muted", "muted"),
    ("nomodule", "noModule"),
    ("novalidate", "noValidate"),
    ("open", "open"),
    ("readonly", "readOnly"),
    ("required", "required"),
    ("reversed", "reversed"),
    ("selected", "selected"),
];

fn lookup(table: &[(&str, &'static str)], name: &str) -> Option<&'static str> {
    let lower = name.to_ascii_lowercase();
    table.iter().find(|(k, _)| *k == lower).map(|(_, v)| *v)
}

/// Replace every match with the placeholders it contained, until stable.
fn strip_keeping_placeholders(re: &Regex, text: &str) -> String {
    let mut current = text.to_owned();
    loop {
        let next = re
            .replace_all(&current, |caps: &Captures<'_>| placeholders_in(&caps[0]))
            .into_owned();
        if next == current {
            return next;
        }
        current = next;
    }
}

/// Escaped templating delimiters become their literal display form.
pub(crate) fn escaped_delimiters(text: &str) -> String {
    text.replace(r"\{{", "&#123;&#123;")
        .replace(r"\}}", "&#125;&#125;")
        .replace(r"\{%", "&#123;%")
        .replace(r"\%}", "%&#125;")
}

/// Remove `{{ }}`, `{% %}` and `{# #}` regions.
pub(crate) fn templating(text: &str) -> String {
    strip_keeping_placeholders(&TEMPLATE_RE, text)
}

/// Remove comments, scripts and styles.
pub(crate) fn comments_scripts_styles(text: &str) -> String {
    let without_comments = strip_keeping_placeholders(&COMMENT_RE, text);
    strip_keeping_placeholders(&SCRIPT_STYLE_RE, &without_comments)
}

/// Drop `on*=` event handlers and `style=` attributes.
pub(crate) fn unsafe_attributes(text: &str) -> String {
    rewrite_open_tags(text, |tag| {
        let before = tag.attrs.len();
        tag.attrs.retain(|attr| {
            let lower = attr.name.to_ascii_lowercase();
            let handler = lower.len() > 2 && lower.starts_with("on");
            !(attr.value.is_some() && (handler || lower == "style"))
        });
        tag.attrs.len() != before
    })
}

/// Quote unquoted `href` and `src` values.
pub(crate) fn quote_urls(text: &str) -> String {
    rewrite_open_tags(text, |tag| {
        let mut changed = false;
        for attr in &mut tag.attrs {
            let is_url = attr.name.eq_ignore_ascii_case("href") || attr.name.eq_ignore_ascii_case("src");
            if is_url && !attr.is_quoted()
                && let Some(value) = &attr.value
            {
                attr.value = Some(format!("\"{value}\""));
                changed = true;
            }
        }
        changed
    })
}

/// Self-close void elements and drop their stray closers.
pub(crate) fn void_elements(text: &str) -> String {
    let opened = rewrite_open_tags(text, |tag| {
        if is_void(&tag.name) && !tag.self_closing {
            tag.self_closing = true;
            true
        } else {
            false
        }
    });
    CLOSE_TAG_RE
        .replace_all(&opened, |caps: &Captures<'_>| {
            if is_void(&caps[1]) {
                String::new()
            } else {
                caps[0].to_owned()
            }
        })
        .into_owned()
}

/// Escape bracket tokens that look like tags but are not markup.
///
/// Names with `_` are never elements. Hyphenated names are kept only when
/// they carry attributes or have a matching closer. Closers without an
/// opener are escaped too, along with `<` before digits, `=` or whitespace.
pub(crate) fn pseudo_tags(text: &str) -> String {
    let opened: HashSet<String> = OPEN_TAG_RE
        .captures_iter(text)
        .map(|caps| caps[1].to_ascii_lowercase())
        .collect();
    let closed: HashSet<String> = CLOSE_TAG_RE
        .captures_iter(text)
        .map(|caps| caps[1].to_ascii_lowercase())
        .collect();

    let is_pseudo_open = |tag: &OpenTag| {
        let lower = tag.name.to_ascii_lowercase();
        lower.contains('_') || (lower.contains('-') && tag.attrs.is_empty() && !closed.contains(&lower))
    };

    let opens = OPEN_TAG_RE
        .replace_all(text, |caps: &Captures<'_>| {
            let tag = OpenTag::from_captures(caps);
            if is_pseudo_open(&tag) {
                escape_brackets(&caps[0])
            } else {
                caps[0].to_owned()
            }
        })
        .into_owned();

    let closes = CLOSE_TAG_RE
        .replace_all(&opens, |caps: &Captures<'_>| {
            let lower = caps[1].to_ascii_lowercase();
            let pseudo = lower.contains('_') || (lower.contains('-') && !opened.contains(&lower));
            if pseudo {
                escape_brackets(&caps[0])
            } else {
                caps[0].to_owned()
            }
        })
        .into_owned();

    BARE_LT_RE.replace_all(&closes, "&lt;$1").into_owned()
}

/// Rename HTML attributes to component-syntax names.
pub(crate) fn attribute_names(text: &str) -> String {
    rewrite_open_tags(text, |tag| {
        let mut changed = false;
        for attr in &mut tag.attrs {
            if let Some(renamed) = lookup(BOOLEANS, &attr.name) {
                if attr.name != renamed {
                    attr.name = renamed.to_owned();
                    changed = true;
                }
                if attr.is_quoted() {
                    attr.value = None;
                    changed = true;
                }
            } else if let Some(renamed) = lookup(RENAMES, &attr.name)
                && attr.name != renamed
            {
                attr.name = renamed.to_owned();
                changed = true;
            }
        }
        changed
    })
}

/// Turn `<p>` wrappers around block content into `<div>` wrappers.
///
/// Repeats until stable so nested paragraphs are unwrapped too.
pub(crate) fn block_paragraphs(text: &str) -> String {
    let mut current = text.to_owned();
    loop {
        let next = PARAGRAPH_RE
            .replace_all(&current, |caps: &Captures<'_>| {
                let inner = &caps[2];
                if BLOCK_OPEN_RE.is_match(inner) || has_block_placeholder(inner) {
                    let attrs = caps.get(1).map_or("", |m| m.as_str());
                    format!("<div{attrs}>{inner}</div>")
                } else {
                    caps[0].to_owned()
                }
            })
            .into_owned();
        if next == current {
            return next;
        }
        current = next;
    }
}
