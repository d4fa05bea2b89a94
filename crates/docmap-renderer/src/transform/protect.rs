//! Code-region protection.
//!
//! Splits source text into protected regions (frontmatter, fenced and
//! indented code blocks, `<pre>` blocks, inline code spans) and the text in
//! between. Code blocks and code spans are located with `pulldown-cmark`.
//! Protected regions are swapped for placeholders so rewrite rules never see
//! them, then restored verbatim.

use std::fmt::Write;
use std::ops::Range;

use pulldown_cmark::{Event, Options, Parser, Tag};

/// Opens an inline placeholder.
const INLINE_OPEN: char = '\u{E000}';
/// Opens a block placeholder.
const BLOCK_OPEN: char = '\u{E002}';
/// Closes either placeholder kind.
const CLOSE: char = '\u{E001}';

/// Kind of protected region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Inline,
    Block,
}

/// Source text with protected regions replaced by placeholders.
#[derive(Debug)]
pub(crate) struct Protected {
    /// Working text with placeholders.
    pub text: String,
    regions: Vec<String>,
}

impl Protected {
    /// Tokenize `input`.
    pub fn new(input: &str) -> Self {
        let mut protected = Self {
            text: String::with_capacity(input.len()),
            regions: Vec::new(),
        };
        let mut pending = 0;
        for region in regions(input) {
            protected.push_plain(&input[pending..region.range.start]);
            protected.push_region(&input[region.range.clone()], region.kind);
            pending = region.range.end;
        }
        protected.push_plain(&input[pending..]);
        protected
    }

    /// Substitute every placeholder in `text` with its original region.
    pub fn restore(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(open) = rest.find([INLINE_OPEN, BLOCK_OPEN]) {
            out.push_str(&rest[..open]);
            let after = &rest[open + INLINE_OPEN.len_utf8()..];
            let region = after.find(CLOSE).and_then(|close| {
                let index: usize = after[..close].parse().ok()?;
                Some((self.regions.get(index)?, close))
            });
            match region {
                Some((original, close)) => {
                    out.push_str(original);
                    rest = &after[close + CLOSE.len_utf8()..];
                }
                None => {
                    out.push_str(&rest[open..open + INLINE_OPEN.len_utf8()]);
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        out
    }

    /// Append text that rules may rewrite. Stray sentinel characters are
    /// entity-escaped so they can never be mistaken for placeholders.
    fn push_plain(&mut self, text: &str) {
        for c in text.chars() {
            if matches!(c, INLINE_OPEN | BLOCK_OPEN | CLOSE) {
                let _ = write!(self.text, "&#x{:X};", u32::from(c));
            } else {
                self.text.push(c);
            }
        }
    }

    fn push_region(&mut self, region: &str, kind: Kind) {
        let open = match kind {
            Kind::Inline => INLINE_OPEN,
            Kind::Block => BLOCK_OPEN,
        };
        let _ = write!(self.text, "{open}{}{CLOSE}", self.regions.len());
        self.regions.push(region.to_owned());
    }
}

/// True if `text` contains a block placeholder.
pub(crate) fn has_block_placeholder(text: &str) -> bool {
    text.contains(BLOCK_OPEN)
}

/// Concatenation of every placeholder inside `text`.
///
/// Rules that delete a region keep this instead, so protected content is
/// never lost along with the markup around it.
pub(crate) fn placeholders_in(text: &str) -> String {
    let mut kept = String::new();
    let mut rest = text;
    while let Some(open) = rest.find([INLINE_OPEN, BLOCK_OPEN]) {
        let Some(close) = rest[open..].find(CLOSE) else {
            break;
        };
        let end = open + close + CLOSE.len_utf8();
        kept.push_str(&rest[open..end]);
        rest = &rest[end..];
    }
    kept
}

/// Byte ranges of protected regions in `input`, in order, non-overlapping.
///
/// Code blocks and code spans come from the markdown parser. The leading
/// frontmatter block and `<pre>` blocks are found by line scanning.
fn regions(input: &str) -> Vec<Region> {
    let body_start = frontmatter_len(input);
    let body = &input[body_start..];

    let mut found = Vec::new();
    if body_start > 0 {
        found.push(Region::block(0..body_start));
    }
    for (event, range) in Parser::new_ext(body, markdown_options()).into_offset_iter() {
        let range = body_start + range.start..body_start + range.end;
        match event {
            Event::Start(Tag::CodeBlock(_)) => found.push(Region::block(range)),
            Event::Code(_) => found.push(Region::inline(range)),
            _ => {}
        }
    }
    found.extend(pre_blocks(input, body_start).map(Region::block));

    found.sort_by_key(|r| (r.range.start, std::cmp::Reverse(r.range.end)));
    let mut merged: Vec<Region> = Vec::with_capacity(found.len());
    for region in found {
        if merged.last().is_some_and(|last| region.range.start < last.range.end) {
            continue;
        }
        merged.push(region);
    }
    merged
}

/// Extensions that change where code spans may appear.
fn markdown_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_HEADING_ATTRIBUTES
        | Options::ENABLE_GFM
}

#[derive(Debug)]
struct Region {
    range: Range<usize>,
    kind: Kind,
}

impl Region {
    fn block(range: Range<usize>) -> Self {
        Self {
            range,
            kind: Kind::Block,
        }
    }

    fn inline(range: Range<usize>) -> Self {
        Self {
            range,
            kind: Kind::Inline,
        }
    }
}

/// Length of a leading `---` frontmatter block, closing line included.
fn frontmatter_len(input: &str) -> usize {
    let mut lines = input.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return 0;
    };
    if first.trim_end_matches(['\n', '\r']) != "---" {
        return 0;
    }
    let mut len = first.len();
    for line in lines {
        len += line.len();
        if matches!(line.trim_end(), "---" | "...") {
            return len;
        }
    }
    0
}

/// Ranges of `<pre>` blocks opening at the start of a line.
///
/// A block runs to the first `</pre>` and takes the rest of that line when it
/// is blank.
fn pre_blocks(input: &str, from: usize) -> impl Iterator<Item = Range<usize>> + '_ {
    let mut offset = from;
    std::iter::from_fn(move || {
        while offset < input.len() {
            let line_start = offset;
            let line_end = input[offset..].find('\n').map_or(input.len(), |i| offset + i + 1);
            offset = line_end;

            let trimmed = input[line_start..line_end].trim_start();
            if !opens_pre(trimmed) {
                continue;
            }
            let close = input[line_start..].to_ascii_lowercase().find("</pre>")?;
            let mut end = line_start + close + "</pre>".len();
            let tail_end = input[end..].find('\n').map_or(input.len(), |i| end + i + 1);
            if input[end..tail_end].trim().is_empty() {
                end = tail_end;
            }
            offset = end;
            return Some(line_start..end);
        }
        None
    })
}

fn opens_pre(line: &str) -> bool {
    line.get(..4).is_some_and(|head| head.eq_ignore_ascii_case("<pre"))
        && line[4..].starts_with(|c: char| c == '>' || c.is_whitespace())
}
