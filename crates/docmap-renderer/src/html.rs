//! Default [`Compiler`] producing HTML with pulldown-cmark.

use std::collections::HashMap;

use pulldown_cmark::{CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::compiler::{CompileError, CompiledDocument, Compiler, TocEntry};
use crate::frontmatter;
use crate::transform::TransformedDocument;
use crate::validate::check_raw_html;

/// Markdown to HTML compiler.
///
/// Extracts frontmatter, enforces the component-syntax contract on raw HTML,
/// assigns heading ids and collects the table of contents.
#[derive(Clone, Debug)]
pub struct HtmlCompiler {
    gfm: bool,
}

impl Default for HtmlCompiler {
    fn default() -> Self {
        Self { gfm: true }
    }
}

impl HtmlCompiler {
    /// Create a compiler with GitHub Flavored Markdown enabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable GitHub Flavored Markdown features.
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    fn options(&self) -> Options {
        let base = Options::ENABLE_HEADING_ATTRIBUTES;
        if self.gfm {
            base | Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_GFM
        } else {
            base
        }
    }
}

impl Compiler for HtmlCompiler {
    fn compile(
        &self,
        doc: &TransformedDocument,
        path: &str,
    ) -> Result<CompiledDocument, CompileError> {
        let split = frontmatter::split(doc.as_str())?;
        let options = self.options();

        check_raw_html(split.body, split.body_line_offset, options).inspect_err(|e| {
            tracing::debug!(path, error = %e, "Raw HTML rejected");
        })?;

        let mut events: Vec<Event<'_>> = Parser::new_ext(split.body, options).collect();
        let headings = assign_heading_ids(&mut events);

        let mut html = String::with_capacity(split.body.len() * 3 / 2);
        pulldown_cmark::html::push_html(&mut html, events.into_iter());

        let first_h1 = headings.iter().position(|h| h.depth == 1);
        let title = split
            .metadata
            .get("title")
            .and_then(|t| t.as_str())
            .map(str::to_owned)
            .or_else(|| first_h1.map(|i| headings[i].text.clone()));
        let toc = headings
            .into_iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != first_h1)
            .map(|(_, h)| h)
            .collect();

        Ok(CompiledDocument {
            html,
            toc,
            title,
            metadata: split.metadata,
        })
    }
}

/// Give every heading a unique id and return them in document order.
///
/// Explicit `{#id}` attributes are kept. Generated ids are slugs of the
/// heading text; repeats get `-1`, `-2`, ... suffixes.
fn assign_heading_ids(events: &mut [Event<'_>]) -> Vec<TocEntry> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut entries = Vec::new();

    let mut i = 0;
    while i < events.len() {
        let Event::Start(Tag::Heading { level, .. }) = &events[i] else {
            i += 1;
            continue;
        };
        let depth = heading_level_to_num(*level);

        let mut text = String::new();
        let mut end = i + 1;
        while end < events.len() && !matches!(events[end], Event::End(TagEnd::Heading(_))) {
            if let Event::Text(t) | Event::Code(t) = &events[end] {
                text.push_str(t);
            }
            end += 1;
        }
        let text = text.trim().to_owned();

        if let Event::Start(Tag::Heading { id, .. }) = &mut events[i] {
            let assigned = match id {
                Some(explicit) => explicit.to_string(),
                None => {
                    let generated = unique_id(&mut counts, &slugify(&text));
                    *id = Some(CowStr::from(generated.clone()));
                    generated
                }
            };
            entries.push(TocEntry {
                id: assigned,
                text,
                depth,
            });
        }
        i = end + 1;
    }
    entries
}

fn unique_id(counts: &mut HashMap<String, usize>, base: &str) -> String {
    let base = if base.is_empty() { "section" } else { base };
    let count = counts.entry(base.to_owned()).or_default();
    let id = match *count {
        0 => base.to_owned(),
        n => format!("{base}-{n}"),
    };
    *count += 1;
    id
}

/// Convert heading text to an anchor slug.
///
/// Lowercases, turns whitespace, dashes and underscores into single dashes,
/// and drops other punctuation.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut result = String::new();
    let mut last_was_dash = true;

    for c in text.trim().chars() {
        if c.is_alphanumeric() {
            result.extend(c.to_lowercase());
            last_was_dash = false;
        } else if !last_was_dash && (c.is_whitespace() || c == '-' || c == '_') {
            result.push('-');
            last_was_dash = true;
        }
    }

    if result.ends_with('-') {
        result.pop();
    }
    result
}

fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
