//! Component-syntax checks for raw HTML embedded in markdown.
//!
//! A component compiler is stricter than a browser: every element must be
//! closed, void elements must self-close, `style` takes an object, and
//! `<script>` is not markup at all. Violations are reported with the source
//! line so authors can fix the document.

use std::sync::LazyLock;

use pulldown_cmark::{Event, Options, Parser};
use regex::Regex;

use crate::compiler::CompileError;
use crate::transform::tags::{CLOSE_TAG_RE, OPEN_TAG_RE, OpenTag, is_void};

/// Comments or anything shaped like a tag.
static TAG_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->|</?[A-Za-z][^<>]*>").unwrap());

/// Element opened but not yet closed.
struct Open {
    name: String,
    line: usize,
}

/// Check raw HTML in `body` against the component-syntax contract.
///
/// `line_offset` is the number of source lines preceding `body`.
pub(crate) fn check_raw_html(
    body: &str,
    line_offset: usize,
    options: Options,
) -> Result<(), CompileError> {
    let mut stack: Vec<Open> = Vec::new();

    for (event, range) in Parser::new_ext(body, options).into_offset_iter() {
        let (Event::Html(html) | Event::InlineHtml(html)) = event else {
            continue;
        };
        let base_line = line_offset + body[..range.start].matches('\n').count() + 1;

        for token in TAG_TOKEN_RE.find_iter(&html) {
            let line = base_line + html[..token.start()].matches('\n').count();
            let text = token.as_str();
            if text.starts_with("<!--") {
                continue;
            }
            if text.starts_with("</") {
                check_close(text, line, &mut stack)?;
            } else {
                check_open(text, line, &mut stack)?;
            }
        }
    }

    match stack.pop() {
        Some(open) => Err(CompileError::at(
            format!("unclosed tag <{}>", open.name),
            open.line,
        )),
        None => Ok(()),
    }
}

fn check_open(text: &str, line: usize, stack: &mut Vec<Open>) -> Result<(), CompileError> {
    let caps = OPEN_TAG_RE
        .captures(text)
        .filter(|c| c[0].len() == text.len())
        .ok_or_else(|| CompileError::at(format!("malformed tag {text}"), line))?;
    let tag = OpenTag::from_captures(&caps);

    if tag.name.eq_ignore_ascii_case("script") {
        return Err(CompileError::at("<script> elements are not supported", line));
    }
    if tag
        .attrs
        .iter()
        .any(|a| a.name.eq_ignore_ascii_case("style") && a.is_quoted())
    {
        return Err(CompileError::at(
            format!("style attribute on <{}> must be an object, not a string", tag.name),
            line,
        ));
    }
    if is_void(&tag.name) {
        if !tag.self_closing {
            return Err(CompileError::at(
                format!("void element <{}> must be self-closing", tag.name),
                line,
            ));
        }
        return Ok(());
    }
    if !tag.self_closing {
        stack.push(Open {
            name: tag.name,
            line,
        });
    }
    Ok(())
}

fn check_close(text: &str, line: usize, stack: &mut Vec<Open>) -> Result<(), CompileError> {
    let caps = CLOSE_TAG_RE
        .captures(text)
        .ok_or_else(|| CompileError::at(format!("malformed tag {text}"), line))?;
    let name = &caps[1];

    if is_void(name) {
        return Err(CompileError::at(
            format!("void element </{name}> cannot have a closing tag"),
            line,
        ));
    }
    match stack.last() {
        Some(open) if open.name == name => {
            stack.pop();
            Ok(())
        }
        Some(open) if stack.iter().any(|o| o.name == name) => Err(CompileError::at(
            format!("expected </{}> but found </{name}>", open.name),
            line,
        )),
        _ => Err(CompileError::at(
            format!("unexpected closing tag </{name}>"),
            line,
        )),
    }
}
