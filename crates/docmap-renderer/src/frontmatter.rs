//! YAML frontmatter extraction.

use crate::compiler::{CompileError, Metadata};

/// Document split into frontmatter and body.
#[derive(Debug)]
pub(crate) struct Split<'a> {
    /// Parsed frontmatter fields (empty when absent).
    pub metadata: Metadata,
    /// Markdown after the frontmatter block.
    pub body: &'a str,
    /// Number of source lines before `body`.
    pub body_line_offset: usize,
}

/// Split a leading `---` YAML block from `text`.
///
/// Text without a closed frontmatter block is returned whole as the body.
pub(crate) fn split(text: &str) -> Result<Split<'_>, CompileError> {
    let Some((yaml, body, offset)) = locate(text) else {
        return Ok(Split {
            metadata: Metadata::new(),
            body: text,
            body_line_offset: 0,
        });
    };

    let value: serde_yaml::Value = serde_yaml::from_str(yaml).map_err(|e| {
        let line = e.location().map_or(1, |l| l.line() + 1);
        CompileError::at(format!("invalid frontmatter: {e}"), line)
    })?;

    let metadata = match value {
        serde_yaml::Value::Null => Metadata::new(),
        serde_yaml::Value::Mapping(_) => match serde_json::to_value(value) {
            Ok(serde_json::Value::Object(map)) => map,
            Ok(_) => Metadata::new(),
            Err(e) => return Err(CompileError::at(format!("invalid frontmatter: {e}"), 1)),
        },
        _ => return Err(CompileError::at("frontmatter must be a mapping", 1)),
    };

    Ok(Split {
        metadata,
        body,
        body_line_offset: offset,
    })
}

/// Returns (yaml, body, lines consumed) for a closed frontmatter block.
fn locate(text: &str) -> Option<(&str, &str, usize)> {
    let mut lines = text.split_inclusive('\n');
    let first = lines.next()?;
    if first.trim_end_matches(['\n', '\r']) != "---" {
        return None;
    }

    let yaml_start = first.len();
    let mut pos = yaml_start;
    let mut count = 1;
    for line in lines {
        count += 1;
        if matches!(line.trim_end(), "---" | "...") {
            return Some((&text[yaml_start..pos], &text[pos + line.len()..], count));
        }
        pos += line.len();
    }
    None
}
