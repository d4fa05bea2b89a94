//! Renderer bridge types.

use serde::Serialize;

use crate::transform::TransformedDocument;

/// Frontmatter fields of a document.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Table of contents entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    /// Anchor id of the heading.
    pub id: String,
    /// Heading text.
    pub text: String,
    /// Heading level (1-6).
    pub depth: u8,
}

/// Output of a [`Compiler`].
#[derive(Clone, Debug, Default, Serialize)]
pub struct CompiledDocument {
    /// Rendered content.
    pub html: String,
    /// Headings in document order, page title excluded.
    pub toc: Vec<TocEntry>,
    /// Title from frontmatter `title`, else the first H1.
    pub title: Option<String>,
    /// Frontmatter fields.
    pub metadata: Metadata,
}

/// Structured rejection from a compiler.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{}{message}", .line.map(|l| format!("line {l}: ")).unwrap_or_default())]
pub struct CompileError {
    /// What the compiler rejected.
    pub message: String,
    /// 1-based source line, when known.
    pub line: Option<usize>,
}

impl CompileError {
    /// Error without a location.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
        }
    }

    /// Error at a 1-based source line.
    #[must_use]
    pub fn at(message: impl Into<String>, line: usize) -> Self {
        Self {
            message: message.into(),
            line: Some(line),
        }
    }
}

/// Turns sanitized document text into renderable output.
///
/// Supplied by the host. `path` is the source path, for diagnostics only.
pub trait Compiler: Send + Sync {
    /// Compile one document.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError`] if the document violates the compiler's
    /// syntax contract.
    fn compile(&self, doc: &TransformedDocument, path: &str)
    -> Result<CompiledDocument, CompileError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_error_display() {
        assert_eq!(CompileError::new("bad").to_string(), "bad");
        assert_eq!(
            CompileError::at("unclosed tag <div>", 4).to_string(),
            "line 4: unclosed tag <div>"
        );
    }
}
