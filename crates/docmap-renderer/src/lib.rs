//! Markup sanitization pipeline and renderer bridge.
//!
//! Untrusted documentation text goes through [`transform`], which protects
//! code regions and then strips or rewrites markup a component compiler would
//! reject. The result is handed to a [`Compiler`]; [`HtmlCompiler`] is the
//! built-in one.
//!
//! # Example
//!
//! ```
//! use docmap_renderer::{Compiler, HtmlCompiler, transform};
//!
//! let doc = transform("# Hello\n\n<p><div>{{ draft }}hi<br></div></p>\n");
//! let compiled = HtmlCompiler::new().compile(&doc, "hello.md").unwrap();
//!
//! assert_eq!(compiled.title.as_deref(), Some("Hello"));
//! assert!(compiled.html.contains("<br />"));
//! ```

mod compiler;
mod frontmatter;
mod html;
mod transform;
mod validate;

pub use compiler::{CompileError, CompiledDocument, Compiler, Metadata, TocEntry};
pub use html::{HtmlCompiler, slugify};
pub use transform::{Rule, TransformReport, TransformedDocument, transform};
