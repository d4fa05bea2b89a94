//! Page maps, route resolution and page rendering for docmap.
//!
//! This crate turns an enumerated document set plus a declarative
//! [`CategorySpec`](docmap_config::CategorySpec) into a navigation tree and a
//! [`RouteTable`], resolves request paths against them, and renders resolved
//! documents through the sanitizer and a [`Compiler`](docmap_renderer::Compiler).
//!
//! # Quick Start
//!
//! ```ignore
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! use docmap_renderer::HtmlCompiler;
//! use docmap_site::{Project, Site};
//! use docmap_storage_fs::FsStorage;
//!
//! let storage = Arc::new(FsStorage::new(PathBuf::from("docs")));
//! let site = Site::new(storage, Arc::new(HtmlCompiler::new()), vec![Project::new("docs")]);
//!
//! // Navigation tree of the default project
//! let tree = site.navigation(None)?;
//!
//! // Render a page
//! let page = site.render(None, &["guide", "setup"])?;
//! println!("{}", page.document.html);
//! ```
//!
//! # Building page maps directly
//!
//! [`PageMap::build`] is a pure function of the document set, the categories and
//! [`BuildOptions`]; it does no I/O and can be called concurrently.

mod page_map;
mod resolver;
mod route;
mod route_table;
mod site;

pub use page_map::{
    Breadcrumb, BuildOptions, GroupEntry, NavigationNode, PageMap, PruneReason, PrunedEntry,
};
pub use resolver::{Resolution, route_key};
pub use route::{normalize_route, slugify};
pub use route_table::{RouteEntry, RouteSource, RouteTable};
pub use site::{PageRenderResult, Project, RenderError, Site};
