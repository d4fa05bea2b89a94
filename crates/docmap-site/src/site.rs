//! Per-project page maps and page rendering.
//!
//! [`Site`] ties a content origin, the configured projects and a
//! [`Compiler`] together. It holds no document state: every call
//! re-enumerates the origin and rebuilds the page map, so results always
//! reflect the origin as it is now.

use std::sync::Arc;

use docmap_config::{CategorySpec, Config, ProjectConfig};
use docmap_renderer::{CompileError, CompiledDocument, Compiler, TransformReport, transform};
use docmap_storage::{DocumentPath, Storage, StorageError, StorageErrorKind};
use serde::Serialize;

use crate::page_map::{Breadcrumb, BuildOptions, NavigationNode, PageMap};
use crate::resolver::{Resolution, route_key};
use crate::route::normalize_route;

/// One documentation project served from the origin.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Project {
    /// Identifier used in URLs.
    pub id: String,
    /// Directory inside the origin holding the project's documents.
    pub root: String,
    /// Top-level folder reachable only through aliases.
    pub hidden_root: Option<String>,
    /// Navigation shape.
    pub spec: CategorySpec,
}

impl Project {
    /// Project rooted at the origin root with an empty spec.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Set the navigation spec.
    #[must_use]
    pub fn with_spec(mut self, spec: CategorySpec) -> Self {
        self.spec = spec;
        self
    }

    /// Set the directory inside the origin.
    #[must_use]
    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.root = root.into().trim_matches('/').to_owned();
        self
    }

    /// Set the hidden root folder.
    #[must_use]
    pub fn with_hidden_root(mut self, hidden_root: impl Into<String>) -> Self {
        self.hidden_root = Some(hidden_root.into());
        self
    }
}

impl From<&ProjectConfig> for Project {
    fn from(config: &ProjectConfig) -> Self {
        Self {
            id: config.id.clone(),
            root: config.root.trim_matches('/').to_owned(),
            hidden_root: config.hidden_root.clone(),
            spec: config.categories.clone(),
        }
    }
}

/// Result of rendering a page.
#[derive(Clone, Debug, Serialize)]
pub struct PageRenderResult {
    /// Project the page belongs to.
    pub project: String,
    /// Normalized route that was requested.
    pub route: String,
    /// Resolved document, relative to the project root.
    pub path: DocumentPath,
    /// Compiler output.
    pub document: CompiledDocument,
    /// Folders leading to the page in the navigation tree.
    pub breadcrumbs: Vec<Breadcrumb>,
    /// Sanitization rules that changed the source.
    pub rules: TransformReport,
}

/// Error returned when a site operation fails.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// No project with this id.
    #[error("Project not found: {0}")]
    ProjectNotFound(String),
    /// No document for the requested route.
    #[error("Page not found: {0}")]
    PageNotFound(String),
    /// Content origin failed.
    #[error(transparent)]
    Origin(#[from] StorageError),
    /// The compiler rejected the document.
    #[error("Document unavailable: {path}")]
    Unavailable {
        /// Document that failed to compile.
        path: DocumentPath,
        /// Compiler diagnostic.
        #[source]
        source: CompileError,
    },
}

/// Content origin plus projects plus compiler.
pub struct Site {
    storage: Arc<dyn Storage>,
    compiler: Arc<dyn Compiler>,
    projects: Vec<Project>,
    default: usize,
}

impl Site {
    /// Create a site serving `projects`.
    ///
    /// The first project is the default until [`Site::with_default`] picks
    /// another. An empty list gets a single project rooted at the origin.
    #[must_use]
    pub fn new(
        storage: Arc<dyn Storage>,
        compiler: Arc<dyn Compiler>,
        mut projects: Vec<Project>,
    ) -> Self {
        if projects.is_empty() {
            projects.push(Project::new(docmap_config::DEFAULT_PROJECT_ID));
        }
        Self {
            storage,
            compiler,
            projects,
            default: 0,
        }
    }

    /// Create a site from loaded configuration.
    #[must_use]
    pub fn from_config(
        storage: Arc<dyn Storage>,
        compiler: Arc<dyn Compiler>,
        config: &Config,
    ) -> Self {
        let projects = config.projects.iter().map(Project::from).collect();
        let site = Self::new(storage, compiler, projects);
        match config.default_project() {
            Some(project) => site.with_default(&project.id),
            None => site,
        }
    }

    /// Make the project with `id` the default. Unknown ids are ignored.
    #[must_use]
    pub fn with_default(mut self, id: &str) -> Self {
        if let Some(index) = self.projects.iter().position(|p| p.id == id) {
            self.default = index;
        }
        self
    }

    /// Configured projects.
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    /// The default project.
    pub fn default_project(&self) -> &Project {
        &self.projects[self.default]
    }

    /// Project by id, or the default for `None`.
    pub fn project(&self, id: Option<&str>) -> Result<&Project, RenderError> {
        match id {
            None => Ok(self.default_project()),
            Some(id) => self
                .projects
                .iter()
                .find(|p| p.id == id)
                .ok_or_else(|| RenderError::ProjectNotFound(id.to_owned())),
        }
    }

    /// Enumerate the origin and build the project's page map.
    pub fn page_map(&self, project: Option<&str>) -> Result<PageMap, RenderError> {
        let project = self.project(project)?;
        let paths = self.storage.scan().inspect_err(|e| {
            tracing::warn!(project = %project.id, error = %e, "Failed to enumerate origin");
        })?;

        let options = BuildOptions {
            hidden_root: project.hidden_root.clone(),
        };
        let scoped = paths.iter().filter_map(|p| p.strip_prefix(&project.root));
        let map = PageMap::build(scoped, &project.spec, &options);

        tracing::info!(
            project = %project.id,
            backend = self.storage.backend(),
            documents = map.documents().len(),
            routes = map.routes().len(),
            "Enumerated documents"
        );
        Ok(map)
    }

    /// Navigation tree of a project.
    pub fn navigation(&self, project: Option<&str>) -> Result<Vec<NavigationNode>, RenderError> {
        Ok(self.page_map(project)?.into_tree())
    }

    /// Resolve request segments to a document of a project.
    pub fn resolve<S: AsRef<str>>(
        &self,
        project: Option<&str>,
        segments: &[S],
    ) -> Result<Resolution, RenderError> {
        Ok(self.page_map(project)?.resolve(segments))
    }

    /// Resolve, fetch, sanitize and compile a page.
    pub fn render<S: AsRef<str>>(
        &self,
        project: Option<&str>,
        segments: &[S],
    ) -> Result<PageRenderResult, RenderError> {
        let map = self.page_map(project)?;
        let project = self.project(project)?;
        let route = route_key(segments).map(|k| normalize_route(&k));

        let Some(path) = map.resolve(segments).found() else {
            let requested = route.unwrap_or_else(|| {
                segments
                    .iter()
                    .map(|s| s.as_ref())
                    .collect::<Vec<_>>()
                    .join("/")
            });
            return Err(RenderError::PageNotFound(requested));
        };
        let route = route.unwrap_or_default();

        let raw = self
            .storage
            .read(&path.with_prefix(&project.root))
            .map_err(|e| match e.kind {
                StorageErrorKind::NotFound => RenderError::PageNotFound(route.clone()),
                _ => RenderError::Origin(e),
            })?;

        let transformed = transform(&raw);
        let document = self
            .compiler
            .compile(&transformed, path.as_str())
            .map_err(|source| {
                tracing::warn!(path = %path, error = %source, "Document rejected by compiler");
                RenderError::Unavailable {
                    path: path.clone(),
                    source,
                }
            })?;

        Ok(PageRenderResult {
            project: project.id.clone(),
            breadcrumbs: map.breadcrumbs(&route),
            route,
            path,
            document,
            rules: transformed.report().clone(),
        })
    }
}
