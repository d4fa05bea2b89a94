//! Pages API endpoint.
//!
//! Resolves the request path, renders the page and returns JSON with
//! metadata, breadcrumbs, table of contents and HTML content.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use docmap_renderer::{Metadata, TocEntry};
use docmap_site::{Breadcrumb, PageRenderResult};
use md5::{Digest, Md5};
use serde::Serialize;

use crate::error::ServerError;
use crate::handlers::{blocking, to_url_path};
use crate::state::AppState;

/// Response for the page endpoints.
#[derive(Serialize)]
struct PageResponse {
    /// Page metadata.
    meta: PageMeta,
    /// Ancestors of the page, root first.
    breadcrumbs: Vec<BreadcrumbResponse>,
    /// Headings below the title.
    toc: Vec<TocResponse>,
    /// Sanitized page body.
    content: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PageMeta {
    /// Title from frontmatter or the first H1.
    title: Option<String>,
    /// URL path of the requested route.
    path: String,
    /// Project id.
    project: String,
    /// Source document, relative to the project root.
    source_file: String,
    /// Frontmatter fields.
    #[serde(skip_serializing_if = "Metadata::is_empty")]
    metadata: Metadata,
}

#[derive(Serialize)]
struct BreadcrumbResponse {
    title: String,
    path: String,
}

impl From<Breadcrumb> for BreadcrumbResponse {
    fn from(item: Breadcrumb) -> Self {
        Self {
            title: item.name,
            path: to_url_path(&item.route),
        }
    }
}

#[derive(Serialize)]
struct TocResponse {
    level: u8,
    title: String,
    id: String,
}

impl From<TocEntry> for TocResponse {
    fn from(entry: TocEntry) -> Self {
        Self {
            level: entry.depth,
            title: entry.text,
            id: entry.id,
        }
    }
}

impl From<PageRenderResult> for PageResponse {
    fn from(result: PageRenderResult) -> Self {
        let document = result.document;
        Self {
            meta: PageMeta {
                title: document.title,
                path: to_url_path(&result.route),
                project: result.project,
                source_file: result.path.to_string(),
                metadata: document.metadata,
            },
            breadcrumbs: result
                .breadcrumbs
                .into_iter()
                .map(BreadcrumbResponse::from)
                .collect(),
            toc: document.toc.into_iter().map(TocResponse::from).collect(),
            content: document.html,
        }
    }
}

/// Handle GET /api/pages/ (default project root).
pub(crate) async fn get_root_page(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    page(state, None, String::new(), headers).await
}

/// Handle GET /api/pages/{path}.
pub(crate) async fn get_page(
    Path(path): Path<String>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    page(state, None, path, headers).await
}

/// Handle GET /api/projects/{project}/pages/.
pub(crate) async fn get_project_root_page(
    Path(project): Path<String>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    page(state, Some(project), String::new(), headers).await
}

/// Handle GET /api/projects/{project}/pages/{path}.
pub(crate) async fn get_project_page(
    Path((project, path)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    page(state, Some(project), path, headers).await
}

async fn page(
    state: Arc<AppState>,
    project: Option<String>,
    path: String,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    blocking(move || render_page(&state, project.as_deref(), &path, &headers)).await
}

fn render_page(
    state: &AppState,
    project: Option<&str>,
    path: &str,
    headers: &HeaderMap,
) -> Result<Response, ServerError> {
    let segments: Vec<&str> = path.split('/').collect();
    let result = state
        .site
        .render(project, &segments)
        .inspect_err(|e| tracing::debug!(path, error = %e, "Page request failed"))?;

    let etag = compute_etag(&state.version, &result.document.html);

    if headers
        .get(header::IF_NONE_MATCH)
        .is_some_and(|value| etag_matches(value, &etag))
    {
        return Ok((StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response());
    }

    Ok((
        [
            (header::ETAG, etag),
            (header::CACHE_CONTROL, "private, max-age=60".to_owned()),
        ],
        Json(PageResponse::from(result)),
    )
        .into_response())
}

/// True if an `If-None-Match` value lists `etag` or `*`.
fn etag_matches(value: &HeaderValue, etag: &str) -> bool {
    value.to_str().is_ok_and(|list| {
        list.split(',')
            .map(str::trim)
            .any(|candidate| candidate == "*" || candidate == etag)
    })
}

/// Quoted validator over the build version and rendered body.
fn compute_etag(version: &str, content: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(version.as_bytes());
    hasher.update(b":");
    hasher.update(content.as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("\"{}\"", &digest[..16])
}
