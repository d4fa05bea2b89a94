//! HTTP request handlers.

pub(crate) mod navigation;
pub(crate) mod pages;
pub(crate) mod projects;

use axum::http::Uri;

use crate::error::ServerError;

/// Convert a route key (no leading slash) to a URL path.
pub(crate) fn to_url_path(route: &str) -> String {
    format!("/{route}")
}

/// Run a blocking site operation off the async runtime.
pub(crate) async fn blocking<T, F>(f: F) -> Result<T, ServerError>
where
    F: FnOnce() -> Result<T, ServerError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?
}

/// JSON 404 for unknown endpoints.
pub(crate) async fn not_found(uri: Uri) -> ServerError {
    ServerError::PageNotFound(uri.path().to_owned())
}
