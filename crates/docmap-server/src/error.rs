//! Error types for the HTTP server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use docmap_site::RenderError;
use serde_json::json;

/// Server error type.
///
/// Every variant maps to a JSON body; none produce a bare 500 for content
/// problems.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Unknown project id.
    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    /// No document for the route.
    #[error("Page not found: {0}")]
    PageNotFound(String),

    /// Content origin failed.
    #[error("Origin unavailable: {0}")]
    Origin(String),

    /// The compiler rejected the document.
    #[error("Document unavailable: {path}: {message}")]
    Unavailable {
        /// Source document.
        path: String,
        /// Compiler diagnostic.
        message: String,
        /// 1-based source line, when known.
        line: Option<usize>,
    },

    /// Blocking task failed to complete.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RenderError> for ServerError {
    fn from(e: RenderError) -> Self {
        match e {
            RenderError::ProjectNotFound(id) => Self::ProjectNotFound(id),
            RenderError::PageNotFound(route) => Self::PageNotFound(route),
            RenderError::Origin(e) => Self::Origin(e.to_string()),
            RenderError::Unavailable { path, source } => Self::Unavailable {
                path: path.to_string(),
                message: source.message,
                line: source.line,
            },
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::ProjectNotFound(id) => (
                StatusCode::NOT_FOUND,
                json!({"error": "Project not found", "project": id}),
            ),
            Self::PageNotFound(path) => (
                StatusCode::NOT_FOUND,
                json!({"error": "Page not found", "path": path}),
            ),
            Self::Origin(message) => (
                StatusCode::BAD_GATEWAY,
                json!({"error": "Origin unavailable", "detail": message}),
            ),
            Self::Unavailable {
                path,
                message,
                line,
            } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({
                    "error": "Document unavailable",
                    "path": path,
                    "detail": message,
                    "line": line,
                }),
            ),
            Self::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": message}),
            ),
        };

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use docmap_renderer::CompileError;
    use docmap_storage::{DocumentPath, StorageError, StorageErrorKind};

    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (ServerError::ProjectNotFound("x".into()), StatusCode::NOT_FOUND),
            (ServerError::PageNotFound("x".into()), StatusCode::NOT_FOUND),
            (ServerError::Origin("down".into()), StatusCode::BAD_GATEWAY),
            (
                ServerError::Unavailable {
                    path: "a.md".into(),
                    message: "unclosed tag <div>".into(),
                    line: Some(3),
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
        ];
        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[test]
    fn test_from_render_error() {
        let origin: ServerError =
            RenderError::Origin(StorageError::new(StorageErrorKind::Timeout)).into();
        assert!(matches!(origin, ServerError::Origin(_)));

        let unavailable: ServerError = RenderError::Unavailable {
            path: DocumentPath::parse("guide.md").unwrap(),
            source: CompileError::at("unclosed tag <div>", 7),
        }
        .into();
        assert!(matches!(
            unavailable,
            ServerError::Unavailable { ref path, line: Some(7), .. } if path == "guide.md"
        ));
    }
}
