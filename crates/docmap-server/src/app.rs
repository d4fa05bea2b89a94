//! Router construction.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::security;
use crate::state::AppState;

/// Create the application router.
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/api/projects", get(handlers::projects::get_projects))
        .route("/api/navigation", get(handlers::navigation::get_navigation))
        .route(
            "/api/projects/{project}/navigation",
            get(handlers::navigation::get_project_navigation),
        )
        .route("/api/pages/", get(handlers::pages::get_root_page))
        .route("/api/pages/{*path}", get(handlers::pages::get_page))
        .route(
            "/api/projects/{project}/pages/",
            get(handlers::pages::get_project_root_page),
        )
        .route(
            "/api/projects/{project}/pages/{*path}",
            get(handlers::pages::get_project_page),
        );

    Router::new()
        .merge(api_routes)
        .fallback(handlers::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(security::content_security_policy())
                .layer(security::no_sniff())
                .layer(security::deny_framing()),
        )
        .with_state(state)
}
