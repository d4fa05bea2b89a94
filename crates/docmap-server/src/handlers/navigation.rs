//! Navigation API endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use docmap_site::NavigationNode;
use serde::Serialize;

use crate::error::ServerError;
use crate::handlers::blocking;
use crate::state::AppState;

/// Response for the navigation endpoints.
#[derive(Serialize)]
pub(crate) struct NavigationResponse {
    /// Project the tree belongs to.
    project: String,
    /// Navigation tree.
    items: Vec<NavigationNode>,
}

/// Handle GET /api/navigation.
pub(crate) async fn get_navigation(
    State(state): State<Arc<AppState>>,
) -> Result<Json<NavigationResponse>, ServerError> {
    navigation(state, None).await
}

/// Handle GET /api/projects/{project}/navigation.
pub(crate) async fn get_project_navigation(
    Path(project): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<NavigationResponse>, ServerError> {
    navigation(state, Some(project)).await
}

async fn navigation(
    state: Arc<AppState>,
    project: Option<String>,
) -> Result<Json<NavigationResponse>, ServerError> {
    blocking(move || {
        let id = state.site.project(project.as_deref())?.id.clone();
        let items = state.site.navigation(Some(&id))?;
        Ok(Json(NavigationResponse { project: id, items }))
    })
    .await
}
