//! Projects API endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::state::AppState;

/// Response for GET /api/projects.
#[derive(Serialize)]
pub(crate) struct ProjectsResponse {
    projects: Vec<ProjectItem>,
}

#[derive(Serialize)]
struct ProjectItem {
    id: String,
    default: bool,
}

/// Handle GET /api/projects.
pub(crate) async fn get_projects(State(state): State<Arc<AppState>>) -> Json<ProjectsResponse> {
    let default = &state.site.default_project().id;
    let projects = state
        .site
        .projects()
        .iter()
        .map(|p| ProjectItem {
            id: p.id.clone(),
            default: &p.id == default,
        })
        .collect();
    Json(ProjectsResponse { projects })
}
