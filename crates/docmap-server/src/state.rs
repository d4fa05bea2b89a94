//! Application state.

use std::sync::Arc;

use docmap_site::Site;

/// State shared across all handlers.
pub(crate) struct AppState {
    /// Projects, origin and compiler.
    pub(crate) site: Arc<Site>,
    /// Application version for `ETag` computation.
    pub(crate) version: String,
}
