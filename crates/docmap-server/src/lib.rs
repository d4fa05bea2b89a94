//! HTTP server for the docmap documentation pipeline.
//!
//! Serves JSON endpoints over a [`Site`]:
//! - `GET /api/projects` lists projects and marks the default
//! - `GET /api/navigation` and `GET /api/projects/{project}/navigation`
//!   return the navigation tree
//! - `GET /api/pages/{*path}` and `GET /api/projects/{project}/pages/{*path}`
//!   return a rendered page
//!
//! Site operations block on the content origin, so handlers run them on the
//! blocking thread pool.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use docmap_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let site = Arc::new(build_site());
//!     let config = ServerConfig {
//!         host: "127.0.0.1".to_string(),
//!         port: 7878,
//!         version: "0.1.0".to_string(),
//!     };
//!
//!     run_server(config, site).await.unwrap();
//! }
//! ```

mod app;
mod error;
mod handlers;
mod middleware;
mod state;

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

use axum::Router;
use docmap_site::Site;

pub use error::ServerError;
use state::AppState;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Application version, mixed into page `ETag`s.
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 7878,
            version: String::new(),
        }
    }
}

impl From<&docmap_config::ServerConfig> for ServerConfig {
    fn from(config: &docmap_config::ServerConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            ..Self::default()
        }
    }
}

/// Build the application router for `site`.
pub fn router(site: Arc<Site>, version: impl Into<String>) -> Router {
    app::create_router(Arc::new(AppState {
        site,
        version: version.into(),
    }))
}

/// Run the server until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the address is invalid or the listener fails.
pub async fn run_server(
    config: ServerConfig,
    site: Arc<Site>,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = router(site, config.version);

    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;
    tracing::info!(address = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for Ctrl-C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}
