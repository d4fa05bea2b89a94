//! CLI command implementations.

pub(crate) mod check;
pub(crate) mod render;
pub(crate) mod routes;
pub(crate) mod serve;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use docmap_config::{CliSettings, Config, OriginConfig};
use docmap_renderer::HtmlCompiler;
use docmap_site::Site;
use docmap_storage::Storage;
use docmap_storage_fs::FsStorage;
use docmap_storage_remote::RemoteStorage;

use crate::error::CliError;

pub(crate) use check::CheckArgs;
pub(crate) use render::RenderArgs;
pub(crate) use routes::RoutesArgs;
pub(crate) use serve::ServeArgs;

/// Configuration arguments shared by every command.
#[derive(Args, Debug, Default)]
pub(crate) struct ConfigArgs {
    /// Path to configuration file (default: auto-discover docmap.toml).
    #[arg(short, long, env = "DOCMAP_CONFIG")]
    config: Option<PathBuf>,

    /// Documentation source directory (overrides config).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,
}

impl ConfigArgs {
    /// Load configuration, letting command-line values win.
    pub(crate) fn load(self, host: Option<String>, port: Option<u16>) -> Result<Config, CliError> {
        let settings = CliSettings {
            host,
            port,
            source_dir: self.source_dir,
        };
        let config = Config::load(self.config.as_deref(), Some(&settings))?;
        tracing::debug!(path = ?config.config_path, projects = config.projects.len(), "Loaded configuration");
        Ok(config)
    }
}

/// Storage for the configured origin.
pub(crate) fn open_storage(origin: &OriginConfig) -> Arc<dyn Storage> {
    match origin {
        OriginConfig::Local(local) => Arc::new(FsStorage::new(local.source_dir.clone())),
        OriginConfig::Remote(remote) => Arc::new(RemoteStorage::new(remote_origin(remote))),
    }
}

fn remote_origin(config: &docmap_config::RemoteOrigin) -> docmap_storage_remote::RemoteOrigin {
    docmap_storage_remote::RemoteOrigin {
        owner: config.owner.clone(),
        repo: config.repo.clone(),
        revision: config.revision.clone(),
        base_path: config.base_path.clone(),
        token: config.token.clone(),
        api_url: config.api_url.clone(),
        raw_url: config.raw_url.clone(),
        timeout: Duration::from_secs(config.timeout_secs),
    }
}

/// Site over the configured origin with the HTML compiler.
pub(crate) fn open_site(config: &Config) -> Site {
    Site::from_config(
        open_storage(&config.origin),
        Arc::new(HtmlCompiler::new()),
        config,
    )
}

/// Human-readable origin description.
pub(crate) fn describe_origin(origin: &OriginConfig) -> String {
    match origin {
        OriginConfig::Local(local) => format!("Source directory: {}", local.source_dir.display()),
        OriginConfig::Remote(remote) => {
            let base = if remote.base_path.is_empty() {
                String::new()
            } else {
                format!(" ({})", remote.base_path)
            };
            format!(
                "Remote origin: {}/{}@{}{base}",
                remote.owner, remote.repo, remote.revision
            )
        }
    }
}
