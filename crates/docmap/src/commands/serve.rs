//! `docmap serve` command implementation.

use std::sync::Arc;

use clap::Args;
use docmap_server::{ServerConfig, run_server};

use super::{ConfigArgs, describe_origin, open_site};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    port: Option<u16>,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the server fails to start.
    pub(crate) async fn execute(self, version: &str, output: &Output) -> Result<(), CliError> {
        let config = self.config.load(self.host, self.port)?;
        let site = open_site(&config);

        output.info(&format!(
            "Starting server on {}:{}",
            config.server.host, config.server.port
        ));
        output.info(&describe_origin(&config.origin));
        let ids: Vec<&str> = site.projects().iter().map(|p| p.id.as_str()).collect();
        output.info(&format!(
            "Projects: {} (default: {})",
            ids.join(", "),
            site.default_project().id
        ));

        let server_config = ServerConfig {
            version: version.to_owned(),
            ..ServerConfig::from(&config.server)
        };
        run_server(server_config, Arc::new(site))
            .await
            .map_err(|e| CliError::Server(e.to_string()))
    }
}
