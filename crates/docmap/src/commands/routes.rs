//! `docmap routes` command implementation.

use clap::Args;

use super::{ConfigArgs, open_site};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the routes command.
#[derive(Args)]
pub(crate) struct RoutesArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Project id (default: the default project).
    #[arg(long)]
    project: Option<String>,

    /// Print the route table as JSON.
    #[arg(long)]
    json: bool,
}

impl RoutesArgs {
    /// Execute the routes command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration or enumeration fails.
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let config = self.config.load(None, None)?;
        let site = open_site(&config);
        let map = site.page_map(self.project.as_deref())?;

        if self.json {
            output.data(&serde_json::to_string_pretty(map.routes())?);
            return Ok(());
        }

        for (key, entry) in map.routes().iter() {
            output.data(&format!("/{key}\t{}\t{}", entry.path, entry.source.as_str()));
        }
        Ok(())
    }
}
