//! `docmap check` command implementation.
//!
//! Builds the page map of each project and reports navigation entries that
//! were pruned because the origin no longer matches them.

use clap::Args;
use docmap_site::{PruneReason, PrunedEntry};

use super::{ConfigArgs, open_site};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the check command.
#[derive(Args)]
pub(crate) struct CheckArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Only check this project (default: all projects).
    #[arg(long)]
    project: Option<String>,

    /// Fail if any entry was pruned.
    #[arg(long)]
    strict: bool,
}

impl CheckArgs {
    /// Execute the check command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration or enumeration fails, or in strict
    /// mode if any navigation entry was pruned.
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let config = self.config.load(None, None)?;
        let site = open_site(&config);

        let ids: Vec<String> = match self.project {
            Some(id) => vec![site.project(Some(id.as_str()))?.id.clone()],
            None => site.projects().iter().map(|p| p.id.clone()).collect(),
        };

        let mut drift = 0;
        for id in &ids {
            let map = site.page_map(Some(id.as_str()))?;
            let pruned = map.pruned();
            if pruned.is_empty() {
                output.success(&format!(
                    "{id}: {} documents, {} routes, no drift",
                    map.documents().len(),
                    map.routes().len()
                ));
                continue;
            }
            drift += pruned.len();
            output.warning(&format!("{id}: {} pruned entries", pruned.len()));
            for entry in pruned {
                output.detail(&format!("  {}", describe(entry)));
            }
        }

        if self.strict && drift > 0 {
            return Err(CliError::Validation(format!(
                "{drift} navigation entries do not match the origin"
            )));
        }
        Ok(())
    }
}

fn describe(entry: &PrunedEntry) -> String {
    match &entry.reason {
        PruneReason::InvalidPath => format!("{}: invalid path", entry.entry),
        PruneReason::Missing => format!("{}: missing from origin", entry.entry),
        PruneReason::DuplicateRoute { route } => {
            format!("{}: route /{route} already taken", entry.entry)
        }
        PruneReason::EmptyFolder => format!("{}: empty folder", entry.entry),
        PruneReason::UnroutableTitle => format!("{}: title has no route segment", entry.entry),
    }
}
