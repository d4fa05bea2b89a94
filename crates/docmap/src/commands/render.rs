//! `docmap render` command implementation.

use clap::Args;
use docmap_site::PageRenderResult;

use super::{ConfigArgs, open_site};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Route to render, e.g. `guide/setup` (empty for the project root).
    #[arg(default_value = "")]
    route: String,

    /// Project id (default: the default project).
    #[arg(long)]
    project: Option<String>,

    /// Print the rendered HTML instead of a summary.
    #[arg(long)]
    html: bool,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if the route is unknown or the document cannot be
    /// read or compiled.
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let config = self.config.load(None, None)?;
        let site = open_site(&config);
        let segments: Vec<&str> = self.route.split('/').collect();
        let page = site.render(self.project.as_deref(), &segments)?;

        if self.html {
            output.data(&page.document.html);
        } else {
            output.highlight(&format!("/{}", page.route));
            for line in summary(&page) {
                output.data(&line);
            }
        }
        Ok(())
    }
}

/// Summary lines for a rendered page.
fn summary(page: &PageRenderResult) -> Vec<String> {
    let mut lines = vec![
        format!("Title:  {}", page.document.title.as_deref().unwrap_or("(none)")),
        format!("Source: {}", page.path),
    ];

    let fired: Vec<&str> = page.rules.fired().iter().map(|rule| rule.as_str()).collect();
    if fired.is_empty() {
        lines.push("Rules:  none".to_owned());
    } else {
        lines.push(format!("Rules:  {}", fired.join(", ")));
    }

    if !page.breadcrumbs.is_empty() {
        let trail: Vec<&str> = page.breadcrumbs.iter().map(|b| b.name.as_str()).collect();
        lines.push(format!("Trail:  {}", trail.join(" > ")));
    }

    for entry in &page.document.toc {
        let indent = "  ".repeat(usize::from(entry.depth.saturating_sub(1)));
        lines.push(format!("  {indent}{} (#{})", entry.text, entry.id));
    }
    lines
}
