//! docmap CLI - documentation ingestion pipeline.
//!
//! Provides commands for:
//! - `serve`: Start the HTTP server
//! - `check`: Report navigation entries pruned against the origin
//! - `routes`: Print the route table of a project
//! - `render`: Render one route and print a summary or the HTML

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{CheckArgs, RenderArgs, RoutesArgs, ServeArgs};
use error::CliError;
use output::Output;

/// Application version from Cargo.toml.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// docmap - documentation ingestion pipeline.
#[derive(Parser)]
#[command(name = "docmap", version, about)]
struct Cli {
    /// Enable verbose output (info-level logs).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server.
    Serve(ServeArgs),
    /// Report navigation entries whose documents are missing.
    Check(CheckArgs),
    /// Print the route table.
    Routes(RoutesArgs),
    /// Render one route.
    Render(RenderArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Serve(args) => tokio::runtime::Runtime::new()
            .map_err(CliError::from)
            .and_then(|rt| rt.block_on(args.execute(VERSION, &output))),
        Commands::Check(args) => args.execute(&output),
        Commands::Routes(args) => args.execute(&output),
        Commands::Render(args) => args.execute(&output),
    };

    if let Err(err) = result {
        report(&output, &err);
        std::process::exit(1);
    }
}

/// Print an error and the causes its message does not already include.
fn report(output: &Output, err: &CliError) {
    let message = err.to_string();
    output.error(&format!("Error: {message}"));

    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            output.error(&format!("  caused by: {text}"));
        }
        source = cause.source();
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_serve_overrides() {
        let cli = Cli::try_parse_from(["docmap", "serve", "--port", "9000", "--host", "0.0.0.0"])
            .unwrap();

        assert!(matches!(cli.command, Commands::Serve(_)));
        assert!(!cli.verbose);
    }

    #[test]
    fn test_parse_global_verbose_after_subcommand() {
        let cli = Cli::try_parse_from(["docmap", "routes", "--json", "-v"]).unwrap();

        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Routes(_)));
    }

    #[test]
    fn test_parse_render_defaults_to_root() {
        let cli = Cli::try_parse_from(["docmap", "render"]).unwrap();

        assert!(matches!(cli.command, Commands::Render(_)));
    }

    #[test]
    fn test_unknown_subcommand_rejected() {
        assert!(Cli::try_parse_from(["docmap", "build"]).is_err());
    }
}
