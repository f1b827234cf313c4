//! srcdoc CLI - render documentation embedded in source files.
//!
//! Provides commands for:
//! - default: extract, render (through the render cache) and print a document
//! - `extract`: print the assembled renderer input
//! - `cache stats` / `cache prune` / `cache clear`: inspect and trim the cache

mod commands;
mod error;
mod output;

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{CacheCommand, ExtractArgs, RenderArgs};
use error::CliError;
use output::Output;

/// srcdoc - render documentation embedded in source files.
#[derive(Parser)]
#[command(name = "srcdoc", version, about, args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    render: RenderArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the assembled renderer input without rendering.
    Extract(ExtractArgs),
    /// Render cache maintenance.
    #[command(subcommand)]
    Cache(CacheCommand),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let verbose = match &cli.command {
        None => cli.render.verbose,
        Some(Commands::Extract(args)) => args.verbose,
        Some(Commands::Cache(cmd)) => cmd.verbose(),
    };
    let errors = match &cli.command {
        None => cli.render.errors.as_deref(),
        Some(_) => None,
    };

    if let Err(err) = init_tracing(verbose, errors) {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }

    let result = match cli.command {
        None => cli.render.execute(),
        Some(Commands::Extract(args)) => args.execute(),
        Some(Commands::Cache(cmd)) => cmd.execute(),
    };

    if let Err(err) = result {
        tracing::error!("{err}");
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

/// Initialize tracing.
///
/// `--verbose` enables DEBUG level, otherwise use `RUST_LOG` or default to WARN.
/// Diagnostics go to `errors` when given, otherwise to stderr.
fn init_tracing(verbose: bool, errors: Option<&Path>) -> Result<(), CliError> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match errors {
        Some(path) => {
            let file = File::create(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_bare_arguments_select_render() {
        let cli = Cli::try_parse_from(["srcdoc", "input.c", "--verbose"]).unwrap();

        assert!(cli.command.is_none());
        assert!(cli.render.verbose);
    }

    #[test]
    fn test_subcommands_parse() {
        let cli = Cli::try_parse_from(["srcdoc", "extract", "--numbered", "input.c"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Extract(_))));

        let cli = Cli::try_parse_from(["srcdoc", "cache", "prune", "--max-size", "1024"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Cache(CacheCommand::Prune { .. }))));
    }
}
