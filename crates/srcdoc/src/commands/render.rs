//! Default command: render a source file through the cache.

use std::path::PathBuf;

use clap::Args;
use srcdoc_config::{CliSettings, Config};
use srcdoc_pipeline::{CacheStatus, Pipeline, PipelineConfig};
use srcdoc_render::AsciiDocCommand;

use super::{open_input, open_output};
use crate::error::CliError;

/// Arguments for rendering a source file.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Source file to read (default: stdin).
    input: Option<PathBuf>,

    /// File to write the rendered document to (default: stdout).
    output: Option<PathBuf>,

    /// File receiving diagnostics (default: stderr).
    pub errors: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover srcdoc.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Prefix code lines with running line numbers.
    #[arg(long)]
    numbered: bool,

    /// Disable the render cache.
    #[arg(long)]
    no_cache: bool,

    /// Cache size ceiling in bytes (overrides config).
    #[arg(long, value_name = "BYTES")]
    cache_size: Option<u64>,

    /// Cache directory (overrides config).
    #[arg(long, value_name = "DIR", env = "SRCDOC_CACHE_DIR")]
    cache_dir: Option<String>,

    /// Start delimiter of documentation blocks (overrides config).
    #[arg(long, value_name = "TAG", allow_hyphen_values = true)]
    start: Option<String>,

    /// End delimiter of documentation blocks (overrides config).
    #[arg(long, value_name = "TAG", allow_hyphen_values = true)]
    end: Option<String>,

    /// Document attribute as NAME=VALUE (repeatable, order is kept).
    #[arg(short, long = "attribute", value_name = "NAME=VALUE")]
    attributes: Vec<String>,

    /// Renderer backend (overrides config).
    #[arg(short, long)]
    backend: Option<String>,

    /// Renderer program (overrides config).
    #[arg(long, value_name = "PROGRAM")]
    renderer: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Options forwarded untouched to the renderer.
    #[arg(last = true, value_name = "RENDERER_OPTIONS")]
    renderer_options: Vec<String>,
}

impl RenderArgs {
    /// Settings overriding the configuration file.
    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            start: self.start.clone(),
            end: self.end.clone(),
            numbered: self.numbered.then_some(true),
            cache_enabled: self.no_cache.then_some(false),
            cache_dir: self.cache_dir.clone(),
            cache_size: self.cache_size,
            program: self.renderer.clone(),
            backend: self.backend.clone(),
            attributes: self.attributes.clone(),
            options: self.renderer_options.clone(),
        }
    }

    /// Render the input and write the document to the output.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, the input cannot be read, or
    /// rendering fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let config = Config::load(self.config.as_deref(), Some(&self.cli_settings()))?;

        let renderer =
            AsciiDocCommand::new(config.render.program.clone()).with_args(config.render.args.clone());
        let pipeline = Pipeline::new(PipelineConfig::from_config(&config), renderer)?;

        let mut input = open_input(self.input.as_deref())?;
        let mut output = open_output(self.output.as_deref())?;
        let report = pipeline.run(&mut input, &mut output)?;

        let status = match report.cache {
            CacheStatus::Hit => "hit",
            CacheStatus::Miss => "miss",
            CacheStatus::Disabled => "disabled",
        };
        tracing::info!(cache = status, bytes = report.bytes_written, "document rendered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: RenderArgs,
    }

    fn parse(args: &[&str]) -> RenderArgs {
        TestCli::try_parse_from(std::iter::once("srcdoc").chain(args.iter().copied()))
            .unwrap()
            .args
    }

    #[test]
    fn test_defaults_override_nothing() {
        let settings = parse(&[]).cli_settings();

        assert_eq!(settings.start, None);
        assert_eq!(settings.numbered, None);
        assert_eq!(settings.cache_enabled, None);
        assert_eq!(settings.cache_size, None);
        assert!(settings.attributes.is_empty());
        assert!(settings.options.is_empty());
    }

    #[test]
    fn test_positional_streams() {
        let args = parse(&["in.c", "out.html", "errors.log"]);

        assert_eq!(args.input, Some(PathBuf::from("in.c")));
        assert_eq!(args.output, Some(PathBuf::from("out.html")));
        assert_eq!(args.errors, Some(PathBuf::from("errors.log")));
    }

    #[test]
    fn test_attributes_and_passthrough_options_keep_order() {
        let settings = parse(&[
            "in.c",
            "-a",
            "toc",
            "--attribute",
            "icons=font",
            "--",
            "--no-header-footer",
            "-s",
        ])
        .cli_settings();

        assert_eq!(settings.attributes, vec!["toc", "icons=font"]);
        assert_eq!(settings.options, vec!["--no-header-footer", "-s"]);
    }

    #[test]
    fn test_flags_map_to_settings() {
        let settings = parse(&[
            "--numbered",
            "--no-cache",
            "--cache-size",
            "2048",
            "--start",
            "#",
            "--end",
            "#",
            "-b",
            "docbook",
            "--renderer",
            "asciidoctor",
        ])
        .cli_settings();

        assert_eq!(settings.numbered, Some(true));
        assert_eq!(settings.cache_enabled, Some(false));
        assert_eq!(settings.cache_size, Some(2048));
        assert_eq!(settings.start.as_deref(), Some("#"));
        assert_eq!(settings.end.as_deref(), Some("#"));
        assert_eq!(settings.backend.as_deref(), Some("docbook"));
        assert_eq!(settings.program.as_deref(), Some("asciidoctor"));
    }
}
