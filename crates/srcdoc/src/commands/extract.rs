//! `srcdoc extract` command implementation.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Args;
use srcdoc_config::{CliSettings, Config};
use srcdoc_extract::{Segmenter, assemble};

use super::{open_input, open_output};
use crate::error::CliError;

/// Arguments for the extract command.
#[derive(Args)]
pub(crate) struct ExtractArgs {
    /// Source file to read (default: stdin).
    input: Option<PathBuf>,

    /// File to write the assembled text to (default: stdout).
    output: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover srcdoc.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Prefix code lines with running line numbers.
    #[arg(long)]
    numbered: bool,

    /// Start delimiter of documentation blocks (overrides config).
    #[arg(long, value_name = "TAG", allow_hyphen_values = true)]
    start: Option<String>,

    /// End delimiter of documentation blocks (overrides config).
    #[arg(long, value_name = "TAG", allow_hyphen_values = true)]
    end: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl ExtractArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let cli_settings = CliSettings {
            start: self.start,
            end: self.end,
            numbered: self.numbered.then_some(true),
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let segmenter = Segmenter::new(&config.extract.start, &config.extract.end)?;

        let source = io::read_to_string(open_input(self.input.as_deref())?)?;
        let segments = segmenter.segment(&source);
        tracing::debug!(segments = segments.len(), "source segmented");

        let mut output = open_output(self.output.as_deref())?;
        output.write_all(assemble(&segments, config.extract.numbered).as_bytes())?;
        output.flush()?;
        Ok(())
    }
}
