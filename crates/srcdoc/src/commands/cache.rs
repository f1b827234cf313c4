//! `srcdoc cache` command implementations.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use srcdoc_cache::CacheStore;
use srcdoc_config::{CliSettings, Config};

use crate::error::CliError;
use crate::output::Output;

/// Render cache maintenance commands.
#[derive(Subcommand)]
pub(crate) enum CacheCommand {
    /// Show the number of entries and total size.
    Stats(CacheArgs),
    /// Evict least-recently-used entries down to the size ceiling.
    Prune {
        #[command(flatten)]
        cache: CacheArgs,
        /// Size ceiling in bytes (default: configured cache size).
        #[arg(long, value_name = "BYTES")]
        max_size: Option<u64>,
    },
    /// Remove every entry.
    Clear(CacheArgs),
}

/// Options shared by all cache commands.
#[derive(Args)]
pub(crate) struct CacheArgs {
    /// Path to configuration file (default: auto-discover srcdoc.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Cache directory (overrides config).
    #[arg(long, value_name = "DIR", env = "SRCDOC_CACHE_DIR")]
    cache_dir: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,
}

impl CacheArgs {
    fn open_store(&self, max_size: Option<u64>) -> Result<CacheStore, CliError> {
        let cli_settings = CliSettings {
            cache_dir: self.cache_dir.clone(),
            cache_size: max_size,
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        Ok(CacheStore::open(
            config.cache_resolved.dir,
            config.cache_resolved.max_size,
        )?)
    }
}

impl CacheCommand {
    /// Whether `--verbose` was given.
    pub(crate) fn verbose(&self) -> bool {
        match self {
            Self::Stats(args) | Self::Clear(args) | Self::Prune { cache: args, .. } => args.verbose,
        }
    }

    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        match self {
            Self::Stats(args) => {
                let store = args.open_store(None)?;
                let stats = store.stats()?;
                output.info(&format!("Cache directory: {}", store.root().display()));
                output.info(&format!("Entries: {}", stats.entries));
                output.info(&format!(
                    "Size: {} / {} bytes",
                    stats.total_bytes,
                    store.max_size()
                ));
            }
            Self::Prune { cache, max_size } => {
                let store = cache.open_store(max_size)?;
                let report = store.prune();
                output.success(&format!(
                    "Removed {} entries ({} bytes), {} bytes remaining",
                    report.removed, report.freed_bytes, report.remaining_bytes
                ));
            }
            Self::Clear(args) => {
                let store = args.open_store(None)?;
                let report = store.evict(0);
                output.success(&format!(
                    "Removed {} entries ({} bytes)",
                    report.removed, report.freed_bytes
                ));
            }
        }

        Ok(())
    }
}
