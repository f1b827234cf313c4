//! CLI error types.

use srcdoc_cache::CacheError;
use srcdoc_config::ConfigError;
use srcdoc_extract::ExtractError;
use srcdoc_pipeline::PipelineError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Extract(#[from] ExtractError),

    #[error("{0}")]
    Pipeline(#[from] PipelineError),

    #[error("{0}")]
    Cache(#[from] CacheError),
}
