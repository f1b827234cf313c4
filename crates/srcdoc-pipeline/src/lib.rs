//! Extract, render and cache pipeline for srcdoc.
//!
//! [`Pipeline`] turns one source file into one rendered document:
//!
//! 1. read the raw input
//! 2. open the cache store, continuing uncached if it is unusable
//! 3. on a cache hit, replay the stored output; otherwise segment and
//!    assemble the source, run the external renderer into a temporary file
//!    in the working directory and move that file into the cache
//! 4. copy the output to the destination stream from an open handle
//! 5. prune the cache to its size ceiling
//!
//! The renderer is supplied by the caller through the
//! [`Renderer`](srcdoc_render::Renderer) trait.

mod config;
mod driver;

pub use config::{CacheSettings, PipelineConfig};
pub use driver::{CacheStatus, Pipeline, RunReport};

/// Error aborting a pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The delimiter pair cannot be turned into a pattern.
    #[error(transparent)]
    Extract(#[from] srcdoc_extract::ExtractError),

    /// The input is not valid UTF-8 text.
    #[error("input is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// Reading input or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The external renderer failed.
    #[error(transparent)]
    Render(#[from] srcdoc_render::RenderError),
}
