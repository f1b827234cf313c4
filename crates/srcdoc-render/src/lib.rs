//! External document renderer invocation for srcdoc.
//!
//! The renderer turning assembled markup into the final document is an
//! external collaborator. [`Renderer`] is the seam the pipeline calls through:
//!
//! - [`AsciiDocCommand`]: runs an AsciiDoc-compatible command-line program
//!
//! Tests substitute their own [`Renderer`] implementations.

mod asciidoc;
mod attribute;

use std::path::Path;
use std::process::ExitStatus;

pub use asciidoc::{AsciiDocCommand, DEFAULT_PROGRAM};
pub use attribute::Attribute;

/// Everything a renderer needs besides the input text and destination.
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    /// Output backend (e.g. "html", "docbook").
    pub backend: &'a str,
    /// Document attributes in the order supplied.
    pub attributes: &'a [Attribute],
    /// Opaque options forwarded to the renderer in order.
    pub options: &'a [String],
}

/// Renders assembled markup into a document.
///
/// Implementations must be deterministic: equal inputs produce equal bytes.
/// The render cache relies on this.
pub trait Renderer {
    /// Render `input` and write the result to the file at `destination`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if the renderer cannot be started or fails.
    /// The content of `destination` is unspecified after a failure.
    fn render(
        &self,
        input: &str,
        destination: &Path,
        request: &RenderRequest<'_>,
    ) -> Result<(), RenderError>;
}

impl<R: Renderer + ?Sized> Renderer for &R {
    fn render(
        &self,
        input: &str,
        destination: &Path,
        request: &RenderRequest<'_>,
    ) -> Result<(), RenderError> {
        (**self).render(input, destination, request)
    }
}

/// Error returned by a [`Renderer`].
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The renderer program could not be started.
    #[error("failed to run renderer '{program}': {source}")]
    Spawn {
        /// Program that was executed.
        program: String,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },
    /// The renderer ran but reported failure.
    #[error("renderer '{program}' failed ({status}): {stderr}")]
    Failed {
        /// Program that was executed.
        program: String,
        /// Exit status of the program.
        status: ExitStatus,
        /// Captured standard error, trimmed.
        stderr: String,
    },
    /// I/O error while talking to the renderer.
    #[error("renderer I/O error: {0}")]
    Io(#[from] std::io::Error),
}
