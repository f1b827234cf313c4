//! Documentation block extraction for srcdoc.
//!
//! Source files carry documentation markup inside delimited regions such as
//! `/*{ ... }*/`. This crate splits raw source text into an ordered sequence of
//! code and documentation segments, then assembles those segments into the
//! text handed to the external document renderer:
//!
//! - [`Segmenter`]: scans text for delimited documentation regions
//! - [`assemble`]: serializes segments with fenced code blocks and optional
//!   running line numbers
//!
//! # Example
//!
//! ```
//! use srcdoc_extract::{Segmenter, assemble};
//!
//! let segmenter = Segmenter::new("/*", "*/").unwrap();
//! let segments = segmenter.segment("int x;\n/*{Some *docs*.}*/\nint y;\n");
//! let text = assemble(&segments, false);
//!
//! assert_eq!(text, "----\nint x;\n----\nSome *docs*.\n----\nint y;\n----\n");
//! ```

mod assemble;
mod segment;

pub use assemble::{FENCE, LineCounter, assemble, assemble_into};
pub use segment::{Segment, Segmenter};

/// Error building a [`Segmenter`].
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// The delimiter pattern could not be compiled.
    #[error("invalid delimiter pattern: {0}")]
    Pattern(#[from] regex::Error),
}
