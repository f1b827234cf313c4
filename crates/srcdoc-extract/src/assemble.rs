//! Renderer input assembly.
//!
//! Code segments become listing blocks bracketed by [`FENCE`] lines,
//! documentation segments are copied verbatim. With numbering enabled every
//! code line is prefixed with a running, zero-padded line number that keeps
//! counting across documentation segments.

use std::fmt::Write;

use crate::Segment;

/// Fence line bracketing a block of source code in the assembled document.
pub const FENCE: &str = "----";

/// Separator between a line number and the source line.
const NUMBER_SEPARATOR: &str = "    ";

/// Running line number shared by all code segments of one assembly pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineCounter {
    next: usize,
}

impl LineCounter {
    /// Create a counter starting at line 1.
    #[must_use]
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Number assigned to the next emitted line.
    #[must_use]
    pub fn peek(&self) -> usize {
        self.next
    }

    /// Return the current line number and advance.
    pub fn advance(&mut self) -> usize {
        let current = self.next;
        self.next += 1;
        current
    }
}

impl Default for LineCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Assemble segments into renderer input using a fresh [`LineCounter`].
#[must_use]
pub fn assemble(segments: &[Segment<'_>], numbered: bool) -> String {
    let mut out = String::new();
    assemble_into(&mut out, segments, numbered, &mut LineCounter::new());
    out
}

/// Append assembled segments to `out`, numbering lines from `counter`.
///
/// The counter advances once per code line whether or not numbering is
/// enabled, so callers assembling a document in several calls get continuous
/// numbering by passing the same counter.
pub fn assemble_into(
    out: &mut String,
    segments: &[Segment<'_>],
    numbered: bool,
    counter: &mut LineCounter,
) {
    for segment in segments {
        match segment {
            Segment::Code(lines) if lines.is_empty() => {}
            Segment::Code(lines) => {
                out.push_str(FENCE);
                out.push('\n');
                for line in lines {
                    let number = counter.advance();
                    if numbered {
                        // Writing to a String cannot fail
                        let _ = write!(out, "{number:02}{NUMBER_SEPARATOR}");
                    }
                    out.push_str(line);
                    out.push('\n');
                }
                out.push_str(FENCE);
                out.push('\n');
            }
            Segment::Doc(text) => {
                out.push_str(text);
                out.push('\n');
            }
        }
    }
}
