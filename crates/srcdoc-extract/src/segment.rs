//! Splitting source text into code and documentation segments.

use regex::Regex;

use crate::ExtractError;

/// A contiguous piece of the input, either source code or documentation.
///
/// A segment sequence always starts and ends with [`Segment::Code`] and
/// documentation segments are always separated by a (possibly empty) code
/// segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Raw source lines found outside any delimiter pair. May be empty.
    Code(Vec<&'a str>),
    /// Text captured between `{` and `}` inside a delimiter pair.
    Doc(&'a str),
}

impl Segment<'_> {
    /// Whether this segment contributes nothing to the assembled output.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Code(lines) if lines.is_empty())
    }
}

/// Scanner for delimited documentation regions.
///
/// Matches `start` + `{` + *content* + `}` + `end`, followed by an optional
/// newline which is consumed with the match. Content is matched lazily and may
/// span lines. Delimiters are matched literally.
#[derive(Debug, Clone)]
pub struct Segmenter {
    pattern: Regex,
}

impl Segmenter {
    /// Build a segmenter for the given delimiter pair.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Pattern`] if the resulting pattern cannot be
    /// compiled (e.g. it exceeds the regex size limit).
    pub fn new(start: &str, end: &str) -> Result<Self, ExtractError> {
        let pattern = format!(
            r"(?s){}\{{(.*?)\}}{}\n?",
            regex::escape(start),
            regex::escape(end)
        );
        Ok(Self {
            pattern: Regex::new(&pattern)?,
        })
    }

    /// Split `text` into alternating code and documentation segments.
    ///
    /// Matches never overlap and scanning always resumes after the previous
    /// match. A start delimiter without a matching `{...}` and end delimiter
    /// stays part of the surrounding code.
    #[must_use]
    pub fn segment<'a>(&self, text: &'a str) -> Vec<Segment<'a>> {
        let mut segments = Vec::new();
        let mut pos = 0;

        for caps in self.pattern.captures_iter(text) {
            let (Some(whole), Some(doc)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            segments.push(code_segment(&text[pos..whole.start()]));
            segments.push(Segment::Doc(doc.as_str()));
            pos = whole.end();
        }

        segments.push(code_segment(&text[pos..]));
        segments
    }
}

fn code_segment(text: &str) -> Segment<'_> {
    Segment::Code(split_lines(text))
}

/// Split at `\n`, `\r\n` and lone `\r`, dropping the terminators.
///
/// A trailing terminator does not start another line.
fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        let end = rest.find(['\n', '\r']).unwrap_or(rest.len());
        lines.push(&rest[..end]);
        let terminator = if rest[end..].starts_with("\r\n") {
            2
        } else {
            usize::from(end < rest.len())
        };
        rest = &rest[end + terminator..];
    }
    lines
}
