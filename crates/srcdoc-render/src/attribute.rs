//! Document attribute assignments.

use std::fmt;

/// A `name=value` document attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name.
    pub name: String,
    /// Attribute value, empty when none was given.
    pub value: String,
}

impl Attribute {
    /// Parse an assignment, splitting at the first `=`.
    ///
    /// `"toc"` yields an empty value; `"a=b=c"` yields name `a`, value `b=c`.
    #[must_use]
    pub fn parse(assignment: &str) -> Self {
        let (name, value) = assignment.split_once('=').unwrap_or((assignment, ""));
        Self {
            name: name.to_owned(),
            value: value.to_owned(),
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.value.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}={}", self.name, self.value)
        }
    }
}
