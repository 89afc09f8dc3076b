//! Parsed form of one `{declaration(parameter):payload}` occurrence.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Byte span of a verb inside the source string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// One brace form, split into declaration, optional parameter, and optional
/// payload. `original` is the exact substring the verb was parsed from, so a
/// declined verb can re-emit verbatim. `depth` is the brace-nesting depth at
/// the opening brace (0 for a top-level verb).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verb {
    pub declaration: String,
    pub parameter: Option<String>,
    pub payload: Option<String>,
    pub original: String,
    pub span: Span,
    pub depth: usize,
}

impl Verb {
    pub fn parameter(&self) -> Option<&str> {
        self.parameter.as_deref()
    }

    pub fn payload(&self) -> Option<&str> {
        self.payload.as_deref()
    }
}

impl fmt::Display for Verb {
    /// Reconstructs the canonical parenthesized form, regardless of the
    /// parameter style the verb was parsed with.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}", self.declaration)?;
        if let Some(ref parameter) = self.parameter {
            write!(f, "({})", parameter)?;
        }
        if let Some(ref payload) = self.payload {
            write!(f, ":{}", payload)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verb(declaration: &str, parameter: Option<&str>, payload: Option<&str>) -> Verb {
        Verb {
            declaration: declaration.to_string(),
            parameter: parameter.map(String::from),
            payload: payload.map(String::from),
            original: String::new(),
            span: Span::new(0, 0),
            depth: 0,
        }
    }

    #[test]
    fn display_reconstructs_full_form() {
        let v = verb("if", Some("1==1"), Some("yes|no"));
        assert_eq!(v.to_string(), "{if(1==1):yes|no}");
    }

    #[test]
    fn display_omits_absent_parts() {
        assert_eq!(verb("delete", None, None).to_string(), "{delete}");
        assert_eq!(verb("args", Some("1"), None).to_string(), "{args(1)}");
        assert_eq!(verb("strf", None, Some("%Y")).to_string(), "{strf:%Y}");
    }
}
