//! Parse error type.

use rill_ir::{Span, Token};
use std::fmt;

/// A parse failure: what was expected, what was found, and where.
///
/// The parser reports one error per `parse` call — the first token that
/// cannot belong to the grammar aborts the phase.
#[derive(Clone, Debug, PartialEq)]
pub struct ParseError {
    /// Human-readable expected-set, e.g. "`;`" or "an expression".
    pub expected: String,
    /// Description of the actual token.
    pub found: &'static str,
    pub span: Span,
}

impl ParseError {
    /// Error at a specific token.
    pub fn unexpected(expected: impl Into<String>, found: &Token) -> Self {
        ParseError {
            expected: expected.into(),
            found: found.kind.describe(),
            span: found.span,
        }
    }

    /// Error with a free-form message anchored at a span.
    ///
    /// Used for structural problems (invalid assignment target, malformed
    /// template interpolation) where "expected X, found Y" does not fit.
    pub fn message(message: impl Into<String>, span: Span) -> Self {
        ParseError {
            expected: message.into(),
            found: "",
            span,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.found.is_empty() {
            write!(f, "{}", self.expected)
        } else {
            write!(f, "expected {}, found {}", self.expected, self.found)
        }
    }
}

impl std::error::Error for ParseError {}
