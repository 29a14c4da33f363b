//! Binding patterns for declarations, parameters, and catch clauses.

use super::{ExprId, PatternId, PatternPropRange, PatternRange};
use crate::{Name, Span};

/// A binding pattern with an optional default expression.
///
/// Defaults apply when the matched value is `undefined`:
/// `let { name = "anon" } = obj;`
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pattern {
    pub kind: PatternKind,
    /// `ExprId::INVALID` = no default.
    pub default: ExprId,
    pub span: Span,
}

impl Pattern {
    pub fn new(kind: PatternKind, span: Span) -> Self {
        Pattern {
            kind,
            default: ExprId::INVALID,
            span,
        }
    }

    #[must_use]
    pub fn with_default(mut self, default: ExprId) -> Self {
        self.default = default;
        self
    }
}

/// One property of an object pattern: `{ key: binding }`.
///
/// Shorthand `{ name }` has `binding` pointing at an `Ident(name)` pattern.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PatternProp {
    pub key: Name,
    pub binding: PatternId,
}

/// Pattern variants.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PatternKind {
    /// Plain identifier binding.
    Ident(Name),

    /// Array destructuring: `[a, b]`, optionally with `...rest`.
    Array {
        elements: PatternRange,
        /// `PatternId::INVALID` = no rest element.
        rest: PatternId,
    },

    /// Object destructuring: `{ name, age: years }`.
    Object(PatternPropRange),
}
