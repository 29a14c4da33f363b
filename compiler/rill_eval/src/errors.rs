//! Evaluation errors and control-flow signals.
//!
//! Runtime failures use the JavaScript taxonomy: `ReferenceError`,
//! `TypeError`, `SyntaxError` (redeclaration), `RangeError`, and user-level
//! `throw` values. `break`/`continue`/`return` are not errors but ride the
//! same channel as signals, unwound by the nearest loop, switch, or call
//! boundary — `finally` blocks run for both alike.

use rill_ir::Span;
use std::fmt;

use crate::value::Value;

/// Result of evaluating a node.
pub type EvalResult = Result<Value, EvalError>;

/// Control flow signals for break, continue, and return.
#[derive(Clone, Debug)]
pub enum ControlFlow {
    Break,
    Continue,
    Return(Value),
}

/// Error category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    /// Unresolved identifier.
    Reference,
    /// Wrong-type operation (calling a non-function, const reassignment,
    /// property read of `null`/`undefined`).
    Type,
    /// Structural error caught at runtime (lexical redeclaration).
    Syntax,
    /// Out-of-range condition (call stack overflow, bad array length).
    Range,
    /// User-level `throw`; the value is in `EvalError::thrown`.
    Thrown,
    /// Not an error: a break/continue/return signal in flight.
    Control,
}

impl EvalErrorKind {
    /// The JavaScript error constructor name for this kind.
    pub fn error_name(&self) -> &'static str {
        match self {
            EvalErrorKind::Reference => "ReferenceError",
            EvalErrorKind::Type => "TypeError",
            EvalErrorKind::Syntax => "SyntaxError",
            EvalErrorKind::Range => "RangeError",
            EvalErrorKind::Thrown => "Error",
            EvalErrorKind::Control => "Error",
        }
    }
}

/// An evaluation failure (or control-flow signal) in flight.
#[derive(Clone, Debug)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    pub message: String,
    /// Where the failure originated; set once at the failing node.
    pub span: Option<Span>,
    /// Break/continue/return payload when `kind` is `Control`.
    pub control_flow: Option<ControlFlow>,
    /// The thrown value when `kind` is `Thrown`.
    pub thrown: Option<Value>,
}

impl EvalError {
    fn new(kind: EvalErrorKind, message: String) -> Self {
        EvalError {
            kind,
            message,
            span: None,
            control_flow: None,
            thrown: None,
        }
    }

    /// Attach a source span unless one is already set.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span.get_or_insert(span);
        self
    }

    /// True for break/continue/return signals.
    #[inline]
    pub fn is_control_flow(&self) -> bool {
        self.control_flow.is_some()
    }

    /// True for conditions a `catch` clause can observe (everything except
    /// control-flow signals).
    #[inline]
    pub fn is_catchable(&self) -> bool {
        !self.is_control_flow()
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.error_name(), self.message)
    }
}

impl std::error::Error for EvalError {}

// Factory constructors. All #[cold]: errors are the exceptional path.

/// Unresolved identifier.
#[cold]
pub fn reference_error(name: &str) -> EvalError {
    EvalError::new(EvalErrorKind::Reference, format!("{name} is not defined"))
}

/// Generic type error.
#[cold]
pub fn type_error(message: impl Into<String>) -> EvalError {
    EvalError::new(EvalErrorKind::Type, message.into())
}

/// Assignment to a `const` binding.
#[cold]
pub fn const_assign(name: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::Type,
        format!("Assignment to constant variable '{name}'"),
    )
}

/// Calling a value that is not a function.
#[cold]
pub fn not_callable(type_name: &str) -> EvalError {
    EvalError::new(EvalErrorKind::Type, format!("{type_name} is not a function"))
}

/// Property access through `null`/`undefined`.
#[cold]
pub fn nullish_member_access(base: &str, property: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::Type,
        format!("Cannot read properties of {base} (reading '{property}')"),
    )
}

/// Lexical redeclaration in the same scope.
#[cold]
pub fn redeclaration(name: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::Syntax,
        format!("Identifier '{name}' has already been declared"),
    )
}

/// Generic syntax error surfaced at runtime (JSON.parse).
#[cold]
pub fn syntax_error(message: impl Into<String>) -> EvalError {
    EvalError::new(EvalErrorKind::Syntax, message.into())
}

/// Generic range error.
#[cold]
pub fn range_error(message: impl Into<String>) -> EvalError {
    EvalError::new(EvalErrorKind::Range, message.into())
}

/// Call stack exhaustion.
#[cold]
pub fn stack_overflow() -> EvalError {
    EvalError::new(
        EvalErrorKind::Range,
        "Maximum call stack size exceeded".to_string(),
    )
}

/// A user-level `throw`.
#[cold]
pub fn thrown(value: Value, display: String) -> EvalError {
    let mut err = EvalError::new(EvalErrorKind::Thrown, display);
    err.thrown = Some(value);
    err
}

/// `break` signal.
#[cold]
pub fn break_signal() -> EvalError {
    let mut err = EvalError::new(EvalErrorKind::Control, "break".to_string());
    err.control_flow = Some(ControlFlow::Break);
    err
}

/// `continue` signal.
#[cold]
pub fn continue_signal() -> EvalError {
    let mut err = EvalError::new(EvalErrorKind::Control, "continue".to_string());
    err.control_flow = Some(ControlFlow::Continue);
    err
}

/// `return` signal carrying the return value.
#[cold]
pub fn return_signal(value: Value) -> EvalError {
    let mut err = EvalError::new(EvalErrorKind::Control, "return".to_string());
    err.control_flow = Some(ControlFlow::Return(value));
    err
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_js_error_names() {
        assert_eq!(
            reference_error("x").to_string(),
            "ReferenceError: x is not defined"
        );
        assert_eq!(
            const_assign("z").to_string(),
            "TypeError: Assignment to constant variable 'z'"
        );
        assert_eq!(
            redeclaration("y").to_string(),
            "SyntaxError: Identifier 'y' has already been declared"
        );
    }

    #[test]
    fn control_signals_are_not_catchable() {
        assert!(break_signal().is_control_flow());
        assert!(!break_signal().is_catchable());
        assert!(thrown(Value::number(1.0), "1".into()).is_catchable());
    }

    #[test]
    fn with_span_sets_only_once() {
        let inner = Span::new(5, 9);
        let outer = Span::new(0, 20);
        let err = type_error("boom").with_span(inner).with_span(outer);
        assert_eq!(err.span, Some(inner));
    }
}
