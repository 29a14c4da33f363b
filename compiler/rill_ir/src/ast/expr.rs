//! Expression nodes.

use super::operators::{AssignOp, BinaryOp, LogicalOp, UnaryOp, UpdateOp};
use super::{ElemRange, ExprId, FuncId, PartRange, PropRange};
use crate::{Name, Span};

/// Expression node.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }
}

/// One interpolation segment of a template literal: `${expr}text_after`.
///
/// `text_after` is the cooked text between this interpolation's `}` and the
/// next `${` (or the closing backtick).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TemplatePart {
    pub expr: ExprId,
    pub text_after: Name,
}

/// An object-literal property. Shorthand (`{ name }`) and method shorthand
/// (`{ greet() {...} }`) are desugared by the parser to a key/value pair.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Property {
    pub key: Name,
    pub value: ExprId,
}

/// One element of an array literal or argument list.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Element {
    pub expr: ExprId,
    /// `...expr` spread element.
    pub spread: bool,
}

/// Expression variants. All children are arena indices.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ExprKind {
    /// Number literal: `42`, `3.14`, `123e-5`
    Number(f64),

    /// BigInt literal: `9007199254740991n`
    BigInt(i64),

    /// String literal (cooked, interned)
    Str(Name),

    /// Template literal without interpolation (cooked)
    TemplateFull(Name),

    /// Template literal with interpolation: head text plus parts.
    Template { head: Name, parts: PartRange },

    /// Boolean literal
    Bool(bool),

    /// `null`
    Null,

    /// Variable reference
    Ident(Name),

    /// `this`
    This,

    /// Array literal, possibly with spread elements: `[a, ...rest, b]`
    Array(ElemRange),

    /// Object literal: `{ name: "John", age: 30 }`
    Object(PropRange),

    /// Function expression, declaration value, or arrow function.
    Function(FuncId),

    /// Prefix unary operation
    Unary { op: UnaryOp, operand: ExprId },

    /// `++x`, `x--`, ...
    Update {
        op: UpdateOp,
        prefix: bool,
        target: ExprId,
    },

    /// Arithmetic/comparison binary operation
    Binary {
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
    },

    /// Short-circuiting `&&` / `||`; evaluates to an operand, not a bool.
    Logical {
        op: LogicalOp,
        left: ExprId,
        right: ExprId,
    },

    /// Ternary conditional
    Conditional {
        cond: ExprId,
        consequent: ExprId,
        alternate: ExprId,
    },

    /// Assignment (plain or compound) to an identifier/member/index target.
    Assign {
        op: AssignOp,
        target: ExprId,
        value: ExprId,
    },

    /// Named member access: `obj.prop`
    Member { object: ExprId, property: Name },

    /// Computed member access: `obj[expr]`
    Index { object: ExprId, index: ExprId },

    /// Call: `callee(args...)`; args may contain spread elements.
    Call { callee: ExprId, args: ElemRange },

    /// Constructor call: `new Callee(args...)`
    New { callee: ExprId, args: ElemRange },

    /// `await expr`
    Await(ExprId),
}
