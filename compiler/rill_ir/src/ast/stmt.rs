//! Statement nodes.

use super::operators::DeclKind;
use super::{CaseRange, CatchId, DeclRange, ExprId, FuncId, PatternId, StmtId, StmtRange};
use crate::Span;

/// Statement node.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Stmt { kind, span }
    }
}

/// One declarator of a variable declaration: `pattern = init`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Declarator {
    pub pattern: PatternId,
    /// `ExprId::INVALID` = no initializer (binds `undefined`).
    pub init: ExprId,
}

/// One `case`/`default` clause of a switch statement.
///
/// Bodies are flat statement lists so execution can fall through from a
/// matched case into the following clauses until a `break`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SwitchCase {
    /// `ExprId::INVALID` = the `default` clause.
    pub test: ExprId,
    pub body: StmtRange,
}

/// A `catch` clause: optional binding pattern plus the handler block.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CatchClause {
    /// `PatternId::INVALID` = `catch { ... }` without a binding.
    pub param: PatternId,
    pub body: StmtRange,
}

/// Statement variants.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum StmtKind {
    /// Expression statement
    Expr(ExprId),

    /// `var`/`let`/`const` declaration with one or more declarators.
    VarDecl { kind: DeclKind, decls: DeclRange },

    /// Hoisted function declaration.
    FunctionDecl(FuncId),

    /// `return` / `return expr` (`ExprId::INVALID` = bare return).
    Return(ExprId),

    /// `if (cond) cons` with optional `else` (`StmtId::INVALID` = none).
    If {
        cond: ExprId,
        cons: StmtId,
        alt: StmtId,
    },

    /// Braced block.
    Block(StmtRange),

    /// `while (cond) body`
    While { cond: ExprId, body: StmtId },

    /// `do body while (cond);`
    DoWhile { body: StmtId, cond: ExprId },

    /// C-style `for`. All header slots optional via `INVALID`.
    For {
        /// VarDecl or Expr statement, or `StmtId::INVALID`.
        init: StmtId,
        test: ExprId,
        update: ExprId,
        body: StmtId,
    },

    /// `for (kind pattern in object) body` — iterates keys.
    ForIn {
        kind: DeclKind,
        pattern: PatternId,
        object: ExprId,
        body: StmtId,
    },

    /// `for (kind pattern of iterable) body` — iterates values.
    ForOf {
        kind: DeclKind,
        pattern: PatternId,
        iterable: ExprId,
        body: StmtId,
    },

    /// `break;`
    Break,

    /// `continue;`
    Continue,

    /// `switch (disc) { cases }` with fall-through clause bodies.
    Switch { disc: ExprId, cases: CaseRange },

    /// `throw expr;`
    Throw(ExprId),

    /// `try { block } catch (param) { ... } finally { ... }`
    Try {
        block: StmtRange,
        /// `CatchId::INVALID` = no catch clause.
        handler: CatchId,
        /// `StmtRange`; `has_finally` distinguishes an absent finalizer
        /// from an empty one.
        finalizer: StmtRange,
        has_finally: bool,
    },

    /// Lone semicolon.
    Empty,
}
