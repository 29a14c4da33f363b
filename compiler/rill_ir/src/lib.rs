//! rill IR - shared data structures for the rill interpreter.
//!
//! This crate holds everything the lexer, parser, and evaluator agree on:
//!
//! - [`Span`]: byte-offset source locations
//! - [`Name`] + [`StringInterner`]: interned identifiers and literals
//! - [`Token`] / [`TokenKind`] / [`TokenList`]: lexer output
//! - [`ast`]: the arena-allocated AST (`u32` indices, no boxes)

pub mod ast;
mod interner;
mod name;
mod span;
mod token;

pub use ast::{
    Arena, AssignOp, BinaryOp, CaseRange, CatchClause, CatchId, DeclKind, DeclRange, Declarator,
    ElemRange, Element, Expr, ExprId, ExprKind, FuncId, FunctionBody, FunctionDef, FunctionKind,
    LogicalOp, Param, ParamRange, PartRange, Pattern, PatternId, PatternKind, PatternProp,
    PatternPropRange, PatternRange, Program, PropRange, Property, SharedArena, Stmt, StmtId,
    StmtKind, StmtRange, SwitchCase, TemplatePart, UnaryOp, UpdateOp,
};
pub use interner::StringInterner;
pub use name::Name;
pub use span::{line_col, LineCol, Span};
pub use token::{Token, TokenKind, TokenList};
