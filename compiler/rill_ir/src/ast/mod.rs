//! Arena-allocated AST.
//!
//! All child links are `u32` indices into the [`Arena`], not boxes. Optional
//! children use the `INVALID` sentinel of their id type. List-shaped children
//! (arguments, statement bodies, properties) are ranges into dedicated side
//! tables, so nodes stay `Copy` and the tree stays contiguous.
//!
//! Nodes are never mutated after allocation.

mod expr;
mod operators;
mod pattern;
mod stmt;

pub use expr::{Element, Expr, ExprKind, Property, TemplatePart};
pub use operators::{AssignOp, BinaryOp, DeclKind, LogicalOp, UnaryOp, UpdateOp};
pub use pattern::{Pattern, PatternKind, PatternProp};
pub use stmt::{CatchClause, Declarator, Stmt, StmtKind, SwitchCase};

use crate::{Name, Span};

macro_rules! define_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Sentinel for "absent" optional children.
            pub const INVALID: $name = $name(u32::MAX);

            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            #[inline]
            pub fn is_valid(self) -> bool {
                self.0 != u32::MAX
            }

            #[inline]
            fn from_index(index: usize) -> Self {
                #[allow(clippy::cast_possible_truncation)]
                $name(index as u32)
            }
        }
    };
}

define_id!(
    /// Index of an expression node.
    ExprId
);
define_id!(
    /// Index of a statement node.
    StmtId
);
define_id!(
    /// Index of a binding pattern node.
    PatternId
);
define_id!(
    /// Index of a function definition.
    FuncId
);
define_id!(
    /// Index of a catch clause.
    CatchId
);

macro_rules! define_range {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
        pub struct $name {
            start: u32,
            end: u32,
        }

        impl $name {
            pub const EMPTY: $name = $name { start: 0, end: 0 };

            #[inline]
            pub fn len(self) -> usize {
                (self.end - self.start) as usize
            }

            #[inline]
            pub fn is_empty(self) -> bool {
                self.start == self.end
            }

            #[inline]
            fn to_range(self) -> std::ops::Range<usize> {
                self.start as usize..self.end as usize
            }

            #[inline]
            fn from_bounds(start: usize, end: usize) -> Self {
                #[allow(clippy::cast_possible_truncation)]
                $name {
                    start: start as u32,
                    end: end as u32,
                }
            }
        }
    };
}

define_range!(
    /// Range of statement ids in the arena's statement-list table.
    StmtRange
);
define_range!(
    /// Range of array/argument elements (value + spread flag).
    ElemRange
);
define_range!(
    /// Range of object-literal properties.
    PropRange
);
define_range!(
    /// Range of function parameters.
    ParamRange
);
define_range!(
    /// Range of switch cases.
    CaseRange
);
define_range!(
    /// Range of declarators in a variable declaration.
    DeclRange
);
define_range!(
    /// Range of template interpolation parts.
    PartRange
);
define_range!(
    /// Range of pattern ids (array destructuring elements).
    PatternRange
);
define_range!(
    /// Range of object destructuring properties.
    PatternPropRange
);

/// Function body: block of statements, or a bare expression (arrow shorthand).
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum FunctionBody {
    Block(StmtRange),
    Expr(ExprId),
}

/// What kind of function a definition is.
///
/// Arrows never bind `this` and never get a `prototype`; declarations are
/// hoisted.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FunctionKind {
    Declaration,
    Expression,
    Arrow,
}

/// A function definition (declaration, expression, or arrow).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FunctionDef {
    pub kind: FunctionKind,
    pub is_async: bool,
    /// `Name::EMPTY` for anonymous functions.
    pub name: Name,
    pub params: ParamRange,
    pub body: FunctionBody,
    pub span: Span,
}

/// A function parameter: a binding pattern, possibly a rest parameter.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Param {
    pub pattern: PatternId,
    pub rest: bool,
}

/// Parsed program: the top-level statement list.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Program {
    pub body: StmtRange,
}

/// Owning storage for all AST nodes of one parse.
#[derive(Default)]
pub struct Arena {
    exprs: Vec<Expr>,
    stmts: Vec<Stmt>,
    patterns: Vec<Pattern>,
    funcs: Vec<FunctionDef>,
    catches: Vec<CatchClause>,
    stmt_list: Vec<StmtId>,
    elems: Vec<Element>,
    props: Vec<Property>,
    params: Vec<Param>,
    cases: Vec<SwitchCase>,
    decls: Vec<Declarator>,
    parts: Vec<TemplatePart>,
    pattern_list: Vec<PatternId>,
    pattern_props: Vec<PatternProp>,
}

impl Arena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc_expr(&mut self, expr: Expr) -> ExprId {
        let id = ExprId::from_index(self.exprs.len());
        self.exprs.push(expr);
        id
    }

    #[inline]
    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    pub fn alloc_stmt(&mut self, stmt: Stmt) -> StmtId {
        let id = StmtId::from_index(self.stmts.len());
        self.stmts.push(stmt);
        id
    }

    #[inline]
    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id.index()]
    }

    pub fn alloc_pattern(&mut self, pattern: Pattern) -> PatternId {
        let id = PatternId::from_index(self.patterns.len());
        self.patterns.push(pattern);
        id
    }

    #[inline]
    pub fn pattern(&self, id: PatternId) -> &Pattern {
        &self.patterns[id.index()]
    }

    pub fn alloc_func(&mut self, func: FunctionDef) -> FuncId {
        let id = FuncId::from_index(self.funcs.len());
        self.funcs.push(func);
        id
    }

    #[inline]
    pub fn func(&self, id: FuncId) -> &FunctionDef {
        &self.funcs[id.index()]
    }

    pub fn alloc_catch(&mut self, clause: CatchClause) -> CatchId {
        let id = CatchId::from_index(self.catches.len());
        self.catches.push(clause);
        id
    }

    #[inline]
    pub fn catch(&self, id: CatchId) -> &CatchClause {
        &self.catches[id.index()]
    }

    pub fn alloc_stmt_list(&mut self, ids: &[StmtId]) -> StmtRange {
        let start = self.stmt_list.len();
        self.stmt_list.extend_from_slice(ids);
        StmtRange::from_bounds(start, self.stmt_list.len())
    }

    #[inline]
    pub fn stmt_list(&self, range: StmtRange) -> &[StmtId] {
        &self.stmt_list[range.to_range()]
    }

    pub fn alloc_elems(&mut self, elems: &[Element]) -> ElemRange {
        let start = self.elems.len();
        self.elems.extend_from_slice(elems);
        ElemRange::from_bounds(start, self.elems.len())
    }

    #[inline]
    pub fn elems(&self, range: ElemRange) -> &[Element] {
        &self.elems[range.to_range()]
    }

    pub fn alloc_props(&mut self, props: &[Property]) -> PropRange {
        let start = self.props.len();
        self.props.extend_from_slice(props);
        PropRange::from_bounds(start, self.props.len())
    }

    #[inline]
    pub fn props(&self, range: PropRange) -> &[Property] {
        &self.props[range.to_range()]
    }

    pub fn alloc_params(&mut self, params: &[Param]) -> ParamRange {
        let start = self.params.len();
        self.params.extend_from_slice(params);
        ParamRange::from_bounds(start, self.params.len())
    }

    #[inline]
    pub fn params(&self, range: ParamRange) -> &[Param] {
        &self.params[range.to_range()]
    }

    pub fn alloc_cases(&mut self, cases: &[SwitchCase]) -> CaseRange {
        let start = self.cases.len();
        self.cases.extend_from_slice(cases);
        CaseRange::from_bounds(start, self.cases.len())
    }

    #[inline]
    pub fn cases(&self, range: CaseRange) -> &[SwitchCase] {
        &self.cases[range.to_range()]
    }

    pub fn alloc_decls(&mut self, decls: &[Declarator]) -> DeclRange {
        let start = self.decls.len();
        self.decls.extend_from_slice(decls);
        DeclRange::from_bounds(start, self.decls.len())
    }

    #[inline]
    pub fn decls(&self, range: DeclRange) -> &[Declarator] {
        &self.decls[range.to_range()]
    }

    pub fn alloc_parts(&mut self, parts: &[TemplatePart]) -> PartRange {
        let start = self.parts.len();
        self.parts.extend_from_slice(parts);
        PartRange::from_bounds(start, self.parts.len())
    }

    #[inline]
    pub fn parts(&self, range: PartRange) -> &[TemplatePart] {
        &self.parts[range.to_range()]
    }

    pub fn alloc_pattern_list(&mut self, ids: &[PatternId]) -> PatternRange {
        let start = self.pattern_list.len();
        self.pattern_list.extend_from_slice(ids);
        PatternRange::from_bounds(start, self.pattern_list.len())
    }

    #[inline]
    pub fn pattern_list(&self, range: PatternRange) -> &[PatternId] {
        &self.pattern_list[range.to_range()]
    }

    pub fn alloc_pattern_props(&mut self, props: &[PatternProp]) -> PatternPropRange {
        let start = self.pattern_props.len();
        self.pattern_props.extend_from_slice(props);
        PatternPropRange::from_bounds(start, self.pattern_props.len())
    }

    #[inline]
    pub fn pattern_props(&self, range: PatternPropRange) -> &[PatternProp] {
        &self.pattern_props[range.to_range()]
    }

    /// Number of expression nodes allocated so far.
    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }
}

/// Shared handle to a parsed arena.
///
/// Function values hold a clone of this so a closure body outlives the
/// driver that parsed it. The evaluator is single-threaded, so `Rc` rather
/// than `Arc`.
pub type SharedArena = std::rc::Rc<Arena>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_ids_are_invalid() {
        assert!(!ExprId::INVALID.is_valid());
        assert!(!StmtId::INVALID.is_valid());
        let mut arena = Arena::new();
        let id = arena.alloc_expr(Expr::new(ExprKind::Null, Span::DUMMY));
        assert!(id.is_valid());
    }

    #[test]
    fn list_ranges_round_trip() {
        let mut arena = Arena::new();
        let a = arena.alloc_expr(Expr::new(ExprKind::Number(1.0), Span::DUMMY));
        let b = arena.alloc_expr(Expr::new(ExprKind::Number(2.0), Span::DUMMY));
        let range = arena.alloc_elems(&[
            Element { expr: a, spread: false },
            Element { expr: b, spread: true },
        ]);
        assert_eq!(range.len(), 2);
        assert!(arena.elems(range)[1].spread);
    }

    #[test]
    fn empty_range_is_empty() {
        let arena = Arena::new();
        assert!(StmtRange::EMPTY.is_empty());
        assert!(arena.stmt_list(StmtRange::EMPTY).is_empty());
    }
}
