//! Hoisting.
//!
//! Before a program or function body runs, every `var`-declared name in it
//! is pre-bound to `undefined` and every function declaration is pre-bound
//! to its closure value, in the function-level scope. This is what makes a
//! `var` readable (as `undefined`) before its declaration line, and a
//! function callable before its definition.
//!
//! The walk descends into blocks, loop bodies, switch clauses, and try
//! arms, but never into nested function bodies — those hoist when called.

use rill_ir::{Name, PatternId, PatternKind, StmtId, StmtKind, StmtRange};

use crate::environment::{declare_var, hoist_var, ScopeRef};
use crate::errors::{redeclaration, EvalError};

use crate::interpreter::Interpreter;

impl Interpreter {
    /// Hoist all `var` and function declarations in `body` into `scope`'s
    /// function level.
    pub(crate) fn hoist(&mut self, body: StmtRange, scope: &ScopeRef) -> Result<(), EvalError> {
        let arena = self.arena.clone();
        for &id in arena.stmt_list(body) {
            self.hoist_stmt(id, scope)?;
        }
        Ok(())
    }

    fn hoist_stmt(&mut self, id: StmtId, scope: &ScopeRef) -> Result<(), EvalError> {
        let arena = self.arena.clone();
        match arena.stmt(id).kind {
            StmtKind::VarDecl {
                kind: rill_ir::DeclKind::Var,
                decls,
            } => {
                let mut names = Vec::new();
                for decl in arena.decls(decls) {
                    self.pattern_names(decl.pattern, &mut names);
                }
                for name in names {
                    hoist_var(scope, name)
                        .map_err(|name| redeclaration(self.interner.resolve(name)))?;
                }
                Ok(())
            }

            StmtKind::FunctionDecl(func) => {
                // Function declarations hoist their *value*: the closure
                // captures the scope being hoisted into.
                let name = arena.func(func).name;
                let value = self.make_function(func);
                declare_var(scope, name, crate::value::Value::Function(value))
                    .map_err(|name| redeclaration(self.interner.resolve(name)))
            }

            StmtKind::Block(range) => self.hoist(range, scope),

            StmtKind::If { cons, alt, .. } => {
                self.hoist_stmt(cons, scope)?;
                if alt.is_valid() {
                    self.hoist_stmt(alt, scope)?;
                }
                Ok(())
            }

            StmtKind::While { body, .. } | StmtKind::DoWhile { body, .. } => {
                self.hoist_stmt(body, scope)
            }

            StmtKind::For { init, body, .. } => {
                if init.is_valid() {
                    self.hoist_stmt(init, scope)?;
                }
                self.hoist_stmt(body, scope)
            }

            StmtKind::ForIn {
                kind,
                pattern,
                body,
                ..
            }
            | StmtKind::ForOf {
                kind,
                pattern,
                body,
                ..
            } => {
                if kind == rill_ir::DeclKind::Var {
                    let mut names = Vec::new();
                    self.pattern_names(pattern, &mut names);
                    for name in names {
                        hoist_var(scope, name)
                            .map_err(|name| redeclaration(self.interner.resolve(name)))?;
                    }
                }
                self.hoist_stmt(body, scope)
            }

            StmtKind::Switch { cases, .. } => {
                for case in arena.cases(cases) {
                    self.hoist(case.body, scope)?;
                }
                Ok(())
            }

            StmtKind::Try {
                block,
                handler,
                finalizer,
                ..
            } => {
                self.hoist(block, scope)?;
                if handler.is_valid() {
                    self.hoist(arena.catch(handler).body, scope)?;
                }
                self.hoist(finalizer, scope)
            }

            _ => Ok(()),
        }
    }

    /// Collect every identifier a pattern binds.
    fn pattern_names(&self, pattern: PatternId, out: &mut Vec<Name>) {
        match self.arena.pattern(pattern).kind {
            PatternKind::Ident(name) => out.push(name),
            PatternKind::Array { elements, rest } => {
                for &element in self.arena.pattern_list(elements) {
                    self.pattern_names(element, out);
                }
                if rest.is_valid() {
                    self.pattern_names(rest, out);
                }
            }
            PatternKind::Object(props) => {
                for prop in self.arena.pattern_props(props) {
                    self.pattern_names(prop.binding, out);
                }
            }
        }
    }
}
