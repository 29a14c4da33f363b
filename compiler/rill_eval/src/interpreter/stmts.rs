//! Statement execution.

use rill_ir::{DeclKind, StmtId, StmtKind, StmtRange};

use crate::coerce::{is_truthy, strict_equals};
use crate::errors::{
    break_signal, continue_signal, return_signal, type_error, ControlFlow, EvalError, EvalResult,
};
use crate::value::Value;

use super::Interpreter;

/// How a loop body iteration ended.
enum LoopFlow {
    Normal,
    Break,
}

impl Interpreter {
    /// Execute a statement list, returning the completion value (the value
    /// of the last expression statement).
    pub(crate) fn exec_stmts(&mut self, range: StmtRange) -> EvalResult {
        let arena = self.arena.clone();
        let mut completion = Value::Undefined;
        for &id in arena.stmt_list(range) {
            completion = self.exec_stmt(id)?;
        }
        Ok(completion)
    }

    /// Execute a block, entering a fresh scope only when the block actually
    /// declares something lexical.
    pub(crate) fn exec_block(&mut self, range: StmtRange) -> EvalResult {
        if self.block_needs_scope(range) {
            self.with_block_scope(|interp| interp.exec_stmts(range))
        } else {
            self.exec_stmts(range)
        }
    }

    fn block_needs_scope(&self, range: StmtRange) -> bool {
        self.arena.stmt_list(range).iter().any(|&id| {
            matches!(
                self.arena.stmt(id).kind,
                StmtKind::VarDecl {
                    kind: DeclKind::Let | DeclKind::Const,
                    ..
                }
            )
        })
    }

    pub(crate) fn exec_stmt(&mut self, id: StmtId) -> EvalResult {
        let arena = self.arena.clone();
        let stmt = *arena.stmt(id);
        let span = stmt.span;
        let result = match stmt.kind {
            StmtKind::Expr(expr) => self.eval_expr(expr),
            StmtKind::Empty | StmtKind::FunctionDecl(_) => Ok(Value::Undefined),

            StmtKind::VarDecl { kind, decls } => {
                for decl in arena.decls(decls) {
                    if decl.init.is_valid() {
                        let value = self.eval_expr(decl.init)?;
                        self.bind_pattern(decl.pattern, value, kind)?;
                    } else if kind.is_lexical() {
                        self.bind_pattern(decl.pattern, Value::Undefined, kind)?;
                    }
                    // `var x;` without initializer: hoisting already bound
                    // it, and re-binding would clobber an assigned value.
                }
                Ok(Value::Undefined)
            }

            StmtKind::Return(value) => {
                let value = if value.is_valid() {
                    self.eval_expr(value)?
                } else {
                    Value::Undefined
                };
                Err(return_signal(value))
            }

            StmtKind::Throw(value) => {
                let value = self.eval_expr(value)?;
                Err(self.throw_value(value))
            }

            StmtKind::Break => Err(break_signal()),
            StmtKind::Continue => Err(continue_signal()),

            StmtKind::If { cond, cons, alt } => {
                let test = self.eval_expr(cond)?;
                if is_truthy(&test) {
                    self.exec_stmt(cons)
                } else if alt.is_valid() {
                    self.exec_stmt(alt)
                } else {
                    Ok(Value::Undefined)
                }
            }

            StmtKind::Block(range) => self.exec_block(range),

            StmtKind::While { cond, body } => {
                loop {
                    let test = self.eval_expr(cond)?;
                    if !is_truthy(&test) {
                        break;
                    }
                    if let LoopFlow::Break = self.run_loop_body(body)? {
                        break;
                    }
                }
                Ok(Value::Undefined)
            }

            StmtKind::DoWhile { body, cond } => {
                loop {
                    if let LoopFlow::Break = self.run_loop_body(body)? {
                        break;
                    }
                    let test = self.eval_expr(cond)?;
                    if !is_truthy(&test) {
                        break;
                    }
                }
                Ok(Value::Undefined)
            }

            StmtKind::For {
                init,
                test,
                update,
                body,
            } => {
                // A `let`/`const` init gets its own scope wrapping the
                // whole loop.
                let lexical_init = init.is_valid()
                    && matches!(
                        arena.stmt(init).kind,
                        StmtKind::VarDecl {
                            kind: DeclKind::Let | DeclKind::Const,
                            ..
                        }
                    );
                let run = |interp: &mut Self| -> EvalResult {
                    if init.is_valid() {
                        interp.exec_stmt(init)?;
                    }
                    loop {
                        if test.is_valid() {
                            let t = interp.eval_expr(test)?;
                            if !is_truthy(&t) {
                                break;
                            }
                        }
                        if let LoopFlow::Break = interp.run_loop_body(body)? {
                            break;
                        }
                        if update.is_valid() {
                            interp.eval_expr(update)?;
                        }
                    }
                    Ok(Value::Undefined)
                };
                if lexical_init {
                    self.with_block_scope(run)
                } else {
                    run(self)
                }
            }

            StmtKind::ForIn {
                kind,
                pattern,
                object,
                body,
            } => {
                let value = self.eval_expr(object)?;
                let keys = self.enumerate_keys(&value);
                for key in keys {
                    let flow = self.with_block_scope(|interp| {
                        interp.bind_pattern(pattern, key, kind)?;
                        interp.run_loop_body(body)
                    })?;
                    if let LoopFlow::Break = flow {
                        break;
                    }
                }
                Ok(Value::Undefined)
            }

            StmtKind::ForOf {
                kind,
                pattern,
                iterable,
                body,
            } => {
                let value = self.eval_expr(iterable)?;
                let items = match &value {
                    Value::Array(items) => items.borrow().clone(),
                    Value::Str(s) => s.chars().map(|c| Value::string(c.to_string())).collect(),
                    other => {
                        return Err(
                            type_error(format!("{} is not iterable", other.type_name()))
                                .with_span(span),
                        )
                    }
                };
                for item in items {
                    let flow = self.with_block_scope(|interp| {
                        interp.bind_pattern(pattern, item, kind)?;
                        interp.run_loop_body(body)
                    })?;
                    if let LoopFlow::Break = flow {
                        break;
                    }
                }
                Ok(Value::Undefined)
            }

            StmtKind::Switch { disc, cases } => {
                let disc = self.eval_expr(disc)?;
                let cases = arena.cases(cases);

                // Strict-equality match; default is the fallback entry.
                let mut start = None;
                for (i, case) in cases.iter().enumerate() {
                    if case.test.is_valid() {
                        let test = self.eval_expr(case.test)?;
                        if strict_equals(&disc, &test) {
                            start = Some(i);
                            break;
                        }
                    }
                }
                let start = start.or_else(|| {
                    cases.iter().position(|case| !case.test.is_valid())
                });
                let Some(start) = start else {
                    return Ok(Value::Undefined);
                };

                // Fall through from the matched clause until a break.
                self.with_block_scope(|interp| {
                    for case in &cases[start..] {
                        match interp.exec_stmts(case.body) {
                            Ok(_) => {}
                            Err(e) if matches!(e.control_flow, Some(ControlFlow::Break)) => {
                                return Ok(Value::Undefined);
                            }
                            Err(e) => return Err(e),
                        }
                    }
                    Ok(Value::Undefined)
                })
            }

            StmtKind::Try {
                block,
                handler,
                finalizer,
                has_finally,
            } => {
                let mut result = self.with_block_scope(|interp| interp.exec_stmts(block));

                // `catch` sees thrown values and runtime errors, never
                // break/continue/return signals.
                let caught = match &result {
                    Err(e) if e.is_catchable() && handler.is_valid() => {
                        Some(self.error_to_value(e))
                    }
                    _ => None,
                };
                if let Some(bound) = caught {
                    let clause = *arena.catch(handler);
                    result = self.with_block_scope(|interp| {
                        if clause.param.is_valid() {
                            interp.bind_pattern(clause.param, bound, DeclKind::Let)?;
                        }
                        interp.exec_stmts(clause.body)
                    });
                }

                // `finally` always runs, even while a signal or error is
                // unwinding; its own abrupt completion takes precedence.
                if has_finally {
                    let fin = self.with_block_scope(|interp| interp.exec_stmts(finalizer));
                    if fin.is_err() {
                        result = fin;
                    }
                }
                result
            }
        };
        result.map_err(|e| e.with_span(span))
    }

    /// Run one loop iteration, translating signals into loop flow.
    fn run_loop_body(&mut self, body: StmtId) -> Result<LoopFlow, EvalError> {
        match self.exec_stmt(body) {
            Ok(_) => Ok(LoopFlow::Normal),
            Err(e) => match e.control_flow {
                Some(ControlFlow::Break) => Ok(LoopFlow::Break),
                Some(ControlFlow::Continue) => Ok(LoopFlow::Normal),
                _ => Err(e),
            },
        }
    }

    /// `for..in` key enumeration: own keys in insertion order for objects,
    /// index strings for arrays and strings, nothing for primitives.
    fn enumerate_keys(&mut self, value: &Value) -> Vec<Value> {
        match value {
            Value::Object(obj) => obj
                .borrow()
                .keys()
                .into_iter()
                .map(|name| Value::string(self.interner.resolve(name)))
                .collect(),
            Value::Array(items) => (0..items.borrow().len())
                .map(|i| Value::string(i.to_string()))
                .collect(),
            Value::Str(s) => (0..s.chars().count())
                .map(|i| Value::string(i.to_string()))
                .collect(),
            _ => Vec::new(),
        }
    }
}
