//! Tree-walking interpreter.
//!
//! # Module Structure
//!
//! - `mod.rs`: interpreter state, program/task driving, calls, promises
//! - `exprs.rs`: expression evaluation
//! - `stmts.rs`: statement execution and control flow
//! - `bind.rs`: destructuring binders
//!
//! # Scoping and `this`
//!
//! The current scope lives on the interpreter and is saved/restored around
//! blocks and calls. `this` is an ordinary `const` binding created in each
//! non-arrow call scope; arrow functions simply never create one, so the
//! chain lookup gives them the enclosing `this` for free (lexical `this`).
//!
//! # Control flow
//!
//! `break`/`continue`/`return` travel up the Rust call stack through the
//! error channel as signals (`EvalError::control_flow`); loops, switches,
//! and call boundaries intercept what belongs to them. `catch` never sees
//! a signal; `finally` runs for both signals and errors.

mod bind;
mod exprs;
mod stmts;

use std::rc::Rc;

use rill_ir::{DeclKind, FuncId, FunctionBody, Name, Program, SharedArena, StringInterner};

use crate::console::SharedConsole;
use crate::environment::{declare_lexical, Scope, ScopeKind, ScopeRef};
use crate::errors::{
    not_callable, stack_overflow, syntax_error, thrown, ControlFlow, EvalError, EvalResult,
};
use crate::tasks::{Task, TaskKind, TaskQueue};
use crate::value::{
    Callable, FunctionValue, JsObject, ObjectClass, PromiseState, PromiseStatus, Reaction,
    Shared, Value,
};
use crate::{builtins, coerce};

/// Call depth limit before `RangeError: Maximum call stack size exceeded`.
const MAX_CALL_DEPTH: usize = 512;

/// Pre-interned names on the interpreter's hot paths.
pub(crate) struct WellKnownNames {
    pub(crate) this_: Name,
    pub(crate) prototype: Name,
    pub(crate) name: Name,
    pub(crate) message: Name,
    pub(crate) length: Name,
}

impl WellKnownNames {
    fn new(interner: &StringInterner) -> Self {
        WellKnownNames {
            this_: interner.intern("this"),
            prototype: interner.intern("prototype"),
            name: interner.intern("name"),
            message: interner.intern("message"),
            length: interner.intern("length"),
        }
    }
}

/// The evaluator.
///
/// Owns the global scope, the current scope, the console sink, and the
/// macrotask queue. Single-threaded and synchronous; "asynchrony" is the
/// cooperative queue in [`crate::tasks`].
pub struct Interpreter {
    pub(crate) arena: SharedArena,
    pub(crate) interner: Rc<StringInterner>,
    pub(crate) global: ScopeRef,
    pub(crate) scope: ScopeRef,
    pub(crate) console: SharedConsole,
    pub(crate) tasks: TaskQueue,
    pub(crate) names: WellKnownNames,
    depth: usize,
}

impl Interpreter {
    /// Create an interpreter with the standard globals installed.
    pub fn new(arena: SharedArena, interner: Rc<StringInterner>, console: SharedConsole) -> Self {
        let global = Scope::global();
        let names = WellKnownNames::new(&interner);
        let mut interp = Interpreter {
            arena,
            interner,
            scope: global.clone(),
            global,
            console,
            tasks: TaskQueue::new(),
            names,
            depth: 0,
        };
        builtins::install(&mut interp);
        interp
    }

    /// Seed an extra global binding before running (embedding hook).
    pub fn define_global(&mut self, name: &str, value: Value) {
        let name = self.interner.intern(name);
        let _ = declare_lexical(&self.global, name, value, DeclKind::Let);
    }

    /// The interner this interpreter resolves names against.
    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    /// Run a program: hoist, execute the top level, then drain the task
    /// queue. Returns the completion value (the value of the last
    /// expression statement), which is what a REPL shows.
    pub fn run_program(&mut self, program: &Program) -> EvalResult {
        self.scope = self.global.clone();
        let scope = self.scope.clone();
        self.hoist(program.body, &scope)?;
        let completion = match self.exec_stmts(program.body) {
            Ok(value) => value,
            Err(e) => return Err(self.illegal_control(e)),
        };
        self.drain_tasks()?;
        Ok(completion)
    }

    /// Turn an escaped control-flow signal into the right error; pass real
    /// errors through.
    fn illegal_control(&self, e: EvalError) -> EvalError {
        match e.control_flow {
            Some(ControlFlow::Break) => syntax_error("Illegal break statement"),
            Some(ControlFlow::Continue) => syntax_error("Illegal continue statement"),
            Some(ControlFlow::Return(_)) => syntax_error("Return statements are only valid inside functions"),
            None => e,
        }
    }

    /// Drain the macrotask queue to empty.
    ///
    /// The call stack is fully unwound between tasks; an uncaught error in
    /// a task terminates the run, as it does at the top level.
    fn drain_tasks(&mut self) -> Result<(), EvalError> {
        while let Some(task) = self.tasks.pop_next() {
            self.run_task(task)?;
        }
        Ok(())
    }

    /// Run one queued task body.
    pub(crate) fn run_task(&mut self, task: Task) -> Result<(), EvalError> {
        match task.kind {
            TaskKind::Timer { callback, args } => {
                self.call_function(&callback, Value::Undefined, &args)
                    .map(|_| ())
                    .map_err(|e| self.illegal_control(e))
            }
            TaskKind::Reaction {
                handler,
                argument,
                rejected,
                target,
            } => match handler {
                Some(handler) => match self.call_function(&handler, Value::Undefined, &[argument])
                {
                    Ok(value) => {
                        self.resolve_promise(&target, value);
                        Ok(())
                    }
                    Err(e) if e.is_catchable() => {
                        let value = self.error_to_value(&e);
                        self.reject_promise(&target, value);
                        Ok(())
                    }
                    Err(e) => Err(e),
                },
                None => {
                    if rejected {
                        self.reject_promise(&target, argument);
                    } else {
                        self.resolve_promise(&target, argument);
                    }
                    Ok(())
                }
            },
            TaskKind::Finally {
                callback,
                argument,
                rejected,
                target,
            } => {
                match self.call_function(&callback, Value::Undefined, &[]) {
                    Ok(_) => {
                        // Pass the original settlement through.
                        if rejected {
                            self.reject_promise(&target, argument);
                        } else {
                            self.resolve_promise(&target, argument);
                        }
                    }
                    Err(e) if e.is_catchable() => {
                        let value = self.error_to_value(&e);
                        self.reject_promise(&target, value);
                    }
                    Err(e) => return Err(e),
                }
                Ok(())
            }
            TaskKind::AsyncCall {
                function,
                this,
                args,
                result,
            } => {
                match self.run_user_function(&function, this, &args) {
                    Ok(value) => self.resolve_promise(&result, value),
                    Err(e) if e.is_catchable() => {
                        let value = self.error_to_value(&e);
                        self.reject_promise(&result, value);
                    }
                    Err(e) => return Err(e),
                }
                Ok(())
            }
        }
    }

    // Scope management

    /// Run `f` with `scope` as the current scope, restoring afterwards.
    pub(crate) fn with_scope<R>(
        &mut self,
        scope: ScopeRef,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        let saved = std::mem::replace(&mut self.scope, scope);
        let result = f(self);
        self.scope = saved;
        result
    }

    /// Enter a fresh block scope for `f`.
    pub(crate) fn with_block_scope<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let child = Scope::child(self.scope.clone(), ScopeKind::Block);
        self.with_scope(child, f)
    }

    // Functions

    /// Create a closure: the function value captures the *current* scope
    /// by reference.
    pub(crate) fn make_function(&mut self, func: FuncId) -> FunctionValue {
        let def = self.arena.func(func);
        FunctionValue::user(def.name, func, self.arena.clone(), self.scope.clone())
    }

    /// Call any callable value.
    pub(crate) fn call_value(&mut self, callee: Value, this: Value, args: &[Value]) -> EvalResult {
        match callee {
            Value::Function(f) => self.call_function(&f, this, args),
            other => Err(not_callable(other.type_name())),
        }
    }

    /// Call a function value with an explicit `this`.
    pub(crate) fn call_function(
        &mut self,
        f: &FunctionValue,
        this: Value,
        args: &[Value],
    ) -> EvalResult {
        match f.callable() {
            Callable::Native(native) => {
                self.depth += 1;
                if self.depth > MAX_CALL_DEPTH {
                    self.depth -= 1;
                    return Err(stack_overflow());
                }
                let result = (native.func)(self, this, args);
                self.depth -= 1;
                result
            }
            Callable::Resolver { state, reject } => {
                let value = args.first().cloned().unwrap_or(Value::Undefined);
                let state = state.clone();
                if *reject {
                    self.reject_promise(&state, value);
                } else {
                    self.resolve_promise(&state, value);
                }
                Ok(Value::Undefined)
            }
            Callable::User(user) => {
                let def = user.arena.func(user.def);
                if def.is_async {
                    // Async calls defer their whole body: the caller's
                    // synchronous code finishes before the body starts.
                    let result = Shared::new(PromiseState::pending());
                    self.tasks.schedule(
                        TaskKind::AsyncCall {
                            function: f.clone(),
                            this,
                            args: args.to_vec(),
                            result: result.clone(),
                        },
                        0,
                    );
                    return Ok(Value::Promise(result));
                }
                self.run_user_function(f, this, args)
            }
        }
    }

    /// Execute a user function body synchronously.
    pub(crate) fn run_user_function(
        &mut self,
        f: &FunctionValue,
        this: Value,
        args: &[Value],
    ) -> EvalResult {
        let Some(user) = f.as_user() else {
            return Err(not_callable("value"));
        };
        self.depth += 1;
        if self.depth > MAX_CALL_DEPTH {
            self.depth -= 1;
            return Err(stack_overflow());
        }

        let def = *user.arena.func(user.def);
        let scope = Scope::child(user.scope.clone(), ScopeKind::Function);
        if !f.is_arrow() {
            let _ = declare_lexical(&scope, self.names.this_, this, DeclKind::Const);
        }

        let params = user.arena.params(def.params).to_vec();
        let result = self.with_scope(scope.clone(), |interp| {
            for (i, param) in params.iter().enumerate() {
                let value = if param.rest {
                    Value::array(args.get(i..).map(<[Value]>::to_vec).unwrap_or_default())
                } else {
                    args.get(i).cloned().unwrap_or(Value::Undefined)
                };
                interp.bind_pattern(param.pattern, value, DeclKind::Let)?;
            }
            match def.body {
                FunctionBody::Expr(expr) => interp.eval_expr(expr),
                FunctionBody::Block(body) => {
                    interp.hoist(body, &scope)?;
                    match interp.exec_stmts(body) {
                        Ok(_) => Ok(Value::Undefined),
                        Err(e) => match e.control_flow {
                            Some(ControlFlow::Return(value)) => Ok(value),
                            Some(_) => Err(interp.illegal_control(e)),
                            None => Err(e),
                        },
                    }
                }
            }
        });

        self.depth -= 1;
        result
    }

    // Promises

    /// Fulfil a promise, adopting promise results.
    pub(crate) fn resolve_promise(&mut self, state: &Shared<PromiseState>, value: Value) {
        if !state.borrow().is_pending() {
            return;
        }
        if let Value::Promise(inner) = &value {
            if Shared::ptr_eq(inner, state) {
                let err = self.make_error_value("TypeError", "Chaining cycle detected");
                self.settle(state, err, true);
                return;
            }
            // Adopt: settle this promise when the inner one settles.
            let inner = inner.clone();
            let status = inner.borrow().status.clone();
            match status {
                PromiseStatus::Pending => {
                    inner.borrow_mut().reactions.push(Reaction {
                        on_fulfilled: None,
                        on_rejected: None,
                        on_finally: None,
                        target: state.clone(),
                    });
                }
                PromiseStatus::Fulfilled(v) => self.settle(state, v, false),
                PromiseStatus::Rejected(v) => self.settle(state, v, true),
            }
            return;
        }
        self.settle(state, value, false);
    }

    /// Reject a promise.
    pub(crate) fn reject_promise(&mut self, state: &Shared<PromiseState>, value: Value) {
        if !state.borrow().is_pending() {
            return;
        }
        self.settle(state, value, true);
    }

    /// Record the settlement and move queued reactions onto the task queue.
    fn settle(&mut self, state: &Shared<PromiseState>, value: Value, rejected: bool) {
        let reactions = {
            let mut guard = state.borrow_mut();
            guard.status = if rejected {
                PromiseStatus::Rejected(value.clone())
            } else {
                PromiseStatus::Fulfilled(value.clone())
            };
            std::mem::take(&mut guard.reactions)
        };
        for reaction in reactions {
            self.schedule_reaction(reaction, value.clone(), rejected);
        }
    }

    /// Queue one reaction against a known settlement.
    pub(crate) fn schedule_reaction(&mut self, reaction: Reaction, value: Value, rejected: bool) {
        if let Some(callback) = reaction.on_finally {
            self.tasks.schedule(
                TaskKind::Finally {
                    callback,
                    argument: value,
                    rejected,
                    target: reaction.target,
                },
                0,
            );
            return;
        }
        let handler = if rejected {
            reaction.on_rejected
        } else {
            reaction.on_fulfilled
        };
        self.tasks.schedule(
            TaskKind::Reaction {
                handler,
                argument: value,
                rejected,
                target: reaction.target,
            },
            0,
        );
    }

    // Errors as values

    /// The value a `catch` clause binds for an in-flight error.
    ///
    /// User `throw` values pass through unchanged; engine errors
    /// materialize as Error-shaped objects so `e.message` works.
    pub(crate) fn error_to_value(&mut self, e: &EvalError) -> Value {
        if let Some(value) = &e.thrown {
            return value.clone();
        }
        self.make_error_value(e.kind.error_name(), &e.message)
    }

    /// Build an Error-shaped object value.
    pub(crate) fn make_error_value(&mut self, name: &str, message: &str) -> Value {
        let mut obj = JsObject::new();
        obj.class = ObjectClass::Error;
        obj.set(self.names.name, Value::string(name));
        obj.set(self.names.message, Value::string(message));
        Value::object(obj)
    }

    /// Wrap a value for `throw`, rendering the display form eagerly.
    pub(crate) fn throw_value(&mut self, value: Value) -> EvalError {
        let display = coerce::to_string_coerce(&value, &self.interner)
            .unwrap_or_else(|_| "exception".to_string());
        thrown(value, display)
    }
}
