//! rill eval - tree-walking evaluator for the rill interpreter.
//!
//! # Architecture
//!
//! - [`value`]: the tagged `Value` union (primitives inline, strings
//!   immutable-shared, objects/arrays/functions/promises reference-shared)
//! - [`Scope`]/[`ScopeRef`]: parent-linked lexical environments; closures
//!   capture a `ScopeRef` by reference at creation time
//! - [`Interpreter`]: recursive tree walker over the `rill_ir` arena
//! - [`errors`]: the JS error taxonomy, with break/continue/return threaded
//!   through the same channel as control-flow signals
//! - [`ConsoleSink`]: injected output sink; the evaluator never prints
//! - [`TaskQueue`]: virtual-time macrotask queue behind timers, promises,
//!   and async functions
//!
//! Evaluation is single-threaded and synchronous. The only "asynchrony" is
//! cooperative: the queue drains between completed call stacks.

mod builtins;
pub mod coerce;
mod console;
mod environment;
pub mod errors;
mod hoist;
mod interpreter;
mod methods;
mod operators;
mod stack;
mod tasks;
pub mod value;

pub use console::{ConsoleSink, Level, SharedConsole};
pub use environment::{AssignError, Scope, ScopeKind, ScopeRef};
pub use errors::{ControlFlow, EvalError, EvalErrorKind, EvalResult};
pub use interpreter::Interpreter;
pub use operators::{evaluate_binary, evaluate_unary};
pub use tasks::{TaskId, TaskKind, TaskQueue};
pub use value::{FunctionValue, Heap, JsObject, ObjectClass, Shared, Value};

#[cfg(test)]
mod tests;
