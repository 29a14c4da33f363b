//! Promise state.
//!
//! A promise is a reference-shared settlement cell. Reactions registered
//! with `then`/`catch`/`finally` are recorded here while pending; the
//! interpreter moves them onto the macrotask queue when the promise settles.

use super::function::FunctionValue;
use super::heap::Shared;
use super::Value;

/// Settlement status.
#[derive(Clone, Debug)]
pub enum PromiseStatus {
    Pending,
    Fulfilled(Value),
    Rejected(Value),
}

/// A queued `then`/`catch`/`finally` continuation.
///
/// `target` is the promise the reaction settles with its handler's result,
/// which is what makes chains (`p.then(..).then(..)`) work. A `finally`
/// handler runs on either outcome and passes the settlement through.
#[derive(Debug)]
pub struct Reaction {
    pub on_fulfilled: Option<FunctionValue>,
    pub on_rejected: Option<FunctionValue>,
    pub on_finally: Option<FunctionValue>,
    pub target: Shared<PromiseState>,
}

/// The shared state behind a `Value::Promise`.
#[derive(Debug)]
pub struct PromiseState {
    pub status: PromiseStatus,
    pub reactions: Vec<Reaction>,
}

impl PromiseState {
    pub fn pending() -> Self {
        PromiseState {
            status: PromiseStatus::Pending,
            reactions: Vec::new(),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.status, PromiseStatus::Pending)
    }
}
