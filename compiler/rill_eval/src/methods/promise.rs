//! Promise methods: `then`, `catch`, `finally`.
//!
//! Reactions registered against a pending promise wait in its state;
//! against a settled one they go straight onto the task queue. Either way
//! they run strictly after the current synchronous burst.

use crate::errors::{type_error, EvalResult};
use crate::interpreter::Interpreter;
use crate::value::{
    FunctionValue, NativeFn, PromiseState, PromiseStatus, Reaction, Shared, Value,
};

pub(super) fn lookup(name: &str) -> Option<NativeFn> {
    Some(match name {
        "then" => then,
        "catch" => catch,
        "finally" => finally,
        _ => return None,
    })
}

fn receiver(this: &Value, method: &str) -> Result<Shared<PromiseState>, crate::errors::EvalError> {
    match this {
        Value::Promise(state) => Ok(state.clone()),
        other => Err(type_error(format!(
            "{method} called on {}, expected a promise",
            other.type_name()
        ))),
    }
}

fn as_handler(arg: Option<&Value>) -> Option<FunctionValue> {
    match arg {
        Some(Value::Function(f)) => Some(f.clone()),
        _ => None,
    }
}

/// Register a reaction and return the chained result promise.
fn register(
    interp: &mut Interpreter,
    state: &Shared<PromiseState>,
    reaction_for: impl FnOnce(Shared<PromiseState>) -> Reaction,
) -> EvalResult {
    let target = Shared::new(PromiseState::pending());
    let reaction = reaction_for(target.clone());
    let status = state.borrow().status.clone();
    match status {
        PromiseStatus::Pending => state.borrow_mut().reactions.push(reaction),
        PromiseStatus::Fulfilled(value) => interp.schedule_reaction(reaction, value, false),
        PromiseStatus::Rejected(value) => interp.schedule_reaction(reaction, value, true),
    }
    Ok(Value::Promise(target))
}

fn then(interp: &mut Interpreter, this: Value, args: &[Value]) -> EvalResult {
    let state = receiver(&this, "then")?;
    let on_fulfilled = as_handler(args.first());
    let on_rejected = as_handler(args.get(1));
    register(interp, &state, |target| Reaction {
        on_fulfilled,
        on_rejected,
        on_finally: None,
        target,
    })
}

fn catch(interp: &mut Interpreter, this: Value, args: &[Value]) -> EvalResult {
    let state = receiver(&this, "catch")?;
    let on_rejected = as_handler(args.first());
    register(interp, &state, |target| Reaction {
        on_fulfilled: None,
        on_rejected,
        on_finally: None,
        target,
    })
}

fn finally(interp: &mut Interpreter, this: Value, args: &[Value]) -> EvalResult {
    let state = receiver(&this, "finally")?;
    let on_finally = as_handler(args.first());
    register(interp, &state, |target| Reaction {
        on_fulfilled: None,
        on_rejected: None,
        on_finally,
        target,
    })
}
