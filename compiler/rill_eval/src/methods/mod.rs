//! Builtin method dispatch for primitive and container values.
//!
//! Method lookup on a value that has no own property falls through to the
//! per-type tables here. The tables map resolved method names to native
//! functions; the receiver arrives as `this` at call time, so a method
//! detached from its receiver fails with a clear `TypeError` instead of
//! silently misbehaving.

mod array;
mod number;
mod object;
mod promise;
mod string;

use crate::value::{NativeFn, Value};

/// Find a builtin method for a receiver type by name.
pub(crate) fn lookup(receiver: &Value, name: &str) -> Option<NativeFn> {
    match receiver {
        Value::Array(_) => array::lookup(name),
        Value::Str(_) => string::lookup(name),
        Value::Number(_) => number::lookup(name),
        Value::Object(_) => object::lookup(name),
        Value::Promise(_) => promise::lookup(name),
        _ => None,
    }
}
