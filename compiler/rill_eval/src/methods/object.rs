//! Plain-object methods.

use crate::coerce::to_property_key;
use crate::errors::{type_error, EvalResult};
use crate::interpreter::Interpreter;
use crate::value::{NativeFn, Value};

pub(super) fn lookup(name: &str) -> Option<NativeFn> {
    Some(match name {
        "hasOwnProperty" => has_own_property,
        _ => return None,
    })
}

fn has_own_property(interp: &mut Interpreter, this: Value, args: &[Value]) -> EvalResult {
    let Value::Object(obj) = &this else {
        return Err(type_error(format!(
            "hasOwnProperty called on {}",
            this.type_name()
        )));
    };
    let key = args.first().cloned().unwrap_or(Value::Undefined);
    let name = to_property_key(&key, &interp.interner)?;
    Ok(Value::Bool(obj.borrow().has_own(name)))
}
