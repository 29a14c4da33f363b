//! Number methods.

use crate::coerce::{number_to_string, to_number};
use crate::errors::{range_error, type_error, EvalResult};
use crate::interpreter::Interpreter;
use crate::value::{NativeFn, Value};

pub(super) fn lookup(name: &str) -> Option<NativeFn> {
    Some(match name {
        "toFixed" => to_fixed,
        "toString" => to_string,
        _ => return None,
    })
}

fn receiver(this: &Value, method: &str) -> Result<f64, crate::errors::EvalError> {
    match this {
        Value::Number(n) => Ok(*n),
        other => Err(type_error(format!(
            "{method} called on {}, expected a number",
            other.type_name()
        ))),
    }
}

fn to_fixed(interp: &mut Interpreter, this: Value, args: &[Value]) -> EvalResult {
    let n = receiver(&this, "toFixed")?;
    let digits = match args.first() {
        Some(v) => to_number(v, &interp.interner)?,
        None => 0.0,
    };
    if !(0.0..=100.0).contains(&digits) || digits.fract() != 0.0 {
        return Err(range_error("toFixed() digits argument must be between 0 and 100"));
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let digits = digits as usize;
    Ok(Value::string(format!("{n:.digits$}")))
}

fn to_string(_interp: &mut Interpreter, this: Value, _args: &[Value]) -> EvalResult {
    let n = receiver(&this, "toString")?;
    Ok(Value::string(number_to_string(n)))
}
