//! String methods. Indices are character-based.

use crate::coerce::{to_number, to_string_coerce};
use crate::errors::{range_error, type_error, EvalResult};
use crate::interpreter::Interpreter;
use crate::value::{NativeFn, Value};

pub(super) fn lookup(name: &str) -> Option<NativeFn> {
    Some(match name {
        "toUpperCase" => to_upper_case,
        "toLowerCase" => to_lower_case,
        "slice" => slice,
        "indexOf" => index_of,
        "includes" => includes,
        "trim" => trim,
        "split" => split,
        "charAt" => char_at,
        "repeat" => repeat,
        _ => return None,
    })
}

fn receiver(this: &Value, method: &str) -> Result<String, crate::errors::EvalError> {
    match this {
        Value::Str(s) => Ok(s.as_str().to_string()),
        other => Err(type_error(format!(
            "{method} called on {}, expected a string",
            other.type_name()
        ))),
    }
}

fn to_upper_case(_interp: &mut Interpreter, this: Value, _args: &[Value]) -> EvalResult {
    Ok(Value::string(receiver(&this, "toUpperCase")?.to_uppercase()))
}

fn to_lower_case(_interp: &mut Interpreter, this: Value, _args: &[Value]) -> EvalResult {
    Ok(Value::string(receiver(&this, "toLowerCase")?.to_lowercase()))
}

fn endpoint(
    arg: Option<&Value>,
    len: usize,
    default: usize,
    interner: &rill_ir::StringInterner,
) -> Result<usize, crate::errors::EvalError> {
    let Some(arg) = arg else { return Ok(default) };
    if arg.is_undefined() {
        return Ok(default);
    }
    let n = to_number(arg, interner)?;
    if n.is_nan() {
        return Ok(0);
    }
    #[allow(clippy::cast_possible_truncation)]
    let i = n.trunc() as i64;
    #[allow(clippy::cast_possible_wrap)]
    let len_i = len as i64;
    let resolved = if i < 0 { len_i + i } else { i };
    #[allow(clippy::cast_sign_loss)]
    Ok(resolved.clamp(0, len_i) as usize)
}

fn slice(interp: &mut Interpreter, this: Value, args: &[Value]) -> EvalResult {
    let s = receiver(&this, "slice")?;
    let chars: Vec<char> = s.chars().collect();
    let start = endpoint(args.first(), chars.len(), 0, &interp.interner)?;
    let end = endpoint(args.get(1), chars.len(), chars.len(), &interp.interner)?;
    let out: String = if start < end {
        chars[start..end].iter().collect()
    } else {
        String::new()
    };
    Ok(Value::string(out))
}

fn index_of(interp: &mut Interpreter, this: Value, args: &[Value]) -> EvalResult {
    let s = receiver(&this, "indexOf")?;
    let needle = match args.first() {
        Some(v) => to_string_coerce(v, &interp.interner)?,
        None => return Ok(Value::number(-1.0)),
    };
    match s.find(&needle) {
        Some(byte_idx) => {
            // Convert the byte offset to a character index.
            let char_idx = s[..byte_idx].chars().count();
            #[allow(clippy::cast_precision_loss)]
            Ok(Value::number(char_idx as f64))
        }
        None => Ok(Value::number(-1.0)),
    }
}

fn includes(interp: &mut Interpreter, this: Value, args: &[Value]) -> EvalResult {
    let s = receiver(&this, "includes")?;
    let needle = match args.first() {
        Some(v) => to_string_coerce(v, &interp.interner)?,
        None => return Ok(Value::Bool(false)),
    };
    Ok(Value::Bool(s.contains(&needle)))
}

fn trim(_interp: &mut Interpreter, this: Value, _args: &[Value]) -> EvalResult {
    Ok(Value::string(receiver(&this, "trim")?.trim().to_string()))
}

fn split(interp: &mut Interpreter, this: Value, args: &[Value]) -> EvalResult {
    let s = receiver(&this, "split")?;
    let parts: Vec<Value> = match args.first() {
        // No separator: one element holding the whole string.
        None | Some(Value::Undefined) => vec![Value::string(s)],
        Some(sep) => {
            let sep = to_string_coerce(sep, &interp.interner)?;
            if sep.is_empty() {
                s.chars().map(|c| Value::string(c.to_string())).collect()
            } else {
                s.split(&sep).map(Value::string).collect()
            }
        }
    };
    Ok(Value::array(parts))
}

fn char_at(interp: &mut Interpreter, this: Value, args: &[Value]) -> EvalResult {
    let s = receiver(&this, "charAt")?;
    let n = match args.first() {
        Some(v) => to_number(v, &interp.interner)?,
        None => 0.0,
    };
    if n.fract() != 0.0 || n < 0.0 {
        return Ok(Value::string(""));
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let i = n as usize;
    Ok(Value::string(
        s.chars().nth(i).map(|c| c.to_string()).unwrap_or_default(),
    ))
}

fn repeat(interp: &mut Interpreter, this: Value, args: &[Value]) -> EvalResult {
    let s = receiver(&this, "repeat")?;
    let n = match args.first() {
        Some(v) => to_number(v, &interp.interner)?,
        None => 0.0,
    };
    if n < 0.0 || !n.is_finite() {
        return Err(range_error("Invalid count value"));
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Ok(Value::string(s.repeat(n.trunc() as usize)))
}
