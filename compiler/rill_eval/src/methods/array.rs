//! Array methods.

use crate::coerce::{is_truthy, strict_equals, to_number, to_string_coerce};
use crate::errors::{type_error, EvalResult};
use crate::interpreter::Interpreter;
use crate::value::{NativeFn, Shared, Value};

pub(super) fn lookup(name: &str) -> Option<NativeFn> {
    Some(match name {
        "push" => push,
        "pop" => pop,
        "shift" => shift,
        "unshift" => unshift,
        "slice" => slice,
        "indexOf" => index_of,
        "includes" => includes,
        "join" => join,
        "concat" => concat,
        "map" => map,
        "filter" => filter,
        "reduce" => reduce,
        "forEach" => for_each,
        "find" => find,
        _ => return None,
    })
}

fn receiver(this: &Value, method: &str) -> Result<Shared<Vec<Value>>, crate::errors::EvalError> {
    match this {
        Value::Array(items) => Ok(items.clone()),
        other => Err(type_error(format!(
            "{method} called on {}, expected an array",
            other.type_name()
        ))),
    }
}

#[allow(clippy::cast_precision_loss)]
fn len_value(len: usize) -> Value {
    Value::number(len as f64)
}

fn push(_interp: &mut Interpreter, this: Value, args: &[Value]) -> EvalResult {
    let items = receiver(&this, "push")?;
    items.borrow_mut().extend(args.iter().cloned());
    let len = items.borrow().len();
    Ok(len_value(len))
}

fn pop(_interp: &mut Interpreter, this: Value, _args: &[Value]) -> EvalResult {
    let items = receiver(&this, "pop")?;
    let popped = items.borrow_mut().pop();
    Ok(popped.unwrap_or(Value::Undefined))
}

fn shift(_interp: &mut Interpreter, this: Value, _args: &[Value]) -> EvalResult {
    let items = receiver(&this, "shift")?;
    let mut guard = items.borrow_mut();
    if guard.is_empty() {
        return Ok(Value::Undefined);
    }
    Ok(guard.remove(0))
}

fn unshift(_interp: &mut Interpreter, this: Value, args: &[Value]) -> EvalResult {
    let items = receiver(&this, "unshift")?;
    let mut guard = items.borrow_mut();
    for (i, arg) in args.iter().enumerate() {
        guard.insert(i, arg.clone());
    }
    Ok(len_value(guard.len()))
}

/// Resolve a possibly-negative, possibly-missing range endpoint.
fn range_endpoint(arg: Option<&Value>, len: usize, default: usize, interner: &rill_ir::StringInterner)
    -> Result<usize, crate::errors::EvalError>
{
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
    let items = receiver(&this, "slice")?;
    let guard = items.borrow();
    let len = guard.len();
    let start = range_endpoint(args.first(), len, 0, &interp.interner)?;
    let end = range_endpoint(args.get(1), len, len, &interp.interner)?;
    let out = if start < end {
        guard[start..end].to_vec()
    } else {
        Vec::new()
    };
    Ok(Value::array(out))
}

fn index_of(_interp: &mut Interpreter, this: Value, args: &[Value]) -> EvalResult {
    let items = receiver(&this, "indexOf")?;
    let needle = args.first().cloned().unwrap_or(Value::Undefined);
    let guard = items.borrow();
    for (i, item) in guard.iter().enumerate() {
        if strict_equals(item, &needle) {
            #[allow(clippy::cast_precision_loss)]
            return Ok(Value::number(i as f64));
        }
    }
    Ok(Value::number(-1.0))
}

fn includes(_interp: &mut Interpreter, this: Value, args: &[Value]) -> EvalResult {
    let items = receiver(&this, "includes")?;
    let needle = args.first().cloned().unwrap_or(Value::Undefined);
    let needle_is_nan = matches!(&needle, Value::Number(n) if n.is_nan());
    let guard = items.borrow();
    let found = guard.iter().any(|item| {
        // SameValueZero: NaN matches NaN here, unlike strict equality.
        strict_equals(item, &needle)
            || (needle_is_nan && matches!(item, Value::Number(n) if n.is_nan()))
    });
    Ok(Value::Bool(found))
}

fn join(interp: &mut Interpreter, this: Value, args: &[Value]) -> EvalResult {
    let items = receiver(&this, "join")?;
    let separator = match args.first() {
        Some(Value::Undefined) | None => ",".to_string(),
        Some(sep) => to_string_coerce(sep, &interp.interner)?,
    };
    let snapshot = items.borrow().clone();
    let mut parts = Vec::with_capacity(snapshot.len());
    for item in &snapshot {
        if item.is_nullish() {
            parts.push(String::new());
        } else {
            parts.push(to_string_coerce(item, &interp.interner)?);
        }
    }
    Ok(Value::string(parts.join(&separator)))
}

fn concat(_interp: &mut Interpreter, this: Value, args: &[Value]) -> EvalResult {
    let items = receiver(&this, "concat")?;
    let mut out = items.borrow().clone();
    for arg in args {
        match arg {
            Value::Array(more) => out.extend(more.borrow().iter().cloned()),
            other => out.push(other.clone()),
        }
    }
    Ok(Value::array(out))
}

fn callback(args: &[Value], method: &str) -> Result<crate::value::FunctionValue, crate::errors::EvalError> {
    match args.first() {
        Some(Value::Function(f)) => Ok(f.clone()),
        _ => Err(type_error(format!("{method} expects a callback function"))),
    }
}

fn map(interp: &mut Interpreter, this: Value, args: &[Value]) -> EvalResult {
    let items = receiver(&this, "map")?;
    let f = callback(args, "map")?;
    let snapshot = items.borrow().clone();
    let mut out = Vec::with_capacity(snapshot.len());
    for (i, item) in snapshot.into_iter().enumerate() {
        #[allow(clippy::cast_precision_loss)]
        let mapped = interp.call_function(
            &f,
            Value::Undefined,
            &[item, Value::number(i as f64), this.clone()],
        )?;
        out.push(mapped);
    }
    Ok(Value::array(out))
}

fn filter(interp: &mut Interpreter, this: Value, args: &[Value]) -> EvalResult {
    let items = receiver(&this, "filter")?;
    let f = callback(args, "filter")?;
    let snapshot = items.borrow().clone();
    let mut out = Vec::new();
    for (i, item) in snapshot.into_iter().enumerate() {
        #[allow(clippy::cast_precision_loss)]
        let keep = interp.call_function(
            &f,
            Value::Undefined,
            &[item.clone(), Value::number(i as f64), this.clone()],
        )?;
        if is_truthy(&keep) {
            out.push(item);
        }
    }
    Ok(Value::array(out))
}

fn reduce(interp: &mut Interpreter, this: Value, args: &[Value]) -> EvalResult {
    let items = receiver(&this, "reduce")?;
    let f = callback(args, "reduce")?;
    let snapshot = items.borrow().clone();
    let mut iter = snapshot.into_iter().enumerate();

    let mut acc = match args.get(1) {
        Some(initial) => initial.clone(),
        None => match iter.next() {
            Some((_, first)) => first,
            None => return Err(type_error("Reduce of empty array with no initial value")),
        },
    };
    for (i, item) in iter {
        #[allow(clippy::cast_precision_loss)]
        let next = interp.call_function(
            &f,
            Value::Undefined,
            &[acc, item, Value::number(i as f64), this.clone()],
        )?;
        acc = next;
    }
    Ok(acc)
}

fn for_each(interp: &mut Interpreter, this: Value, args: &[Value]) -> EvalResult {
    let items = receiver(&this, "forEach")?;
    let f = callback(args, "forEach")?;
    let snapshot = items.borrow().clone();
    for (i, item) in snapshot.into_iter().enumerate() {
        #[allow(clippy::cast_precision_loss)]
        interp.call_function(
            &f,
            Value::Undefined,
            &[item, Value::number(i as f64), this.clone()],
        )?;
    }
    Ok(Value::Undefined)
}

fn find(interp: &mut Interpreter, this: Value, args: &[Value]) -> EvalResult {
    let items = receiver(&this, "find")?;
    let f = callback(args, "find")?;
    let snapshot = items.borrow().clone();
    for (i, item) in snapshot.into_iter().enumerate() {
        #[allow(clippy::cast_precision_loss)]
        let hit = interp.call_function(
            &f,
            Value::Undefined,
            &[item.clone(), Value::number(i as f64), this.clone()],
        )?;
        if is_truthy(&hit) {
            return Ok(item);
        }
    }
    Ok(Value::Undefined)
}
