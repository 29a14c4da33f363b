//! Global environment installation.
//!
//! Registers the standard globals into the root scope: `console`, `Math`,
//! `JSON`, `Object`, `Array`, `Error`, `Promise`, timers, and the global
//! conversion functions. Everything is a native function or a plain object
//! holding native functions; nothing here is magic to the evaluator.

mod json;

use rill_ir::DeclKind;

use crate::coerce::{console_display, is_truthy, to_number, to_string_coerce};
use crate::console::Level;
use crate::environment::declare_lexical;
use crate::errors::{type_error, EvalResult};
use crate::interpreter::Interpreter;
use crate::tasks::{TaskId, TaskKind};
use crate::value::{
    FunctionValue, JsObject, NativeFn, ObjectClass, PromiseState, Shared, Value,
};

/// Install the standard globals.
pub(crate) fn install(interp: &mut Interpreter) {
    let console = object_of(
        interp,
        &[
            ("log", native(interp, "log", console_log)),
            ("warn", native(interp, "warn", console_warn)),
            ("error", native(interp, "error", console_error)),
        ],
    );
    define(interp, "console", console);

    let math = object_of(
        interp,
        &[
            ("PI", Value::number(std::f64::consts::PI)),
            ("E", Value::number(std::f64::consts::E)),
            ("abs", native(interp, "abs", math_abs)),
            ("floor", native(interp, "floor", math_floor)),
            ("ceil", native(interp, "ceil", math_ceil)),
            ("round", native(interp, "round", math_round)),
            ("trunc", native(interp, "trunc", math_trunc)),
            ("sqrt", native(interp, "sqrt", math_sqrt)),
            ("pow", native(interp, "pow", math_pow)),
            ("min", native(interp, "min", math_min)),
            ("max", native(interp, "max", math_max)),
        ],
    );
    define(interp, "Math", math);

    let json = object_of(
        interp,
        &[
            ("stringify", native(interp, "stringify", json_stringify)),
            ("parse", native(interp, "parse", json_parse)),
        ],
    );
    define(interp, "JSON", json);

    let object_fn = native(interp, "Object", object_constructor);
    set_fn_props(
        interp,
        &object_fn,
        &[
            ("keys", native(interp, "keys", object_keys)),
            ("values", native(interp, "values", object_values)),
            ("entries", native(interp, "entries", object_entries)),
        ],
    );
    define(interp, "Object", object_fn);

    let array_fn = native(interp, "Array", array_constructor);
    set_fn_props(
        interp,
        &array_fn,
        &[("isArray", native(interp, "isArray", array_is_array))],
    );
    define(interp, "Array", array_fn);

    let error_fn = native(interp, "Error", error_constructor);
    define(interp, "Error", error_fn);

    let promise_fn = native(interp, "Promise", promise_constructor);
    set_fn_props(
        interp,
        &promise_fn,
        &[
            ("resolve", native(interp, "resolve", promise_resolve_static)),
            ("reject", native(interp, "reject", promise_reject_static)),
        ],
    );
    define(interp, "Promise", promise_fn);

    let set_timeout = native(interp, "setTimeout", set_timeout_fn);
    define(interp, "setTimeout", set_timeout);
    let clear_timeout = native(interp, "clearTimeout", clear_timeout_fn);
    define(interp, "clearTimeout", clear_timeout);

    let parse_int_fn = native(interp, "parseInt", parse_int);
    define(interp, "parseInt", parse_int_fn);
    let parse_float_fn = native(interp, "parseFloat", parse_float);
    define(interp, "parseFloat", parse_float_fn);
    let is_nan_fn2 = native(interp, "isNaN", is_nan_fn);
    define(interp, "isNaN", is_nan_fn2);
    let number_fn2 = native(interp, "Number", number_fn);
    define(interp, "Number", number_fn2);
    let string_fn2 = native(interp, "String", string_fn);
    define(interp, "String", string_fn2);
    let boolean_fn2 = native(interp, "Boolean", boolean_fn);
    define(interp, "Boolean", boolean_fn2);

    define(interp, "undefined", Value::Undefined);
    define(interp, "NaN", Value::number(f64::NAN));
    define(interp, "Infinity", Value::number(f64::INFINITY));
}

fn define(interp: &mut Interpreter, name: &'static str, value: Value) {
    let name = interp.interner.intern(name);
    let _ = declare_lexical(&interp.global, name, value, DeclKind::Const);
}

fn native(interp: &Interpreter, name: &'static str, func: NativeFn) -> Value {
    Value::Function(FunctionValue::native(
        name,
        interp.interner.intern(name),
        func,
    ))
}

fn object_of(interp: &Interpreter, entries: &[(&'static str, Value)]) -> Value {
    let mut object = JsObject::new();
    for (key, value) in entries {
        object.set(interp.interner.intern(key), value.clone());
    }
    Value::object(object)
}

fn set_fn_props(interp: &Interpreter, function: &Value, entries: &[(&'static str, Value)]) {
    let Value::Function(f) = function else { return };
    for (key, value) in entries {
        f.set_property(interp.interner.intern(key), value.clone());
    }
}

// console

fn console_write(interp: &mut Interpreter, level: Level, args: &[Value]) -> EvalResult {
    let line = args
        .iter()
        .map(|value| console_display(value, &interp.interner))
        .collect::<Vec<_>>()
        .join(" ");
    interp.console.write(level, line);
    Ok(Value::Undefined)
}

fn console_log(interp: &mut Interpreter, _this: Value, args: &[Value]) -> EvalResult {
    console_write(interp, Level::Log, args)
}

fn console_warn(interp: &mut Interpreter, _this: Value, args: &[Value]) -> EvalResult {
    console_write(interp, Level::Warn, args)
}

fn console_error(interp: &mut Interpreter, _this: Value, args: &[Value]) -> EvalResult {
    console_write(interp, Level::Error, args)
}

// Math

fn num_arg(interp: &Interpreter, args: &[Value], i: usize) -> Result<f64, crate::errors::EvalError> {
    match args.get(i) {
        Some(value) => to_number(value, &interp.interner),
        None => Ok(f64::NAN),
    }
}

fn math_abs(interp: &mut Interpreter, _this: Value, args: &[Value]) -> EvalResult {
    Ok(Value::number(num_arg(interp, args, 0)?.abs()))
}

fn math_floor(interp: &mut Interpreter, _this: Value, args: &[Value]) -> EvalResult {
    Ok(Value::number(num_arg(interp, args, 0)?.floor()))
}

fn math_ceil(interp: &mut Interpreter, _this: Value, args: &[Value]) -> EvalResult {
    Ok(Value::number(num_arg(interp, args, 0)?.ceil()))
}

fn math_round(interp: &mut Interpreter, _this: Value, args: &[Value]) -> EvalResult {
    // Half-up like the language (round(-0.5) is -0), not half-away.
    let n = num_arg(interp, args, 0)?;
    Ok(Value::number((n + 0.5).floor()))
}

fn math_trunc(interp: &mut Interpreter, _this: Value, args: &[Value]) -> EvalResult {
    Ok(Value::number(num_arg(interp, args, 0)?.trunc()))
}

fn math_sqrt(interp: &mut Interpreter, _this: Value, args: &[Value]) -> EvalResult {
    Ok(Value::number(num_arg(interp, args, 0)?.sqrt()))
}

fn math_pow(interp: &mut Interpreter, _this: Value, args: &[Value]) -> EvalResult {
    let base = num_arg(interp, args, 0)?;
    let exp = num_arg(interp, args, 1)?;
    Ok(Value::number(base.powf(exp)))
}

fn math_min(interp: &mut Interpreter, _this: Value, args: &[Value]) -> EvalResult {
    let mut best = f64::INFINITY;
    for arg in args {
        let n = to_number(arg, &interp.interner)?;
        if n.is_nan() {
            return Ok(Value::number(f64::NAN));
        }
        best = best.min(n);
    }
    Ok(Value::number(best))
}

fn math_max(interp: &mut Interpreter, _this: Value, args: &[Value]) -> EvalResult {
    let mut best = f64::NEG_INFINITY;
    for arg in args {
        let n = to_number(arg, &interp.interner)?;
        if n.is_nan() {
            return Ok(Value::number(f64::NAN));
        }
        best = best.max(n);
    }
    Ok(Value::number(best))
}

// JSON

fn json_stringify(interp: &mut Interpreter, _this: Value, args: &[Value]) -> EvalResult {
    let value = args.first().cloned().unwrap_or(Value::Undefined);
    match json::stringify(&value, &interp.interner)? {
        Some(text) => Ok(Value::string(text)),
        None => Ok(Value::Undefined),
    }
}

fn json_parse(interp: &mut Interpreter, _this: Value, args: &[Value]) -> EvalResult {
    let text = match args.first() {
        Some(value) => to_string_coerce(value, &interp.interner)?,
        None => return Err(type_error("Unexpected token undefined in JSON")),
    };
    json::parse(&text, &interp.interner)
}

// Object / Array / Error

fn object_constructor(_interp: &mut Interpreter, _this: Value, _args: &[Value]) -> EvalResult {
    Ok(Value::object(JsObject::new()))
}

/// Own-key enumeration shared by keys/values/entries.
fn own_entries(
    interp: &mut Interpreter,
    args: &[Value],
) -> Result<Vec<(String, Value)>, crate::errors::EvalError> {
    let value = args.first().cloned().unwrap_or(Value::Undefined);
    match &value {
        Value::Object(obj) => Ok(obj
            .borrow()
            .entries()
            .iter()
            .map(|(key, val)| (interp.interner.resolve(*key).to_string(), val.clone()))
            .collect()),
        Value::Array(items) => Ok(items
            .borrow()
            .iter()
            .enumerate()
            .map(|(i, val)| (i.to_string(), val.clone()))
            .collect()),
        Value::Str(s) => Ok(s
            .chars()
            .enumerate()
            .map(|(i, c)| (i.to_string(), Value::string(c.to_string())))
            .collect()),
        Value::Null | Value::Undefined => Err(type_error(format!(
            "Cannot convert {} to object",
            value.type_name()
        ))),
        _ => Ok(Vec::new()),
    }
}

fn object_keys(interp: &mut Interpreter, _this: Value, args: &[Value]) -> EvalResult {
    let entries = own_entries(interp, args)?;
    Ok(Value::array(
        entries.into_iter().map(|(k, _)| Value::string(k)).collect(),
    ))
}

fn object_values(interp: &mut Interpreter, _this: Value, args: &[Value]) -> EvalResult {
    let entries = own_entries(interp, args)?;
    Ok(Value::array(entries.into_iter().map(|(_, v)| v).collect()))
}

fn object_entries(interp: &mut Interpreter, _this: Value, args: &[Value]) -> EvalResult {
    let entries = own_entries(interp, args)?;
    Ok(Value::array(
        entries
            .into_iter()
            .map(|(k, v)| Value::array(vec![Value::string(k), v]))
            .collect(),
    ))
}

fn array_constructor(interp: &mut Interpreter, _this: Value, args: &[Value]) -> EvalResult {
    // `Array(3)` is a length, `Array(a, b)` is elements.
    if args.len() == 1 {
        if matches!(args[0], Value::Number(_)) {
            let len = to_number(&args[0], &interp.interner)?;
            if len.fract() != 0.0 || !(0.0..=f64::from(u32::MAX)).contains(&len) {
                return Err(crate::errors::range_error("Invalid array length"));
            }
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            return Ok(Value::array(vec![Value::Undefined; len as usize]));
        }
    }
    Ok(Value::array(args.to_vec()))
}

fn array_is_array(_interp: &mut Interpreter, _this: Value, args: &[Value]) -> EvalResult {
    Ok(Value::Bool(matches!(args.first(), Some(Value::Array(_)))))
}

fn error_constructor(interp: &mut Interpreter, _this: Value, args: &[Value]) -> EvalResult {
    let message = match args.first() {
        Some(Value::Undefined) | None => String::new(),
        Some(value) => to_string_coerce(value, &interp.interner)?,
    };
    let mut obj = JsObject::new();
    obj.class = ObjectClass::Error;
    obj.set(interp.interner.intern("name"), Value::string("Error"));
    obj.set(interp.interner.intern("message"), Value::string(message));
    Ok(Value::object(obj))
}

// Promise

fn promise_constructor(interp: &mut Interpreter, _this: Value, args: &[Value]) -> EvalResult {
    let Some(Value::Function(executor)) = args.first() else {
        return Err(type_error("Promise resolver is not a function"));
    };
    let state = Shared::new(PromiseState::pending());
    let resolve = Value::Function(FunctionValue::resolver(state.clone(), false));
    let reject = Value::Function(FunctionValue::resolver(state.clone(), true));

    // The executor runs synchronously; a throw inside it rejects.
    match interp.call_function(&executor.clone(), Value::Undefined, &[resolve, reject]) {
        Ok(_) => {}
        Err(e) if e.is_catchable() => {
            let value = interp.error_to_value(&e);
            interp.reject_promise(&state, value);
        }
        Err(e) => return Err(e),
    }
    Ok(Value::Promise(state))
}

fn promise_resolve_static(interp: &mut Interpreter, _this: Value, args: &[Value]) -> EvalResult {
    let state = Shared::new(PromiseState::pending());
    let value = args.first().cloned().unwrap_or(Value::Undefined);
    interp.resolve_promise(&state, value);
    Ok(Value::Promise(state))
}

fn promise_reject_static(interp: &mut Interpreter, _this: Value, args: &[Value]) -> EvalResult {
    let state = Shared::new(PromiseState::pending());
    let value = args.first().cloned().unwrap_or(Value::Undefined);
    interp.reject_promise(&state, value);
    Ok(Value::Promise(state))
}

// Timers

fn set_timeout_fn(interp: &mut Interpreter, _this: Value, args: &[Value]) -> EvalResult {
    let Some(Value::Function(callback)) = args.first() else {
        return Err(type_error("setTimeout callback is not a function"));
    };
    let delay = match args.get(1) {
        Some(value) => {
            let n = to_number(value, &interp.interner)?;
            if n.is_nan() || n < 0.0 {
                0
            } else {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                {
                    n as u64
                }
            }
        }
        None => 0,
    };
    let extra = args.get(2..).map(<[Value]>::to_vec).unwrap_or_default();
    let id = interp.tasks.schedule(
        TaskKind::Timer {
            callback: callback.clone(),
            args: extra,
        },
        delay,
    );
    Ok(Value::number(id.as_f64()))
}

fn clear_timeout_fn(interp: &mut Interpreter, _this: Value, args: &[Value]) -> EvalResult {
    if let Some(Value::Number(n)) = args.first() {
        if let Some(id) = TaskId::from_f64(*n) {
            interp.tasks.cancel(id);
        }
    }
    Ok(Value::Undefined)
}

// Global conversion functions

fn parse_int(interp: &mut Interpreter, _this: Value, args: &[Value]) -> EvalResult {
    let text = match args.first() {
        Some(value) => to_string_coerce(value, &interp.interner)?,
        None => return Ok(Value::number(f64::NAN)),
    };
    let radix = match args.get(1) {
        Some(value) => {
            let n = to_number(value, &interp.interner)?;
            if n.is_nan() {
                0
            } else {
                #[allow(clippy::cast_possible_truncation)]
                {
                    n.trunc() as i64
                }
            }
        }
        None => 0,
    };

    let mut s = text.trim();
    let mut sign = 1.0;
    if let Some(rest) = s.strip_prefix('-') {
        sign = -1.0;
        s = rest;
    } else if let Some(rest) = s.strip_prefix('+') {
        s = rest;
    }

    let radix = match radix {
        0 => {
            if s.starts_with("0x") || s.starts_with("0X") {
                s = &s[2..];
                16
            } else {
                10
            }
        }
        16 => {
            if s.starts_with("0x") || s.starts_with("0X") {
                s = &s[2..];
            }
            16
        }
        r if (2..=36).contains(&r) => r,
        _ => return Ok(Value::number(f64::NAN)),
    };

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let radix_u32 = radix as u32;
    let mut value = 0.0f64;
    let mut any = false;
    for c in s.chars() {
        match c.to_digit(radix_u32) {
            Some(digit) => {
                value = value * f64::from(radix_u32) + f64::from(digit);
                any = true;
            }
            None => break,
        }
    }
    if !any {
        return Ok(Value::number(f64::NAN));
    }
    Ok(Value::number(sign * value))
}

fn parse_float(interp: &mut Interpreter, _this: Value, args: &[Value]) -> EvalResult {
    let text = match args.first() {
        Some(value) => to_string_coerce(value, &interp.interner)?,
        None => return Ok(Value::number(f64::NAN)),
    };
    let s = text.trim_start();

    // Longest valid float prefix: sign, digits, fraction, exponent.
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    while matches!(bytes.get(end), Some(c) if c.is_ascii_digit()) {
        end += 1;
    }
    if bytes.get(end) == Some(&b'.') {
        end += 1;
        while matches!(bytes.get(end), Some(c) if c.is_ascii_digit()) {
            end += 1;
        }
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        if matches!(bytes.get(exp_end), Some(c) if c.is_ascii_digit()) {
            while matches!(bytes.get(exp_end), Some(c) if c.is_ascii_digit()) {
                exp_end += 1;
            }
            end = exp_end;
        }
    }

    Ok(Value::number(
        s[..end].parse::<f64>().unwrap_or(f64::NAN),
    ))
}

fn is_nan_fn(interp: &mut Interpreter, _this: Value, args: &[Value]) -> EvalResult {
    let n = num_arg(interp, args, 0)?;
    Ok(Value::Bool(n.is_nan()))
}

fn number_fn(interp: &mut Interpreter, _this: Value, args: &[Value]) -> EvalResult {
    match args.first() {
        None => Ok(Value::number(0.0)),
        // Explicit conversion of a BigInt is allowed, unlike coercion.
        #[allow(clippy::cast_precision_loss)]
        Some(Value::BigInt(v)) => Ok(Value::number(*v as f64)),
        Some(value) => Ok(Value::number(to_number(value, &interp.interner)?)),
    }
}

fn string_fn(interp: &mut Interpreter, _this: Value, args: &[Value]) -> EvalResult {
    match args.first() {
        None => Ok(Value::string("")),
        Some(value) => Ok(Value::string(to_string_coerce(value, &interp.interner)?)),
    }
}

fn boolean_fn(_interp: &mut Interpreter, _this: Value, args: &[Value]) -> EvalResult {
    Ok(Value::Bool(
        args.first().map(is_truthy).unwrap_or(false),
    ))
}
