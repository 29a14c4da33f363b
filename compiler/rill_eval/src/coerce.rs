//! Coercion tables: truthiness, ToNumber/ToString, equality, display.
//!
//! Every rule here is explicit — nothing leans on host-language dispatch.
//! The falsy set is fixed: `false`, `0`, `-0`, `NaN`, `""`, `null`,
//! `undefined` (and `0n`).

use rill_ir::{Name, StringInterner};

use crate::errors::{type_error, EvalError};
use crate::value::{ObjectClass, Value};

/// Truthiness in boolean contexts.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Undefined | Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => *n != 0.0 && !n.is_nan(),
        Value::BigInt(v) => *v != 0,
        Value::Str(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) | Value::Function(_) | Value::Promise(_) => true,
    }
}

/// Format a number the way JavaScript stringifies it.
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        // Covers -0 as well.
        return "0".to_string();
    }
    if n.fract() == 0.0 && n.abs() < 1e21 {
        return format!("{n:.0}");
    }
    if n.abs() >= 1e21 {
        // JS switches to exponent form at 1e21 ("1e+21").
        let exp = format!("{n:e}");
        return match exp.find('e') {
            Some(i) if !exp[i + 1..].starts_with('-') => {
                format!("{}e+{}", &exp[..i], &exp[i + 1..])
            }
            _ => exp,
        };
    }
    format!("{n}")
}

/// ToNumber coercion.
///
/// BigInt refuses implicit conversion, matching the language.
pub fn to_number(value: &Value, interner: &StringInterner) -> Result<f64, EvalError> {
    match value {
        Value::Undefined => Ok(f64::NAN),
        Value::Null => Ok(0.0),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => Ok(*n),
        Value::BigInt(_) => Err(type_error("Cannot convert a BigInt value to a number")),
        Value::Str(s) => Ok(string_to_number(s)),
        Value::Array(items) => {
            // ToPrimitive on arrays goes through their string form.
            let joined = array_to_string_inner(&items.borrow(), interner)?;
            Ok(string_to_number(&joined))
        }
        Value::Object(_) | Value::Function(_) | Value::Promise(_) => Ok(f64::NAN),
    }
}

fn string_to_number(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed {
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        _ => trimmed.parse().unwrap_or(f64::NAN),
    }
}

fn array_to_string_inner(
    items: &[Value],
    interner: &StringInterner,
) -> Result<String, EvalError> {
    let mut parts = Vec::with_capacity(items.len());
    for item in items {
        if item.is_nullish() {
            parts.push(String::new());
        } else {
            parts.push(to_string_coerce(item, interner)?);
        }
    }
    Ok(parts.join(","))
}

/// ToString coercion (string concatenation, template interpolation,
/// property keys).
pub fn to_string_coerce(value: &Value, interner: &StringInterner) -> Result<String, EvalError> {
    match value {
        Value::Undefined => Ok("undefined".to_string()),
        Value::Null => Ok("null".to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(number_to_string(*n)),
        Value::BigInt(v) => Ok(v.to_string()),
        Value::Str(s) => Ok(s.as_str().to_string()),
        Value::Array(items) => array_to_string_inner(&items.borrow(), interner),
        Value::Object(obj) => {
            if obj.borrow().class == ObjectClass::Error {
                Ok(error_object_to_string(value, interner))
            } else {
                Ok("[object Object]".to_string())
            }
        }
        Value::Function(_) => Ok("function () { ... }".to_string()),
        Value::Promise(_) => Ok("[object Promise]".to_string()),
    }
}

/// Render an Error-shaped object as `Name: message`.
fn error_object_to_string(value: &Value, interner: &StringInterner) -> String {
    let Value::Object(obj) = value else {
        return "Error".to_string();
    };
    let guard = obj.borrow();
    let name = match guard.get_own(interner.intern("name")) {
        Some(Value::Str(s)) => s.as_str().to_string(),
        _ => "Error".to_string(),
    };
    let message = match guard.get_own(interner.intern("message")) {
        Some(Value::Str(s)) => s.as_str().to_string(),
        _ => String::new(),
    };
    if message.is_empty() {
        name
    } else {
        format!("{name}: {message}")
    }
}

/// Strict equality (`===`): identical tag plus identical value; reference
/// identity for objects, arrays, functions, and promises.
pub fn strict_equals(a: &Value, b: &Value) -> bool {
    use Value::*;
    match (a, b) {
        (Undefined, Undefined) | (Null, Null) => true,
        (Bool(x), Bool(y)) => x == y,
        (Number(x), Number(y)) => x == y,
        (BigInt(x), BigInt(y)) => x == y,
        (Str(x), Str(y)) => x.as_str() == y.as_str(),
        (Array(x), Array(y)) => crate::value::Shared::ptr_eq(x, y),
        (Object(x), Object(y)) => crate::value::Shared::ptr_eq(x, y),
        (Promise(x), Promise(y)) => crate::value::Shared::ptr_eq(x, y),
        (Function(x), Function(y)) => crate::value::FunctionValue::ptr_eq(x, y),
        _ => false,
    }
}

/// Loose equality (`==`) per the fixed coercion table:
/// - same tag: strict comparison
/// - `null == undefined` (and nothing else loosely equals them)
/// - number ~ string: the string converts to a number
/// - boolean ~ anything: the boolean converts to 0/1 first
/// - bigint ~ number/string: numeric comparison
/// - reference values loosely equal only by identity
pub fn loose_equals(a: &Value, b: &Value) -> bool {
    use Value::*;
    match (a, b) {
        (Undefined | Null, Undefined | Null) => true,
        (Undefined | Null, _) | (_, Undefined | Null) => false,

        (Number(x), Str(s)) | (Str(s), Number(x)) => *x == string_to_number(s),
        (BigInt(x), Number(n)) | (Number(n), BigInt(x)) => {
            n.fract() == 0.0 && *x as f64 == *n
        }
        (BigInt(x), Str(s)) | (Str(s), BigInt(x)) => {
            s.trim().parse::<i64>().map(|v| v == *x).unwrap_or(false)
        }

        (Bool(x), other) | (other, Bool(x)) => {
            let as_number = Value::number(if *x { 1.0 } else { 0.0 });
            loose_equals(&as_number, other)
        }

        _ => strict_equals(a, b),
    }
}

/// Convert a value to a property key name.
pub fn to_property_key(value: &Value, interner: &StringInterner) -> Result<Name, EvalError> {
    let key = to_string_coerce(value, interner)?;
    Ok(interner.intern_owned(key))
}

/// Console/inspector rendering (node-flavored): strings quoted when nested,
/// arrays and objects expanded with a cycle guard.
pub fn inspect(value: &Value, interner: &StringInterner) -> String {
    let mut seen: Vec<*const ()> = Vec::new();
    inspect_inner(value, interner, &mut seen, false)
}

/// Top-level console rendering: bare strings, everything else inspected.
pub fn console_display(value: &Value, interner: &StringInterner) -> String {
    match value {
        Value::Str(s) => s.as_str().to_string(),
        other => inspect(other, interner),
    }
}

fn inspect_inner(
    value: &Value,
    interner: &StringInterner,
    seen: &mut Vec<*const ()>,
    nested: bool,
) -> String {
    match value {
        Value::Undefined => "undefined".to_string(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number_to_string(*n),
        Value::BigInt(v) => format!("{v}n"),
        Value::Str(s) => {
            if nested {
                format!("'{}'", s.as_str())
            } else {
                s.as_str().to_string()
            }
        }
        Value::Array(items) => {
            let ptr = items.as_ptr();
            if seen.contains(&ptr) {
                return "[Circular]".to_string();
            }
            seen.push(ptr);
            let guard = items.borrow();
            let rendered: Vec<String> = guard
                .iter()
                .map(|item| inspect_inner(item, interner, seen, true))
                .collect();
            drop(guard);
            seen.pop();
            if rendered.is_empty() {
                "[]".to_string()
            } else {
                format!("[ {} ]", rendered.join(", "))
            }
        }
        Value::Object(obj) => {
            let ptr = obj.as_ptr();
            if seen.contains(&ptr) {
                return "[Circular]".to_string();
            }
            if obj.borrow().class == ObjectClass::Error {
                return error_object_to_string(value, interner);
            }
            seen.push(ptr);
            let guard = obj.borrow();
            let rendered: Vec<String> = guard
                .entries()
                .iter()
                .map(|(key, val)| {
                    format!(
                        "{}: {}",
                        interner.resolve(*key),
                        inspect_inner(val, interner, seen, true)
                    )
                })
                .collect();
            drop(guard);
            seen.pop();
            if rendered.is_empty() {
                "{}".to_string()
            } else {
                format!("{{ {} }}", rendered.join(", "))
            }
        }
        Value::Function(f) => {
            let name = interner.resolve(f.name());
            if name.is_empty() {
                "[Function (anonymous)]".to_string()
            } else {
                format!("[Function: {name}]")
            }
        }
        Value::Promise(state) => {
            use crate::value::PromiseStatus;
            let status = state.borrow().status.clone();
            match status {
                PromiseStatus::Pending => "Promise { <pending> }".to_string(),
                PromiseStatus::Fulfilled(v) => {
                    format!("Promise {{ {} }}", inspect_inner(&v, interner, seen, true))
                }
                PromiseStatus::Rejected(v) => {
                    format!(
                        "Promise {{ <rejected> {} }}",
                        inspect_inner(&v, interner, seen, true)
                    )
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn falsy_set_is_exact() {
        assert!(!is_truthy(&Value::Bool(false)));
        assert!(!is_truthy(&Value::number(0.0)));
        assert!(!is_truthy(&Value::number(-0.0)));
        assert!(!is_truthy(&Value::number(f64::NAN)));
        assert!(!is_truthy(&Value::string("")));
        assert!(!is_truthy(&Value::Null));
        assert!(!is_truthy(&Value::Undefined));
        assert!(!is_truthy(&Value::BigInt(0)));

        assert!(is_truthy(&Value::string("0")));
        assert!(is_truthy(&Value::number(-1.0)));
        assert!(is_truthy(&Value::array(vec![])));
        assert!(is_truthy(&Value::object(crate::value::JsObject::new())));
    }

    #[test]
    fn number_formatting_is_js_shaped() {
        assert_eq!(number_to_string(1.0), "1");
        assert_eq!(number_to_string(-0.0), "0");
        assert_eq!(number_to_string(3.14), "3.14");
        assert_eq!(number_to_string(12_300_000.0), "12300000");
        assert_eq!(number_to_string(0.00123), "0.00123");
        assert_eq!(number_to_string(f64::NAN), "NaN");
        assert_eq!(number_to_string(f64::INFINITY), "Infinity");
    }

    #[test]
    fn to_number_table() {
        let interner = StringInterner::new();
        assert_eq!(to_number(&Value::Null, &interner).ok(), Some(0.0));
        assert!(to_number(&Value::Undefined, &interner)
            .map(f64::is_nan)
            .unwrap_or(false));
        assert_eq!(to_number(&Value::Bool(true), &interner).ok(), Some(1.0));
        assert_eq!(to_number(&Value::string("  5  "), &interner).ok(), Some(5.0));
        assert_eq!(to_number(&Value::string(""), &interner).ok(), Some(0.0));
        assert!(to_number(&Value::BigInt(1), &interner).is_err());
    }

    #[test]
    fn loose_equality_table() {
        // 5 == "5"
        assert!(loose_equals(&Value::number(5.0), &Value::string("5")));
        // null == undefined, and nothing else
        assert!(loose_equals(&Value::Null, &Value::Undefined));
        assert!(!loose_equals(&Value::Null, &Value::number(0.0)));
        assert!(!loose_equals(&Value::Undefined, &Value::Bool(false)));
        // booleans through 0/1
        assert!(loose_equals(&Value::Bool(true), &Value::number(1.0)));
        assert!(loose_equals(&Value::Bool(false), &Value::string("")));
        // bigint crossings
        assert!(loose_equals(&Value::BigInt(5), &Value::number(5.0)));
        assert!(loose_equals(&Value::BigInt(5), &Value::string("5")));
    }

    #[test]
    fn strict_equality_requires_same_tag() {
        assert!(!strict_equals(&Value::number(5.0), &Value::string("5")));
        assert!(strict_equals(&Value::string("a"), &Value::string("a")));
        assert!(!strict_equals(
            &Value::number(f64::NAN),
            &Value::number(f64::NAN)
        ));
        // Reference identity for arrays.
        let a = Value::array(vec![]);
        let b = a.clone();
        assert!(strict_equals(&a, &b));
        assert!(!strict_equals(&a, &Value::array(vec![])));
    }

    #[test]
    fn inspect_renders_node_style() {
        let interner = rill_ir::StringInterner::new();
        let arr = Value::array(vec![
            Value::number(1.0),
            Value::string("two"),
            Value::Null,
        ]);
        assert_eq!(inspect(&arr, &interner), "[ 1, 'two', null ]");

        let mut obj = crate::value::JsObject::new();
        obj.set(interner.intern("name"), Value::string("John"));
        obj.set(interner.intern("age"), Value::number(30.0));
        let obj = Value::object(obj);
        assert_eq!(inspect(&obj, &interner), "{ name: 'John', age: 30 }");
    }

    #[test]
    fn inspect_detects_cycles() {
        let interner = rill_ir::StringInterner::new();
        let arr = Value::array(vec![]);
        if let Value::Array(items) = &arr {
            items.borrow_mut().push(arr.clone());
        }
        assert_eq!(inspect(&arr, &interner), "[ [Circular] ]");
    }
}
