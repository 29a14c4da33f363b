//! Binary and unary operator evaluation over values.
//!
//! Direct enum dispatch; the `in` operator needs property-table access and
//! lives in the interpreter instead.

use rill_ir::{BinaryOp, StringInterner, UnaryOp};

use crate::coerce::{
    is_truthy, loose_equals, strict_equals, to_number, to_string_coerce,
};
use crate::errors::{range_error, type_error, EvalResult};
use crate::value::Value;

/// Evaluate a binary operator (everything except `&&`/`||`, which
/// short-circuit in the interpreter, and `in`).
pub fn evaluate_binary(
    op: BinaryOp,
    left: &Value,
    right: &Value,
    interner: &StringInterner,
) -> EvalResult {
    match op {
        BinaryOp::Add => evaluate_add(left, right, interner),
        BinaryOp::Sub => numeric_or_bigint(op, left, right, interner),
        BinaryOp::Mul => numeric_or_bigint(op, left, right, interner),
        BinaryOp::Div => numeric_or_bigint(op, left, right, interner),
        BinaryOp::Rem => numeric_or_bigint(op, left, right, interner),
        BinaryOp::Pow => numeric_or_bigint(op, left, right, interner),

        BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge => {
            evaluate_relational(op, left, right, interner)
        }

        BinaryOp::EqLoose => Ok(Value::Bool(loose_equals(left, right))),
        BinaryOp::NeLoose => Ok(Value::Bool(!loose_equals(left, right))),
        BinaryOp::EqStrict => Ok(Value::Bool(strict_equals(left, right))),
        BinaryOp::NeStrict => Ok(Value::Bool(!strict_equals(left, right))),

        BinaryOp::In => Err(type_error(
            "Cannot use 'in' operator to search in a non-object",
        )),
    }
}

/// `+`: string concatenation when either side is a string (or coerces to
/// one through an object), otherwise numeric/bigint addition.
fn evaluate_add(left: &Value, right: &Value, interner: &StringInterner) -> EvalResult {
    let stringy = matches!(left, Value::Str(_) | Value::Array(_) | Value::Object(_))
        || matches!(right, Value::Str(_) | Value::Array(_) | Value::Object(_));
    if stringy {
        let mut out = to_string_coerce(left, interner)?;
        out.push_str(&to_string_coerce(right, interner)?);
        return Ok(Value::string(out));
    }
    if let (Value::BigInt(a), Value::BigInt(b)) = (left, right) {
        return a
            .checked_add(*b)
            .map(Value::BigInt)
            .ok_or_else(|| range_error("BigInt addition overflow"));
    }
    let a = to_number(left, interner)?;
    let b = to_number(right, interner)?;
    Ok(Value::number(a + b))
}

/// Numeric arithmetic with a matching bigint path.
///
/// Division by zero follows the language: `1 / 0` is `Infinity` for
/// numbers, an error for bigints.
fn numeric_or_bigint(
    op: BinaryOp,
    left: &Value,
    right: &Value,
    interner: &StringInterner,
) -> EvalResult {
    if let (Value::BigInt(a), Value::BigInt(b)) = (left, right) {
        return bigint_arith(op, *a, *b);
    }
    let a = to_number(left, interner)?;
    let b = to_number(right, interner)?;
    let result = match op {
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => a / b,
        BinaryOp::Rem => a % b,
        BinaryOp::Pow => a.powf(b),
        _ => unreachable_binary(op),
    };
    Ok(Value::number(result))
}

fn bigint_arith(op: BinaryOp, a: i64, b: i64) -> EvalResult {
    let result = match op {
        BinaryOp::Sub => a.checked_sub(b),
        BinaryOp::Mul => a.checked_mul(b),
        BinaryOp::Div => {
            if b == 0 {
                return Err(range_error("Division by zero"));
            }
            a.checked_div(b)
        }
        BinaryOp::Rem => {
            if b == 0 {
                return Err(range_error("Division by zero"));
            }
            a.checked_rem(b)
        }
        BinaryOp::Pow => u32::try_from(b).ok().and_then(|e| a.checked_pow(e)),
        _ => unreachable_binary(op),
    };
    result
        .map(Value::BigInt)
        .ok_or_else(|| range_error("BigInt arithmetic overflow"))
}

fn evaluate_relational(
    op: BinaryOp,
    left: &Value,
    right: &Value,
    interner: &StringInterner,
) -> EvalResult {
    // Two strings compare lexicographically; anything else numerically.
    if let (Value::Str(a), Value::Str(b)) = (left, right) {
        let (a, b) = (a.as_str(), b.as_str());
        let result = match op {
            BinaryOp::Lt => a < b,
            BinaryOp::Gt => a > b,
            BinaryOp::Le => a <= b,
            BinaryOp::Ge => a >= b,
            _ => unreachable_binary(op),
        };
        return Ok(Value::Bool(result));
    }
    if let (Value::BigInt(a), Value::BigInt(b)) = (left, right) {
        let result = match op {
            BinaryOp::Lt => a < b,
            BinaryOp::Gt => a > b,
            BinaryOp::Le => a <= b,
            BinaryOp::Ge => a >= b,
            _ => unreachable_binary(op),
        };
        return Ok(Value::Bool(result));
    }
    let a = to_number(left, interner)?;
    let b = to_number(right, interner)?;
    // NaN comparisons are always false.
    let result = match op {
        BinaryOp::Lt => a < b,
        BinaryOp::Gt => a > b,
        BinaryOp::Le => a <= b,
        BinaryOp::Ge => a >= b,
        _ => unreachable_binary(op),
    };
    Ok(Value::Bool(result))
}

fn unreachable_binary(op: BinaryOp) -> ! {
    // Dispatch above is exhaustive per operator group.
    panic!("operator {op:?} routed to the wrong arithmetic group")
}

/// Evaluate a prefix unary operator.
pub fn evaluate_unary(op: UnaryOp, operand: &Value, interner: &StringInterner) -> EvalResult {
    match op {
        UnaryOp::Not => Ok(Value::Bool(!is_truthy(operand))),
        UnaryOp::Neg => match operand {
            Value::BigInt(v) => v
                .checked_neg()
                .map(Value::BigInt)
                .ok_or_else(|| range_error("BigInt negation overflow")),
            other => Ok(Value::number(-to_number(other, interner)?)),
        },
        UnaryOp::Plus => Ok(Value::number(to_number(operand, interner)?)),
        UnaryOp::TypeOf => Ok(Value::string(operand.type_of())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn num(n: f64) -> Value {
        Value::number(n)
    }

    fn binary(op: BinaryOp, a: &Value, b: &Value) -> Value {
        let interner = StringInterner::new();
        evaluate_binary(op, a, b, &interner).unwrap_or_else(|e| panic!("eval failed: {e}"))
    }

    #[test]
    fn arithmetic_operator_table() {
        // 10 + 5, 10 - 5, 10 * 5, 10 / 5, 10 % 3, 2 ** 3
        assert!(matches!(binary(BinaryOp::Add, &num(10.0), &num(5.0)), Value::Number(n) if n == 15.0));
        assert!(matches!(binary(BinaryOp::Sub, &num(10.0), &num(5.0)), Value::Number(n) if n == 5.0));
        assert!(matches!(binary(BinaryOp::Mul, &num(10.0), &num(5.0)), Value::Number(n) if n == 50.0));
        assert!(matches!(binary(BinaryOp::Div, &num(10.0), &num(5.0)), Value::Number(n) if n == 2.0));
        assert!(matches!(binary(BinaryOp::Rem, &num(10.0), &num(3.0)), Value::Number(n) if n == 1.0));
        assert!(matches!(binary(BinaryOp::Pow, &num(2.0), &num(3.0)), Value::Number(n) if n == 8.0));
    }

    #[test]
    fn plus_concatenates_when_either_side_is_a_string() {
        let interner = StringInterner::new();
        let result = evaluate_binary(
            BinaryOp::Add,
            &Value::string("Hello, "),
            &Value::string("World"),
            &interner,
        );
        assert!(matches!(result, Ok(Value::Str(s)) if s.as_str() == "Hello, World"));

        let mixed = evaluate_binary(BinaryOp::Add, &Value::string("n="), &num(5.0), &interner);
        assert!(matches!(mixed, Ok(Value::Str(s)) if s.as_str() == "n=5"));
    }

    #[test]
    fn string_minus_number_goes_numeric() {
        // "10" - 5 is 5 in JS.
        let result = binary(BinaryOp::Sub, &Value::string("10"), &num(5.0));
        assert!(matches!(result, Value::Number(n) if n == 5.0));
    }

    #[test]
    fn division_by_zero_is_infinity_for_numbers() {
        assert!(matches!(
            binary(BinaryOp::Div, &num(1.0), &num(0.0)),
            Value::Number(n) if n.is_infinite()
        ));
        // NaN propagates through %.
        assert!(matches!(
            binary(BinaryOp::Rem, &num(1.0), &num(0.0)),
            Value::Number(n) if n.is_nan()
        ));
    }

    #[test]
    fn bigint_arithmetic_stays_bigint() {
        let a = Value::BigInt(9_007_199_254_740_991);
        let b = Value::BigInt(2);
        assert!(matches!(
            binary(BinaryOp::Mul, &b, &Value::BigInt(3)),
            Value::BigInt(6)
        ));
        let interner = StringInterner::new();
        // Mixing bigint and number in arithmetic is a TypeError.
        assert!(evaluate_binary(BinaryOp::Add, &a, &num(1.0), &interner).is_err());
    }

    #[test]
    fn relational_on_strings_is_lexicographic() {
        assert!(matches!(
            binary(BinaryOp::Lt, &Value::string("apple"), &Value::string("banana")),
            Value::Bool(true)
        ));
        assert!(matches!(
            binary(BinaryOp::Gt, &Value::string("2"), &Value::string("10")),
            Value::Bool(true)
        ));
    }

    #[test]
    fn nan_comparisons_are_false() {
        let nan = num(f64::NAN);
        assert!(matches!(binary(BinaryOp::Lt, &nan, &num(1.0)), Value::Bool(false)));
        assert!(matches!(binary(BinaryOp::Ge, &nan, &num(1.0)), Value::Bool(false)));
    }

    #[test]
    fn unary_table() {
        let interner = StringInterner::new();
        assert!(matches!(
            evaluate_unary(UnaryOp::Not, &Value::string(""), &interner),
            Ok(Value::Bool(true))
        ));
        assert!(matches!(
            evaluate_unary(UnaryOp::Neg, &num(5.0), &interner),
            Ok(Value::Number(n)) if n == -5.0
        ));
        assert!(matches!(
            evaluate_unary(UnaryOp::Plus, &Value::string("12"), &interner),
            Ok(Value::Number(n)) if n == 12.0
        ));
        assert!(matches!(
            evaluate_unary(UnaryOp::TypeOf, &Value::Null, &interner),
            Ok(Value::Str(s)) if s.as_str() == "object"
        ));
    }
}
