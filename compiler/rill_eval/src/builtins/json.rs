//! JSON serialization and parsing.

use rill_ir::StringInterner;

use crate::coerce::number_to_string;
use crate::errors::{syntax_error, type_error, EvalError};
use crate::value::{JsObject, Value};

/// `JSON.stringify` semantics: `None` when the top-level value has no JSON
/// representation (undefined, functions).
pub(super) fn stringify(
    value: &Value,
    interner: &StringInterner,
) -> Result<Option<String>, EvalError> {
    let mut seen: Vec<*const ()> = Vec::new();
    let mut out = String::new();
    if write_value(value, interner, &mut out, &mut seen)? {
        Ok(Some(out))
    } else {
        Ok(None)
    }
}

/// Append the JSON form of `value`; false when it has none.
fn write_value(
    value: &Value,
    interner: &StringInterner,
    out: &mut String,
    seen: &mut Vec<*const ()>,
) -> Result<bool, EvalError> {
    match value {
        Value::Undefined | Value::Function(_) => Ok(false),
        Value::Null => {
            out.push_str("null");
            Ok(true)
        }
        Value::Bool(b) => {
            out.push_str(if *b { "true" } else { "false" });
            Ok(true)
        }
        Value::Number(n) => {
            if n.is_finite() {
                out.push_str(&number_to_string(*n));
            } else {
                // NaN and infinities serialize as null.
                out.push_str("null");
            }
            Ok(true)
        }
        Value::BigInt(_) => Err(type_error("Do not know how to serialize a BigInt")),
        Value::Str(s) => {
            write_json_string(s, out);
            Ok(true)
        }
        Value::Array(items) => {
            let ptr = items.as_ptr();
            if seen.contains(&ptr) {
                return Err(type_error("Converting circular structure to JSON"));
            }
            seen.push(ptr);
            out.push('[');
            let snapshot = items.borrow().clone();
            for (i, item) in snapshot.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                // Unserializable array elements become null.
                if !write_value(item, interner, out, seen)? {
                    out.push_str("null");
                }
            }
            out.push(']');
            seen.pop();
            Ok(true)
        }
        Value::Object(obj) => {
            let ptr = obj.as_ptr();
            if seen.contains(&ptr) {
                return Err(type_error("Converting circular structure to JSON"));
            }
            seen.push(ptr);
            out.push('{');
            let entries = obj.borrow().entries().to_vec();
            let mut first = true;
            for (key, item) in &entries {
                let mut rendered = String::new();
                // Unserializable members are omitted entirely.
                if write_value(item, interner, &mut rendered, seen)? {
                    if !first {
                        out.push(',');
                    }
                    first = false;
                    write_json_string(interner.resolve(*key), out);
                    out.push(':');
                    out.push_str(&rendered);
                }
            }
            out.push('}');
            seen.pop();
            Ok(true)
        }
        Value::Promise(_) => {
            // Promises serialize like plain empty objects.
            out.push_str("{}");
            Ok(true)
        }
    }
}

fn write_json_string(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

/// `JSON.parse`: recursive descent over the text. Errors are
/// `SyntaxError`s, catchable from user code.
pub(super) fn parse(text: &str, interner: &StringInterner) -> Result<Value, EvalError> {
    let mut parser = JsonParser {
        bytes: text.as_bytes(),
        text,
        pos: 0,
        interner,
    };
    parser.skip_ws();
    let value = parser.parse_value()?;
    parser.skip_ws();
    if parser.pos != parser.bytes.len() {
        return Err(parser.error("Unexpected non-whitespace character after JSON"));
    }
    Ok(value)
}

struct JsonParser<'a> {
    bytes: &'a [u8],
    text: &'a str,
    pos: usize,
    interner: &'a StringInterner,
}

impl JsonParser<'_> {
    fn error(&self, message: &str) -> EvalError {
        syntax_error(format!("{message} in JSON at position {}", self.pos))
    }

    fn skip_ws(&mut self) {
        while matches!(self.bytes.get(self.pos), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    fn eat(&mut self, expected: u8) -> bool {
        if self.bytes.get(self.pos) == Some(&expected) {
            self.pos += 1;
            return true;
        }
        false
    }

    fn expect_literal(&mut self, literal: &str) -> Result<(), EvalError> {
        if self.text[self.pos..].starts_with(literal) {
            self.pos += literal.len();
            Ok(())
        } else {
            Err(self.error("Unexpected token"))
        }
    }

    fn parse_value(&mut self) -> Result<Value, EvalError> {
        match self.bytes.get(self.pos) {
            Some(b'n') => {
                self.expect_literal("null")?;
                Ok(Value::Null)
            }
            Some(b't') => {
                self.expect_literal("true")?;
                Ok(Value::Bool(true))
            }
            Some(b'f') => {
                self.expect_literal("false")?;
                Ok(Value::Bool(false))
            }
            Some(b'"') => Ok(Value::string(self.parse_string()?)),
            Some(b'[') => self.parse_array(),
            Some(b'{') => self.parse_object(),
            Some(c) if c.is_ascii_digit() || *c == b'-' => self.parse_number(),
            _ => Err(self.error("Unexpected token")),
        }
    }

    fn parse_number(&mut self) -> Result<Value, EvalError> {
        let start = self.pos;
        self.eat(b'-');
        while matches!(self.bytes.get(self.pos), Some(c) if c.is_ascii_digit()) {
            self.pos += 1;
        }
        if self.eat(b'.') {
            while matches!(self.bytes.get(self.pos), Some(c) if c.is_ascii_digit()) {
                self.pos += 1;
            }
        }
        if matches!(self.bytes.get(self.pos), Some(b'e' | b'E')) {
            self.pos += 1;
            if matches!(self.bytes.get(self.pos), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            while matches!(self.bytes.get(self.pos), Some(c) if c.is_ascii_digit()) {
                self.pos += 1;
            }
        }
        self.text[start..self.pos]
            .parse::<f64>()
            .map(Value::number)
            .map_err(|_| self.error("Invalid number"))
    }

    fn parse_string(&mut self) -> Result<String, EvalError> {
        if !self.eat(b'"') {
            return Err(self.error("Expected string"));
        }
        let mut out = String::new();
        loop {
            let Some(rest) = self.text.get(self.pos..) else {
                return Err(self.error("Unterminated string"));
            };
            let mut chars = rest.chars();
            let Some(c) = chars.next() else {
                return Err(self.error("Unterminated string"));
            };
            self.pos += c.len_utf8();
            match c {
                '"' => return Ok(out),
                '\\' => {
                    let Some(esc) = chars.next() else {
                        return Err(self.error("Unterminated string"));
                    };
                    self.pos += esc.len_utf8();
                    match esc {
                        '"' => out.push('"'),
                        '\\' => out.push('\\'),
                        '/' => out.push('/'),
                        'b' => out.push('\u{8}'),
                        'f' => out.push('\u{c}'),
                        'n' => out.push('\n'),
                        'r' => out.push('\r'),
                        't' => out.push('\t'),
                        'u' => {
                            let hex = self
                                .text
                                .get(self.pos..self.pos + 4)
                                .ok_or_else(|| self.error("Invalid unicode escape"))?;
                            let code = u32::from_str_radix(hex, 16)
                                .map_err(|_| self.error("Invalid unicode escape"))?;
                            self.pos += 4;
                            out.push(
                                char::from_u32(code)
                                    .ok_or_else(|| self.error("Invalid unicode escape"))?,
                            );
                        }
                        _ => return Err(self.error("Invalid escape")),
                    }
                }
                c => out.push(c),
            }
        }
    }

    fn parse_array(&mut self) -> Result<Value, EvalError> {
        self.pos += 1; // `[`
        let mut items = Vec::new();
        self.skip_ws();
        if self.eat(b']') {
            return Ok(Value::array(items));
        }
        loop {
            self.skip_ws();
            items.push(self.parse_value()?);
            self.skip_ws();
            if self.eat(b',') {
                continue;
            }
            if self.eat(b']') {
                return Ok(Value::array(items));
            }
            return Err(self.error("Expected ',' or ']'"));
        }
    }

    fn parse_object(&mut self) -> Result<Value, EvalError> {
        self.pos += 1; // `{`
        let mut object = JsObject::new();
        self.skip_ws();
        if self.eat(b'}') {
            return Ok(Value::object(object));
        }
        loop {
            self.skip_ws();
            let key = self.parse_string()?;
            self.skip_ws();
            if !self.eat(b':') {
                return Err(self.error("Expected ':'"));
            }
            self.skip_ws();
            let value = self.parse_value()?;
            object.set(self.interner.intern_owned(key), value);
            self.skip_ws();
            if self.eat(b',') {
                continue;
            }
            if self.eat(b'}') {
                return Ok(Value::object(object));
            }
            return Err(self.error("Expected ',' or '}'"));
        }
    }
}
