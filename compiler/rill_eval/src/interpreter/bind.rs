//! Destructuring binders.
//!
//! One binder covers declarations, parameters, and catch clauses: array
//! patterns decompose positionally, object patterns by key, and absent
//! slots bind `undefined` unless the pattern carries a default.

use rill_ir::{DeclKind, Name, PatternId, PatternKind};

use crate::environment::{declare_lexical, declare_var};
use crate::errors::{redeclaration, type_error, EvalError};
use crate::value::Value;

use super::Interpreter;

impl Interpreter {
    /// Bind `value` to `pattern` in the current scope with the given
    /// declaration kind.
    pub(crate) fn bind_pattern(
        &mut self,
        pattern: PatternId,
        value: Value,
        kind: DeclKind,
    ) -> Result<(), EvalError> {
        let arena = self.arena.clone();
        let pat = *arena.pattern(pattern);

        // Defaults apply exactly when the incoming value is `undefined`.
        let value = if value.is_undefined() && pat.default.is_valid() {
            self.eval_expr(pat.default)?
        } else {
            value
        };

        match pat.kind {
            PatternKind::Ident(name) => self.declare_binding(name, value, kind),

            PatternKind::Array { elements, rest } => {
                let items: Vec<Value> = match &value {
                    Value::Array(items) => items.borrow().clone(),
                    Value::Str(s) => s.chars().map(|c| Value::string(c.to_string())).collect(),
                    other => {
                        return Err(type_error(format!(
                            "{} is not iterable",
                            other.type_name()
                        )))
                    }
                };
                let elements = arena.pattern_list(elements).to_vec();
                let count = elements.len();
                for (i, element) in elements.into_iter().enumerate() {
                    let item = items.get(i).cloned().unwrap_or(Value::Undefined);
                    self.bind_pattern(element, item, kind)?;
                }
                if rest.is_valid() {
                    let remainder = items.get(count..).map(<[Value]>::to_vec).unwrap_or_default();
                    self.bind_pattern(rest, Value::array(remainder), kind)?;
                }
                Ok(())
            }

            PatternKind::Object(props) => {
                let Value::Object(obj) = &value else {
                    return Err(type_error(format!(
                        "Cannot destructure {}",
                        value.type_name()
                    )));
                };
                for prop in arena.pattern_props(props).to_vec() {
                    // Destructuring reads like property access: prototype
                    // fallback included.
                    let item = obj.borrow().get(prop.key).unwrap_or(Value::Undefined);
                    self.bind_pattern(prop.binding, item, kind)?;
                }
                Ok(())
            }
        }
    }

    /// Declare one name with the right scope-attachment rule.
    pub(crate) fn declare_binding(
        &mut self,
        name: Name,
        value: Value,
        kind: DeclKind,
    ) -> Result<(), EvalError> {
        let result = match kind {
            DeclKind::Var => declare_var(&self.scope, name, value),
            DeclKind::Let | DeclKind::Const => {
                declare_lexical(&self.scope, name, value, kind)
            }
        };
        result.map_err(|name| redeclaration(self.interner.resolve(name)))
    }
}
