//! Expression evaluation.

use rill_ir::{
    BinaryOp, ElemRange, ExprId, ExprKind, LogicalOp, Name, Span, UpdateOp,
};
use smallvec::SmallVec;

use crate::coerce::{is_truthy, to_number, to_property_key, to_string_coerce};
use crate::environment::{assign, lookup, AssignError};
use crate::errors::{
    const_assign, nullish_member_access, range_error, reference_error, type_error, EvalError,
    EvalResult,
};
use crate::operators::{evaluate_binary, evaluate_unary};
use crate::stack::ensure_sufficient_stack;
use crate::value::{FunctionValue, JsObject, PromiseState, PromiseStatus, Shared, Value};

use super::Interpreter;

/// An assignable location, resolved once so compound assignment and
/// updates read and write the same slot.
enum TargetRef {
    Var(Name),
    Member { object: Value, property: Name },
    Index { object: Value, key: Value },
}

impl Interpreter {
    /// Evaluate an expression node.
    pub(crate) fn eval_expr(&mut self, id: ExprId) -> EvalResult {
        ensure_sufficient_stack(|| self.eval_expr_inner(id))
    }

    fn eval_expr_inner(&mut self, id: ExprId) -> EvalResult {
        let arena = self.arena.clone();
        let node = *arena.expr(id);
        let span = node.span;
        let result = match node.kind {
            ExprKind::Number(n) => Ok(Value::number(n)),
            ExprKind::BigInt(v) => Ok(Value::BigInt(v)),
            ExprKind::Str(name) => Ok(Value::string(self.interner.resolve(name))),
            ExprKind::TemplateFull(name) => Ok(Value::string(self.interner.resolve(name))),
            ExprKind::Template { head, parts } => self.eval_template(head, parts),
            ExprKind::Bool(b) => Ok(Value::Bool(b)),
            ExprKind::Null => Ok(Value::Null),
            ExprKind::This => Ok(lookup(&self.scope, self.names.this_).unwrap_or(Value::Undefined)),
            ExprKind::Ident(name) => lookup(&self.scope, name)
                .ok_or_else(|| reference_error(self.interner.resolve(name))),
            ExprKind::Array(elems) => {
                let values = self.eval_elements(elems)?;
                Ok(Value::array(values.into_vec()))
            }
            ExprKind::Object(props) => {
                let mut object = JsObject::new();
                for prop in arena.props(props).iter().copied().collect::<Vec<_>>() {
                    let value = self.eval_expr(prop.value)?;
                    object.set(prop.key, value);
                }
                Ok(Value::object(object))
            }
            ExprKind::Function(func) => Ok(Value::Function(self.make_function(func))),
            ExprKind::Unary { op, operand } => {
                let value = self.eval_expr(operand)?;
                evaluate_unary(op, &value, &self.interner)
            }
            ExprKind::Update { op, prefix, target } => self.eval_update(op, prefix, target),
            ExprKind::Binary { op, left, right } => {
                let lhs = self.eval_expr(left)?;
                let rhs = self.eval_expr(right)?;
                if op == BinaryOp::In {
                    self.eval_in_operator(&lhs, &rhs)
                } else {
                    evaluate_binary(op, &lhs, &rhs, &self.interner)
                }
            }
            ExprKind::Logical { op, left, right } => {
                let lhs = self.eval_expr(left)?;
                // Short-circuit: the result is an operand, never a coerced
                // boolean.
                match op {
                    LogicalOp::And if !is_truthy(&lhs) => Ok(lhs),
                    LogicalOp::Or if is_truthy(&lhs) => Ok(lhs),
                    _ => self.eval_expr(right),
                }
            }
            ExprKind::Conditional {
                cond,
                consequent,
                alternate,
            } => {
                let test = self.eval_expr(cond)?;
                if is_truthy(&test) {
                    self.eval_expr(consequent)
                } else {
                    self.eval_expr(alternate)
                }
            }
            ExprKind::Assign { op, target, value } => {
                let slot = self.eval_target(target)?;
                // Compound ops read the slot before the right-hand side.
                let next = match op.binary_op() {
                    None => self.eval_expr(value)?,
                    Some(binop) => {
                        let current = self.read_target(&slot, span)?;
                        let rhs = self.eval_expr(value)?;
                        evaluate_binary(binop, &current, &rhs, &self.interner)?
                    }
                };
                self.write_target(&slot, next.clone(), span)?;
                Ok(next)
            }
            ExprKind::Member { object, property } => {
                let obj = self.eval_expr(object)?;
                self.get_member(&obj, property, span)
            }
            ExprKind::Index { object, index } => {
                let obj = self.eval_expr(object)?;
                let key = self.eval_expr(index)?;
                self.get_index(&obj, &key, span)
            }
            ExprKind::Call { callee, args } => self.eval_call(callee, args, span),
            ExprKind::New { callee, args } => {
                let callee = self.eval_expr(callee)?;
                let args = self.eval_elements(args)?;
                self.construct(callee, &args)
            }
            ExprKind::Await(operand) => {
                let value = self.eval_expr(operand)?;
                match value {
                    Value::Promise(state) => self.await_promise(&state),
                    other => Ok(other),
                }
            }
        };
        result.map_err(|e| e.with_span(span))
    }

    fn eval_template(&mut self, head: Name, parts: rill_ir::PartRange) -> EvalResult {
        let arena = self.arena.clone();
        let mut out = self.interner.resolve(head).to_string();
        for part in arena.parts(parts) {
            let value = self.eval_expr(part.expr)?;
            out.push_str(&to_string_coerce(&value, &self.interner)?);
            out.push_str(self.interner.resolve(part.text_after));
        }
        Ok(Value::string(out))
    }

    /// Evaluate an element list, expanding `...spread`s.
    pub(crate) fn eval_elements(
        &mut self,
        elems: ElemRange,
    ) -> Result<SmallVec<[Value; 8]>, EvalError> {
        let arena = self.arena.clone();
        let mut out: SmallVec<[Value; 8]> = SmallVec::new();
        for elem in arena.elems(elems) {
            let value = self.eval_expr(elem.expr)?;
            if !elem.spread {
                out.push(value);
                continue;
            }
            match value {
                Value::Array(items) => out.extend(items.borrow().iter().cloned()),
                Value::Str(s) => {
                    out.extend(s.chars().map(|c| Value::string(c.to_string())));
                }
                other => {
                    return Err(type_error(format!(
                        "{} is not iterable",
                        other.type_name()
                    )))
                }
            }
        }
        Ok(out)
    }

    fn eval_call(&mut self, callee: ExprId, args: ElemRange, span: Span) -> EvalResult {
        let arena = self.arena.clone();
        // A member callee binds `this` to the receiver for this invocation.
        match arena.expr(callee).kind {
            ExprKind::Member { object, property } => {
                let receiver = self.eval_expr(object)?;
                let f = self.get_member(&receiver, property, span)?;
                let args = self.eval_elements(args)?;
                self.call_named(f, receiver, &args, property)
            }
            ExprKind::Index { object, index } => {
                let receiver = self.eval_expr(object)?;
                let key = self.eval_expr(index)?;
                let f = self.get_index(&receiver, &key, span)?;
                let args = self.eval_elements(args)?;
                self.call_value(f, receiver, &args)
            }
            _ => {
                let f = self.eval_expr(callee)?;
                let args = self.eval_elements(args)?;
                self.call_value(f, Value::Undefined, &args)
            }
        }
    }

    /// Call a property value, naming the property in the error when it is
    /// not callable.
    fn call_named(
        &mut self,
        callee: Value,
        this: Value,
        args: &[Value],
        property: Name,
    ) -> EvalResult {
        match callee {
            Value::Function(f) => self.call_function(&f, this, args),
            _ => Err(type_error(format!(
                "{}.{} is not a function",
                this.type_name(),
                self.interner.resolve(property)
            ))),
        }
    }

    /// `new callee(...)`.
    pub(crate) fn construct(&mut self, callee: Value, args: &[Value]) -> EvalResult {
        let Value::Function(f) = callee else {
            return Err(type_error(format!(
                "{} is not a constructor",
                callee.type_name()
            )));
        };
        if f.is_arrow() {
            return Err(type_error("arrow function is not a constructor"));
        }
        match f.as_user() {
            None => {
                // Native constructors (Object, Error, Promise) build and
                // return their own instances.
                self.call_function(&f, Value::Undefined, args)
            }
            Some(user) => {
                if user.arena.func(user.def).is_async {
                    return Err(type_error("async function is not a constructor"));
                }
                let Some(proto) = f.prototype() else {
                    return Err(type_error("function is not a constructor"));
                };
                // The instance holds only a weak link to the prototype; the
                // constructor keeps it alive.
                let instance = Value::object(JsObject::with_proto(proto.downgrade()));
                let result = self.call_function(&f, instance.clone(), args)?;
                match result {
                    Value::Object(_) | Value::Array(_) | Value::Promise(_) => Ok(result),
                    _ => Ok(instance),
                }
            }
        }
    }

    /// `await` on a pending promise: pump the macrotask queue until it
    /// settles. Only one task body runs at a time; if the queue drains
    /// while the promise is still pending, nothing can ever settle it.
    fn await_promise(&mut self, state: &Shared<PromiseState>) -> EvalResult {
        loop {
            let status = state.borrow().status.clone();
            match status {
                PromiseStatus::Fulfilled(value) => return Ok(value),
                PromiseStatus::Rejected(value) => return Err(self.throw_value(value)),
                PromiseStatus::Pending => match self.tasks.pop_next() {
                    Some(task) => self.run_task(task)?,
                    None => {
                        return Err(type_error(
                            "await on a computation that can never settle",
                        ))
                    }
                },
            }
        }
    }

    fn eval_update(&mut self, op: UpdateOp, prefix: bool, target: ExprId) -> EvalResult {
        let span = self.arena.expr(target).span;
        let slot = self.eval_target(target)?;
        let old = self.read_target(&slot, span)?;

        let (old_value, new_value) = match old {
            Value::BigInt(v) => {
                let delta = if op == UpdateOp::Inc { 1 } else { -1 };
                let next = v
                    .checked_add(delta)
                    .ok_or_else(|| range_error("BigInt arithmetic overflow"))?;
                (Value::BigInt(v), Value::BigInt(next))
            }
            other => {
                let n = to_number(&other, &self.interner)?;
                let next = if op == UpdateOp::Inc { n + 1.0 } else { n - 1.0 };
                (Value::number(n), Value::number(next))
            }
        };

        self.write_target(&slot, new_value.clone(), span)?;
        Ok(if prefix { new_value } else { old_value })
    }

    // Assignment targets

    fn eval_target(&mut self, target: ExprId) -> Result<TargetRef, EvalError> {
        let arena = self.arena.clone();
        match arena.expr(target).kind {
            ExprKind::Ident(name) => Ok(TargetRef::Var(name)),
            ExprKind::Member { object, property } => {
                let object = self.eval_expr(object)?;
                Ok(TargetRef::Member { object, property })
            }
            ExprKind::Index { object, index } => {
                let object = self.eval_expr(object)?;
                let key = self.eval_expr(index)?;
                Ok(TargetRef::Index { object, key })
            }
            // The parser rejects other targets.
            _ => Err(type_error("invalid assignment target")),
        }
    }

    fn read_target(&mut self, slot: &TargetRef, span: Span) -> EvalResult {
        match slot {
            TargetRef::Var(name) => lookup(&self.scope, *name)
                .ok_or_else(|| reference_error(self.interner.resolve(*name))),
            TargetRef::Member { object, property } => self.get_member(object, *property, span),
            TargetRef::Index { object, key } => self.get_index(object, key, span),
        }
    }

    fn write_target(
        &mut self,
        slot: &TargetRef,
        value: Value,
        span: Span,
    ) -> Result<(), EvalError> {
        match slot {
            TargetRef::Var(name) => match assign(&self.scope, *name, value) {
                Ok(()) => Ok(()),
                Err(AssignError::Const) => Err(const_assign(self.interner.resolve(*name))),
                Err(AssignError::NotFound) => {
                    Err(reference_error(self.interner.resolve(*name)))
                }
            },
            TargetRef::Member { object, property } => {
                self.set_member(object, *property, value, span)
            }
            TargetRef::Index { object, key } => self.set_index(object, key, value, span),
        }
    }

    // Member access

    /// Property read with prototype fallback and builtin-method lookup.
    pub(crate) fn get_member(
        &mut self,
        object: &Value,
        property: Name,
        span: Span,
    ) -> EvalResult {
        match object {
            Value::Null | Value::Undefined => Err(nullish_member_access(
                object.type_name(),
                self.interner.resolve(property),
            )
            .with_span(span)),
            Value::Object(obj) => {
                if let Some(value) = obj.borrow().get(property) {
                    return Ok(value);
                }
                self.builtin_method(object, property)
            }
            Value::Array(items) => {
                if property == self.names.length {
                    #[allow(clippy::cast_precision_loss)]
                    return Ok(Value::number(items.borrow().len() as f64));
                }
                self.builtin_method(object, property)
            }
            Value::Str(s) => {
                if property == self.names.length {
                    #[allow(clippy::cast_precision_loss)]
                    return Ok(Value::number(s.chars().count() as f64));
                }
                self.builtin_method(object, property)
            }
            Value::Function(f) => {
                if let Some(value) = f.get_property(property) {
                    return Ok(value);
                }
                if property == self.names.prototype {
                    return Ok(f
                        .prototype()
                        .map(Value::Object)
                        .unwrap_or(Value::Undefined));
                }
                if property == self.names.name {
                    return Ok(Value::string(self.interner.resolve(f.name())));
                }
                self.builtin_method(object, property)
            }
            _ => self.builtin_method(object, property),
        }
    }

    fn builtin_method(&mut self, receiver: &Value, property: Name) -> EvalResult {
        let name = self.interner.resolve(property);
        match crate::methods::lookup(receiver, name) {
            Some(func) => Ok(Value::Function(FunctionValue::native(name, property, func))),
            None => Ok(Value::Undefined),
        }
    }

    /// Property write. Writes always land on the receiver itself, never on
    /// a prototype.
    pub(crate) fn set_member(
        &mut self,
        object: &Value,
        property: Name,
        value: Value,
        span: Span,
    ) -> Result<(), EvalError> {
        match object {
            Value::Object(obj) => {
                obj.borrow_mut().set(property, value);
                Ok(())
            }
            Value::Array(items) => {
                if property == self.names.length {
                    return set_array_length(items, &value, &self.interner);
                }
                Err(type_error(format!(
                    "Cannot create property '{}' on array",
                    self.interner.resolve(property)
                ))
                .with_span(span))
            }
            Value::Function(f) => {
                f.set_property(property, value);
                Ok(())
            }
            Value::Null | Value::Undefined => Err(type_error(format!(
                "Cannot set properties of {} (setting '{}')",
                object.type_name(),
                self.interner.resolve(property)
            ))
            .with_span(span)),
            other => Err(type_error(format!(
                "Cannot create property '{}' on {}",
                self.interner.resolve(property),
                other.type_name()
            ))
            .with_span(span)),
        }
    }

    /// Computed access: array/string indices take the numeric fast path,
    /// everything else converts to a property key.
    pub(crate) fn get_index(&mut self, object: &Value, key: &Value, span: Span) -> EvalResult {
        match (object, key) {
            (Value::Array(items), Value::Number(n)) => {
                Ok(array_index(*n)
                    .and_then(|i| items.borrow().get(i).cloned())
                    .unwrap_or(Value::Undefined))
            }
            (Value::Str(s), Value::Number(n)) => Ok(array_index(*n)
                .and_then(|i| s.chars().nth(i))
                .map(|c| Value::string(c.to_string()))
                .unwrap_or(Value::Undefined)),
            (Value::Null | Value::Undefined, _) => {
                let key = to_string_coerce(key, &self.interner)?;
                Err(nullish_member_access(object.type_name(), &key).with_span(span))
            }
            _ => {
                let property = to_property_key(key, &self.interner)?;
                self.get_member(object, property, span)
            }
        }
    }

    pub(crate) fn set_index(
        &mut self,
        object: &Value,
        key: &Value,
        value: Value,
        span: Span,
    ) -> Result<(), EvalError> {
        match (object, key) {
            (Value::Array(items), Value::Number(n)) => match array_index(*n) {
                Some(i) => {
                    let mut guard = items.borrow_mut();
                    if i >= guard.len() {
                        guard.resize(i, Value::Undefined);
                        guard.push(value);
                    } else {
                        guard[i] = value;
                    }
                    Ok(())
                }
                None => Err(type_error("invalid array index").with_span(span)),
            },
            _ => {
                let property = to_property_key(key, &self.interner)?;
                self.set_member(object, property, value, span)
            }
        }
    }

    /// The `in` operator: own-or-inherited membership.
    fn eval_in_operator(&mut self, key: &Value, object: &Value) -> EvalResult {
        match object {
            Value::Object(obj) => {
                let name = to_property_key(key, &self.interner)?;
                Ok(Value::Bool(obj.borrow().has(name)))
            }
            Value::Array(items) => match key {
                Value::Number(n) => {
                    Ok(Value::Bool(
                        array_index(*n).map(|i| i < items.borrow().len()).unwrap_or(false),
                    ))
                }
                other => {
                    let name = to_property_key(other, &self.interner)?;
                    Ok(Value::Bool(name == self.names.length))
                }
            },
            Value::Function(f) => {
                let name = to_property_key(key, &self.interner)?;
                Ok(Value::Bool(f.get_property(name).is_some()))
            }
            other => Err(type_error(format!(
                "Cannot use 'in' operator to search in {}",
                other.type_name()
            ))),
        }
    }
}

/// Convert an f64 to a usable array index (non-negative integer).
fn array_index(n: f64) -> Option<usize> {
    if n.fract() == 0.0 && n >= 0.0 && n <= u32::MAX as f64 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Some(n as usize)
    } else {
        None
    }
}

/// `arr.length = n` truncates or extends with `undefined`.
fn set_array_length(
    items: &Shared<Vec<Value>>,
    value: &Value,
    interner: &rill_ir::StringInterner,
) -> Result<(), EvalError> {
    let n = to_number(value, interner)?;
    match array_index(n) {
        Some(len) => {
            items.borrow_mut().resize(len, Value::Undefined);
            Ok(())
        }
        None => Err(range_error("Invalid array length")),
    }
}
