//! Function values.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rill_ir::{FuncId, FunctionKind, Name, SharedArena};
use rustc_hash::FxHashMap;

use crate::environment::ScopeRef;
use crate::errors::EvalResult;
use crate::interpreter::Interpreter;

use super::heap::Shared;
use super::object::JsObject;
use super::promise::PromiseState;
use super::Value;

/// Native function signature: interpreter, `this`, arguments.
pub type NativeFn = fn(&mut Interpreter, Value, &[Value]) -> EvalResult;

/// A user-defined function: body reference plus the environment captured by
/// reference at creation time.
///
/// The function carries its own [`SharedArena`] so a closure returned out of
/// the driver that parsed it keeps its body alive.
pub struct UserFunction {
    pub def: FuncId,
    pub arena: SharedArena,
    /// Captured defining environment. Calls chain a fresh child scope off
    /// this, never off the caller's scope (lexical scoping).
    pub scope: ScopeRef,
    /// `.prototype`, created on first access. Arrows never get one.
    prototype: RefCell<Option<Shared<JsObject>>>,
}

/// A built-in function.
pub struct NativeFunction {
    pub name: &'static str,
    pub func: NativeFn,
}

/// What a function value does when called.
pub enum Callable {
    User(UserFunction),
    Native(NativeFunction),
    /// The `resolve`/`reject` half of a promise executor pair.
    Resolver {
        state: Shared<PromiseState>,
        reject: bool,
    },
}

struct FunctionData {
    name: Name,
    callable: Callable,
    /// Expando properties (`Promise.resolve`, constructor statics).
    /// Unordered: these never participate in `for..in`.
    properties: RefCell<FxHashMap<Name, Value>>,
}

/// A function value; cheap to clone, compared by reference identity.
#[derive(Clone)]
pub struct FunctionValue(Rc<FunctionData>);

impl FunctionValue {
    pub fn user(name: Name, def: FuncId, arena: SharedArena, scope: ScopeRef) -> Self {
        FunctionValue(Rc::new(FunctionData {
            name,
            callable: Callable::User(UserFunction {
                def,
                arena,
                scope,
                prototype: RefCell::new(None),
            }),
            properties: RefCell::new(FxHashMap::default()),
        }))
    }

    pub fn native(name: &'static str, interned: Name, func: NativeFn) -> Self {
        FunctionValue(Rc::new(FunctionData {
            name: interned,
            callable: Callable::Native(NativeFunction { name, func }),
            properties: RefCell::new(FxHashMap::default()),
        }))
    }

    pub(crate) fn resolver(state: Shared<PromiseState>, reject: bool) -> Self {
        FunctionValue(Rc::new(FunctionData {
            name: Name::EMPTY,
            callable: Callable::Resolver { state, reject },
            properties: RefCell::new(FxHashMap::default()),
        }))
    }

    #[inline]
    pub fn name(&self) -> Name {
        self.0.name
    }

    #[inline]
    pub fn callable(&self) -> &Callable {
        &self.0.callable
    }

    /// Reference identity (strict equality of function values).
    #[inline]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }

    pub fn get_property(&self, name: Name) -> Option<Value> {
        self.0.properties.borrow().get(&name).cloned()
    }

    pub fn set_property(&self, name: Name, value: Value) {
        self.0.properties.borrow_mut().insert(name, value);
    }

    /// The user function definition, if this is one.
    pub fn as_user(&self) -> Option<&UserFunction> {
        match &self.0.callable {
            Callable::User(user) => Some(user),
            _ => None,
        }
    }

    /// Whether this is an arrow function (no own `this`, no prototype).
    pub fn is_arrow(&self) -> bool {
        self.as_user()
            .map(|u| u.arena.func(u.def).kind == FunctionKind::Arrow)
            .unwrap_or(false)
    }

    /// The `.prototype` object, created on first access.
    ///
    /// Only non-arrow user functions have one; the constructor holds the
    /// only strong reference, instances link to it weakly.
    pub fn prototype(&self) -> Option<Shared<JsObject>> {
        let user = self.as_user()?;
        if self.is_arrow() {
            return None;
        }
        let mut slot = user.prototype.borrow_mut();
        if slot.is_none() {
            *slot = Some(Shared::new(JsObject::new()));
        }
        slot.clone()
    }
}

impl fmt::Debug for FunctionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.callable {
            Callable::User(_) => write!(f, "Function({:?})", self.0.name),
            Callable::Native(n) => write!(f, "NativeFunction({})", n.name),
            Callable::Resolver { reject, .. } => write!(f, "Resolver(reject={reject})"),
        }
    }
}
