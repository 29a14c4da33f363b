//! Lexical environments.
//!
//! A scope is a mapping from name to binding plus a link to its enclosing
//! scope. Closures capture a [`ScopeRef`] by reference, so later mutations
//! of captured variables are visible inside the closure — which is the
//! defining property of a closure here.
//!
//! `var` bindings attach to the nearest function/global scope; `let`/`const`
//! attach to the scope they are declared in. Lookup and assignment walk
//! outward through the chain.

use rill_ir::{DeclKind, Name};
use rustc_hash::FxHashMap;

use crate::value::{Shared, Value};

/// Shared handle to a scope; scopes form a parent-linked chain.
pub type ScopeRef = Shared<Scope>;

/// What level of the chain a scope represents.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    Function,
    Block,
}

/// A variable binding.
#[derive(Clone, Debug)]
struct Binding {
    value: Value,
    kind: DeclKind,
}

/// Typed assignment failure, so callers produce the right error kind.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AssignError {
    /// Binding exists but is `const`.
    Const,
    /// Name not found anywhere in the chain.
    NotFound,
}

/// A single scope in the chain.
pub struct Scope {
    bindings: FxHashMap<Name, Binding>,
    parent: Option<ScopeRef>,
    kind: ScopeKind,
}

impl Scope {
    /// Create the root (global) scope.
    pub fn global() -> ScopeRef {
        Shared::new(Scope {
            bindings: FxHashMap::default(),
            parent: None,
            kind: ScopeKind::Global,
        })
    }

    /// Create a child scope.
    pub fn child(parent: ScopeRef, kind: ScopeKind) -> ScopeRef {
        Shared::new(Scope {
            bindings: FxHashMap::default(),
            parent: Some(parent),
            kind,
        })
    }

    fn lookup(&self, name: Name) -> Option<Value> {
        if let Some(binding) = self.bindings.get(&name) {
            return Some(binding.value.clone());
        }
        self.parent.as_ref().and_then(|p| p.borrow().lookup(name))
    }

    fn assign(&mut self, name: Name, value: Value) -> Result<(), AssignError> {
        if let Some(binding) = self.bindings.get_mut(&name) {
            if binding.kind == DeclKind::Const {
                return Err(AssignError::Const);
            }
            binding.value = value;
            return Ok(());
        }
        match &self.parent {
            Some(parent) => parent.borrow_mut().assign(name, value),
            None => Err(AssignError::NotFound),
        }
    }

    fn has_own(&self, name: Name) -> bool {
        self.bindings.contains_key(&name)
    }

    fn own_is_lexical(&self, name: Name) -> bool {
        self.bindings
            .get(&name)
            .map(|b| b.kind.is_lexical())
            .unwrap_or(false)
    }

    fn insert(&mut self, name: Name, value: Value, kind: DeclKind) {
        self.bindings.insert(name, Binding { value, kind });
    }
}

/// Look up a name, walking outward through the chain.
pub fn lookup(scope: &ScopeRef, name: Name) -> Option<Value> {
    scope.borrow().lookup(name)
}

/// Assign to the nearest scope where `name` is bound.
pub fn assign(scope: &ScopeRef, name: Name, value: Value) -> Result<(), AssignError> {
    scope.borrow_mut().assign(name, value)
}

/// Declare a `let`/`const` binding in `scope` itself.
///
/// Fails if the name is already bound in this same scope (redeclaration
/// guard); the caller turns that into a `SyntaxError`.
pub fn declare_lexical(
    scope: &ScopeRef,
    name: Name,
    value: Value,
    kind: DeclKind,
) -> Result<(), Name> {
    debug_assert!(kind.is_lexical());
    let mut guard = scope.borrow_mut();
    if guard.has_own(name) {
        return Err(name);
    }
    guard.insert(name, value, kind);
    Ok(())
}

/// Declare a `var` binding in the nearest function/global scope.
///
/// Redeclaring over an existing `var` overwrites; colliding with a lexical
/// binding in that scope is an error (the caller's `SyntaxError`).
pub fn declare_var(scope: &ScopeRef, name: Name, value: Value) -> Result<(), Name> {
    let target = function_scope(scope);
    let mut guard = target.borrow_mut();
    if guard.own_is_lexical(name) {
        return Err(name);
    }
    guard.insert(name, value, DeclKind::Var);
    Ok(())
}

/// Pre-bind a `var` name to `undefined` during hoisting, unless already
/// present (a later `var x = 5` must not clobber a function declaration).
pub fn hoist_var(scope: &ScopeRef, name: Name) -> Result<(), Name> {
    let target = function_scope(scope);
    let mut guard = target.borrow_mut();
    if guard.own_is_lexical(name) {
        return Err(name);
    }
    if !guard.has_own(name) {
        guard.insert(name, Value::Undefined, DeclKind::Var);
    }
    Ok(())
}

/// The nearest function-or-global scope at or above `scope`.
fn function_scope(scope: &ScopeRef) -> ScopeRef {
    let mut current = scope.clone();
    loop {
        let parent = {
            let guard = current.borrow();
            if guard.kind == ScopeKind::Block {
                guard.parent.clone()
            } else {
                None
            }
        };
        match parent {
            Some(parent) => current = parent,
            None => return current,
        }
    }
}
