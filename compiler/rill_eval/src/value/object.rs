//! Insertion-ordered property tables with prototype fallback.

use rill_ir::Name;
use rustc_hash::FxHashMap;

use super::heap::WeakShared;
use super::Value;

/// Maximum prototype-chain hops before lookup gives up.
///
/// Chains are built from constructor prototypes and never legitimately get
/// deep; the cap guards against hand-built cycles.
const MAX_PROTO_DEPTH: usize = 32;

/// Distinguished object classes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ObjectClass {
    Plain,
    /// Error-shaped objects (`name`/`message`), rendered as `Name: message`.
    Error,
}

/// A JavaScript object: insertion-ordered `Name -> Value` mapping plus a
/// weak prototype back-reference.
///
/// Entries keep insertion order in a vector; an index map gives O(1) key
/// lookup (the entry-vector-plus-index layout keeps `for..in` order exact).
/// The prototype link is weak: instances never keep a constructor's
/// prototype alive on their own.
#[derive(Debug)]
pub struct JsObject {
    entries: Vec<(Name, Value)>,
    index: FxHashMap<Name, usize>,
    proto: Option<WeakShared<JsObject>>,
    pub class: ObjectClass,
}

impl JsObject {
    pub fn new() -> Self {
        JsObject {
            entries: Vec::new(),
            index: FxHashMap::default(),
            proto: None,
            class: ObjectClass::Plain,
        }
    }

    pub fn with_proto(proto: WeakShared<JsObject>) -> Self {
        JsObject {
            entries: Vec::new(),
            index: FxHashMap::default(),
            proto: Some(proto),
            class: ObjectClass::Plain,
        }
    }

    /// Look up an own property only.
    pub fn get_own(&self, name: Name) -> Option<Value> {
        self.index.get(&name).map(|&i| self.entries[i].1.clone())
    }

    /// Look up a property, falling back through the prototype chain.
    pub fn get(&self, name: Name) -> Option<Value> {
        if let Some(value) = self.get_own(name) {
            return Some(value);
        }
        let mut proto = self.proto.as_ref().and_then(WeakShared::upgrade);
        for _ in 0..MAX_PROTO_DEPTH {
            let Some(current) = proto else { break };
            let guard = current.borrow();
            if let Some(value) = guard.get_own(name) {
                return Some(value);
            }
            proto = guard.proto.as_ref().and_then(WeakShared::upgrade);
        }
        None
    }

    /// Set an own property, preserving first-insertion order on overwrite.
    pub fn set(&mut self, name: Name, value: Value) {
        match self.index.get(&name) {
            Some(&i) => self.entries[i].1 = value,
            None => {
                self.index.insert(name, self.entries.len());
                self.entries.push((name, value));
            }
        }
    }

    pub fn has_own(&self, name: Name) -> bool {
        self.index.contains_key(&name)
    }

    /// Own-or-inherited membership (the `in` operator).
    pub fn has(&self, name: Name) -> bool {
        self.get(name).is_some()
    }

    /// Own keys in insertion order.
    pub fn keys(&self) -> Vec<Name> {
        self.entries.iter().map(|(name, _)| *name).collect()
    }

    /// Own entries in insertion order.
    pub fn entries(&self) -> &[(Name, Value)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for JsObject {
    fn default() -> Self {
        Self::new()
    }
}
