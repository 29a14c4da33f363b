//! Sharded string interner for identifiers and literals.
//!
//! O(1) interning and lookup with per-shard locking. The interner is shared
//! between the lexer, parser, and evaluator; every identifier, keyword, and
//! string literal in a program resolves to a [`Name`].

use crate::Name;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

/// Per-shard storage for interned strings.
struct InternShard {
    /// Map from string content to local index.
    map: FxHashMap<&'static str, u32>,
    /// Storage for string contents.
    strings: Vec<&'static str>,
}

impl InternShard {
    fn new() -> Self {
        Self {
            map: FxHashMap::default(),
            strings: Vec::with_capacity(64),
        }
    }

    fn with_empty() -> Self {
        let mut shard = Self::new();
        // Pre-intern empty string at index 0 so Name::EMPTY resolves.
        let empty: &'static str = "";
        shard.map.insert(empty, 0);
        shard.strings.push(empty);
        shard
    }
}

/// Sharded string interner.
///
/// Uses `RwLock` per shard; reads of already-interned strings take the
/// read path only. Interned strings live for the process lifetime (the
/// storage is leaked), which is what makes `resolve` return `&'static str`.
pub struct StringInterner {
    shards: [RwLock<InternShard>; Name::NUM_SHARDS],
}

impl StringInterner {
    /// Create a new interner with the empty string pre-interned.
    pub fn new() -> Self {
        let shards = std::array::from_fn(|i| {
            if i == 0 {
                RwLock::new(InternShard::with_empty())
            } else {
                RwLock::new(InternShard::new())
            }
        });
        Self { shards }
    }

    /// Compute shard for a string based on its first bytes.
    #[inline]
    fn shard_for(s: &str) -> usize {
        let mut hash = 0u32;
        for byte in s.bytes().take(8) {
            hash = hash.wrapping_mul(31).wrapping_add(u32::from(byte));
        }
        (hash as usize) % Name::NUM_SHARDS
    }

    /// Intern a string, returning its [`Name`].
    ///
    /// # Panics
    /// Panics if a single shard exceeds `Name::MAX_LOCAL` strings, which
    /// would require hundreds of millions of distinct identifiers.
    pub fn intern(&self, s: &str) -> Name {
        let shard_idx = Self::shard_for(s);
        let shard = &self.shards[shard_idx];
        #[allow(clippy::cast_possible_truncation)]
        let shard_idx_u32 = shard_idx as u32;

        // Fast path: already interned.
        {
            let guard = shard.read();
            if let Some(&local) = guard.map.get(s) {
                return Name::new(shard_idx_u32, local);
            }
        }

        let mut guard = shard.write();
        // Double-check after acquiring the write lock.
        if let Some(&local) = guard.map.get(s) {
            return Name::new(shard_idx_u32, local);
        }

        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        let local = u32::try_from(guard.strings.len())
            .ok()
            .filter(|&n| n <= Name::MAX_LOCAL)
            .unwrap_or_else(|| panic!("interner shard {shard_idx} exceeded capacity"));
        guard.strings.push(leaked);
        guard.map.insert(leaked, local);
        Name::new(shard_idx_u32, local)
    }

    /// Intern an owned string without re-copying when it is new.
    pub fn intern_owned(&self, s: String) -> Name {
        let shard_idx = Self::shard_for(&s);
        let shard = &self.shards[shard_idx];
        #[allow(clippy::cast_possible_truncation)]
        let shard_idx_u32 = shard_idx as u32;

        {
            let guard = shard.read();
            if let Some(&local) = guard.map.get(s.as_str()) {
                return Name::new(shard_idx_u32, local);
            }
        }

        let mut guard = shard.write();
        if let Some(&local) = guard.map.get(s.as_str()) {
            return Name::new(shard_idx_u32, local);
        }

        let leaked: &'static str = Box::leak(s.into_boxed_str());
        let local = u32::try_from(guard.strings.len())
            .ok()
            .filter(|&n| n <= Name::MAX_LOCAL)
            .unwrap_or_else(|| panic!("interner shard {shard_idx} exceeded capacity"));
        guard.strings.push(leaked);
        guard.map.insert(leaked, local);
        Name::new(shard_idx_u32, local)
    }

    /// Resolve a [`Name`] back to its string content.
    ///
    /// Names are only produced by `intern`, so the indices are always in
    /// bounds for the interner that produced them.
    pub fn resolve(&self, name: Name) -> &'static str {
        let guard = self.shards[name.shard()].read();
        guard.strings.get(name.local()).copied().unwrap_or("")
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_round_trips() {
        let interner = StringInterner::new();
        let a = interner.intern("fruits");
        let b = interner.intern("fruits");
        assert_eq!(a, b);
        assert_eq!(interner.resolve(a), "fruits");
    }

    #[test]
    fn distinct_strings_get_distinct_names() {
        let interner = StringInterner::new();
        let a = interner.intern("apple");
        let b = interner.intern("banana");
        assert_ne!(a, b);
    }

    #[test]
    fn empty_string_is_name_empty() {
        let interner = StringInterner::new();
        assert_eq!(interner.intern(""), Name::EMPTY);
        assert_eq!(interner.resolve(Name::EMPTY), "");
    }

    #[test]
    fn intern_owned_matches_intern() {
        let interner = StringInterner::new();
        let a = interner.intern("message");
        let b = interner.intern_owned("message".to_owned());
        assert_eq!(a, b);
    }
}
