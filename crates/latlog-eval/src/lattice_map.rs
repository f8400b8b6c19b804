//! Lattice-map storage: key tuples mapped to a running join.
//!
//! The merge itself (computing `join(stored, new)` and deciding whether the
//! cell strictly increased) lives in the engine, because joining may invoke
//! clause-defined lattice operators. This module only holds the cells.

use latlog_ir::{Tuple, Value};
use rustc_hash::FxHashMap;

/// Storage for one lattice-map symbol: the key prefix of each inserted
/// tuple maps to the join of every value derived for it so far.
#[derive(Debug, Clone, Default)]
pub struct LatticeMapStorage {
    entries: FxHashMap<Tuple, Value>,
    key_arity: usize,
}

impl LatticeMapStorage {
    pub fn new(key_arity: usize) -> Self {
        Self {
            entries: FxHashMap::default(),
            key_arity,
        }
    }

    pub fn key_arity(&self) -> usize {
        self.key_arity
    }

    /// Number of keys with a stored value.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The stored value at a key. A missing entry reads as bottom at the
    /// call sites; this returns what is physically stored.
    pub fn get(&self, key: &[Value]) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Store (or overwrite) the value at a key.
    pub fn put(&mut self, key: Tuple, value: Value) {
        debug_assert_eq!(key.len(), self.key_arity, "key arity mismatch");
        self.entries.insert(key, value);
    }

    /// Iterate over (key, value) entries.
    pub fn iter(&self) -> impl Iterator<Item = (&Tuple, &Value)> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_overwrites() {
        let mut map = LatticeMapStorage::new(1);
        let key = vec![Value::string("x")];
        assert!(map.get(&key).is_none());

        map.put(key.clone(), Value::atom("Pos"));
        assert_eq!(map.get(&key), Some(&Value::atom("Pos")));

        map.put(key.clone(), Value::atom("Top"));
        assert_eq!(map.get(&key), Some(&Value::atom("Top")));
        assert_eq!(map.len(), 1);
    }
}
