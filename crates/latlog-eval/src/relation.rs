//! Storage for relation symbols.
//!
//! A relation's extension is an append-only set of ground fact tuples.
//! Every column carries a value index so the dispatcher can satisfy a
//! body atom with a bound argument by probing the index instead of
//! scanning the whole extension.

use latlog_ir::{Tuple, Value};
use rustc_hash::{FxHashMap, FxHashSet};

/// The stored extension of one relation symbol.
#[derive(Debug, Clone)]
pub struct RelationStorage {
    /// Facts in derivation order; probes refer to them by row number.
    rows: Vec<Tuple>,
    /// Membership set for duplicate suppression.
    dedup: FxHashSet<Tuple>,
    /// One index per column, mapping a value to the rows holding it.
    by_column: Vec<FxHashMap<Value, Vec<usize>>>,
}

impl RelationStorage {
    pub fn new(arity: usize) -> Self {
        Self {
            rows: Vec::new(),
            dedup: FxHashSet::default(),
            by_column: vec![FxHashMap::default(); arity],
        }
    }

    /// Number of columns.
    pub fn arity(&self) -> usize {
        self.by_column.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of derived facts.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Add a derived fact. Returns false when it was already present, so
    /// the caller knows not to emit a delta for it.
    pub fn insert(&mut self, fact: Tuple) -> bool {
        debug_assert_eq!(
            fact.len(),
            self.arity(),
            "fact width disagrees with relation arity"
        );
        if !self.dedup.insert(fact.clone()) {
            return false;
        }
        let row = self.rows.len();
        for (index, value) in self.by_column.iter_mut().zip(&fact) {
            index.entry(value.clone()).or_default().push(row);
        }
        self.rows.push(fact);
        true
    }

    /// Whether a fact has been derived.
    pub fn contains(&self, fact: &Tuple) -> bool {
        self.dedup.contains(fact)
    }

    /// All facts, in derivation order.
    pub fn iter(&self) -> impl Iterator<Item = &Tuple> {
        self.rows.iter()
    }

    /// Row numbers of the facts holding `value` in column `col`.
    pub fn lookup(&self, col: usize, value: &Value) -> &[usize] {
        self.by_column
            .get(col)
            .and_then(|index| index.get(value))
            .map_or(&[], Vec::as_slice)
    }

    /// The fact at a row number returned by [`RelationStorage::lookup`].
    pub fn get(&self, row: usize) -> Option<&Tuple> {
        self.rows.get(row)
    }
}
