//! Interned predicate symbols.
//!
//! A symbol is resolved once at load time; everywhere else it is a small
//! integer handle into the program's symbol table.

use std::collections::HashMap;
use std::fmt;

/// A predicate-symbol handle.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PredSym(pub(crate) u32);

impl PredSym {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for PredSym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PredSym({})", self.0)
    }
}

/// A lattice-declaration handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LatticeId(pub(crate) u32);

impl LatticeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// How atoms of a symbol are stored and satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpretation {
    /// A stored, deduplicated set of tuples.
    Relation,
    /// A partial function keyed on the leading `key_arity` arguments; the
    /// final argument is a value of `lattice`, merged by join on insert.
    LatticeMap {
        key_arity: usize,
        lattice: LatticeId,
    },
    /// A lattice operator (`leq`, `join`) defined by its own Horn clauses,
    /// satisfied by goal-directed resolution.
    LatticeFn,
    /// A host function over the first `in_arity` arguments; the remaining
    /// argument (if any) is bound to its output.
    Code { in_arity: usize },
}

/// Declared facts about one symbol.
#[derive(Debug, Clone)]
pub struct SymbolInfo {
    pub name: String,
    pub arity: usize,
    pub interp: Interpretation,
}

/// The symbol table: name-to-handle interning plus per-symbol info.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    infos: Vec<SymbolInfo>,
    by_name: HashMap<String, PredSym>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a new symbol. Returns the existing handle if `name` is
    /// already declared (the caller validates signature agreement).
    pub(crate) fn declare(
        &mut self,
        name: &str,
        arity: usize,
        interp: Interpretation,
    ) -> PredSym {
        if let Some(&sym) = self.by_name.get(name) {
            return sym;
        }
        let sym = PredSym(self.infos.len() as u32);
        self.infos.push(SymbolInfo {
            name: name.to_string(),
            arity,
            interp,
        });
        self.by_name.insert(name.to_string(), sym);
        sym
    }

    pub fn lookup(&self, name: &str) -> Option<PredSym> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, sym: PredSym) -> Option<&SymbolInfo> {
        self.infos.get(sym.index())
    }

    pub fn len(&self) -> usize {
        self.infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PredSym, &SymbolInfo)> {
        self.infos
            .iter()
            .enumerate()
            .map(|(i, info)| (PredSym(i as u32), info))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_stable() {
        let mut table = SymbolTable::new();
        let edge = table.declare("edge", 2, Interpretation::Relation);
        let path = table.declare("path", 2, Interpretation::Relation);
        assert_ne!(edge, path);
        assert_eq!(table.declare("edge", 2, Interpretation::Relation), edge);
        assert_eq!(table.lookup("path"), Some(path));
        assert_eq!(table.lookup("missing"), None);
        assert_eq!(table.get(edge).map(|i| i.arity), Some(2));
    }
}
