//! The relational store: one cell per predicate symbol plus the delta
//! queue that drives semi-naive evaluation.

use std::collections::VecDeque;

use latlog_ir::{Interpretation, PredSym, Program, Tuple};

use crate::lattice_map::LatticeMapStorage;
use crate::relation::RelationStorage;

/// Storage cell for one symbol. Lattice operators and code symbols have no
/// stored extension.
#[derive(Debug, Clone)]
pub(crate) enum Cell {
    Set(RelationStorage),
    Map(LatticeMapStorage),
    None,
}

/// The database: per-symbol cells and the FIFO queue of pending deltas.
#[derive(Debug, Clone, Default)]
pub(crate) struct Database {
    cells: Vec<Cell>,
    queue: VecDeque<(PredSym, Tuple)>,
}

impl Database {
    pub(crate) fn new(program: &Program) -> Self {
        let cells = program
            .symbols()
            .iter()
            .map(|(_, info)| match info.interp {
                Interpretation::Relation => Cell::Set(RelationStorage::new(info.arity)),
                Interpretation::LatticeMap { key_arity, .. } => {
                    Cell::Map(LatticeMapStorage::new(key_arity))
                }
                Interpretation::LatticeFn | Interpretation::Code { .. } => Cell::None,
            })
            .collect();
        Database {
            cells,
            queue: VecDeque::new(),
        }
    }

    pub(crate) fn relation(&self, sym: PredSym) -> Option<&RelationStorage> {
        match self.cells.get(sym.index()) {
            Some(Cell::Set(rel)) => Some(rel),
            _ => None,
        }
    }

    pub(crate) fn relation_mut(&mut self, sym: PredSym) -> Option<&mut RelationStorage> {
        match self.cells.get_mut(sym.index()) {
            Some(Cell::Set(rel)) => Some(rel),
            _ => None,
        }
    }

    pub(crate) fn lattice_map(&self, sym: PredSym) -> Option<&LatticeMapStorage> {
        match self.cells.get(sym.index()) {
            Some(Cell::Map(map)) => Some(map),
            _ => None,
        }
    }

    pub(crate) fn lattice_map_mut(&mut self, sym: PredSym) -> Option<&mut LatticeMapStorage> {
        match self.cells.get_mut(sym.index()) {
            Some(Cell::Map(map)) => Some(map),
            _ => None,
        }
    }

    /// Number of stored tuples (or keys) for a symbol.
    pub(crate) fn count(&self, sym: PredSym) -> usize {
        match self.cells.get(sym.index()) {
            Some(Cell::Set(rel)) => rel.len(),
            Some(Cell::Map(map)) => map.len(),
            _ => 0,
        }
    }

    /// True if any cell holds at least one tuple.
    pub(crate) fn any_tuples(&self) -> bool {
        self.cells.iter().any(|cell| match cell {
            Cell::Set(rel) => !rel.is_empty(),
            Cell::Map(map) => !map.is_empty(),
            Cell::None => false,
        })
    }

    pub(crate) fn enqueue(&mut self, sym: PredSym, tuple: Tuple) {
        self.queue.push_back((sym, tuple));
    }

    pub(crate) fn pop_delta(&mut self) -> Option<(PredSym, Tuple)> {
        self.queue.pop_front()
    }

    pub(crate) fn clear_deltas(&mut self) {
        self.queue.clear();
    }
}
