//! Clause compilation.
//!
//! Transforms loaded clauses into an evaluation-friendly format: variable
//! names are interned to dense per-clause slots (no string hashing while
//! matching), and clauses are indexed by the symbols they mention so a
//! delta reaches exactly the clause positions it can drive.

use latlog_ir::{Atom, Interpretation, PredSym, Program, Term, Value};
use rustc_hash::FxHashMap;

/// A clause-local variable slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct VarId(pub(crate) u32);

impl VarId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Interns variable names to dense slots, one interner per clause.
#[derive(Debug, Default)]
struct VarInterner {
    names: Vec<String>,
    map: FxHashMap<String, VarId>,
}

impl VarInterner {
    fn intern(&mut self, name: &str) -> VarId {
        if let Some(&id) = self.map.get(name) {
            return id;
        }
        let id = VarId(self.names.len() as u32);
        self.names.push(name.to_string());
        self.map.insert(name.to_string(), id);
        id
    }
}

/// A compiled term: variables are slots, constants are pre-built values.
#[derive(Debug, Clone)]
pub(crate) enum CTerm {
    Var(VarId),
    Lit(Value),
    App(String, Vec<CTerm>),
}

/// A compiled atom.
#[derive(Debug, Clone)]
pub(crate) struct CAtom {
    pub sym: PredSym,
    pub args: Vec<CTerm>,
}

/// A compiled clause.
#[derive(Debug, Clone)]
pub(crate) struct CClause {
    pub head: CAtom,
    pub body: Vec<CAtom>,
    pub num_vars: usize,
    /// Slot-indexed variable names, kept for diagnostics.
    pub var_names: Vec<String>,
}

/// Clauses indexed for both evaluation directions.
///
/// Bottom-up clauses (relation and lattice-map heads) are reached through
/// `by_body_sym`: for each symbol, the (clause, body position) pairs its
/// deltas can drive. Resolution clauses (lattice-operator heads) are
/// reached through `by_head_sym` when a goal query asks for that operator.
#[derive(Debug, Default)]
pub(crate) struct ClauseIndex {
    pub bottom_up: Vec<CClause>,
    pub by_body_sym: Vec<Vec<(usize, usize)>>,
    /// Bottom-up clauses with no storage-backed body atom; no delta can
    /// ever drive them, so they are evaluated once at startup.
    pub unkeyed: Vec<usize>,
    pub resolution: Vec<CClause>,
    pub by_head_sym: Vec<Vec<usize>>,
}

fn compile_term(term: &Term, interner: &mut VarInterner) -> CTerm {
    match term {
        Term::Var(name) => CTerm::Var(interner.intern(name)),
        Term::Lit(value) => CTerm::Lit(value.clone()),
        Term::App(name, args) => CTerm::App(
            name.clone(),
            args.iter().map(|t| compile_term(t, interner)).collect(),
        ),
    }
}

fn compile_atom(atom: &Atom, interner: &mut VarInterner) -> CAtom {
    CAtom {
        sym: atom.sym,
        args: atom
            .args
            .iter()
            .map(|t| compile_term(t, interner))
            .collect(),
    }
}

fn compile_clause(head: &Atom, body: &[Atom]) -> CClause {
    let mut interner = VarInterner::default();
    // Body first: evaluation binds body variables before the head is built.
    let body: Vec<CAtom> = body.iter().map(|a| compile_atom(a, &mut interner)).collect();
    let head = compile_atom(head, &mut interner);
    CClause {
        head,
        body,
        num_vars: interner.names.len(),
        var_names: interner.names,
    }
}

fn is_storage_backed(interp: Option<Interpretation>) -> bool {
    matches!(
        interp,
        Some(Interpretation::Relation | Interpretation::LatticeMap { .. })
    )
}

pub(crate) fn compile(program: &Program) -> ClauseIndex {
    let num_syms = program.symbols().len();
    let mut index = ClauseIndex {
        by_body_sym: vec![Vec::new(); num_syms],
        by_head_sym: vec![Vec::new(); num_syms],
        ..ClauseIndex::default()
    };

    for clause in program.clauses() {
        let compiled = compile_clause(&clause.head, &clause.body);
        match program.interp(clause.head.sym) {
            Some(Interpretation::LatticeFn) => {
                let ci = index.resolution.len();
                index.by_head_sym[clause.head.sym.index()].push(ci);
                index.resolution.push(compiled);
            }
            _ => {
                let ci = index.bottom_up.len();
                let mut keyed = false;
                for (pos, atom) in compiled.body.iter().enumerate() {
                    if is_storage_backed(program.interp(atom.sym)) {
                        index.by_body_sym[atom.sym.index()].push((ci, pos));
                        keyed = true;
                    }
                }
                if !keyed {
                    index.unkeyed.push(ci);
                }
                index.bottom_up.push(compiled);
            }
        }
    }

    index
}
