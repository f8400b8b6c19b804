//! Program model for the latlog solver.
//!
//! A [`Program`] is the fully elaborated form of an analysis: predicate
//! symbols with their interpretations, lattice declarations, Horn clauses,
//! and initial ground facts. Programs are produced through
//! [`ProgramBuilder`], which interns symbols and validates the result at
//! load time; the evaluator (`latlog-eval`) consumes them read-only.
//!
//! # Example
//!
//! ```
//! use latlog_ir::{Atom, ProgramBuilder, Term, Value};
//!
//! let mut b = ProgramBuilder::new();
//! let edge = b.relation("edge", 2);
//! let path = b.relation("path", 2);
//!
//! // path(x, y) :- edge(x, y).
//! b.clause(
//!     Atom::new(path, vec![Term::var("x"), Term::var("y")]),
//!     vec![Atom::new(edge, vec![Term::var("x"), Term::var("y")])],
//! );
//! // path(x, z) :- edge(x, y), path(y, z).
//! b.clause(
//!     Atom::new(path, vec![Term::var("x"), Term::var("z")]),
//!     vec![
//!         Atom::new(edge, vec![Term::var("x"), Term::var("y")]),
//!         Atom::new(path, vec![Term::var("y"), Term::var("z")]),
//!     ],
//! );
//! b.fact(edge, vec![Value::I32(1), Value::I32(2)]);
//!
//! let program = b.build().unwrap();
//! assert_eq!(program.clauses().len(), 2);
//! ```

mod symbol;
mod term;
mod value;

use std::collections::HashSet;
use std::fmt;

pub use symbol::{Interpretation, LatticeId, PredSym, SymbolInfo, SymbolTable};
pub use term::{Bindings, Term};
pub use value::{CtorValue, Tuple, Value};

/// An atom: a predicate symbol applied to argument terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Atom {
    pub sym: PredSym,
    pub args: Vec<Term>,
}

impl Atom {
    pub fn new(sym: PredSym, args: Vec<Term>) -> Self {
        Atom { sym, args }
    }
}

/// A Horn clause: one head atom implied by a conjunction of body atoms.
///
/// An empty body makes the clause a fact schema (used for lattice-operator
/// axioms such as `leq(bot, x).`, whose head variables act as wildcards).
#[derive(Debug, Clone)]
pub struct Clause {
    pub head: Atom,
    pub body: Vec<Atom>,
}

/// A lattice declaration: the operator symbols plus the bottom element.
///
/// `leq` has arity 2 and `join` arity 3 (output last); both must be
/// interpreted as `LatticeFn` (clause-defined) or `Code` (host function).
#[derive(Debug, Clone)]
pub struct LatticeDecl {
    pub name: String,
    pub leq: PredSym,
    pub join: PredSym,
    pub bottom: Option<Value>,
}

/// Errors detected while loading a program. Load errors abort before any
/// evaluation takes place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// An atom, fact, or operator symbol was used at the wrong arity.
    ArityMismatch {
        symbol: String,
        expected: usize,
        found: usize,
    },
    /// An atom references a symbol the program never declared.
    UnknownSymbol { symbol: String },
    /// A head variable does not occur in the clause body.
    NonRangeRestricted { clause: usize, variable: String },
    /// A symbol is used where its interpretation cannot satisfy it: a
    /// lattice operator that is neither clause-defined nor code, or a code
    /// symbol with no registered function.
    MissingInterpretation { symbol: String },
    /// A lattice is referenced by a lattice-map but declares no bottom.
    MissingBottom { lattice: String },
    /// A clause head (or fact) targets a symbol with no stored extension.
    HeadNotInsertable { symbol: String },
    /// The same name was declared twice with different signatures.
    DuplicateSymbol { symbol: String },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::ArityMismatch {
                symbol,
                expected,
                found,
            } => write!(
                f,
                "arity mismatch on `{symbol}`: declared {expected}, used with {found}"
            ),
            LoadError::UnknownSymbol { symbol } => {
                write!(f, "unknown symbol `{symbol}`")
            }
            LoadError::NonRangeRestricted { clause, variable } => write!(
                f,
                "clause {clause} is not range-restricted: head variable `{variable}` \
                 does not occur in the body"
            ),
            LoadError::MissingInterpretation { symbol } => {
                write!(f, "no usable interpretation for `{symbol}`")
            }
            LoadError::MissingBottom { lattice } => {
                write!(f, "lattice `{lattice}` declares no bottom element")
            }
            LoadError::HeadNotInsertable { symbol } => {
                write!(f, "`{symbol}` has no stored extension and cannot head a clause")
            }
            LoadError::DuplicateSymbol { symbol } => {
                write!(f, "`{symbol}` declared twice with different signatures")
            }
        }
    }
}

impl std::error::Error for LoadError {}

/// A validated, immutable program: the unit handed to the evaluator.
#[derive(Debug, Clone)]
pub struct Program {
    symbols: SymbolTable,
    lattices: Vec<LatticeDecl>,
    clauses: Vec<Clause>,
    facts: Vec<(PredSym, Tuple)>,
}

impl Program {
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn facts(&self) -> &[(PredSym, Tuple)] {
        &self.facts
    }

    pub fn lattices(&self) -> &[LatticeDecl] {
        &self.lattices
    }

    pub fn lattice(&self, id: LatticeId) -> Option<&LatticeDecl> {
        self.lattices.get(id.index())
    }

    pub fn lookup(&self, name: &str) -> Option<PredSym> {
        self.symbols.lookup(name)
    }

    /// The declared name of a symbol, for diagnostics.
    pub fn name(&self, sym: PredSym) -> &str {
        self.symbols.get(sym).map_or("?", |info| info.name.as_str())
    }

    pub fn arity(&self, sym: PredSym) -> Option<usize> {
        self.symbols.get(sym).map(|info| info.arity)
    }

    pub fn interp(&self, sym: PredSym) -> Option<Interpretation> {
        self.symbols.get(sym).map(|info| info.interp)
    }
}

/// Builds and validates a [`Program`].
///
/// Declaration methods intern symbols and return their handles; `build`
/// performs all load-time checks and reports the first violation.
#[derive(Debug, Default)]
pub struct ProgramBuilder {
    symbols: SymbolTable,
    lattices: Vec<LatticeDecl>,
    clauses: Vec<Clause>,
    facts: Vec<(PredSym, Tuple)>,
    errors: Vec<LoadError>,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn declare(&mut self, name: &str, arity: usize, interp: Interpretation) -> PredSym {
        let sym = self.symbols.declare(name, arity, interp);
        // `declare` returns the existing handle for a known name; reject
        // signature disagreements here so `build` can report them.
        if let Some(info) = self.symbols.get(sym) {
            if info.arity != arity {
                self.errors.push(LoadError::ArityMismatch {
                    symbol: name.to_string(),
                    expected: info.arity,
                    found: arity,
                });
            } else if info.interp != interp {
                self.errors.push(LoadError::DuplicateSymbol {
                    symbol: name.to_string(),
                });
            }
        }
        sym
    }

    /// Declare a plain relation of the given arity.
    pub fn relation(&mut self, name: &str, arity: usize) -> PredSym {
        self.declare(name, arity, Interpretation::Relation)
    }

    /// Declare a clause-defined lattice operator (e.g. `leq`, `join`).
    pub fn lattice_fn(&mut self, name: &str, arity: usize) -> PredSym {
        self.declare(name, arity, Interpretation::LatticeFn)
    }

    /// Declare a code symbol: a host function over the first `in_arity`
    /// arguments. `arity - in_arity` must be 0 (predicate) or 1 (function).
    pub fn code(&mut self, name: &str, arity: usize, in_arity: usize) -> PredSym {
        if arity < in_arity || arity - in_arity > 1 {
            self.errors.push(LoadError::ArityMismatch {
                symbol: name.to_string(),
                expected: in_arity,
                found: arity,
            });
        }
        self.declare(name, arity, Interpretation::Code { in_arity })
    }

    /// Declare a lattice from its operator symbols. The bottom element is
    /// supplied separately through [`ProgramBuilder::bottom`].
    pub fn lattice(&mut self, name: &str, leq: PredSym, join: PredSym) -> LatticeId {
        let id = LatticeId(self.lattices.len() as u32);
        self.lattices.push(LatticeDecl {
            name: name.to_string(),
            leq,
            join,
            bottom: None,
        });
        id
    }

    /// Declare the bottom element of a lattice.
    pub fn bottom(&mut self, lattice: LatticeId, value: Value) {
        match self.lattices.get_mut(lattice.index()) {
            Some(decl) => decl.bottom = Some(value),
            None => self.errors.push(LoadError::UnknownSymbol {
                symbol: format!("lattice #{}", lattice.index()),
            }),
        }
    }

    /// Declare a lattice-map: a partial function from `key_arity` leading
    /// arguments to a value of `lattice`, merged by join on insert.
    pub fn lattice_map(&mut self, name: &str, key_arity: usize, lattice: LatticeId) -> PredSym {
        self.declare(
            name,
            key_arity + 1,
            Interpretation::LatticeMap { key_arity, lattice },
        )
    }

    /// Add a Horn clause.
    pub fn clause(&mut self, head: Atom, body: Vec<Atom>) {
        self.clauses.push(Clause { head, body });
    }

    /// Add an initial ground fact.
    pub fn fact(&mut self, sym: PredSym, args: Vec<Value>) {
        self.facts.push((sym, args));
    }

    /// Validate everything and produce the immutable program.
    pub fn build(mut self) -> Result<Program, LoadError> {
        if let Some(err) = self.errors.first() {
            return Err(err.clone());
        }

        // Facts on lattice-operator symbols are axioms, not stored tuples:
        // fold them into the clause set as empty-body clauses.
        let mut stored_facts = Vec::new();
        for (sym, args) in std::mem::take(&mut self.facts) {
            match self.symbols.get(sym).map(|info| info.interp) {
                Some(Interpretation::LatticeFn) => self.clauses.push(Clause {
                    head: Atom::new(sym, args.into_iter().map(Term::Lit).collect()),
                    body: Vec::new(),
                }),
                _ => stored_facts.push((sym, args)),
            }
        }
        self.facts = stored_facts;

        self.check_atoms()?;
        self.check_heads()?;
        self.check_range_restriction()?;
        self.check_facts()?;
        self.check_lattices()?;

        Ok(Program {
            symbols: self.symbols,
            lattices: self.lattices,
            clauses: self.clauses,
            facts: self.facts,
        })
    }

    fn check_atom(symbols: &SymbolTable, atom: &Atom) -> Result<(), LoadError> {
        let Some(info) = symbols.get(atom.sym) else {
            return Err(LoadError::UnknownSymbol {
                symbol: format!("#{}", atom.sym.index()),
            });
        };
        if info.arity != atom.args.len() {
            return Err(LoadError::ArityMismatch {
                symbol: info.name.clone(),
                expected: info.arity,
                found: atom.args.len(),
            });
        }
        Ok(())
    }

    fn check_atoms(&self) -> Result<(), LoadError> {
        for clause in &self.clauses {
            Self::check_atom(&self.symbols, &clause.head)?;
            for atom in &clause.body {
                Self::check_atom(&self.symbols, atom)?;
            }
        }
        Ok(())
    }

    fn check_heads(&self) -> Result<(), LoadError> {
        for clause in &self.clauses {
            if let Some(Interpretation::Code { .. }) =
                self.symbols.get(clause.head.sym).map(|info| info.interp)
            {
                return Err(LoadError::HeadNotInsertable {
                    symbol: self.symbols.get(clause.head.sym).map_or_else(
                        || format!("#{}", clause.head.sym.index()),
                        |info| info.name.clone(),
                    ),
                });
            }
        }
        Ok(())
    }

    /// Every head variable must occur in the body. Lattice-operator
    /// clauses are exempt: their head variables are bound by the ground
    /// query at resolution time (`leq(bot, x).` is the canonical axiom).
    fn check_range_restriction(&self) -> Result<(), LoadError> {
        for (i, clause) in self.clauses.iter().enumerate() {
            if matches!(
                self.symbols.get(clause.head.sym).map(|info| info.interp),
                Some(Interpretation::LatticeFn)
            ) {
                continue;
            }
            let mut body_vars = HashSet::new();
            for atom in &clause.body {
                for term in &atom.args {
                    term.for_each_var(&mut |name| {
                        body_vars.insert(name.to_string());
                    });
                }
            }
            for term in &clause.head.args {
                let mut missing = None;
                term.for_each_var(&mut |name| {
                    if missing.is_none() && !body_vars.contains(name) {
                        missing = Some(name.to_string());
                    }
                });
                if let Some(variable) = missing {
                    return Err(LoadError::NonRangeRestricted { clause: i, variable });
                }
            }
        }
        Ok(())
    }

    fn check_facts(&self) -> Result<(), LoadError> {
        for (sym, args) in &self.facts {
            let Some(info) = self.symbols.get(*sym) else {
                return Err(LoadError::UnknownSymbol {
                    symbol: format!("#{}", sym.index()),
                });
            };
            if info.arity != args.len() {
                return Err(LoadError::ArityMismatch {
                    symbol: info.name.clone(),
                    expected: info.arity,
                    found: args.len(),
                });
            }
            if matches!(info.interp, Interpretation::Code { .. }) {
                return Err(LoadError::HeadNotInsertable {
                    symbol: info.name.clone(),
                });
            }
        }
        Ok(())
    }

    fn check_lattices(&self) -> Result<(), LoadError> {
        for decl in &self.lattices {
            for (op, arity) in [(decl.leq, 2), (decl.join, 3)] {
                let Some(info) = self.symbols.get(op) else {
                    return Err(LoadError::UnknownSymbol {
                        symbol: format!("#{}", op.index()),
                    });
                };
                if info.arity != arity {
                    return Err(LoadError::ArityMismatch {
                        symbol: info.name.clone(),
                        expected: arity,
                        found: info.arity,
                    });
                }
                if !matches!(
                    info.interp,
                    Interpretation::LatticeFn | Interpretation::Code { .. }
                ) {
                    return Err(LoadError::MissingInterpretation {
                        symbol: info.name.clone(),
                    });
                }
            }
        }
        // Every lattice a map stores into needs a bottom to default to.
        for (_, info) in self.symbols.iter() {
            if let Interpretation::LatticeMap { lattice, .. } = info.interp {
                let Some(decl) = self.lattices.get(lattice.index()) else {
                    return Err(LoadError::UnknownSymbol {
                        symbol: format!("lattice #{}", lattice.index()),
                    });
                };
                if decl.bottom.is_none() {
                    return Err(LoadError::MissingBottom {
                        lattice: decl.name.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}
