//! The semi-naive fixpoint engine.
//!
//! Evaluation is driven by a FIFO queue of deltas: newly derived ground
//! tuples awaiting propagation. Popping a delta `(P, t)` activates every
//! clause position where `P` occurs in a body; the remaining body atoms are
//! evaluated left-to-right against the current database, and satisfied
//! substitutions produce head tuples. Inserts that change the database
//! enqueue fresh deltas; the queue running dry is the fixpoint.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use latlog_ir::{Interpretation, LatticeId, LoadError, PredSym, Program, Tuple, Value};
use log::{debug, trace};

use crate::compile::{CClause, ClauseIndex, compile};
use crate::database::Database;
use crate::error::EvalError;
use crate::lattice_map::LatticeMapStorage;
use crate::matcher::{Subst, ground_term, match_atom};
use crate::registry::FnRegistry;
use crate::relation::RelationStorage;

/// Why the engine stopped.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// The delta queue ran dry: the database is the least model.
    Fixpoint,
    /// The cancellation token was tripped; the database is partial.
    Cancelled,
    /// Evaluation aborted; the database is partial.
    Error(EvalError),
}

impl Outcome {
    pub fn is_fixpoint(&self) -> bool {
        matches!(self, Outcome::Fixpoint)
    }
}

/// Cooperative cancellation. Clone the token, trip it from anywhere; the
/// engine checks it on every delta pop.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Engine tuning knobs.
#[derive(Debug, Clone)]
pub struct Config {
    /// Drive evaluation from deltas (default). Disabling re-evaluates
    /// every clause against the full store each round; the final database
    /// is identical, only the work differs.
    pub seminaive: bool,
    /// Verify after every merge that the joined value is above both
    /// inputs, reporting `NonMonotoneJoin` otherwise.
    pub validate_joins: bool,
    /// Check the lattice laws on code lattices at startup, over a sample
    /// set drawn from the program.
    pub check_laws: bool,
    /// Step budget for one recursive lattice query.
    pub lattice_budget: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            seminaive: true,
            validate_joins: false,
            check_laws: true,
            lattice_budget: 1_000_000,
        }
    }
}

/// Evaluation counters.
#[derive(Debug, Clone, Default)]
pub struct Stats {
    /// Deltas popped from the queue.
    pub deltas_processed: u64,
    /// Tuple-against-pattern match attempts across scans, lookups, and
    /// delta bindings. Comparable between semi-naive and naive runs.
    pub body_matches: u64,
    /// Inserts that changed the database.
    pub inserts_changed: u64,
    /// Full rounds (naive mode only).
    pub rounds: u64,
}

/// The fixpoint engine: owns the database, the compiled clause index, and
/// the host-function registry for one program.
#[derive(Debug)]
pub struct Engine {
    program: Program,
    index: ClauseIndex,
    db: Database,
    registry: FnRegistry,
    config: Config,
    stats: Stats,
    cancel: CancelToken,
}

/// Borrowed evaluation context: the immutable program parts plus the
/// mutable counters, threaded through body evaluation and resolution.
pub(crate) struct EvalCtx<'a> {
    pub program: &'a Program,
    pub index: &'a ClauseIndex,
    pub db: &'a Database,
    pub registry: &'a FnRegistry,
    pub config: &'a Config,
    pub stats: &'a mut Stats,
    /// Resolution nesting depth; the budget resets at depth zero.
    pub depth: usize,
    pub budget: u64,
}

macro_rules! ctx {
    ($self:ident) => {
        EvalCtx {
            program: &$self.program,
            index: &$self.index,
            db: &$self.db,
            registry: &$self.registry,
            config: &$self.config,
            stats: &mut $self.stats,
            depth: 0,
            budget: 0,
        }
    };
}

impl Engine {
    /// Load a program with its host functions. Fails if a code symbol has
    /// no registered function.
    pub fn new(program: Program, registry: FnRegistry) -> Result<Self, LoadError> {
        Self::with_config(program, registry, Config::default())
    }

    pub fn with_config(
        program: Program,
        registry: FnRegistry,
        config: Config,
    ) -> Result<Self, LoadError> {
        for (sym, info) in program.symbols().iter() {
            if matches!(info.interp, Interpretation::Code { .. }) && !registry.contains(sym) {
                return Err(LoadError::MissingInterpretation {
                    symbol: info.name.clone(),
                });
            }
        }
        let index = compile(&program);
        let db = Database::new(&program);
        Ok(Engine {
            program,
            index,
            db,
            registry,
            config,
            stats: Stats::default(),
            cancel: CancelToken::new(),
        })
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// A clonable handle that cancels this engine's run when tripped.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// The stored extension of a relation symbol.
    pub fn relation(&self, sym: PredSym) -> Option<&RelationStorage> {
        self.db.relation(sym)
    }

    /// The stored cells of a lattice-map symbol (absent keys read as
    /// bottom; see [`Engine::lattice_value`]).
    pub fn lattice_map(&self, sym: PredSym) -> Option<&LatticeMapStorage> {
        self.db.lattice_map(sym)
    }

    /// The lattice value at a key, defaulting to the lattice's bottom for
    /// keys that were never derived.
    pub fn lattice_value(&self, sym: PredSym, key: &[Value]) -> Option<Value> {
        let map = self.db.lattice_map(sym)?;
        if let Some(value) = map.get(key) {
            return Some(value.clone());
        }
        match self.program.interp(sym)? {
            Interpretation::LatticeMap { lattice, .. } => {
                self.program.lattice(lattice)?.bottom.clone()
            }
            _ => None,
        }
    }

    /// Total derived tuples (or keys) stored for a symbol.
    pub fn derived_count(&self, sym: PredSym) -> usize {
        self.db.count(sym)
    }

    /// True if any cell holds at least one tuple.
    pub fn has_tuples(&self) -> bool {
        self.db.any_tuples()
    }

    /// Query a lattice's partial order directly.
    pub fn lattice_leq(
        &mut self,
        lattice: LatticeId,
        a: &Value,
        b: &Value,
    ) -> Result<bool, EvalError> {
        let Some(decl) = self.program.lattice(lattice) else {
            return Err(EvalError::NotStored {
                symbol: format!("lattice #{}", lattice.index()),
            });
        };
        let decl = decl.clone();
        ctx!(self).lat_leq(&decl, a, b)
    }

    /// Query a lattice's join directly.
    pub fn lattice_join(
        &mut self,
        lattice: LatticeId,
        a: &Value,
        b: &Value,
    ) -> Result<Value, EvalError> {
        let Some(decl) = self.program.lattice(lattice) else {
            return Err(EvalError::NotStored {
                symbol: format!("lattice #{}", lattice.index()),
            });
        };
        let decl = decl.clone();
        ctx!(self).lat_join(&decl, a, b)
    }

    /// Insert a ground tuple. Returns whether the database changed: a new
    /// tuple for a relation, a strict `leq`-increase for a lattice-map.
    /// Changed inserts enqueue a delta for the next run.
    pub fn insert(&mut self, sym: PredSym, tuple: Tuple) -> Result<bool, EvalError> {
        self.insert_tuple(sym, tuple, true)
    }

    /// Run to fixpoint. On completion the database is the least model; on
    /// cancellation or error it is the partial model reached so far.
    pub fn run(&mut self) -> Outcome {
        debug!(
            "run: {} clauses ({} resolution), {} facts, seminaive={}",
            self.index.bottom_up.len(),
            self.index.resolution.len(),
            self.program.facts().len(),
            self.config.seminaive,
        );

        if self.config.check_laws {
            if let Err(err) = ctx!(self).check_laws() {
                return Outcome::Error(err);
            }
        }

        if let Err(err) = self.seed() {
            return Outcome::Error(err);
        }

        let outcome = if self.config.seminaive {
            self.run_seminaive()
        } else {
            self.run_naive()
        };
        debug!(
            "done: {:?}, {} deltas, {} body matches, {} changed inserts",
            outcome, self.stats.deltas_processed, self.stats.body_matches, self.stats.inserts_changed,
        );
        outcome
    }

    /// Insert declared base facts and evaluate clauses no delta can ever
    /// drive (bodies without a storage-backed atom, including empty ones).
    fn seed(&mut self) -> Result<(), EvalError> {
        let enqueue = self.config.seminaive;
        for (sym, args) in self.program.facts().to_vec() {
            self.insert_tuple(sym, args, enqueue)?;
        }
        for k in 0..self.index.unkeyed.len() {
            let ci = self.index.unkeyed[k];
            let derived = ctx!(self).derive_full(ci)?;
            for (sym, tuple) in derived {
                self.insert_tuple(sym, tuple, enqueue)?;
            }
        }
        Ok(())
    }

    fn run_seminaive(&mut self) -> Outcome {
        loop {
            if self.cancel.is_cancelled() {
                debug!("cancelled after {} deltas", self.stats.deltas_processed);
                self.db.clear_deltas();
                return Outcome::Cancelled;
            }
            let Some((sym, tuple)) = self.db.pop_delta() else {
                break;
            };
            self.stats.deltas_processed += 1;
            trace!("delta {}{:?}", self.program.name(sym), tuple);

            let targets = self.index.by_body_sym[sym.index()].len();
            for k in 0..targets {
                let (ci, pos) = self.index.by_body_sym[sym.index()][k];
                let derived = match ctx!(self).activate(ci, pos, &tuple) {
                    Ok(derived) => derived,
                    Err(err) => return Outcome::Error(err),
                };
                for (head_sym, head_tuple) in derived {
                    if let Err(err) = self.insert_tuple(head_sym, head_tuple, true) {
                        return Outcome::Error(err);
                    }
                }
            }
        }
        Outcome::Fixpoint
    }

    fn run_naive(&mut self) -> Outcome {
        // Rounds re-derive from the full store; pending deltas are moot.
        self.db.clear_deltas();
        loop {
            if self.cancel.is_cancelled() {
                return Outcome::Cancelled;
            }
            let mut changed = false;
            for ci in 0..self.index.bottom_up.len() {
                let derived = match ctx!(self).derive_full(ci) {
                    Ok(derived) => derived,
                    Err(err) => return Outcome::Error(err),
                };
                for (sym, tuple) in derived {
                    match self.insert_tuple(sym, tuple, false) {
                        Ok(inserted) => changed |= inserted,
                        Err(err) => return Outcome::Error(err),
                    }
                }
            }
            self.stats.rounds += 1;
            if !changed {
                break;
            }
        }
        Outcome::Fixpoint
    }

    fn insert_tuple(
        &mut self,
        sym: PredSym,
        mut tuple: Tuple,
        enqueue: bool,
    ) -> Result<bool, EvalError> {
        let Some(info) = self.program.symbols().get(sym) else {
            return Err(EvalError::NotStored {
                symbol: format!("#{}", sym.index()),
            });
        };
        if info.arity != tuple.len() {
            return Err(EvalError::ArityMismatch {
                symbol: info.name.clone(),
                expected: info.arity,
                found: tuple.len(),
            });
        }

        match info.interp {
            Interpretation::Relation => {
                let Some(rel) = self.db.relation_mut(sym) else {
                    return Err(EvalError::NotStored {
                        symbol: info.name.clone(),
                    });
                };
                let new = rel.insert(tuple.clone());
                if new {
                    self.stats.inserts_changed += 1;
                    if enqueue {
                        self.db.enqueue(sym, tuple);
                    }
                }
                Ok(new)
            }
            Interpretation::LatticeMap { lattice, .. } => {
                let Some(value) = tuple.pop() else {
                    return Err(EvalError::ArityMismatch {
                        symbol: info.name.clone(),
                        expected: info.arity,
                        found: 0,
                    });
                };
                let key = tuple;
                let Some(decl) = self.program.lattice(lattice) else {
                    return Err(EvalError::NotStored {
                        symbol: info.name.clone(),
                    });
                };
                let decl = decl.clone();
                let Some(bottom) = decl.bottom.clone() else {
                    return Err(EvalError::NotStored {
                        symbol: decl.name.clone(),
                    });
                };
                let stored = self
                    .db
                    .lattice_map(sym)
                    .and_then(|map| map.get(&key))
                    .cloned();
                let current = stored.unwrap_or(bottom);

                let (joined, changed) = {
                    let mut ctx = ctx!(self);
                    let joined = ctx.lat_join(&decl, &current, &value)?;
                    if ctx.config.validate_joins
                        && !(ctx.lat_leq(&decl, &current, &joined)?
                            && ctx.lat_leq(&decl, &value, &joined)?)
                    {
                        return Err(EvalError::NonMonotoneJoin {
                            lattice: decl.name.clone(),
                            left: current,
                            right: value,
                            joined,
                        });
                    }
                    let changed = !ctx.lat_leq(&decl, &joined, &current)?;
                    (joined, changed)
                };

                if changed {
                    if let Some(map) = self.db.lattice_map_mut(sym) {
                        map.put(key.clone(), joined.clone());
                    }
                    self.stats.inserts_changed += 1;
                    if enqueue {
                        let mut delta = key;
                        delta.push(joined);
                        self.db.enqueue(sym, delta);
                    }
                }
                Ok(changed)
            }
            Interpretation::LatticeFn | Interpretation::Code { .. } => {
                Err(EvalError::NotStored {
                    symbol: info.name.clone(),
                })
            }
        }
    }
}

impl EvalCtx<'_> {
    /// Activate one clause from a delta bound at body position `pos`.
    /// Returns the derived head tuples.
    pub(crate) fn activate(
        &mut self,
        ci: usize,
        pos: usize,
        tuple: &[Value],
    ) -> Result<Vec<(PredSym, Tuple)>, EvalError> {
        let index = self.index;
        let clause = &index.bottom_up[ci];
        let mut subst = Subst::new(clause.num_vars);
        self.stats.body_matches += 1;
        if !match_atom(&clause.body[pos].args, tuple, &mut subst) {
            return Ok(Vec::new());
        }
        self.finish_clause(clause, ci, Some(pos), subst)
    }

    /// Evaluate a clause body from scratch (naive mode and unkeyed
    /// clauses).
    pub(crate) fn derive_full(&mut self, ci: usize) -> Result<Vec<(PredSym, Tuple)>, EvalError> {
        let index = self.index;
        let clause = &index.bottom_up[ci];
        let subst = Subst::new(clause.num_vars);
        self.finish_clause(clause, ci, None, subst)
    }

    /// Evaluate the remaining body atoms left-to-right and construct the
    /// head for every satisfying substitution.
    fn finish_clause(
        &mut self,
        clause: &CClause,
        ci: usize,
        skip: Option<usize>,
        subst: Subst,
    ) -> Result<Vec<(PredSym, Tuple)>, EvalError> {
        let mut substs = vec![subst];
        for (pos, atom) in clause.body.iter().enumerate() {
            if Some(pos) == skip {
                continue;
            }
            if substs.is_empty() {
                break;
            }
            let mut next = Vec::new();
            for s in &substs {
                self.satisfy_atom(atom, clause, Some(ci), Some(pos), s, &mut next)?;
            }
            substs = next;
        }

        let mut derived = Vec::with_capacity(substs.len());
        for s in substs {
            let tuple: Option<Tuple> = clause
                .head
                .args
                .iter()
                .map(|t| ground_term(t, &s))
                .collect();
            match tuple {
                Some(tuple) => derived.push((clause.head.sym, tuple)),
                // Range restriction makes this unreachable for bottom-up
                // heads; surface it rather than dropping the derivation.
                None => {
                    return Err(EvalError::UngroundAnswer {
                        symbol: self.program.name(clause.head.sym).to_string(),
                    });
                }
            }
        }
        Ok(derived)
    }
}
