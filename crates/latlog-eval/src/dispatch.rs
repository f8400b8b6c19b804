//! Body-atom satisfaction, routed by the symbol's interpretation.
//!
//! | interpretation | how the atom is satisfied |
//! |---|---|
//! | relation       | scan, index-accelerated when an argument is ground |
//! | lattice-map    | point lookup on a ground key (missing reads as bottom), entry scan otherwise |
//! | lattice-fn     | goal-directed resolution over its defining clauses |
//! | code           | invoke the registered function on the ground inputs |

use latlog_ir::{Interpretation, Value};

use crate::compile::{CAtom, CClause};
use crate::error::{Diagnostic, EvalError};
use crate::eval::EvalCtx;
use crate::matcher::{Subst, ground_term, match_atom, match_term};

impl EvalCtx<'_> {
    /// Extend `subst` in every way that satisfies `atom` against the
    /// current database, pushing the results into `out`.
    pub(crate) fn satisfy_atom(
        &mut self,
        atom: &CAtom,
        clause: &CClause,
        clause_idx: Option<usize>,
        pos: Option<usize>,
        subst: &Subst,
        out: &mut Vec<Subst>,
    ) -> Result<(), EvalError> {
        let Some(interp) = self.program.interp(atom.sym) else {
            return Err(EvalError::NotStored {
                symbol: format!("#{}", atom.sym.index()),
            });
        };
        match interp {
            Interpretation::Relation => self.satisfy_relation(atom, subst, out),
            Interpretation::LatticeMap { key_arity, lattice } => {
                self.satisfy_lattice_map(atom, key_arity, lattice, subst, out)
            }
            Interpretation::LatticeFn => self.satisfy_lattice_fn(atom, subst, out),
            Interpretation::Code { in_arity } => {
                self.satisfy_code(atom, in_arity, clause, clause_idx, pos, subst, out)
            }
        }
    }

    fn satisfy_relation(
        &mut self,
        atom: &CAtom,
        subst: &Subst,
        out: &mut Vec<Subst>,
    ) -> Result<(), EvalError> {
        let db = self.db;
        let Some(rel) = db.relation(atom.sym) else {
            return Ok(());
        };

        // Prefer an index probe on the first argument that is already
        // ground under the substitution; fall back to a full scan.
        let mut probe = None;
        for (col, pat) in atom.args.iter().enumerate() {
            if let Some(value) = ground_term(pat, subst) {
                probe = Some((col, value));
                break;
            }
        }

        match probe {
            Some((col, value)) => {
                for &idx in rel.lookup(col, &value) {
                    let Some(tuple) = rel.get(idx) else { continue };
                    self.stats.body_matches += 1;
                    let mut s = subst.clone();
                    if match_atom(&atom.args, tuple, &mut s) {
                        out.push(s);
                    }
                }
            }
            None => {
                for tuple in rel.iter() {
                    self.stats.body_matches += 1;
                    let mut s = subst.clone();
                    if match_atom(&atom.args, tuple, &mut s) {
                        out.push(s);
                    }
                }
            }
        }
        Ok(())
    }

    fn satisfy_lattice_map(
        &mut self,
        atom: &CAtom,
        key_arity: usize,
        lattice: latlog_ir::LatticeId,
        subst: &Subst,
        out: &mut Vec<Subst>,
    ) -> Result<(), EvalError> {
        let db = self.db;
        let program = self.program;
        let Some(map) = db.lattice_map(atom.sym) else {
            return Ok(());
        };

        let mut key = Vec::with_capacity(key_arity);
        for pat in &atom.args[..key_arity] {
            match ground_term(pat, subst) {
                Some(value) => key.push(value),
                None => {
                    // Unground key: scan the stored entries. Keys never
                    // derived stay at bottom and are not enumerable.
                    for (stored_key, stored_value) in map.iter() {
                        self.stats.body_matches += 1;
                        let mut s = subst.clone();
                        if match_atom(&atom.args[..key_arity], stored_key, &mut s)
                            && match_term(&atom.args[key_arity], stored_value, &mut s)
                        {
                            out.push(s);
                        }
                    }
                    return Ok(());
                }
            }
        }

        // Ground key: a point lookup, defaulting to the lattice's bottom.
        let value = match map.get(&key) {
            Some(value) => value.clone(),
            None => match program.lattice(lattice).and_then(|decl| decl.bottom.clone()) {
                Some(bottom) => bottom,
                None => return Ok(()),
            },
        };
        self.stats.body_matches += 1;
        let mut s = subst.clone();
        if match_term(&atom.args[key_arity], &value, &mut s) {
            out.push(s);
        }
        Ok(())
    }

    fn satisfy_lattice_fn(
        &mut self,
        atom: &CAtom,
        subst: &Subst,
        out: &mut Vec<Subst>,
    ) -> Result<(), EvalError> {
        let query: Vec<Option<Value>> = atom
            .args
            .iter()
            .map(|pat| ground_term(pat, subst))
            .collect();
        let answers = self.resolve(atom.sym, &query)?;
        for answer in answers {
            self.stats.body_matches += 1;
            let mut s = subst.clone();
            if match_atom(&atom.args, &answer, &mut s) {
                out.push(s);
            }
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn satisfy_code(
        &mut self,
        atom: &CAtom,
        in_arity: usize,
        clause: &CClause,
        clause_idx: Option<usize>,
        pos: Option<usize>,
        subst: &Subst,
        out: &mut Vec<Subst>,
    ) -> Result<(), EvalError> {
        let registry = self.registry;
        let program = self.program;

        let mut inputs = Vec::with_capacity(in_arity);
        for pat in &atom.args[..in_arity] {
            match ground_term(pat, subst) {
                Some(value) => inputs.push(value),
                None => {
                    return Err(EvalError::UngroundFunctionInput(Diagnostic {
                        symbol: program.name(atom.sym).to_string(),
                        clause: clause_idx,
                        position: pos,
                        bindings: subst.named(&clause.var_names),
                    }));
                }
            }
        }

        let Some(f) = registry.get(atom.sym) else {
            return Err(EvalError::NotStored {
                symbol: program.name(atom.sym).to_string(),
            });
        };
        self.stats.body_matches += 1;
        let result = f.as_ref()(&inputs);

        if atom.args.len() == in_arity {
            // Predicate form: any non-false answer means satisfied.
            match result {
                None | Some(Value::Bool(false)) => {}
                Some(_) => out.push(subst.clone()),
            }
        } else if let Some(output) = result {
            let mut s = subst.clone();
            if match_term(&atom.args[in_arity], &output, &mut s) {
                out.push(s);
            }
        }
        Ok(())
    }
}
