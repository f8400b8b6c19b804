//! The lattice runtime: `leq` and `join` behind a uniform interface.
//!
//! Code-interpreted operators call into the registry. Clause-interpreted
//! operators run goal-directed resolution: the ground inputs are matched
//! against the defining clauses' heads, the bodies are evaluated through
//! the regular dispatcher (so product lattices compose by plain Horn
//! conjunction), and the head is groundified into an answer. For `leq`,
//! truth is the existence of an answer; for `join`, the answer's output
//! column is the result. Every clause tried consumes step budget, which
//! bounds ill-founded user lattices.

use latlog_ir::{Atom, Bindings, Interpretation, LatticeDecl, PredSym, Program, Tuple, Value};

use crate::error::EvalError;
use crate::eval::EvalCtx;
use crate::matcher::{Subst, ground_term, match_term};

/// Resolution recurses on the host stack; cap nesting well below stack
/// exhaustion so a cyclic operator definition surfaces as a budget error.
const MAX_RESOLUTION_DEPTH: usize = 256;

impl EvalCtx<'_> {
    /// Solve a partially ground goal against the resolution clauses of
    /// `sym`. `None` positions are outputs to be computed.
    pub(crate) fn resolve(
        &mut self,
        sym: PredSym,
        query: &[Option<Value>],
    ) -> Result<Vec<Tuple>, EvalError> {
        if self.depth == 0 {
            self.budget = self.config.lattice_budget;
        }
        if self.depth >= MAX_RESOLUTION_DEPTH {
            return Err(EvalError::LatticeTimeoutOrOverflow {
                symbol: self.program.name(sym).to_string(),
            });
        }
        self.depth += 1;
        let result = self.resolve_inner(sym, query);
        self.depth -= 1;
        result
    }

    fn resolve_inner(
        &mut self,
        sym: PredSym,
        query: &[Option<Value>],
    ) -> Result<Vec<Tuple>, EvalError> {
        let index = self.index;
        let program = self.program;
        let mut answers: Vec<Tuple> = Vec::new();

        for &ci in &index.by_head_sym[sym.index()] {
            if self.budget == 0 {
                return Err(EvalError::LatticeTimeoutOrOverflow {
                    symbol: program.name(sym).to_string(),
                });
            }
            self.budget -= 1;

            let clause = &index.resolution[ci];
            let mut subst = Subst::new(clause.num_vars);
            let mut matched = true;
            for (pos, bound) in query.iter().enumerate() {
                if let Some(value) = bound {
                    if !match_term(&clause.head.args[pos], value, &mut subst) {
                        matched = false;
                        break;
                    }
                }
            }
            if !matched {
                continue;
            }

            let mut substs = vec![subst];
            for (pos, atom) in clause.body.iter().enumerate() {
                if substs.is_empty() {
                    break;
                }
                let mut next = Vec::new();
                for s in &substs {
                    self.satisfy_atom(atom, clause, None, Some(pos), s, &mut next)?;
                }
                substs = next;
            }

            for s in substs {
                let answer: Option<Tuple> = clause
                    .head
                    .args
                    .iter()
                    .map(|t| ground_term(t, &s))
                    .collect();
                match answer {
                    Some(answer) => {
                        if !answers.contains(&answer) {
                            answers.push(answer);
                        }
                    }
                    None => {
                        return Err(EvalError::UngroundAnswer {
                            symbol: program.name(sym).to_string(),
                        });
                    }
                }
            }
        }
        Ok(answers)
    }

    /// `a ⊑ b` in the given lattice.
    pub(crate) fn lat_leq(
        &mut self,
        decl: &LatticeDecl,
        a: &Value,
        b: &Value,
    ) -> Result<bool, EvalError> {
        match self.program.interp(decl.leq) {
            Some(Interpretation::Code { .. }) => {
                let registry = self.registry;
                let Some(f) = registry.get(decl.leq) else {
                    return Err(EvalError::NotStored {
                        symbol: self.program.name(decl.leq).to_string(),
                    });
                };
                Ok(!matches!(
                    f.as_ref()(&[a.clone(), b.clone()]),
                    None | Some(Value::Bool(false))
                ))
            }
            Some(Interpretation::LatticeFn) => {
                let answers = self.resolve(decl.leq, &[Some(a.clone()), Some(b.clone())])?;
                Ok(!answers.is_empty())
            }
            _ => Err(EvalError::NotStored {
                symbol: self.program.name(decl.leq).to_string(),
            }),
        }
    }

    /// `a ⊔ b` in the given lattice.
    pub(crate) fn lat_join(
        &mut self,
        decl: &LatticeDecl,
        a: &Value,
        b: &Value,
    ) -> Result<Value, EvalError> {
        match self.program.interp(decl.join) {
            Some(Interpretation::Code { .. }) => {
                let registry = self.registry;
                let Some(f) = registry.get(decl.join) else {
                    return Err(EvalError::NotStored {
                        symbol: self.program.name(decl.join).to_string(),
                    });
                };
                f.as_ref()(&[a.clone(), b.clone()]).ok_or_else(|| EvalError::JoinUndefined {
                    lattice: decl.name.clone(),
                    left: a.clone(),
                    right: b.clone(),
                })
            }
            Some(Interpretation::LatticeFn) => {
                let answers =
                    self.resolve(decl.join, &[Some(a.clone()), Some(b.clone()), None])?;
                match answers.into_iter().next() {
                    Some(mut answer) => match answer.pop() {
                        Some(joined) => Ok(joined),
                        None => Err(EvalError::UngroundAnswer {
                            symbol: decl.name.clone(),
                        }),
                    },
                    None => Err(EvalError::JoinUndefined {
                        lattice: decl.name.clone(),
                        left: a.clone(),
                        right: b.clone(),
                    }),
                }
            }
            _ => Err(EvalError::NotStored {
                symbol: self.program.name(decl.join).to_string(),
            }),
        }
    }

    /// Startup validation of the lattice laws on code lattices, over a
    /// sample set drawn from the program: the declared bottom, every value
    /// in a base fact of a map over the lattice, and every lattice literal
    /// mentioned in a clause (map value arguments and operator arguments).
    pub(crate) fn check_laws(&mut self) -> Result<(), EvalError> {
        let program = self.program;
        for (lid, decl) in program.lattices().iter().enumerate() {
            let leq_is_code = matches!(
                program.interp(decl.leq),
                Some(Interpretation::Code { .. })
            );
            let join_is_code = matches!(
                program.interp(decl.join),
                Some(Interpretation::Code { .. })
            );
            if !leq_is_code && !join_is_code {
                continue;
            }
            let Some(bottom) = decl.bottom.clone() else {
                continue;
            };

            let samples = lattice_samples(program, lid, decl, &bottom);

            for x in &samples {
                if !self.lat_leq(decl, &bottom, x)? {
                    return Err(EvalError::LatticeLawViolation {
                        lattice: decl.name.clone(),
                        law: "leq(bottom, x)",
                        witness: vec![x.clone()],
                    });
                }
                let xx = self.lat_join(decl, x, x)?;
                if !(self.lat_leq(decl, &xx, x)? && self.lat_leq(decl, x, &xx)?) {
                    return Err(EvalError::LatticeLawViolation {
                        lattice: decl.name.clone(),
                        law: "join(x, x) = x",
                        witness: vec![x.clone(), xx],
                    });
                }
                for y in &samples {
                    let xy = self.lat_join(decl, x, y)?;
                    let yx = self.lat_join(decl, y, x)?;
                    if !(self.lat_leq(decl, &xy, &yx)? && self.lat_leq(decl, &yx, &xy)?) {
                        return Err(EvalError::LatticeLawViolation {
                            lattice: decl.name.clone(),
                            law: "join(x, y) = join(y, x)",
                            witness: vec![x.clone(), y.clone()],
                        });
                    }
                    if !self.lat_leq(decl, x, &xy)? {
                        return Err(EvalError::LatticeLawViolation {
                            lattice: decl.name.clone(),
                            law: "leq(x, join(x, y))",
                            witness: vec![x.clone(), y.clone(), xy],
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

/// Collect the law-check sample set for one lattice: the bottom, the
/// values of base facts stored into its maps, and the ground literals its
/// clauses mention at lattice-valued positions.
fn lattice_samples(
    program: &Program,
    lid: usize,
    decl: &LatticeDecl,
    bottom: &Value,
) -> Vec<Value> {
    fn push(value: Value, samples: &mut Vec<Value>) {
        if !samples.contains(&value) {
            samples.push(value);
        }
    }

    let mut samples = vec![bottom.clone()];

    for (fact_sym, args) in program.facts() {
        if let Some(Interpretation::LatticeMap { lattice, .. }) = program.interp(*fact_sym) {
            if lattice.index() == lid {
                if let Some(value) = args.last() {
                    push(value.clone(), &mut samples);
                }
            }
        }
    }

    // Lattice-valued positions in clauses: the value argument of a map
    // atom, and every argument of the lattice's own operators. Only
    // variable-free terms contribute.
    let empty = Bindings::new();
    let scan_atom = |atom: &Atom, samples: &mut Vec<Value>| {
        if let Some(Interpretation::LatticeMap { lattice, .. }) = program.interp(atom.sym) {
            if lattice.index() == lid {
                if let Some(value) = atom.args.last().and_then(|t| t.groundify(&empty)) {
                    push(value, samples);
                }
            }
        }
        if atom.sym == decl.leq || atom.sym == decl.join {
            for value in atom.args.iter().filter_map(|t| t.groundify(&empty)) {
                push(value, samples);
            }
        }
    };
    for clause in program.clauses() {
        scan_atom(&clause.head, &mut samples);
        for atom in &clause.body {
            scan_atom(atom, &mut samples);
        }
    }

    samples
}
