//! Matching compiled patterns against ground tuples.
//!
//! Variables bind to any value; repeated occurrences of the same variable
//! must agree; constructor patterns match structurally. No open-open
//! unification is ever needed: every candidate comes out of the database
//! (or a resolution answer) and is ground.

use latlog_ir::Value;

use crate::compile::{CTerm, VarId};

/// A slot substitution for one clause activation.
#[derive(Debug, Clone)]
pub(crate) struct Subst {
    slots: Vec<Option<Value>>,
}

impl Subst {
    pub(crate) fn new(num_vars: usize) -> Self {
        Subst {
            slots: vec![None; num_vars],
        }
    }

    pub(crate) fn get(&self, var: VarId) -> Option<&Value> {
        self.slots.get(var.index()).and_then(Option::as_ref)
    }

    /// Bind a variable, or check agreement if it is already bound.
    pub(crate) fn bind(&mut self, var: VarId, value: &Value) -> bool {
        match &self.slots[var.index()] {
            Some(existing) => existing == value,
            None => {
                self.slots[var.index()] = Some(value.clone());
                true
            }
        }
    }

    /// Named bindings for diagnostics, in slot order.
    pub(crate) fn named(&self, var_names: &[String]) -> Vec<(String, Value)> {
        self.slots
            .iter()
            .zip(var_names)
            .filter_map(|(slot, name)| slot.as_ref().map(|v| (name.clone(), v.clone())))
            .collect()
    }
}

/// Match one pattern term against a ground value, extending `subst`.
pub(crate) fn match_term(pat: &CTerm, value: &Value, subst: &mut Subst) -> bool {
    match pat {
        CTerm::Var(var) => subst.bind(*var, value),
        CTerm::Lit(lit) => lit == value,
        CTerm::App(name, args) => match value {
            Value::Ctor(ctor) => {
                ctor.name == *name
                    && ctor.args.len() == args.len()
                    && args
                        .iter()
                        .zip(ctor.args.iter())
                        .all(|(pat, value)| match_term(pat, value, subst))
            }
            _ => false,
        },
    }
}

/// Match a whole pattern atom against a ground tuple.
pub(crate) fn match_atom(args: &[CTerm], tuple: &[Value], subst: &mut Subst) -> bool {
    args.len() == tuple.len()
        && args
            .iter()
            .zip(tuple.iter())
            .all(|(pat, value)| match_term(pat, value, subst))
}

/// Evaluate a pattern term to a ground value under `subst`, if possible.
pub(crate) fn ground_term(pat: &CTerm, subst: &Subst) -> Option<Value> {
    match pat {
        CTerm::Var(var) => subst.get(*var).cloned(),
        CTerm::Lit(lit) => Some(lit.clone()),
        CTerm::App(name, args) => {
            let args: Option<Vec<Value>> =
                args.iter().map(|t| ground_term(t, subst)).collect();
            Some(Value::ctor(name.clone(), args?))
        }
    }
}
