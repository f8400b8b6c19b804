//! Open terms: the argument patterns of clause atoms.
//!
//! Terms arrive from the elaborator with named variables. The evaluator
//! renumbers them into dense slots at load time; this module is the
//! name-based surface shared with the outside world.

use std::collections::HashMap;

use crate::value::{CtorValue, Value};

/// An open term: a variable, a constant, or a constructor pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    /// A named variable.
    Var(String),
    /// A ground constant.
    Lit(Value),
    /// A constructor applied to sub-terms, e.g. `SP(s, p)`.
    App(String, Vec<Term>),
}

/// A substitution: a mapping from variable names to ground values.
pub type Bindings = HashMap<String, Value>;

impl Term {
    pub fn var(name: impl Into<String>) -> Self {
        Term::Var(name.into())
    }

    pub fn lit(value: impl Into<Value>) -> Self {
        Term::Lit(value.into())
    }

    pub fn app(name: impl Into<String>, args: Vec<Term>) -> Self {
        Term::App(name.into(), args)
    }

    /// Replace every variable bound in `subst` by its value. Total:
    /// unbound variables are left in place.
    pub fn substitute(&self, subst: &Bindings) -> Term {
        match self {
            Term::Var(name) => match subst.get(name) {
                Some(value) => Term::Lit(value.clone()),
                None => self.clone(),
            },
            Term::Lit(_) => self.clone(),
            Term::App(name, args) => Term::App(
                name.clone(),
                args.iter().map(|t| t.substitute(subst)).collect(),
            ),
        }
    }

    /// True iff every variable the term mentions is bound in `subst`.
    pub fn is_ground(&self, subst: &Bindings) -> bool {
        match self {
            Term::Var(name) => subst.contains_key(name),
            Term::Lit(_) => true,
            Term::App(_, args) => args.iter().all(|t| t.is_ground(subst)),
        }
    }

    /// Evaluate the term to a value under `subst`; `None` if not ground.
    pub fn groundify(&self, subst: &Bindings) -> Option<Value> {
        match self {
            Term::Var(name) => subst.get(name).cloned(),
            Term::Lit(value) => Some(value.clone()),
            Term::App(name, args) => {
                let args: Option<Vec<Value>> =
                    args.iter().map(|t| t.groundify(subst)).collect();
                Some(Value::Ctor(std::rc::Rc::new(CtorValue {
                    name: name.clone(),
                    args: args?,
                })))
            }
        }
    }

    /// Visit every variable name the term mentions.
    pub fn for_each_var(&self, f: &mut impl FnMut(&str)) {
        match self {
            Term::Var(name) => f(name),
            Term::Lit(_) => {}
            Term::App(_, args) => {
                for t in args {
                    t.for_each_var(f);
                }
            }
        }
    }
}

impl From<Value> for Term {
    fn from(v: Value) -> Self {
        Term::Lit(v)
    }
}
