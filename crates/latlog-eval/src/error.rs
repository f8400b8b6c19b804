//! Runtime errors. Every eval error aborts the run; the engine keeps the
//! partial database so callers can inspect how far evaluation got.

use std::fmt;

use latlog_ir::Value;

/// Where in the program a runtime failure surfaced: the predicate symbol,
/// the clause and body position (when inside a clause activation), and the
/// partially constructed substitution.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub symbol: String,
    pub clause: Option<usize>,
    pub position: Option<usize>,
    pub bindings: Vec<(String, Value)>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}`", self.symbol)?;
        if let Some(clause) = self.clause {
            write!(f, " in clause {clause}")?;
            if let Some(position) = self.position {
                write!(f, " at body position {position}")?;
            }
        }
        if !self.bindings.is_empty() {
            write!(f, " with ")?;
            for (i, (name, value)) in self.bindings.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{name} = {value:?}")?;
            }
        }
        Ok(())
    }
}

/// Errors raised during evaluation.
#[derive(Debug, Clone)]
pub enum EvalError {
    /// A code atom was called with an unbound input argument.
    UngroundFunctionInput(Diagnostic),
    /// A derived tuple's shape disagrees with the symbol's arity.
    ArityMismatch {
        symbol: String,
        expected: usize,
        found: usize,
    },
    /// `join(left, right)` produced a value that is not above both inputs
    /// (detected when join validation is enabled).
    NonMonotoneJoin {
        lattice: String,
        left: Value,
        right: Value,
        joined: Value,
    },
    /// A recursive lattice query blew its step budget: the user lattice is
    /// not well-founded, or the budget is too small for the program.
    LatticeTimeoutOrOverflow { symbol: String },
    /// A clause-defined join produced no answer for these inputs.
    JoinUndefined {
        lattice: String,
        left: Value,
        right: Value,
    },
    /// A resolution answer left an output argument unground.
    UngroundAnswer { symbol: String },
    /// A sampled lattice-law check failed on a code lattice.
    LatticeLawViolation {
        lattice: String,
        law: &'static str,
        witness: Vec<Value>,
    },
    /// The symbol has no stored extension to insert into.
    NotStored { symbol: String },
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::UngroundFunctionInput(diag) => {
                write!(f, "unground input to code predicate {diag}")
            }
            EvalError::ArityMismatch {
                symbol,
                expected,
                found,
            } => write!(
                f,
                "derived tuple for `{symbol}` has {found} columns, expected {expected}"
            ),
            EvalError::NonMonotoneJoin {
                lattice,
                left,
                right,
                joined,
            } => write!(
                f,
                "non-monotone join on `{lattice}`: join({left:?}, {right:?}) = {joined:?} \
                 is not above both inputs"
            ),
            EvalError::LatticeTimeoutOrOverflow { symbol } => write!(
                f,
                "lattice query on `{symbol}` exceeded its step budget"
            ),
            EvalError::JoinUndefined {
                lattice,
                left,
                right,
            } => write!(
                f,
                "`{lattice}` defines no join for ({left:?}, {right:?})"
            ),
            EvalError::UngroundAnswer { symbol } => write!(
                f,
                "resolution answer for `{symbol}` left an output unground"
            ),
            EvalError::LatticeLawViolation {
                lattice,
                law,
                witness,
            } => write!(
                f,
                "lattice `{lattice}` violates {law} on sample {witness:?}"
            ),
            EvalError::NotStored { symbol } => {
                write!(f, "`{symbol}` has no stored extension")
            }
        }
    }
}

impl std::error::Error for EvalError {}
