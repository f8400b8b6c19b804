//! latlog: declarative program analysis as Horn clauses over lattices.
//!
//! Users describe abstract domains (lattices) and analyses as sets of Horn
//! clauses; the solver computes the least fixed point over a shared
//! relational store and exposes the resulting facts. Plain relations
//! accumulate tuples; lattice-maps merge every derivation for a key with
//! the user's `join`; `leq`/`join` themselves are either host functions or
//! further Horn clauses, so product lattices compose by plain conjunction.
//!
//! The crate is a facade: the program model lives in [`latlog_ir`], the
//! engine in [`latlog_eval`]. A parser or elaborator for a surface syntax
//! is an external concern; programs are built through [`ProgramBuilder`].
//!
//! # Example: constant-sign analysis
//!
//! ```
//! use latlog::{Atom, Engine, FnRegistry, ProgramBuilder, Term, Value};
//!
//! let mut b = ProgramBuilder::new();
//!
//! // The flat Sign lattice, with code-interpreted operators.
//! let leq = b.code("sign_leq", 2, 2);
//! let join = b.code("sign_join", 3, 2);
//! let sign = b.lattice("Sign", leq, join);
//! b.bottom(sign, Value::atom("Bot"));
//!
//! // val: Var -> Sign, merged by join.
//! let val = b.lattice_map("val", 1, sign);
//! b.fact(val, vec![Value::string("x"), Value::atom("Pos")]);
//! b.fact(val, vec![Value::string("x"), Value::atom("Neg")]);
//!
//! let mut registry = FnRegistry::new();
//! registry.register(leq, |args| {
//!     let ok = args[0] == Value::atom("Bot")
//!         || args[1] == Value::atom("Top")
//!         || args[0] == args[1];
//!     Some(Value::Bool(ok))
//! });
//! registry.register(join, |args| {
//!     Some(match (&args[0], &args[1]) {
//!         (a, b) if a == b => a.clone(),
//!         (a, b) if *a == Value::atom("Bot") => b.clone(),
//!         (_, b) if *b == Value::atom("Bot") => args[0].clone(),
//!         _ => Value::atom("Top"),
//!     })
//! });
//!
//! let mut engine = Engine::new(b.build().unwrap(), registry).unwrap();
//! assert!(engine.run().is_fixpoint());
//!
//! // Pos ⊔ Neg = Top; never-derived keys read as bottom.
//! assert_eq!(
//!     engine.lattice_value(val, &[Value::string("x")]),
//!     Some(Value::atom("Top"))
//! );
//! assert_eq!(
//!     engine.lattice_value(val, &[Value::string("y")]),
//!     Some(Value::atom("Bot"))
//! );
//! ```

pub use latlog_eval::{
    BridgeError, CancelToken, Config, Diagnostic, Engine, EvalError, FnRegistry,
    LatticeMapStorage, NativeFn, Outcome, RelationStorage, Stats, from_row, from_value,
    serde_bridge, to_row, to_value,
};
pub use latlog_ir::{
    Atom, Bindings, Clause, CtorValue, Interpretation, LatticeDecl, LatticeId, LoadError,
    PredSym, Program, ProgramBuilder, SymbolInfo, SymbolTable, Term, Tuple, Value,
};
