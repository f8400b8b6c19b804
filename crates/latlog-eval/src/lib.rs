//! Semi-naive fixpoint engine over relations and lattice-maps.
//!
//! This crate is the runtime of the latlog solver: it takes a validated
//! [`Program`](latlog_ir::Program) plus a [`FnRegistry`] of host functions
//! and computes the least model. Relations accumulate tuples; lattice-maps
//! merge derivations by join; lattice operators are satisfied either by
//! code or by goal-directed resolution over their own Horn clauses.
//!
//! # Example
//!
//! ```
//! use latlog_eval::{Engine, FnRegistry};
//! use latlog_ir::{Atom, ProgramBuilder, Term, Value};
//!
//! let mut b = ProgramBuilder::new();
//! let edge = b.relation("edge", 2);
//! let path = b.relation("path", 2);
//! b.clause(
//!     Atom::new(path, vec![Term::var("x"), Term::var("y")]),
//!     vec![Atom::new(edge, vec![Term::var("x"), Term::var("y")])],
//! );
//! b.clause(
//!     Atom::new(path, vec![Term::var("x"), Term::var("z")]),
//!     vec![
//!         Atom::new(edge, vec![Term::var("x"), Term::var("y")]),
//!         Atom::new(path, vec![Term::var("y"), Term::var("z")]),
//!     ],
//! );
//! b.fact(edge, vec![Value::I32(1), Value::I32(2)]);
//! b.fact(edge, vec![Value::I32(2), Value::I32(3)]);
//!
//! let mut engine = Engine::new(b.build().unwrap(), FnRegistry::new()).unwrap();
//! assert!(engine.run().is_fixpoint());
//! assert_eq!(engine.relation(path).unwrap().len(), 3); // (1,2), (2,3), (1,3)
//! ```

mod compile;
mod database;
mod dispatch;
mod error;
mod eval;
mod lattice;
mod lattice_map;
mod matcher;
mod registry;
mod relation;
pub mod serde_bridge;

pub use error::{Diagnostic, EvalError};
pub use eval::{CancelToken, Config, Engine, Outcome, Stats};
pub use lattice_map::LatticeMapStorage;
pub use registry::{FnRegistry, NativeFn};
pub use relation::RelationStorage;
pub use serde_bridge::{BridgeError, from_row, from_value, to_row, to_value};
