//! The host-function registry for code-interpreted symbols.
//!
//! Read-only during evaluation: functions are registered up front and the
//! engine takes the registry by value at construction.

use std::fmt;
use std::rc::Rc;

use latlog_ir::{PredSym, Value};
use rustc_hash::FxHashMap;

/// A registered host function. Inputs arrive ground; `None` signals
/// failure (a false boolean predicate, or a partial function off-domain).
pub type NativeFn = Rc<dyn Fn(&[Value]) -> Option<Value>>;

/// Registry of host functions, keyed by predicate symbol.
#[derive(Clone, Default)]
pub struct FnRegistry {
    fns: FxHashMap<PredSym, NativeFn>,
}

impl FnRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the function for a code symbol. Re-registering replaces.
    pub fn register(
        &mut self,
        sym: PredSym,
        f: impl Fn(&[Value]) -> Option<Value> + 'static,
    ) -> &mut Self {
        self.fns.insert(sym, Rc::new(f));
        self
    }

    pub fn get(&self, sym: PredSym) -> Option<&NativeFn> {
        self.fns.get(&sym)
    }

    pub fn contains(&self, sym: PredSym) -> bool {
        self.fns.contains_key(&sym)
    }

    pub fn len(&self) -> usize {
        self.fns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fns.is_empty()
    }
}

impl fmt::Debug for FnRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnRegistry")
            .field("len", &self.fns.len())
            .finish()
    }
}
