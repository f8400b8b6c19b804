//! Ground values stored in the database.

use std::fmt;
use std::rc::Rc;

use num_bigint::BigInt;

/// A ground value: the payload of database tuples.
///
/// Equality and hashing are structural. Integer widths are distinct types
/// with no implicit coercion: `I32(1)` and `I64(1)` are different values.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Value {
    /// Unit value.
    Unit,
    /// Boolean.
    Bool(bool),
    /// Fixed-width signed integers.
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    /// Arbitrary-precision integer.
    Int(Rc<BigInt>),
    /// String.
    Str(Rc<String>),
    /// Tuple of values.
    Tuple(Rc<Vec<Value>>),
    /// Named constructor application, e.g. `Pos` or `SP(Pos, Even)`.
    Ctor(Rc<CtorValue>),
}

/// A constructor value: a name applied to zero or more argument values.
///
/// Constructors compare by name, arity, and argument values.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CtorValue {
    pub name: String,
    pub args: Vec<Value>,
}

/// A tuple of values, used as a row in a relation.
pub type Tuple = Vec<Value>;

impl Value {
    /// Create a tuple value.
    pub fn tuple(values: Vec<Value>) -> Self {
        Value::Tuple(Rc::new(values))
    }

    /// Create a string value.
    pub fn string(s: impl Into<String>) -> Self {
        Value::Str(Rc::new(s.into()))
    }

    /// Create an arbitrary-precision integer value.
    pub fn int(i: impl Into<BigInt>) -> Self {
        Value::Int(Rc::new(i.into()))
    }

    /// Create a constructor value.
    pub fn ctor(name: impl Into<String>, args: Vec<Value>) -> Self {
        Value::Ctor(Rc::new(CtorValue {
            name: name.into(),
            args,
        }))
    }

    /// Create a nullary constructor value.
    pub fn atom(name: impl Into<String>) -> Self {
        Value::ctor(name, Vec::new())
    }

    /// Try to get as bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as i64. Fixed widths widen; `Int` converts when it fits.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I8(v) => Some(*v as i64),
            Value::I16(v) => Some(*v as i64),
            Value::I32(v) => Some(*v as i64),
            Value::I64(v) => Some(*v),
            Value::Int(v) => i64::try_from(v.as_ref()).ok(),
            _ => None,
        }
    }

    /// The constructor name, if this is a constructor value.
    pub fn ctor_name(&self) -> Option<&str> {
        match self {
            Value::Ctor(c) => Some(&c.name),
            _ => None,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => write!(f, "()"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::I8(v) => write!(f, "{v}i8"),
            Value::I16(v) => write!(f, "{v}i16"),
            Value::I32(v) => write!(f, "{v}"),
            Value::I64(v) => write!(f, "{v}i64"),
            Value::Int(v) => write!(f, "{v}int"),
            Value::Str(v) => write!(f, "{v:?}"),
            Value::Tuple(v) => {
                write!(f, "(")?;
                for (i, val) in v.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{val:?}")?;
                }
                if v.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
            Value::Ctor(c) => {
                write!(f, "{}", c.name)?;
                if !c.args.is_empty() {
                    write!(f, "(")?;
                    for (i, val) in c.args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{val:?}")?;
                    }
                    write!(f, ")")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{s}"),
            other => write!(f, "{other:?}"),
        }
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Unit
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i8> for Value {
    fn from(v: i8) -> Self {
        Value::I8(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::I16(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::I32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::I64(v)
    }
}

impl From<BigInt> for Value {
    fn from(v: BigInt) -> Self {
        Value::Int(Rc::new(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::string(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::string(v)
    }
}
