//! Runtime values that assertions are evaluated against.

use indexmap::IndexMap;
use std::any::Any;
use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;

/// Ordered key/value storage backing [`Value::Object`].
pub type ObjectMap = IndexMap<String, Value>;

/// A dynamically typed subject or argument.
///
/// Composite values (`Array`, `Object`, `Opaque`) are reference counted and
/// carry identity: clones share the same storage, which is what makes
/// circular structures representable and detectable.
#[derive(Clone)]
pub enum Value {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Rc<RefCell<Vec<Value>>>),
    Object(Rc<RefCell<ObjectMap>>),
    /// Any Rust value, for types registered over application data.
    Opaque(Rc<dyn Any>),
}

/// Coarse classification used to decide whether two values can be diffed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffKind {
    Object,
    Array,
    String,
}

impl Value {
    pub fn array(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(items.into_iter().collect())))
    }

    pub fn object<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Object(Rc::new(RefCell::new(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        )))
    }

    pub fn opaque<T: Any>(value: T) -> Self {
        Value::Opaque(Rc::new(value))
    }

    /// Append to an array in place. Returns false for non-arrays.
    pub fn push(&self, item: Value) -> bool {
        match self {
            Value::Array(items) => {
                items.borrow_mut().push(item);
                true
            }
            _ => false,
        }
    }

    /// Insert into an object in place. Returns false for non-objects.
    pub fn insert(&self, key: impl Into<String>, item: Value) -> bool {
        match self {
            Value::Object(entries) => {
                entries.borrow_mut().insert(key.into(), item);
                true
            }
            _ => false,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<Ref<'_, Vec<Value>>> {
        match self {
            Value::Array(items) => Some(items.borrow()),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<Ref<'_, ObjectMap>> {
        match self {
            Value::Object(entries) => Some(entries.borrow()),
            _ => None,
        }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Value::Opaque(inner) => inner.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Address of the shared storage for composite values.
    pub fn identity(&self) -> Option<usize> {
        match self {
            Value::Array(items) => Some(Rc::as_ptr(items) as *const () as usize),
            Value::Object(entries) => Some(Rc::as_ptr(entries) as *const () as usize),
            Value::Opaque(inner) => Some(Rc::as_ptr(inner) as *const () as usize),
            _ => None,
        }
    }

    pub fn is_composite(&self) -> bool {
        self.identity().is_some()
    }

    /// Primitive equality, identity for composites.
    pub fn strict_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            _ => match (self.identity(), other.identity()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }

    /// Classification for diff augmentation. Empty strings do not qualify.
    pub fn diff_kind(&self) -> Option<DiffKind> {
        match self {
            Value::Object(_) | Value::Opaque(_) => Some(DiffKind::Object),
            Value::Array(_) => Some(DiffKind::Array),
            Value::String(s) if !s.is_empty() => Some(DiffKind::String),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write_number(f, *n),
            Value::String(s) => f.write_str(s),
            Value::Array(items) => {
                for (idx, item) in items.borrow().iter().enumerate() {
                    if idx > 0 {
                        f.write_str(",")?;
                    }
                    if item.is_composite() {
                        f.write_str("...")?;
                    } else {
                        write!(f, "{}", item)?;
                    }
                }
                Ok(())
            }
            Value::Object(_) => f.write_str("[object Object]"),
            Value::Opaque(_) => f.write_str("[opaque]"),
        }
    }
}

fn write_number(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    if n.is_nan() {
        f.write_str("NaN")
    } else if n.is_infinite() {
        f.write_str(if n > 0.0 { "Infinity" } else { "-Infinity" })
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        write!(f, "{}", n as i64)
    } else {
        write!(f, "{}", n)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("Undefined"),
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Value::Number(n) => f.debug_tuple("Number").field(n).finish(),
            Value::String(s) => f.debug_tuple("String").field(s).finish(),
            // Composites print their address only; they may be circular.
            Value::Array(_) => write!(f, "Array(@{:x})", self.identity().unwrap_or_default()),
            Value::Object(_) => write!(f, "Object(@{:x})", self.identity().unwrap_or_default()),
            Value::Opaque(_) => write!(f, "Opaque(@{:x})", self.identity().unwrap_or_default()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::array(items.into_iter().map(Into::into))
    }
}
