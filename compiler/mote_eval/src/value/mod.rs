//! Runtime values for the Mote object runtime.
//!
//! Heap payloads (strings, arrays, bindings) go through the factory methods
//! on `Value`; `Heap<T>` has a private constructor.
//!
//! ```text
//! let s = Value::string("hello");      // OK
//! let a = Value::array(vec![]);        // OK
//! let s = Value::Str(Heap::new(...));  // ERROR: Heap::new is pub(super)
//! ```
//!
//! Objects and classes are plain ids into the `ObjectModel`; identity
//! comparison on them is id comparison.

mod heap;

use std::fmt;

use mote_ir::Name;

use crate::closure::{Binding, Closure};
use crate::object_model::{ClassId, ObjectId};

pub use heap::Heap;

/// Runtime value.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Nil,
    Bool(bool),
    Int(i64),
    Str(Heap<String>),
    Symbol(Name),
    Array(Heap<Vec<Value>>),
    /// Instance allocated in the object model.
    Object(ObjectId),
    /// Class or module object.
    Class(ClassId),
    /// Proc or lambda.
    Proc(Closure),
    /// Captured binding.
    Binding(Heap<Binding>),
}

// Factory Methods (ONLY way to construct heap values)

impl Value {
    #[inline]
    pub fn int(n: i64) -> Self {
        Value::Int(n)
    }

    #[inline]
    pub fn bool(b: bool) -> Self {
        Value::Bool(b)
    }

    /// Create a string value.
    #[inline]
    pub fn string(s: impl Into<String>) -> Self {
        Value::Str(Heap::new(s.into()))
    }

    #[inline]
    pub fn symbol(name: Name) -> Self {
        Value::Symbol(name)
    }

    /// Create an array value.
    #[inline]
    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Heap::new(items))
    }

    #[inline]
    pub fn proc(closure: Closure) -> Self {
        Value::Proc(closure)
    }

    /// Wrap a captured binding.
    #[inline]
    pub fn binding(binding: Binding) -> Self {
        Value::Binding(Heap::new(binding))
    }
}

// Queries

impl Value {
    #[inline]
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Everything except `nil` and `false` is truthy.
    #[inline]
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<Name> {
        match self {
            Value::Symbol(name) => Some(*name),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<ObjectId> {
        match self {
            Value::Object(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<ClassId> {
        match self {
            Value::Class(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_proc(&self) -> Option<&Closure> {
        match self {
            Value::Proc(closure) => Some(closure),
            _ => None,
        }
    }

    pub fn as_binding(&self) -> Option<&Binding> {
        match self {
            Value::Binding(binding) => Some(&**binding),
            _ => None,
        }
    }

    /// Short category name used in type-mismatch messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Int(_) => "integer",
            Value::Str(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Class(_) => "class",
            Value::Proc(_) => "proc",
            Value::Binding(_) => "binding",
        }
    }

    /// Identity comparison (`equal?`).
    ///
    /// Immediates compare by value, heap payloads by allocation.
    pub fn is_identical(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => Heap::ptr_eq(a, b),
            (Value::Array(a), Value::Array(b)) => Heap::ptr_eq(a, b),
            (Value::Binding(a), Value::Binding(b)) => Heap::ptr_eq(a, b),
            _ => self == other,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Class(a), Value::Class(b)) => a == b,
            (Value::Proc(a), Value::Proc(b)) => Closure::ptr_eq(a, b),
            (Value::Binding(a), Value::Binding(b)) => Heap::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Str(s) => write!(f, "{:?}", s.as_str()),
            Value::Symbol(name) => write!(f, ":{}", name.raw()),
            Value::Array(items) => f.debug_list().entries(items.iter()).finish(),
            Value::Object(id) => write!(f, "#<object {}>", id.raw()),
            Value::Class(id) => write!(f, "#<class {}>", id.raw()),
            Value::Proc(closure) => fmt::Debug::fmt(closure, f),
            Value::Binding(binding) => fmt::Debug::fmt(&**binding, f),
        }
    }
}
