//! Typed RPC parameter and return value lists.
//!
//! Each value has a one-character type code; a list of values is described
//! by the concatenation of its codes (e.g. `"bix"` for `u8, i32, bytes`).

use bytes::Bytes;
use std::fmt;

/// A single typed RPC value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// `b`: unsigned 8-bit integer.
    Int8(u8),
    /// `i`: signed 32-bit integer.
    Int32(i32),
    /// `l`: signed 64-bit integer.
    Int64(i64),
    /// `x`: opaque binary data.
    Data(Bytes),
    /// `s`: UTF-8 string.
    String(String),
}

impl Value {
    /// Returns the type code for this value.
    pub fn type_code(&self) -> char {
        match self {
            Value::Int8(_) => 'b',
            Value::Int32(_) => 'i',
            Value::Int64(_) => 'l',
            Value::Data(_) => 'x',
            Value::String(_) => 's',
        }
    }

    pub fn as_int8(&self) -> Option<u8> {
        match self {
            Value::Int8(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int32(&self) -> Option<i32> {
        match self {
            Value::Int32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int64(&self) -> Option<i64> {
        match self {
            Value::Int64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_data(&self) -> Option<&Bytes> {
        match self {
            Value::Data(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }
}

/// An ordered list of typed values (parameters or return values).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Values {
    values: Vec<Value>,
}

impl Values {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_int8(&mut self, value: u8) {
        self.values.push(Value::Int8(value));
    }

    pub fn add_int32(&mut self, value: i32) {
        self.values.push(Value::Int32(value));
    }

    pub fn add_int64(&mut self, value: i64) {
        self.values.push(Value::Int64(value));
    }

    pub fn add_data(&mut self, value: impl Into<Bytes>) {
        self.values.push(Value::Data(value.into()));
    }

    pub fn add_string(&mut self, value: impl Into<String>) {
        self.values.push(Value::String(value.into()));
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.values.iter()
    }

    /// Returns the type string describing this list.
    pub fn type_string(&self) -> String {
        self.values.iter().map(Value::type_code).collect()
    }

    /// Returns whether this list has exactly the given type string.
    pub fn matches(&self, types: &str) -> bool {
        self.values.len() == types.len()
            && self
                .values
                .iter()
                .zip(types.chars())
                .all(|(v, t)| v.type_code() == t)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

impl fmt::Display for Values {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.type_string())
    }
}

impl FromIterator<Value> for Values {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
