//! Value trait implementations: constructors, predicates, extractors, From traits, PartialEq

use indexmap::IndexMap;
use std::sync::Arc;

use super::*;
use crate::error::Result;

// ═══════════════════════════════════════════════════════════════════
// Convenience Constructors
// ═══════════════════════════════════════════════════════════════════

impl Value {
    /// Create a string value
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(Arc::new(s.into()))
    }

    /// Create a byte string value
    pub fn bytes(b: impl Into<Vec<u8>>) -> Self {
        Value::Bytes(Arc::new(b.into()))
    }

    /// Create a sequence value
    pub fn vec(items: Vec<Value>) -> Self {
        Value::Vec(items)
    }

    /// Create a map value from key/value pairs.
    ///
    /// Later pairs overwrite earlier ones with an equal key, keeping the
    /// position of the first insertion.
    ///
    /// # Errors
    ///
    /// Returns `UnhashableKey` if any key is a float or an aggregate.
    pub fn map<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Value, Value)>,
    {
        let mut map = IndexMap::new();
        for (key, value) in pairs {
            map.insert(HashableValue::new(key)?, value);
        }
        Ok(Value::Map(map))
    }

    /// Create a reference to a heap instance
    pub fn object(id: ObjectId) -> Self {
        Value::Object(id)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Shape Predicates
    // ═══════════════════════════════════════════════════════════════════

    /// Check if value is nil
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Check if value is a sequence or a map
    pub fn is_aggregate(&self) -> bool {
        matches!(self, Value::Vec(_) | Value::Map(_))
    }

    /// Check if value is a reference to exactly this instance.
    ///
    /// This is an identity test: two references are the same only when
    /// they name the same slot and generation.
    pub fn is_identical(&self, id: ObjectId) -> bool {
        matches!(self, Value::Object(other) if *other == id)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Extractors (return Option for safe access)
    // ═══════════════════════════════════════════════════════════════════

    /// Extract boolean value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Extract integer value
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I64(n) => Some(*n),
            _ => None,
        }
    }

    /// Extract string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Extract sequence elements
    pub fn as_vec(&self) -> Option<&[Value]> {
        match self {
            Value::Vec(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    /// Extract map entries
    pub fn as_map(&self) -> Option<&IndexMap<HashableValue, Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Extract the referenced instance
    pub fn as_object(&self) -> Option<ObjectId> {
        match self {
            Value::Object(id) => Some(*id),
            _ => None,
        }
    }

    /// Visit every instance reference held by this value, including those
    /// nested inside aggregates (map keys and values alike).
    pub fn for_each_object(&self, f: &mut impl FnMut(ObjectId)) {
        match self {
            Value::Object(id) => f(*id),
            Value::Vec(items) => items.iter().for_each(|item| item.for_each_object(f)),
            Value::Map(map) => {
                for (key, value) in map {
                    key.value().for_each_object(f);
                    value.for_each_object(f);
                }
            }
            _ => {}
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
// PartialEq Implementation
// ═══════════════════════════════════════════════════════════════════

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::F64(a), Value::F64(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Vec(a), Value::Vec(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => {
                a.len() == b.len() && a.iter().all(|(k, v)| b.get(k) == Some(v))
            }
            (Value::Object(a), Value::Object(b)) => a == b,
            _ => false,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
// From Implementations
// ═══════════════════════════════════════════════════════════════════

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Char(c)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::I64(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::F64(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::string(s)
    }
}

impl From<ObjectId> for Value {
    fn from(id: ObjectId) -> Self {
        Value::Object(id)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Vec(items)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Nil, Into::into)
    }
}
