//! Hashable wrapper for Value to enable use as map keys

use std::hash::{Hash, Hasher};

use super::Value;
use crate::error::{kind_name, MassError, Result};

/// A map key.
///
/// Only scalars, strings, byte strings and instance references can be keys.
/// Construction through [`HashableValue::new`] rejects everything else, so
/// hashing never sees a float or an aggregate.
#[derive(Debug, Clone)]
pub struct HashableValue(Value);

impl HashableValue {
    /// Wrap a value as a map key.
    ///
    /// # Errors
    ///
    /// Returns `UnhashableKey` for floats and aggregates.
    pub fn new(value: Value) -> Result<Self> {
        if Self::is_hashable(&value) {
            Ok(Self(value))
        } else {
            Err(MassError::UnhashableKey {
                kind: kind_name(&value).to_string(),
            })
        }
    }

    /// Check if a value can be used as a key
    pub fn is_hashable(value: &Value) -> bool {
        matches!(
            value,
            Value::Nil
                | Value::Bool(_)
                | Value::Char(_)
                | Value::I64(_)
                | Value::String(_)
                | Value::Bytes(_)
                | Value::Object(_)
        )
    }

    /// The wrapped value
    pub fn value(&self) -> &Value {
        &self.0
    }

    /// Unwrap into the inner value
    pub fn into_inner(self) -> Value {
        self.0
    }
}

impl Hash for HashableValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(&self.0).hash(state);

        match &self.0 {
            Value::Bool(b) => b.hash(state),
            Value::Char(c) => c.hash(state),
            Value::I64(n) => n.hash(state),
            Value::String(s) => s.hash(state),
            Value::Bytes(b) => b.hash(state),
            Value::Object(id) => id.hash(state),
            // Nil only needs its discriminant; the rest never get wrapped
            _ => {}
        }
    }
}

impl PartialEq for HashableValue {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for HashableValue {}

impl From<&str> for HashableValue {
    fn from(s: &str) -> Self {
        Self(Value::string(s))
    }
}

impl From<String> for HashableValue {
    fn from(s: String) -> Self {
        Self(Value::string(s))
    }
}

impl From<i64> for HashableValue {
    fn from(n: i64) -> Self {
        Self(Value::I64(n))
    }
}

impl From<crate::heap::ObjectId> for HashableValue {
    fn from(id: crate::heap::ObjectId) -> Self {
        Self(Value::Object(id))
    }
}
