//! Error types for heap and type-registry operations
//!
//! The reference engine itself never fails: discovery yields an empty map
//! and detachment reports `false`. Errors only come from the platform layer
//! (declaring types, allocating, writing fields, looking up identities).

use thiserror::Error;

use crate::heap::ObjectId;
use crate::value::Value;

/// Main error type for mass operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MassError {
    /// No live instance carries this identity (never existed or reclaimed)
    #[error("no live instance with id {0}")]
    NotFound(ObjectId),

    /// Type handle or name unknown to the registry
    #[error("unknown type: {0}")]
    UnknownType(String),

    /// A nested declaration with this name already exists
    #[error("duplicate declaration: {0}")]
    DuplicateDeclaration(String),

    /// Attempted to allocate an instance of a namespace-only module
    #[error("{0} is a module and cannot be instantiated")]
    NotInstantiable(String),

    /// Field is not part of the type's field table
    #[error("undefined field `{field}` on {type_name}")]
    UnknownField {
        /// The field that was written
        field: String,
        /// Qualified name of the instance's type
        type_name: String,
    },

    /// Value cannot be used as a map key
    #[error("{kind} cannot be used as a map key")]
    UnhashableKey {
        /// Shape of the rejected key
        kind: String,
    },

    /// The configured instance cap was reached
    #[error("heap exhausted: limit of {max} live instances reached")]
    HeapExhausted {
        /// Configured maximum
        max: usize,
    },
}

/// Result type alias for mass operations
pub type Result<T> = std::result::Result<T, MassError>;

/// Get a human-readable name for a value's shape.
pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Nil => "nil",
        Value::Bool(_) => "bool",
        Value::Char(_) => "char",
        Value::I64(_) => "integer",
        Value::F64(_) => "float",
        Value::String(_) => "string",
        Value::Bytes(_) => "bytes",
        Value::Vec(_) => "vec",
        Value::Map(_) => "map",
        Value::Object(_) => "object",
    }
}
