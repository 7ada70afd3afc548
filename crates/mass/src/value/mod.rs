//! Field values stored on heap instances

mod display;
mod hashable;
mod impls;

pub use hashable::HashableValue;

use indexmap::IndexMap;
use std::sync::Arc;

use crate::heap::ObjectId;

/// A value held in an instance field.
///
/// Values are organized into three tiers:
/// - Tier 1: Inline scalars (no identity)
/// - Tier 2: Aggregates owned by the field that holds them
/// - Tier 3: References to other heap instances (identity-bearing)
#[derive(Clone)]
pub enum Value {
    // ═══════════════════════════════════════════════════════════════════
    // Tier 1: Inline Scalars
    // ═══════════════════════════════════════════════════════════════════
    /// The absent value
    Nil,

    /// Boolean: `true` or `false`
    Bool(bool),

    /// Unicode scalar value
    Char(char),

    /// 64-bit signed integer
    I64(i64),

    /// 64-bit floating point
    F64(f64),

    /// Shared immutable string
    String(Arc<String>),

    /// Shared immutable byte string
    Bytes(Arc<Vec<u8>>),

    // ═══════════════════════════════════════════════════════════════════
    // Tier 2: Aggregates
    // ═══════════════════════════════════════════════════════════════════
    /// Ordered sequence
    Vec(Vec<Value>),

    /// Keyed map, iterated in insertion order
    Map(IndexMap<HashableValue, Value>),

    // ═══════════════════════════════════════════════════════════════════
    // Tier 3: Instance References
    // ═══════════════════════════════════════════════════════════════════
    /// Reference to a heap instance, compared by identity
    Object(ObjectId),
}
