//! Heap instances and their field access capability

use indexmap::IndexMap;

use super::ObjectId;
use crate::types::TypeRef;
use crate::value::Value;

/// Generic access to an object's named fields.
///
/// This is the capability the reference engine relies on instead of runtime
/// reflection: list what is set, read it, mutate it in place, remove it.
pub trait Fields {
    /// Names of the fields currently set, in assignment order.
    fn field_names(&self) -> Vec<&str>;

    /// Read a field.
    fn field(&self, name: &str) -> Option<&Value>;

    /// Mutable access to a field's value (used to edit aggregates in place).
    fn field_mut(&mut self, name: &str) -> Option<&mut Value>;

    /// Remove a field entirely, returning its last value.
    ///
    /// Afterwards the field is absent, not set to nil.
    fn remove_field(&mut self, name: &str) -> Option<Value>;
}

/// A live object tracked by a [`Heap`](super::Heap).
#[derive(Debug, Clone)]
pub struct Instance {
    id: ObjectId,
    ty: TypeRef,
    fields: IndexMap<String, Value>,
}

impl Instance {
    pub(super) fn new(id: ObjectId, ty: TypeRef) -> Self {
        Self {
            id,
            ty,
            fields: IndexMap::new(),
        }
    }

    /// This instance's identity
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// This instance's exact runtime type
    pub fn type_ref(&self) -> TypeRef {
        self.ty
    }

    /// Iterate over set fields in assignment order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub(super) fn set(&mut self, name: &str, value: Value) -> Option<Value> {
        self.fields.insert(name.to_string(), value)
    }
}

impl Fields for Instance {
    fn field_names(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }

    fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.fields.get_mut(name)
    }

    fn remove_field(&mut self, name: &str) -> Option<Value> {
        self.fields.shift_remove(name)
    }
}
