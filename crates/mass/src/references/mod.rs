//! Reference discovery
//!
//! Finds which fields of which instances hold a target instance. A field
//! holds the target when its value *is* the target (identity, not value
//! equality) or when it is an aggregate that contains the target at any
//! depth of aggregate nesting. References held through another instance's
//! fields do not count: discovery is one hop per candidate.

mod detach;

pub use detach::{detach, OnDetached, Verification};

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{trace, warn};

use crate::heap::{Fields, Instance, ObjectId};
use crate::space::ObjectSpace;
use crate::value::Value;

/// Names a referencing instance: its qualified type name and identity.
///
/// Renders as `Type::Name#<id>`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Descriptor {
    /// Qualified type name
    pub type_name: String,
    /// Instance identity
    pub id: ObjectId,
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.type_name, self.id)
    }
}

/// Referencing instances mapped to the sorted field names that hold the
/// target. Instances without a matching field never appear.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceMap {
    entries: BTreeMap<Descriptor, Vec<String>>,
}

impl ReferenceMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of referencing instances.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing references the target.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Field names on `id` that hold the target.
    pub fn fields_of(&self, id: ObjectId) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(descriptor, _)| descriptor.id == id)
            .map(|(_, fields)| fields.as_slice())
    }

    /// Check if `id` holds the target.
    pub fn contains(&self, id: ObjectId) -> bool {
        self.fields_of(id).is_some()
    }

    /// Identities of every referencing instance, in descriptor order.
    pub fn ids(&self) -> Vec<ObjectId> {
        self.entries.keys().map(|descriptor| descriptor.id).collect()
    }

    /// Iterate in descriptor order.
    pub fn iter(&self) -> impl Iterator<Item = (&Descriptor, &[String])> {
        self.entries
            .iter()
            .map(|(descriptor, fields)| (descriptor, fields.as_slice()))
    }

    /// Rendered form: `"Type#id" → fields`, as printed in reports.
    pub fn to_strings(&self) -> BTreeMap<String, Vec<String>> {
        self.entries
            .iter()
            .map(|(descriptor, fields)| (descriptor.to_string(), fields.clone()))
            .collect()
    }

    fn insert(&mut self, descriptor: Descriptor, mut fields: Vec<String>) {
        fields.sort();
        fields.dedup();
        self.entries.insert(descriptor, fields);
    }
}

impl Serialize for ReferenceMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (descriptor, fields) in &self.entries {
            map.serialize_entry(&descriptor.to_string(), fields)?;
        }
        map.end()
    }
}

/// Check whether a value is the target or an aggregate containing it.
///
/// Both keys and values of maps are searched. Instance references other
/// than the target are not followed.
pub fn matches(value: &Value, target: ObjectId) -> bool {
    match value {
        Value::Object(id) => *id == target,
        Value::Vec(items) => items.iter().any(|item| matches(item, target)),
        Value::Map(map) => map
            .iter()
            .any(|(key, value)| matches(key.value(), target) || matches(value, target)),
        _ => false,
    }
}

/// Names of the fields of `instance` that hold `target`, in field order.
pub fn extract_references(instance: &impl Fields, target: ObjectId) -> Vec<String> {
    instance
        .field_names()
        .into_iter()
        .filter(|name| {
            instance
                .field(name)
                .is_some_and(|value| matches(value, target))
        })
        .map(str::to_string)
        .collect()
}

/// Find every candidate field that holds `target`.
///
/// An absent target has no references. Candidates that are no longer live
/// are skipped.
pub fn find_references<S>(
    space: &S,
    target: Option<ObjectId>,
    candidates: &[ObjectId],
) -> ReferenceMap
where
    S: ObjectSpace + ?Sized,
{
    let mut map = ReferenceMap::new();
    let Some(target) = target else {
        return map;
    };

    for &id in candidates {
        let instance = match space.lookup(id) {
            Ok(instance) => instance,
            Err(err) => {
                warn!(%id, %err, "skipping candidate");
                continue;
            }
        };
        let fields = extract_references(instance, target);
        if fields.is_empty() {
            continue;
        }
        trace!(%id, %target, ?fields, "found references");
        map.insert(descriptor(space, instance), fields);
    }
    map
}

fn descriptor<S>(space: &S, instance: &Instance) -> Descriptor
where
    S: ObjectSpace + ?Sized,
{
    let type_name = space
        .types()
        .name(instance.type_ref())
        .unwrap_or("?")
        .to_string();
    Descriptor {
        type_name,
        id: instance.id(),
    }
}
