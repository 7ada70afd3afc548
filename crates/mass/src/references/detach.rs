//! Reference removal
//!
//! Detaching a target removes every discovered reference to it from the
//! candidate instances, in place. Direct references drop the field; inside
//! aggregates the matching elements (or map entries, matched on the value
//! side) are deleted. Nothing is rolled back when some field cannot be
//! cleaned: the boolean result is the only report.

use indexmap::IndexMap;
use tracing::{debug, warn};

use super::{extract_references, find_references};
use crate::heap::{Fields, ObjectId};
use crate::space::ObjectSpace;
use crate::value::{HashableValue, Value};

/// How much a successful detach must prove.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    /// Trust the removal performed on the supplied candidates.
    Scoped,

    /// Additionally rescan every live instance for surviving references.
    Environment,
}

/// Callback run after a successful detach, with access to the space so the
/// caller can drop its own hold on the target.
pub type OnDetached<'a, S> = Box<dyn FnOnce(&mut S) + 'a>;

/// Remove every reference to `target` held by `candidates`.
///
/// Returns `true` when every matching field was cleaned and, under
/// [`Verification::Environment`], no live instance still references the
/// target. `on_success` runs once, after verification, only on `true`.
///
/// An absent or no longer live target returns `false` without touching
/// anything. No reclamation pass is triggered.
pub fn detach<S>(
    space: &mut S,
    target: Option<ObjectId>,
    candidates: &[ObjectId],
    verification: Verification,
    on_success: Option<OnDetached<'_, S>>,
) -> bool
where
    S: ObjectSpace,
{
    let Some(target) = target else {
        return false;
    };
    if let Err(err) = space.lookup(target) {
        warn!(%target, %err, "cannot detach");
        return false;
    }

    let mut removed = true;
    for (id, fields) in working_set(space, target, candidates) {
        let Ok(instance) = space.lookup_mut(id) else {
            removed = false;
            continue;
        };
        let mut instance_removed = true;
        for name in &fields {
            // every field is attempted even after a failure
            instance_removed &= remove_field_reference(instance, name, target);
        }
        if !instance_removed {
            debug!(%id, %target, ?fields, "references left in place");
        }
        removed &= instance_removed;
    }

    let detached = removed
        && (verification == Verification::Scoped
            || find_references(space, Some(target), &space.live_instances()).is_empty());
    debug!(%target, ?verification, removed, detached, "detach finished");

    if detached {
        if let Some(callback) = on_success {
            callback(space);
        }
    }
    detached
}

/// Candidates with at least one matching field, each at most once.
fn working_set<S>(
    space: &S,
    target: ObjectId,
    candidates: &[ObjectId],
) -> Vec<(ObjectId, Vec<String>)>
where
    S: ObjectSpace + ?Sized,
{
    let mut set: Vec<(ObjectId, Vec<String>)> = Vec::new();
    for &id in candidates {
        if set.iter().any(|(seen, _)| *seen == id) {
            continue;
        }
        let Ok(instance) = space.lookup(id) else {
            continue;
        };
        let fields = extract_references(instance, target);
        if !fields.is_empty() {
            set.push((id, fields));
        }
    }
    set
}

fn remove_field_reference(instance: &mut impl Fields, name: &str, target: ObjectId) -> bool {
    let direct = match instance.field(name) {
        Some(value) => value.is_identical(target),
        None => return false,
    };
    if direct {
        instance.remove_field(name);
        return true;
    }
    instance
        .field_mut(name)
        .is_some_and(|value| remove_nested(value, target))
}

/// Delete the target from an aggregate, descending into nested aggregates.
///
/// Returns whether anything was removed anywhere within `value`. Scalars
/// and instance references other than the target never succeed.
fn remove_nested(value: &mut Value, target: ObjectId) -> bool {
    match value {
        Value::Vec(items) => {
            let before = items.len();
            items.retain(|item| !item.is_identical(target));
            let mut removed = items.len() != before;
            for item in items.iter_mut().filter(|item| item.is_aggregate()) {
                removed |= remove_nested(item, target);
            }
            removed
        }
        Value::Map(map) => {
            let before = map.len();
            map.retain(|_, entry| !entry.is_identical(target));
            let mut removed = map.len() != before;
            removed |= remove_nested_values(map, target);
            removed
        }
        _ => false,
    }
}

fn remove_nested_values(map: &mut IndexMap<HashableValue, Value>, target: ObjectId) -> bool {
    let mut removed = false;
    for value in map.values_mut().filter(|value| value.is_aggregate()) {
        removed |= remove_nested(value, target);
    }
    removed
}
