//! Instance enumeration within a scope

use tracing::trace;

use crate::heap::ObjectId;
use crate::space::ObjectSpace;
use crate::types::{scope, TypeRef};

/// Enumerate live instances within the namespaces `roots`.
///
/// A reclamation pass always runs first, so instances that are already
/// unreachable never show up. With no roots every live instance is
/// returned; otherwise only instances whose exact type is one of the
/// resolved classes, grouped by class. Roots that resolve to nothing yield
/// nothing.
pub fn instances_within<S>(space: &mut S, roots: &[TypeRef]) -> Vec<ObjectId>
where
    S: ObjectSpace + ?Sized,
{
    space.reclaim();

    if roots.is_empty() {
        return space.live_instances();
    }

    let classes = scope::resolve(space.types(), roots);
    trace!(roots = roots.len(), classes = classes.len(), "resolved scope");
    classes
        .into_iter()
        .flat_map(|ty| space.live_instances_of(ty))
        .collect()
}
