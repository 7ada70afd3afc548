//! Caller-facing operations
//!
//! Grouped listings, counts and printed reports of the live set, plus the
//! scoped and environment-verified forms of reference lookup and detach.
//! Every function takes the namespace roots to narrow by; an empty slice
//! means the whole environment.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Write};

use crate::enumerate::instances_within;
use crate::error::Result;
use crate::heap::{Instance, ObjectId};
use crate::references::{find_references, OnDetached, ReferenceMap, Verification};
use crate::space::ObjectSpace;
use crate::types::TypeRef;

const RULE_WIDTH: usize = 50;

/// Look up a live instance by identity.
///
/// # Errors
///
/// Returns `NotFound` if the identity is stale.
pub fn get<S: ObjectSpace>(space: &S, id: ObjectId) -> Result<&Instance> {
    space.lookup(id)
}

// ═══════════════════════════════════════════════════════════════════════
// Listing
// ═══════════════════════════════════════════════════════════════════════

/// Live identities grouped by qualified type name, each list sorted.
pub fn index<S: ObjectSpace>(
    space: &mut S,
    roots: &[TypeRef],
) -> BTreeMap<String, Vec<ObjectId>> {
    let mut index: BTreeMap<String, Vec<ObjectId>> = BTreeMap::new();
    for id in instances_within(space, roots) {
        if let Some(name) = space.type_name_of(id) {
            index.entry(name.to_string()).or_default().push(id);
        }
    }
    index.values_mut().for_each(|ids| ids.sort());
    index
}

/// Live instance counts by qualified type name.
pub fn count<S: ObjectSpace>(space: &mut S, roots: &[TypeRef]) -> BTreeMap<String, usize> {
    index(space, roots)
        .into_iter()
        .map(|(name, ids)| (name, ids.len()))
        .collect()
}

/// One line of a [`Report`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeCount {
    /// Qualified type name
    pub name: String,
    /// Live instances of exactly that type
    pub count: usize,
}

/// Printable summary of the live set.
///
/// Lines are sorted by descending count, then ascending name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    /// Sorted namespace names, or `None` for the whole environment
    pub namespaces: Option<Vec<String>>,
    /// Per-type counts
    pub counts: Vec<TypeCount>,
}

impl Report {
    /// Render as pretty JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(RULE_WIDTH);
        writeln!(f)?;
        writeln!(f, "{}", rule)?;
        match &self.namespaces {
            Some(names) => writeln!(f, " Objects within {:?} namespace", names)?,
            None => writeln!(f, " Objects within environment")?,
        }
        writeln!(f, "{}", rule)?;
        for line in &self.counts {
            writeln!(f, "  {}: {}", line.name, line.count)?;
        }
        if self.counts.is_empty() {
            writeln!(f, " - no objects instantiated -")?;
        }
        writeln!(f, "{}", rule)?;
        writeln!(f)
    }
}

/// Build a [`Report`] of the live set within `roots`.
pub fn report<S: ObjectSpace>(space: &mut S, roots: &[TypeRef]) -> Report {
    let mut counts: Vec<TypeCount> = count(space, roots)
        .into_iter()
        .map(|(name, count)| TypeCount { name, count })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));

    let namespaces = (!roots.is_empty()).then(|| {
        let mut names: Vec<String> = roots
            .iter()
            .filter_map(|root| space.types().name(*root))
            .map(str::to_string)
            .collect();
        names.sort();
        names
    });

    Report { namespaces, counts }
}

/// Write the [`Report`] of the live set within `roots` to `out`.
///
/// # Errors
///
/// Propagates write failures.
pub fn print<S, W>(space: &mut S, roots: &[TypeRef], out: &mut W) -> io::Result<()>
where
    S: ObjectSpace,
    W: Write,
{
    write!(out, "{}", report(space, roots))
}

// ═══════════════════════════════════════════════════════════════════════
// References
// ═══════════════════════════════════════════════════════════════════════

/// Instances within `roots` that reference `target`, with the fields that
/// hold it.
pub fn references<S: ObjectSpace>(
    space: &mut S,
    target: Option<ObjectId>,
    roots: &[TypeRef],
) -> ReferenceMap {
    if target.is_none() {
        return ReferenceMap::new();
    }
    let candidates = space.reference_instances(roots);
    find_references(space, target, &candidates)
}

/// Remove all references to `target` held within `roots`.
///
/// Succeeds only if afterwards nothing in the whole environment references
/// the target.
pub fn detach<S: ObjectSpace>(
    space: &mut S,
    target: Option<ObjectId>,
    roots: &[TypeRef],
) -> bool {
    run_detach(space, target, roots, Verification::Environment, None)
}

/// [`detach`], running `on_success` once the target is verified detached.
pub fn detach_then<'a, S, F>(
    space: &mut S,
    target: Option<ObjectId>,
    roots: &[TypeRef],
    on_success: F,
) -> bool
where
    S: ObjectSpace,
    F: FnOnce(&mut S) + 'a,
{
    let callback: OnDetached<'a, S> = Box::new(on_success);
    run_detach(space, target, roots, Verification::Environment, Some(callback))
}

/// Remove all references to `target` held within `roots`, trusting that
/// removal without rescanning the rest of the environment.
pub fn detach_scoped<S: ObjectSpace>(
    space: &mut S,
    target: Option<ObjectId>,
    roots: &[TypeRef],
) -> bool {
    run_detach(space, target, roots, Verification::Scoped, None)
}

/// [`detach_scoped`], running `on_success` when removal succeeded.
pub fn detach_scoped_then<'a, S, F>(
    space: &mut S,
    target: Option<ObjectId>,
    roots: &[TypeRef],
    on_success: F,
) -> bool
where
    S: ObjectSpace,
    F: FnOnce(&mut S) + 'a,
{
    let callback: OnDetached<'a, S> = Box::new(on_success);
    run_detach(space, target, roots, Verification::Scoped, Some(callback))
}

/// Detach every live instance of exactly `ty`, one by one, against the
/// whole environment.
///
/// Instances reclaimed while earlier ones were being detached count as
/// detached. Returns `true` if every instance was detached.
pub fn detach_all<S: ObjectSpace>(space: &mut S, ty: TypeRef, verification: Verification) -> bool {
    let targets: Vec<ObjectId> = instances_within(space, &[ty])
        .into_iter()
        .filter(|id| space.lookup(*id).is_ok_and(|instance| instance.type_ref() == ty))
        .collect();

    let mut detached = true;
    for target in targets {
        let candidates = space.reference_instances(&[]);
        if space.lookup(target).is_err() {
            continue;
        }
        detached &=
            crate::references::detach(space, Some(target), &candidates, verification, None);
    }
    detached
}

/// Run a reclamation pass once the caller has cleared `variable`.
///
/// Returns the number of reclaimed instances, or `None` while the variable
/// is still set.
pub fn collect_unless_held<S, T>(space: &mut S, variable: &Option<T>) -> Option<usize>
where
    S: ObjectSpace,
{
    variable.is_none().then(|| space.reclaim())
}

fn run_detach<S: ObjectSpace>(
    space: &mut S,
    target: Option<ObjectId>,
    roots: &[TypeRef],
    verification: Verification,
    on_success: Option<OnDetached<'_, S>>,
) -> bool {
    if target.is_none() {
        return false;
    }
    let candidates = space.reference_instances(roots);
    crate::references::detach(space, target, &candidates, verification, on_success)
}
