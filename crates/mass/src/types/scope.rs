//! Scope resolution: namespace roots → concrete types
//!
//! A scope follows declared nesting, not inheritance. Starting from each
//! root, nested declarations are walked as long as their qualified name
//! lives under the enclosing declaration's name; aliases pointing elsewhere
//! in the namespace tree are therefore not followed.

use super::{TypeRef, TypeRegistry, PATH_SEPARATOR};

/// Resolve namespace roots to the classes whose instances they cover.
///
/// Returned classes are deduplicated and ordered: concrete roots first (in
/// root order), then nested classes in discovery order. Modules are walked
/// but never returned. Roots unknown to the registry are skipped.
///
/// # Example
///
/// ```
/// use mass::{scope, TypeRegistry};
///
/// let mut types = TypeRegistry::new();
/// let app = types.declare_module(None, "App").unwrap();
/// let user = types.declare_class(Some(app), "User", &["name"]).unwrap();
///
/// assert_eq!(scope::resolve(&types, &[app]), vec![user]);
/// ```
pub fn resolve(registry: &TypeRegistry, roots: &[TypeRef]) -> Vec<TypeRef> {
    let mut resolved: Vec<TypeRef> = roots
        .iter()
        .copied()
        .filter(|root| registry.get(*root).is_some_and(|decl| decl.is_class()))
        .fold(Vec::new(), |mut acc, root| {
            if !acc.contains(&root) {
                acc.push(root);
            }
            acc
        });

    for root in roots {
        collect_nested(registry, *root, &mut resolved);
    }
    resolved
}

/// Resolve roots given by qualified name. Unknown names are skipped.
pub fn resolve_names(registry: &TypeRegistry, roots: &[&str]) -> Vec<TypeRef> {
    let roots: Vec<TypeRef> = roots
        .iter()
        .filter_map(|name| registry.lookup(name))
        .collect();
    resolve(registry, &roots)
}

fn collect_nested(registry: &TypeRegistry, namespace: TypeRef, resolved: &mut Vec<TypeRef>) {
    let Some(decl) = registry.get(namespace) else {
        return;
    };

    for nested in registry.nested(namespace) {
        let Some(nested_decl) = registry.get(nested) else {
            continue;
        };
        if resolved.contains(&nested) || !is_nested_name(decl.name(), nested_decl.name()) {
            continue;
        }
        if nested_decl.is_class() {
            resolved.push(nested);
        }
        collect_nested(registry, nested, resolved);
    }
}

/// `Foo::Bar` is nested under `Foo`; `Food` and `Foo` itself are not.
fn is_nested_name(namespace: &str, candidate: &str) -> bool {
    candidate
        .strip_prefix(namespace)
        .is_some_and(|rest| rest.starts_with(PATH_SEPARATOR))
}
