//! Scope resolution tests

use mass::*;

struct Namespaces {
    types: TypeRegistry,
    foo: TypeRef,
    bar: TypeRef,
    thing: TypeRef,
    one_more_thing: TypeRef,
}

fn namespaces() -> Namespaces {
    let mut types = TypeRegistry::new();
    let foo = types.declare_class(None, "Foo", &["foo"]).unwrap();
    let bar = types.declare_class(Some(foo), "Bar", &["fool"]).unwrap();
    let thing = types.declare_class(None, "Thing", &["food"]).unwrap();
    let one_more_thing = types
        .declare_class(None, "OneMoreThing", &["thing"])
        .unwrap();
    Namespaces {
        types,
        foo,
        bar,
        thing,
        one_more_thing,
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Nesting
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_resolve_empty_roots() {
    let ns = namespaces();
    assert!(scope::resolve(&ns.types, &[]).is_empty());
}

#[test]
fn test_resolve_includes_nested_classes() {
    let ns = namespaces();
    assert_eq!(scope::resolve(&ns.types, &[ns.foo]), vec![ns.foo, ns.bar]);
}

#[test]
fn test_resolve_nested_root_alone() {
    let ns = namespaces();
    assert_eq!(scope::resolve(&ns.types, &[ns.bar]), vec![ns.bar]);
}

#[test]
fn test_resolve_multiple_roots() {
    let ns = namespaces();
    assert_eq!(
        scope::resolve(&ns.types, &[ns.bar, ns.thing]),
        vec![ns.bar, ns.thing]
    );
    assert_eq!(
        scope::resolve(&ns.types, &[ns.one_more_thing]),
        vec![ns.one_more_thing]
    );
}

#[test]
fn test_resolve_deduplicates() {
    let ns = namespaces();
    assert_eq!(
        scope::resolve(&ns.types, &[ns.foo, ns.bar, ns.foo]),
        vec![ns.foo, ns.bar]
    );
}

#[test]
fn test_resolve_deep_module_nesting() {
    let mut types = TypeRegistry::new();
    let app = types.declare_module(None, "App").unwrap();
    let models = types.declare_module(Some(app), "Models").unwrap();
    let user = types.declare_class(Some(models), "User", &[]).unwrap();
    let session = types.declare_class(Some(user), "Session", &[]).unwrap();
    let config = types.declare_class(Some(app), "Config", &[]).unwrap();

    assert_eq!(
        scope::resolve(&types, &[app]),
        vec![user, session, config]
    );
    assert_eq!(scope::resolve(&types, &[models]), vec![user, session]);
}

#[test]
fn test_resolve_empty_module() {
    let mut types = TypeRegistry::new();
    let empty = types.declare_module(None, "Empty").unwrap();
    assert!(scope::resolve(&types, &[empty]).is_empty());
}

// ═══════════════════════════════════════════════════════════════════════
// Cross References and Unknown Roots
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_resolve_skips_aliases_outside_namespace() {
    let mut ns = namespaces();
    ns.types.alias(ns.foo, "Thingy", ns.thing).unwrap();

    assert_eq!(scope::resolve(&ns.types, &[ns.foo]), vec![ns.foo, ns.bar]);
}

#[test]
fn test_resolve_skips_name_prefix_coincidence() {
    let mut ns = namespaces();
    let food = ns.types.declare_class(None, "Food", &[]).unwrap();
    ns.types.alias(ns.foo, "Snack", food).unwrap();

    assert_eq!(scope::resolve(&ns.types, &[ns.foo]), vec![ns.foo, ns.bar]);
}

#[test]
fn test_resolve_skips_unknown_roots() {
    let ns = namespaces();

    let mut other = TypeRegistry::new();
    let mut stranger = other.declare_module(None, "S0").unwrap();
    for i in 1..10 {
        stranger = other.declare_module(None, &format!("S{}", i)).unwrap();
    }
    assert!(ns.types.get(stranger).is_none());

    assert_eq!(
        scope::resolve(&ns.types, &[stranger, ns.thing]),
        vec![ns.thing]
    );
    assert!(scope::resolve(&ns.types, &[stranger]).is_empty());
}

#[test]
fn test_resolve_names() {
    let ns = namespaces();
    assert_eq!(
        scope::resolve_names(&ns.types, &["Foo::Bar", "Nope", "Thing"]),
        vec![ns.bar, ns.thing]
    );
    assert!(scope::resolve_names(&ns.types, &["Nope"]).is_empty());
}
