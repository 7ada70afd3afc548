//! Reference removal tests

use pretty_assertions::assert_eq;
use std::cell::Cell;

use mass::*;

struct World {
    heap: Heap,
    foo: TypeRef,
    bar: TypeRef,
    thing: TypeRef,
    one_more_thing: TypeRef,
    holder: TypeRef,
}

fn world() -> World {
    let mut types = TypeRegistry::new();
    let foo = types.declare_class(None, "Foo", &["foo"]).unwrap();
    let bar = types.declare_class(Some(foo), "Bar", &["fool"]).unwrap();
    let thing = types.declare_class(None, "Thing", &["food"]).unwrap();
    let one_more_thing = types
        .declare_class(None, "OneMoreThing", &["thing"])
        .unwrap();
    let holder = types
        .declare_class(None, "Holder", &["direct", "items", "keyed", "count"])
        .unwrap();
    World {
        heap: Heap::new(types),
        foo,
        bar,
        thing,
        one_more_thing,
        holder,
    }
}

/// f1 referenced by f2 (Foo), b (Foo::Bar) and t (Thing).
fn scenario(w: &mut World) -> (ObjectId, ObjectId, ObjectId, ObjectId) {
    let f1 = w.heap.alloc(w.foo).unwrap();
    let f2 = w.heap.alloc(w.foo).unwrap();
    let b = w.heap.alloc(w.bar).unwrap();
    let t = w.heap.alloc(w.thing).unwrap();
    w.heap.set_field(f2, "foo", f1).unwrap();
    w.heap.set_field(b, "fool", f1).unwrap();
    w.heap.set_field(t, "food", f1).unwrap();
    (f1, f2, b, t)
}

// ═══════════════════════════════════════════════════════════════════════
// Scoped vs Environment Verification
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_scenario_scoped_detach_reports_survivors() {
    let mut w = world();
    let (f1, f2, b, t) = scenario(&mut w);

    assert_eq!(references(&mut w.heap, Some(f1), &[]).len(), 3);

    assert!(!detach(&mut w.heap, Some(f1), &[w.thing]));
    assert_eq!(w.heap.get_field(t, "food").unwrap(), None);
    assert_eq!(
        references(&mut w.heap, Some(f1), &[]).ids(),
        vec![f2, b]
    );

    assert!(detach(&mut w.heap, Some(f1), &[]));
    assert!(references(&mut w.heap, Some(f1), &[]).is_empty());
    assert!(w.heap.is_live(f1));
}

#[test]
fn test_unrelated_scope_changes_nothing() {
    let mut w = world();
    let (f1, f2, b, t) = scenario(&mut w);

    assert!(!detach(&mut w.heap, Some(f1), &[w.one_more_thing]));
    assert_eq!(w.heap.get_field(f2, "foo").unwrap(), Some(&Value::Object(f1)));
    assert_eq!(w.heap.get_field(b, "fool").unwrap(), Some(&Value::Object(f1)));
    assert_eq!(w.heap.get_field(t, "food").unwrap(), Some(&Value::Object(f1)));
}

#[test]
fn test_scoped_variant_trusts_scope() {
    let mut w = world();
    let (f1, f2, b, t) = scenario(&mut w);

    assert!(detach_scoped(&mut w.heap, Some(f1), &[w.thing]));
    assert_eq!(w.heap.get_field(t, "food").unwrap(), None);

    let remaining = references(&mut w.heap, Some(f1), &[]);
    assert_eq!(remaining.ids(), vec![f2, b]);
}

#[test]
fn test_scoped_detach_does_not_touch_outside_scope() {
    let mut w = world();
    let (f1, f2, _, _) = scenario(&mut w);

    assert!(detach_scoped(&mut w.heap, Some(f1), &[w.bar, w.thing]));
    assert_eq!(w.heap.get_field(f2, "foo").unwrap(), Some(&Value::Object(f1)));
}

// ═══════════════════════════════════════════════════════════════════════
// Callbacks
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_callback_fires_only_on_success() {
    let mut w = world();
    let (f1, _, _, _) = scenario(&mut w);
    let calls = Cell::new(0);

    assert!(!detach_then(&mut w.heap, Some(f1), &[w.thing], |_| {
        calls.set(calls.get() + 1)
    }));
    assert_eq!(calls.get(), 0);

    assert!(detach_then(&mut w.heap, Some(f1), &[], |_| {
        calls.set(calls.get() + 1)
    }));
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_callback_can_release_last_hold() {
    let mut w = world();
    let (f1, _, _, _) = scenario(&mut w);

    let detached = detach_then(&mut w.heap, Some(f1), &[], |heap: &mut Heap| {
        assert!(heap.release(f1).unwrap());
    });
    assert!(detached);

    w.heap.collect();
    assert!(!w.heap.is_live(f1));
}

#[test]
fn test_scoped_callback_fires_after_removal() {
    let mut w = world();
    let (f1, _, _, t) = scenario(&mut w);
    let seen = Cell::new(None);

    assert!(detach_scoped_then(&mut w.heap, Some(f1), &[w.thing], |heap: &mut Heap| {
        seen.set(Some(heap.get_field(t, "food").unwrap().is_none()));
    }));
    assert_eq!(seen.get(), Some(true));
}

// ═══════════════════════════════════════════════════════════════════════
// Aggregates
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_detach_from_nested_aggregates() {
    let mut w = world();
    let target = w.heap.alloc(w.foo).unwrap();
    let other = w.heap.alloc(w.foo).unwrap();
    let h = w.heap.alloc(w.holder).unwrap();

    let items = Value::vec(vec![
        Value::I64(1),
        Value::Object(target),
        Value::vec(vec![Value::Object(target), Value::from("x")]),
        Value::map([
            (Value::from("k"), Value::Object(target)),
            (Value::from("n"), Value::vec(vec![Value::Object(target)])),
            (Value::from("o"), Value::Object(other)),
        ])
        .unwrap(),
    ]);
    w.heap.set_field(h, "items", items).unwrap();

    assert!(detach(&mut w.heap, Some(target), &[]));

    let expected = Value::vec(vec![
        Value::I64(1),
        Value::vec(vec![Value::from("x")]),
        Value::map([
            (Value::from("n"), Value::vec(vec![])),
            (Value::from("o"), Value::Object(other)),
        ])
        .unwrap(),
    ]);
    assert_eq!(w.heap.get_field(h, "items").unwrap(), Some(&expected));
}

#[test]
fn test_detach_removes_map_entries_by_value() {
    let mut w = world();
    let target = w.heap.alloc(w.foo).unwrap();
    let h = w.heap.alloc(w.holder).unwrap();
    let keyed = Value::map([
        (Value::from("a"), Value::Object(target)),
        (Value::from("b"), Value::I64(2)),
    ])
    .unwrap();
    w.heap.set_field(h, "keyed", keyed).unwrap();

    assert!(detach(&mut w.heap, Some(target), &[w.holder]));
    let expected = Value::map([(Value::from("b"), Value::I64(2))]).unwrap();
    assert_eq!(w.heap.get_field(h, "keyed").unwrap(), Some(&expected));
}

#[test]
fn test_direct_reference_removes_field() {
    let mut w = world();
    let target = w.heap.alloc(w.foo).unwrap();
    let h = w.heap.alloc(w.holder).unwrap();
    w.heap.set_field(h, "count", 3i64).unwrap();
    w.heap.set_field(h, "direct", target).unwrap();

    assert!(detach(&mut w.heap, Some(target), &[]));
    assert_eq!(w.heap.instance(h).unwrap().field_names(), vec!["count"]);
}

#[test]
fn test_map_key_reference_cannot_be_removed() {
    let mut w = world();
    let target = w.heap.alloc(w.foo).unwrap();
    let h = w.heap.alloc(w.holder).unwrap();
    let keyed = Value::map([(Value::Object(target), Value::I64(0))]).unwrap();
    w.heap.set_field(h, "keyed", keyed.clone()).unwrap();

    assert!(!detach_scoped(&mut w.heap, Some(target), &[w.holder]));
    assert_eq!(w.heap.get_field(h, "keyed").unwrap(), Some(&keyed));
}

#[test]
fn test_partial_removal_is_not_rolled_back() {
    let mut w = world();
    let target = w.heap.alloc(w.foo).unwrap();
    let h = w.heap.alloc(w.holder).unwrap();
    let keyed = Value::map([(Value::Object(target), Value::I64(0))]).unwrap();
    w.heap.set_field(h, "keyed", keyed).unwrap();
    w.heap.set_field(h, "direct", target).unwrap();

    assert!(!detach(&mut w.heap, Some(target), &[]));

    // the unsupported field did not stop the others from being cleaned
    assert_eq!(w.heap.get_field(h, "direct").unwrap(), None);
    let remaining = references(&mut w.heap, Some(target), &[]);
    assert_eq!(remaining.fields_of(h), Some(&["keyed".to_string()][..]));
}

#[test]
fn test_detach_is_one_hop() {
    let mut w = world();
    let target = w.heap.alloc(w.foo).unwrap();
    let near = w.heap.alloc(w.foo).unwrap();
    let far = w.heap.alloc(w.holder).unwrap();
    w.heap.set_field(near, "foo", target).unwrap();
    w.heap.set_field(far, "direct", near).unwrap();

    assert!(detach(&mut w.heap, Some(target), &[]));
    assert_eq!(w.heap.get_field(near, "foo").unwrap(), None);
    assert_eq!(w.heap.get_field(far, "direct").unwrap(), Some(&Value::Object(near)));
}

// ═══════════════════════════════════════════════════════════════════════
// Engine Contract
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_duplicate_candidates_processed_once() {
    let mut w = world();
    let target = w.heap.alloc(w.foo).unwrap();
    let h = w.heap.alloc(w.holder).unwrap();
    w.heap
        .set_field(h, "items", Value::vec(vec![Value::Object(target)]))
        .unwrap();

    let detached = references::detach(
        &mut w.heap,
        Some(target),
        &[h, h],
        Verification::Environment,
        None,
    );
    assert!(detached);
    assert_eq!(w.heap.get_field(h, "items").unwrap(), Some(&Value::vec(vec![])));
}

#[test]
fn test_engine_detach_does_not_reclaim() {
    let mut w = world();
    let target = w.heap.alloc(w.foo).unwrap();
    let garbage = w.heap.alloc(w.foo).unwrap();
    w.heap.release(garbage).unwrap();
    let collections = w.heap.stats().collections;

    assert!(references::detach(
        &mut w.heap,
        Some(target),
        &[],
        Verification::Environment,
        None,
    ));
    assert_eq!(w.heap.stats().collections, collections);
    assert!(w.heap.is_live(garbage));
}

#[test]
fn test_absent_target_is_noop() {
    let mut w = world();
    let (f1, f2, _, _) = scenario(&mut w);

    assert!(!detach(&mut w.heap, None, &[]));
    assert!(!detach_scoped(&mut w.heap, None, &[]));
    assert_eq!(w.heap.get_field(f2, "foo").unwrap(), Some(&Value::Object(f1)));
}

#[test]
fn test_stale_target_is_noop() {
    let mut w = world();
    let gone = w.heap.alloc(w.foo).unwrap();
    w.heap.release(gone).unwrap();
    w.heap.collect();
    let calls = Cell::new(0);

    assert!(!detach_then(&mut w.heap, Some(gone), &[], |_| {
        calls.set(calls.get() + 1)
    }));
    assert_eq!(calls.get(), 0);
}

#[test]
fn test_target_without_references_detaches() {
    let mut w = world();
    let lonely = w.heap.alloc(w.foo).unwrap();
    assert!(detach(&mut w.heap, Some(lonely), &[]));
}

#[test]
fn test_detach_all_of_type() {
    let mut w = world();
    let a = w.heap.alloc(w.foo).unwrap();
    let b = w.heap.alloc(w.foo).unwrap();
    let bar = w.heap.alloc(w.bar).unwrap();
    let t = w.heap.alloc(w.thing).unwrap();
    let h = w.heap.alloc(w.holder).unwrap();
    w.heap.set_field(t, "food", a).unwrap();
    w.heap
        .set_field(h, "items", Value::vec(vec![Value::Object(a), Value::Object(b)]))
        .unwrap();
    w.heap.set_field(bar, "fool", b).unwrap();
    w.heap.set_field(a, "foo", bar).unwrap();

    assert!(detach_all(&mut w.heap, w.foo, Verification::Environment));
    assert!(references(&mut w.heap, Some(a), &[]).is_empty());
    assert!(references(&mut w.heap, Some(b), &[]).is_empty());

    // Foo::Bar is nested, not the same type: its references survive
    assert_eq!(references(&mut w.heap, Some(bar), &[]).ids(), vec![a]);
}

#[test]
fn test_detach_all_reports_failures() {
    let mut w = world();
    let a = w.heap.alloc(w.foo).unwrap();
    let h = w.heap.alloc(w.holder).unwrap();
    let keyed = Value::map([(Value::Object(a), Value::Nil)]).unwrap();
    w.heap.set_field(h, "keyed", keyed).unwrap();

    assert!(!detach_all(&mut w.heap, w.foo, Verification::Scoped));
}
