//! Integration tests for mirrored mutation
//!
//! Every mutating operation requires an active partner and must leave the
//! pair as exact inverses, or fail without touching either side.

use mirrormap_foundation::{ErrorKind, MapId};
use mirrormap_storage::{MapStore, PairMap, UpdateBatch};

fn linked(store: &mut MapStore<&'static str>) -> (MapId, MapId) {
    let a = store.create();
    let b = store.create();
    store.link(a, b).unwrap();
    (a, b)
}

fn assert_inverse(store: &MapStore<&'static str>, a: MapId, b: MapId) {
    let inverse: PairMap<&str, &str> = store.pairs(b).unwrap().map(|(k, v)| (*v, *k)).collect();
    assert_eq!(store.map(a).unwrap(), &inverse);
}

// =============================================================================
// set
// =============================================================================

#[test]
fn set_writes_both_directions() {
    let mut store = MapStore::new();
    let (a, b) = linked(&mut store);

    store.set(a, "one", "1").unwrap();
    store.set(b, "2", "two").unwrap();

    assert_eq!(store.get(a, &"one").unwrap(), Some(&"1"));
    assert_eq!(store.get(a, &"two").unwrap(), Some(&"2"));
    assert_eq!(store.get(b, &"1").unwrap(), Some(&"one"));
    assert_inverse(&store, a, b);
}

#[test]
fn set_overwrite_removes_the_old_mirror() {
    let mut store = MapStore::new();
    let (a, b) = linked(&mut store);

    store.set(a, "x", "1").unwrap();
    store.set(a, "x", "2").unwrap();

    assert!(!store.contains(b, &"1").unwrap());
    assert_eq!(store.get(b, &"2").unwrap(), Some(&"x"));
    assert_inverse(&store, a, b);
}

#[test]
fn set_reassigning_a_value_evicts_its_old_key() {
    let mut store = MapStore::new();
    let (a, b) = linked(&mut store);
    store.set(a, "x", "1").unwrap();

    store.set(a, "z", "1").unwrap();

    assert!(!store.contains(a, &"x").unwrap());
    assert_eq!(store.get(b, &"1").unwrap(), Some(&"z"));
    assert_eq!(store.len(a).unwrap(), 1);
    assert_inverse(&store, a, b);
}

#[test]
fn set_returns_the_previous_value() {
    let mut store = MapStore::new();
    let (a, _b) = linked(&mut store);

    assert_eq!(store.set(a, "k", "v1").unwrap(), None);
    assert_eq!(store.set(a, "k", "v2").unwrap(), Some("v1"));
}

// =============================================================================
// delete / pop / pop_arbitrary
// =============================================================================

#[test]
fn delete_removes_both_directions() {
    let mut store = MapStore::new();
    let a = store.create_from([("k", "v")]);
    let b = store.create_from([("v", "k")]);
    store.link(a, b).unwrap();

    store.delete(a, &"k").unwrap();

    assert!(store.is_empty(a).unwrap());
    assert!(store.is_empty(b).unwrap());
}

#[test]
fn delete_missing_key_fails_cleanly() {
    let mut store = MapStore::new();
    let (a, b) = linked(&mut store);
    store.set(a, "k", "v").unwrap();

    let err = store.delete(a, &"absent").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::KeyMissing { .. }));
    assert_eq!(store.len(a).unwrap(), 1);
    assert_eq!(store.len(b).unwrap(), 1);
}

#[test]
fn pop_returns_value_and_mirrors_removal() {
    let mut store = MapStore::new();
    let (a, b) = linked(&mut store);
    store.set(a, "k", "v").unwrap();

    let value = store.pop(a, &"k").unwrap();

    assert_eq!(value, "v");
    assert!(store.is_empty(a).unwrap());
    assert!(store.is_empty(b).unwrap());
}

#[test]
fn pop_arbitrary_is_lifo_and_mirrored() {
    let mut store = MapStore::new();
    let (a, b) = linked(&mut store);
    store.set(a, "early", "1").unwrap();
    store.set(a, "late", "2").unwrap();

    let (key, value) = store.pop_arbitrary(a).unwrap();

    assert_eq!((key, value), ("late", "2"));
    assert!(!store.contains(b, &"2").unwrap());
    assert_inverse(&store, a, b);
}

#[test]
fn pop_arbitrary_on_empty_map_fails() {
    let mut store = MapStore::new();
    let (a, _b) = linked(&mut store);

    let err = store.pop_arbitrary(a).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::EmptyMap(_)));
}

// =============================================================================
// set_default
// =============================================================================

#[test]
fn set_default_is_a_no_op_on_present_keys() {
    let mut store = MapStore::new();
    let (a, b) = linked(&mut store);

    assert_eq!(store.set_default(a, "five", "5").unwrap(), "5");
    assert_eq!(store.get(a, &"five").unwrap(), Some(&"5"));

    // A second call with a different fallback changes nothing.
    assert_eq!(store.set_default(a, "five", "0").unwrap(), "5");
    assert_eq!(store.get(a, &"five").unwrap(), Some(&"5"));
    assert_eq!(store.get(b, &"5").unwrap(), Some(&"five"));
    assert!(!store.contains(b, &"0").unwrap());
    assert_inverse(&store, a, b);
}

// =============================================================================
// clear / update
// =============================================================================

#[test]
fn clear_mirrors_to_the_partner() {
    let mut store = MapStore::new();
    let (a, b) = linked(&mut store);
    store.set(a, "k1", "v1").unwrap();
    store.set(b, "x", "y").unwrap();

    store.clear(b).unwrap();

    assert!(store.is_empty(a).unwrap());
    assert!(store.is_empty(b).unwrap());
}

#[test]
fn update_applies_pairs_in_order_with_mirroring() {
    let mut store = MapStore::new();
    let (a, b) = linked(&mut store);
    store.set(a, "one", "1").unwrap();

    let batch = UpdateBatch::new().with_source([("three", "3"), ("four", "4")]);
    store.update(a, batch).unwrap();

    let keys: Vec<_> = store.keys(a).unwrap().copied().collect();
    assert_eq!(keys, vec!["one", "three", "four"]);
    assert_inverse(&store, a, b);
}

#[test]
fn update_source_applies_before_trailing_pairs() {
    let mut store = MapStore::new();
    let (a, _b) = linked(&mut store);

    // The trailing pair overwrites the bulk-source entry for the same key.
    let batch = UpdateBatch::new()
        .with_source([("k", "from-source")])
        .with_pair("k", "from-pair");
    store.update(a, batch).unwrap();

    assert_eq!(store.get(a, &"k").unwrap(), Some(&"from-pair"));
}

#[test]
fn update_with_two_sources_is_rejected_before_mutation() {
    let mut store = MapStore::new();
    let (a, b) = linked(&mut store);
    store.set(a, "k", "v").unwrap();

    let batch = UpdateBatch::new()
        .with_source([("x", "1")])
        .with_source([("y", "2")]);
    let err = store.update(a, batch).unwrap_err();

    assert!(matches!(err.kind, ErrorKind::TooManyArguments { actual: 2 }));
    assert_eq!(store.len(a).unwrap(), 1);
    assert_eq!(store.len(b).unwrap(), 1);
}

// =============================================================================
// Partner requirement
// =============================================================================

#[test]
fn every_mutator_requires_a_partner() {
    let mut store = MapStore::new();
    let a = store.create_from([("k", "v")]);

    assert!(matches!(
        store.set(a, "x", "y").unwrap_err().kind,
        ErrorKind::NoPartner(_)
    ));
    assert!(matches!(
        store.delete(a, &"k").unwrap_err().kind,
        ErrorKind::NoPartner(_)
    ));
    assert!(matches!(
        store.pop(a, &"k").unwrap_err().kind,
        ErrorKind::NoPartner(_)
    ));
    assert!(matches!(
        store.pop_arbitrary(a).unwrap_err().kind,
        ErrorKind::NoPartner(_)
    ));
    assert!(matches!(
        store.set_default(a, "x", "y").unwrap_err().kind,
        ErrorKind::NoPartner(_)
    ));
    assert!(matches!(
        store.clear(a).unwrap_err().kind,
        ErrorKind::NoPartner(_)
    ));
    assert!(matches!(
        store.update(a, UpdateBatch::new()).unwrap_err().kind,
        ErrorKind::NoPartner(_)
    ));
}

#[test]
fn mutation_resumes_after_relink() {
    let mut store = MapStore::new();
    let (a, _b) = linked(&mut store);
    store.set(a, "k", "v").unwrap();
    store.unlink(a).unwrap();

    assert!(matches!(
        store.set(a, "x", "y").unwrap_err().kind,
        ErrorKind::NoPartner(_)
    ));

    let c = store.create();
    store.link(a, c).unwrap();
    store.set(a, "x", "y").unwrap();

    assert_eq!(store.get(c, &"y").unwrap(), Some(&"x"));
}
