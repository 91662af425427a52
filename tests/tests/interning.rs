//! Relationship type name interning.

use std::sync::Arc;
use std::thread;

use mew_ha_tests::prelude::*;
use pretty_assertions::assert_eq;

#[test]
fn test_same_name_yields_same_id() {
    let fixture = Fixture::new();

    let first = fixture.master.intern_relationship_type(key(1, 1), "KNOWS").unwrap();
    let second = fixture.master.intern_relationship_type(key(2, 1), "KNOWS").unwrap();

    assert_eq!(first, second);
    assert_eq!(fixture.types.len(), 1);
}

#[test]
fn test_known_name_is_a_plain_lookup() {
    // GIVEN
    let fixture = Fixture::new();
    fixture.master.intern_relationship_type(key(1, 1), "KNOWS").unwrap();
    fixture.probe.clear();

    // WHEN
    fixture.master.intern_relationship_type(key(2, 1), "KNOWS").unwrap();

    // THEN
    assert!(fixture.probe.type_creations().is_empty());
    assert!(fixture.probe.tx_events().is_empty());
    assert_eq!(fixture.master.context_for(key(2, 1)), None);
}

#[test]
fn test_new_type_is_created_under_the_key_context() {
    // GIVEN
    let fixture = Fixture::new();
    let k = key(3, 7);
    fixture.master.acquire_locks(k, LockKind::Read, &[node(1)]).unwrap();
    let context = fixture.master.context_for(k).unwrap();

    // WHEN
    let id = fixture.master.intern_relationship_type(k, "LIKES").unwrap();

    // THEN
    assert_eq!(
        fixture.probe.type_creations(),
        vec![("LIKES".to_string(), Some(context))]
    );
    assert_eq!(fixture.types.created_by(id), Some(context));
    assert_eq!(fixture.types.name_of(id), Some("LIKES".to_string()));
    assert_eq!(fixture.master.bound_context(), None);
}

#[test]
fn test_first_creation_begins_the_key_context() {
    let fixture = Fixture::new();
    let k = key(1, 1);

    fixture.master.intern_relationship_type(k, "OWNS").unwrap();

    let begins = fixture.probe.begins();
    assert_eq!(begins.len(), 1);
    assert_eq!(fixture.master.context_for(k), Some(begins[0]));
}

#[test]
fn test_distinct_names_get_distinct_ids() {
    let fixture = Fixture::new();
    let k = key(1, 1);

    let knows = fixture.master.intern_relationship_type(k, "KNOWS").unwrap();
    let likes = fixture.master.intern_relationship_type(k, "LIKES").unwrap();

    assert_ne!(knows, likes);
    assert_eq!(fixture.types.len(), 2);
}

#[test]
fn test_type_survives_rollback_of_its_creator() {
    // GIVEN
    let fixture = Fixture::new();
    let k = key(1, 1);
    let id = fixture.master.intern_relationship_type(k, "KNOWS").unwrap();

    // WHEN
    fixture.master.rollback(k).unwrap();

    // THEN
    assert_eq!(
        fixture.master.intern_relationship_type(key(2, 2), "KNOWS").unwrap(),
        id
    );
}

#[test]
fn test_boundary_create_relationship_type() {
    let fixture = Fixture::new();
    let slave = SlaveContext::new(6);

    let response = fixture
        .master
        .create_relationship_type(slave, 2, "FOLLOWS")
        .unwrap();

    assert!(response.stream().is_empty());
    assert_eq!(fixture.types.name_of(*response.value()), Some("FOLLOWS".to_string()));
    assert!(fixture.master.context_for(key(6, 2)).is_some());
}

#[test]
fn test_concurrent_interning_agrees_on_one_id() {
    // GIVEN
    let fixture = Arc::new(Fixture::new());

    // WHEN
    let handles: Vec<_> = (0..8u32)
        .map(|owner| {
            let fixture = Arc::clone(&fixture);
            thread::spawn(move || {
                fixture
                    .master
                    .intern_relationship_type(key(owner, 1), "KNOWS")
                    .unwrap()
            })
        })
        .collect();
    let ids: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    // THEN
    assert!(ids.iter().all(|&id| id == ids[0]));
    assert_eq!(fixture.types.len(), 1);
    assert_eq!(fixture.master.bound_context(), None);
}
