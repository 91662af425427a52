//! Many replicas calling the master at once.

use std::sync::Arc;
use std::thread;

use mew_ha_tests::prelude::*;
use pretty_assertions::assert_eq;

const REPLICAS: u32 = 6;
const TRANSACTIONS: u32 = 4;

#[test]
fn test_parallel_replicas_each_get_one_context_per_transaction() {
    // GIVEN
    let fixture = Arc::new(Fixture::new());

    // WHEN
    let handles: Vec<_> = (1..=REPLICAS)
        .map(|owner| {
            let fixture = Arc::clone(&fixture);
            thread::spawn(move || {
                let slave = SlaveContext::new(owner);
                for round in 0..10u64 {
                    for local in 1..=TRANSACTIONS {
                        // Entities private to this transaction never conflict.
                        let base = u64::from(owner) * 1_000 + u64::from(local) * 100;
                        let outcome = fixture
                            .master
                            .acquire_write_lock(slave, local, &[node(base + round)])
                            .unwrap()
                            .into_value();
                        assert_eq!(outcome, LockOutcome::Granted);
                        fixture
                            .master
                            .acquire_read_lock(slave, local, &[node(0)])
                            .unwrap();
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // THEN
    let expected = (REPLICAS * TRANSACTIONS) as usize;
    assert_eq!(fixture.master.bound_context(), None);
    assert_eq!(fixture.master.open_transactions().len(), expected);
    assert_eq!(fixture.probe.begins().len(), expected);
    for owner in 1..=REPLICAS {
        for local in 1..=TRANSACTIONS {
            let context = fixture.master.context_for(key(owner, local)).unwrap();
            assert_eq!(fixture.locks.attached(context).len(), 20);
        }
    }
}

#[test]
fn test_parallel_rollbacks_release_everything() {
    // GIVEN
    let fixture = Arc::new(Fixture::new());
    for owner in 1..=REPLICAS {
        fixture
            .master
            .acquire_locks(key(owner, 1), LockKind::Write, &[node(u64::from(owner))])
            .unwrap();
    }

    // WHEN
    let handles: Vec<_> = (1..=REPLICAS)
        .map(|owner| {
            let fixture = Arc::clone(&fixture);
            thread::spawn(move || fixture.master.rollback(key(owner, 1)).unwrap())
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // THEN
    assert!(fixture.master.open_transactions().is_empty());
    assert_eq!(fixture.master.bound_context(), None);
    for owner in 1..=REPLICAS {
        assert!(!fixture.locks.is_locked(node(u64::from(owner))));
    }
}

#[test]
fn test_contended_entity_is_granted_to_one_transaction() {
    // GIVEN
    let fixture = Arc::new(Fixture::new());

    // WHEN
    let handles: Vec<_> = (1..=REPLICAS)
        .map(|owner| {
            let fixture = Arc::clone(&fixture);
            thread::spawn(move || {
                fixture
                    .master
                    .acquire_locks(key(owner, 1), LockKind::Write, &[rel(42)])
                    .unwrap()
            })
        })
        .collect();
    let outcomes: Vec<LockOutcome> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    // THEN
    let granted = outcomes.iter().filter(|o| o.is_granted()).count();
    let refused = outcomes
        .iter()
        .filter(|o| o.status() == LockStatus::DeadLocked)
        .count();
    assert_eq!(granted, 1);
    assert_eq!(refused, REPLICAS as usize - 1);
    assert_eq!(fixture.master.bound_context(), None);
}
