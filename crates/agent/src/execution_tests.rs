// SPDX-License-Identifier: MIT

use super::*;
use cronmesh_core::test_support::TaskBuilder;
use cronmesh_core::Plan;

fn record() -> ExecutionRecord {
    ExecutionRecord::new(Plan::active(TaskBuilder::new(1, "t1").build()), None, Instant::now())
}

#[test]
fn second_insert_for_same_key_fails() {
    let table = ExecutionTable::new();
    let key = SchedulerKey::new(1, "t1");
    assert!(table.insert_if_absent(key.clone(), record()).is_ok());
    assert!(table.insert_if_absent(key, record()).is_err());
}

#[test]
fn remove_makes_the_record_unobservable() {
    let table = ExecutionTable::new();
    let key = SchedulerKey::new(1, "t1");
    table.insert_if_absent(key.clone(), record()).unwrap_or_else(|_| panic!("insert"));
    assert!(table.contains(&key));
    assert!(table.remove(&key).is_some());
    assert!(!table.contains(&key));
    assert!(table.remove(&key).is_none());
}

#[test]
fn cancel_is_idempotent_and_reports_existence() {
    let table = ExecutionTable::new();
    let key = SchedulerKey::new(1, "t1");
    assert!(!table.cancel(&key));
    table.insert_if_absent(key.clone(), record()).unwrap_or_else(|_| panic!("insert"));
    assert!(table.cancel(&key));
    assert!(table.cancel(&key));
}

#[test]
fn snapshot_is_none_once_removed() {
    let table = ExecutionTable::new();
    let key = SchedulerKey::new(1, "t1");
    table.insert_if_absent(key.clone(), record()).unwrap_or_else(|_| panic!("insert"));
    assert!(table.snapshot(&key, Instant::now()).is_some());
    table.remove(&key);
    assert!(table.snapshot(&key, Instant::now()).is_none());
}
