// SPDX-License-Identifier: MIT

use super::*;
use crate::task::SchedulerKey;

#[cfg(feature = "test-support")]
use proptest::prelude::*;

#[test]
fn hash_is_independent_of_input_order() {
    let a = vec![(SchedulerKey::new(1, "x"), 10u64), (SchedulerKey::new(1, "y"), 20u64)];
    let b = vec![(SchedulerKey::new(1, "y"), 20u64), (SchedulerKey::new(1, "x"), 10u64)];
    assert_eq!(project_task_hash(a), project_task_hash(b));
}

#[test]
fn hash_changes_when_a_fingerprint_changes() {
    let a = vec![(SchedulerKey::new(1, "x"), 10u64)];
    let b = vec![(SchedulerKey::new(1, "x"), 11u64)];
    assert_ne!(project_task_hash(a), project_task_hash(b));
}

#[test]
fn empty_set_hashes_deterministically() {
    assert_eq!(project_task_hash(vec![]), project_task_hash(vec![]));
}

#[cfg(feature = "test-support")]
proptest! {
    #[test]
    fn hash_is_a_pure_function_of_the_set(
        mut pairs in proptest::collection::vec((1i64..5, "[a-z]{1,4}", any::<u64>()), 0..8)
    ) {
        pairs.dedup_by(|a, b| a.0 == b.0 && a.1 == b.1);
        let entries: Vec<(SchedulerKey, u64)> =
            pairs.iter().map(|(p, t, f)| (SchedulerKey::new(*p, t), *f)).collect();
        let mut shuffled = entries.clone();
        shuffled.reverse();
        prop_assert_eq!(project_task_hash(entries), project_task_hash(shuffled));
    }
}
