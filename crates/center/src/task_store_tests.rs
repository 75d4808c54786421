use super::*;
use cronmesh_core::test_support::TaskBuilder;

#[test]
fn save_then_get_round_trips_the_task() {
    let store = InMemoryTaskStore::new();
    let task = TaskBuilder::new(1, "backup").command("run-backup").build();
    store.save_task(task.clone());
    assert_eq!(store.get(1, "backup"), Some(task));
}

#[test]
fn delete_removes_only_the_named_task() {
    let store = InMemoryTaskStore::new();
    store.save_task(TaskBuilder::new(1, "keep").build());
    store.save_task(TaskBuilder::new(1, "drop").build());
    let removed = store.delete_task(1, "drop");
    assert!(removed.is_some());
    assert_eq!(store.get(1, "drop"), None);
    assert!(store.get(1, "keep").is_some());
}

#[test]
fn tasks_for_project_is_scoped_per_project() {
    let store = InMemoryTaskStore::new();
    store.save_task(TaskBuilder::new(1, "a").build());
    store.save_task(TaskBuilder::new(2, "b").build());
    assert_eq!(store.tasks_for_project(1).len(), 1);
    assert_eq!(store.tasks_for_project(2).len(), 1);
    assert!(store.tasks_for_project(3).is_empty());
}

#[test]
fn hash_matches_the_core_project_task_hash_function() {
    let store = InMemoryTaskStore::new();
    let task = TaskBuilder::new(1, "a").build();
    store.save_task(task.clone());
    let expected = cronmesh_core::project_task_hash(vec![(task.scheduler_key(), task.definition_fingerprint())]);
    assert_eq!(store.hash_for_project(1), expected);
}

#[tokio::test]
async fn task_lookup_trait_delegates_to_get() {
    let store = InMemoryTaskStore::new();
    store.save_task(TaskBuilder::new(1, "a").build());
    let found = TaskLookup::task(&store, 1, "a").await;
    assert!(found.is_some());
    assert!(TaskLookup::task(&store, 1, "missing").await.is_none());
}
