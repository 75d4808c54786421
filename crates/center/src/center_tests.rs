use super::*;
use crate::agent_handle::AgentHandle;
use crate::task_store::InMemoryTaskStore;
use cronmesh_core::test_support::TaskBuilder;
use cronmesh_core::{CenterConfig, Event, RunId, Workflow, WorkflowId, WorkflowNode};
use cronmesh_registry::InMemoryRegistry;
use cronmesh_wire::{Envelope, Message};
use std::collections::BTreeSet;
use std::time::Duration;
use tokio::sync::mpsc;

fn config() -> CenterConfig {
    CenterConfig {
        listen_address: "127.0.0.1:0".into(),
        organization: "acme".into(),
        dispatch_timeout_secs: 5,
        hash_reconcile_interval_secs: 60,
        lease_ttl_secs: 180,
        log_level: String::new(),
    }
}

fn center() -> Arc<Center> {
    Arc::new(Center::new(config(), Arc::new(InMemoryRegistry::new()), Arc::new(InMemoryTaskStore::new())))
}

fn fake_handle(endpoint: &str, project_id: i64) -> (Arc<AgentHandle>, mpsc::UnboundedReceiver<Envelope>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = Arc::new(AgentHandle::new(
        endpoint.to_string(),
        vec![project_id],
        "acme".into(),
        "us-east".into(),
        1,
        cronmesh_registry::LeaseHandle::new(Duration::from_secs(30)),
        tx,
    ));
    (handle, rx)
}

#[test]
fn save_task_pushes_only_to_agents_declaring_that_project() {
    let center = center();
    let (project_1, mut project_1_rx) = fake_handle("agent-1", 1);
    let (project_2, mut project_2_rx) = fake_handle("agent-2", 2);
    center.connections().insert(project_1);
    center.connections().insert(project_2);

    center.save_task(TaskBuilder::new(1, "a").build());

    let envelope = project_1_rx.try_recv().expect("project-1 agent gets the push");
    assert!(matches!(envelope.body, Message::CenterEvent(Event::TaskSaved { .. })));
    assert!(project_2_rx.try_recv().is_err(), "project-2 agent must not see a project-1 task_saved");
}

#[test]
fn delete_task_pushes_task_deleted() {
    let center = center();
    let (handle, mut rx) = fake_handle("agent-1", 1);
    center.connections().insert(handle);

    center.delete_task(1, "a");

    let envelope = rx.try_recv().expect("push sent");
    match envelope.body {
        Message::CenterEvent(Event::TaskDeleted { project_id, task_id, .. }) => {
            assert_eq!(project_id, 1);
            assert_eq!(task_id, "a");
        }
        other => panic!("expected task_deleted, got {other:?}"),
    }
}

#[test]
fn kill_task_broadcasts_task_stop_to_every_agent_serving_the_project() {
    let center = center();
    let (handle_a, mut rx_a) = fake_handle("agent-a", 1);
    let (handle_b, mut rx_b) = fake_handle("agent-b", 1);
    center.connections().insert(handle_a);
    center.connections().insert(handle_b);

    center.kill_task(1, "a");

    assert!(matches!(rx_a.try_recv().expect("a gets stop").body, Message::CenterEvent(Event::TaskStop { .. })));
    assert!(matches!(rx_b.try_recv().expect("b gets stop").body, Message::CenterEvent(Event::TaskStop { .. })));
}

fn simple_workflow() -> Workflow {
    Workflow {
        id: WorkflowId::new(),
        name: "deploy".into(),
        nodes: vec![WorkflowNode { id: "build".into(), project_id: 1, task_id: "build".into(), depends_on: BTreeSet::new() }],
    }
}

#[test]
fn start_workflow_admits_a_valid_dag_even_with_no_agents_connected() {
    let center = center();
    let run_id = center.start_workflow(simple_workflow(), String::new()).expect("admits");
    assert!(center.workflow().run_state(&run_id).is_some());
}

#[test]
fn kill_workflow_fails_for_an_unknown_run() {
    let center = center();
    let result = center.kill_workflow(&RunId::new());
    assert!(result.is_err());
}

#[tokio::test]
async fn reconcile_hash_pushes_a_refresh_on_mismatch_and_nothing_on_match() {
    let center = center();
    center.task_store().save_task(TaskBuilder::new(1, "a").build());
    let expected_hash = center.task_store().hash_for_project(1);
    let (handle, mut rx) = fake_handle("agent-1", 1);

    center.reconcile_hash(&handle, 1, "stale").await;
    let envelope = rx.try_recv().expect("mismatch pushes a refresh");
    assert!(matches!(envelope.body, Message::CenterEvent(Event::TaskSetRefresh { .. })));

    center.reconcile_hash(&handle, 1, &expected_hash).await;
    assert!(rx.try_recv().is_err(), "matching hash must not push anything");
}
