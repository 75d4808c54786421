use super::*;
use crate::center::Center;
use crate::task_store::InMemoryTaskStore;
use cronmesh_core::test_support::TaskBuilder;
use cronmesh_core::{CenterConfig, Event};
use cronmesh_registry::InMemoryRegistry;
use cronmesh_wire::{HashReport, TaskFinishedReport};
use std::time::Duration;

struct FakeConnection {
    outbound: mpsc::UnboundedSender<Envelope>,
    inbound: mpsc::UnboundedReceiver<Envelope>,
}

#[async_trait::async_trait]
impl CenterConnection for FakeConnection {
    async fn send(&mut self, envelope: Envelope) -> Result<(), crate::error::ConnectionError> {
        self.outbound.send(envelope).map_err(|_| crate::error::ConnectionError::Closed)
    }

    async fn recv(&mut self) -> Result<Option<Envelope>, crate::error::ConnectionError> {
        Ok(self.inbound.recv().await)
    }
}

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

struct Harness {
    to_center: mpsc::UnboundedSender<Envelope>,
    from_center: mpsc::UnboundedReceiver<Envelope>,
    center: Arc<Center>,
}

fn setup() -> Harness {
    let (to_center_tx, to_center_rx) = mpsc::unbounded_channel();
    let (from_center_tx, from_center_rx) = mpsc::unbounded_channel();
    let conn: Box<dyn CenterConnection> = Box::new(FakeConnection { outbound: from_center_tx, inbound: to_center_rx });

    let registry = Arc::new(InMemoryRegistry::new());
    let task_store = Arc::new(InMemoryTaskStore::new());
    let center = Arc::new(Center::new(config(), registry, task_store));

    tokio::spawn(super::run(conn, center.clone()));

    Harness { to_center: to_center_tx, from_center: from_center_rx, center }
}

async fn next_outbound(harness: &mut Harness) -> Envelope {
    tokio::time::timeout(Duration::from_secs(5), harness.from_center.recv())
        .await
        .unwrap_or_else(|_| panic!("timed out waiting for outbound message"))
        .unwrap_or_else(|| panic!("channel closed"))
}

fn hello(project_ids: Vec<i64>) -> Envelope {
    Envelope::new(Message::AgentReport(AgentReport::Hello(cronmesh_wire::Hello {
        agent_ip: "agent-1".into(),
        agent_version: "test".into(),
        project_ids,
        organization: "acme".into(),
        region: "us-east".into(),
        weight: 1,
    })))
}

#[tokio::test]
async fn hello_registers_the_agent_and_opens_a_connection_table_entry() {
    let mut harness = setup();
    harness.to_center.send(hello(vec![1])).expect("send hello");

    // Give the session task a moment to process the hello and register.
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(harness.center.connections().get("agent-1").is_some());

    let filter = cronmesh_registry::LookupFilter::new("acme".to_string(), String::new(), 1);
    let found = harness.center.registry().lookup(&filter).await;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].endpoint, "agent-1");
}

#[tokio::test]
async fn hash_mismatch_triggers_a_task_set_refresh_push() {
    let mut harness = setup();
    harness.center.save_task(TaskBuilder::new(1, "a").build());

    harness.to_center.send(hello(vec![1])).expect("send hello");
    tokio::time::sleep(Duration::from_millis(20)).await;

    harness
        .to_center
        .send(Envelope::new(Message::AgentReport(AgentReport::HashReport(HashReport {
            project_id: 1,
            hash: "stale-hash".into(),
            latest_update_unix_seconds: 0,
        }))))
        .expect("send hash report");

    let refresh = next_outbound(&mut harness).await;
    match refresh.body {
        Message::CenterEvent(Event::TaskSetRefresh { project_id, tasks, .. }) => {
            assert_eq!(project_id, 1);
            assert_eq!(tasks.len(), 1);
        }
        other => panic!("expected a task_set_refresh push, got {other:?}"),
    }
}

#[tokio::test]
async fn matching_hash_report_produces_no_push() {
    let mut harness = setup();
    harness.to_center.send(hello(vec![1])).expect("send hello");
    tokio::time::sleep(Duration::from_millis(20)).await;

    harness.center.save_task(TaskBuilder::new(1, "a").build());
    let saved_push = next_outbound(&mut harness).await; // task_saved, now that agent-1 is connected
    assert!(matches!(saved_push.body, Message::CenterEvent(Event::TaskSaved { .. })));
    let expected_hash = harness.center.task_store().hash_for_project(1);

    harness
        .to_center
        .send(Envelope::new(Message::AgentReport(AgentReport::HashReport(HashReport {
            project_id: 1,
            hash: expected_hash,
            latest_update_unix_seconds: 0,
        }))))
        .expect("send hash report");

    let result = tokio::time::timeout(Duration::from_millis(100), harness.from_center.recv()).await;
    assert!(result.is_err(), "no refresh should be pushed when the hash already matches");
}

#[tokio::test]
async fn task_finished_without_a_tmp_id_is_just_logged() {
    let mut harness = setup();
    harness.to_center.send(hello(vec![1])).expect("send hello");
    tokio::time::sleep(Duration::from_millis(20)).await;

    harness
        .to_center
        .send(Envelope::new(Message::AgentReport(AgentReport::TaskFinished(TaskFinishedReport {
            project_id: 1,
            task_id: "a".into(),
            tmp_id: None,
            exit_status: cronmesh_core::ExitStatus::Exited(0),
            duration_ms: 10,
            output_tail: String::new(),
        }))))
        .expect("send task finished");

    // No crash, no push: a periodic fire's completion has nothing to correlate.
    let result = tokio::time::timeout(Duration::from_millis(50), harness.from_center.recv()).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn connection_close_removes_the_agent_and_deregisters_its_lease() {
    let mut harness = setup();
    harness.to_center.send(hello(vec![1])).expect("send hello");
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(harness.center.connections().get("agent-1").is_some());

    drop(harness.to_center);
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert!(harness.center.connections().get("agent-1").is_none());
    let filter = cronmesh_registry::LookupFilter::new("acme".to_string(), String::new(), 1);
    assert!(harness.center.registry().lookup(&filter).await.is_empty());
}
