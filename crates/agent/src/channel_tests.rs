// SPDX-License-Identifier: MIT

use super::*;
use crate::sink::TracingLogSink;
use cronmesh_core::test_support::TaskBuilder;
use cronmesh_core::{FakeClock, RunId, TmpId};
use cronmesh_wire::RpcRequest;
use parking_lot::Mutex;
use std::time::Duration;

struct FakeConnection {
    outbound: mpsc::UnboundedSender<Envelope>,
    inbound: mpsc::UnboundedReceiver<Envelope>,
}

#[async_trait]
impl ChannelConnection for FakeConnection {
    async fn send(&mut self, envelope: Envelope) -> Result<(), ChannelError> {
        self.outbound.send(envelope).map_err(|_| ChannelError::Closed)
    }

    async fn recv(&mut self) -> Result<Option<Envelope>, ChannelError> {
        Ok(self.inbound.recv().await)
    }
}

struct FakeDialer {
    conn: Mutex<Option<FakeConnection>>,
}

#[async_trait]
impl ChannelDialer for FakeDialer {
    async fn dial(&self, _endpoint: &str) -> Result<Box<dyn ChannelConnection>, ChannelError> {
        self.conn
            .lock()
            .take()
            .map(|c| Box::new(c) as Box<dyn ChannelConnection>)
            .ok_or_else(|| ChannelError::Transport("exhausted".into()))
    }
}

struct Harness {
    to_agent: mpsc::UnboundedSender<Envelope>,
    from_agent: mpsc::UnboundedReceiver<Envelope>,
    scheduler: Arc<AgentScheduler<FakeClock>>,
    shutdown: CancellationToken,
}

fn setup(project_ids: Vec<i64>) -> Harness {
    let (to_agent_tx, to_agent_rx) = mpsc::unbounded_channel();
    let (from_agent_tx, from_agent_rx) = mpsc::unbounded_channel();
    let dialer = FakeDialer { conn: Mutex::new(Some(FakeConnection { outbound: from_agent_tx, inbound: to_agent_rx })) };

    let (report_tx, report_rx) = mpsc::channel(64);
    let scheduler = Arc::new(AgentScheduler::with_clock(
        vec!["/bin/sh".to_string(), "-c".to_string()],
        Arc::new(TracingLogSink),
        report_tx,
        FakeClock::new(),
    ));

    let identity = AgentIdentity {
        agent_ip: "127.0.0.1".into(),
        agent_version: "test".into(),
        project_ids,
        organization: "test-org".into(),
        region: "test-region".into(),
        weight: 1,
    };
    let channel = AgentChannel::new(
        "ws://unused".into(),
        dialer,
        scheduler.clone(),
        identity,
        report_rx,
        Duration::from_secs(3600),
    );

    let shutdown = CancellationToken::new();
    tokio::spawn(channel.run(shutdown.clone()));

    Harness { to_agent: to_agent_tx, from_agent: from_agent_rx, scheduler, shutdown }
}

async fn next_outbound(harness: &mut Harness) -> Message {
    tokio::time::timeout(Duration::from_secs(5), harness.from_agent.recv())
        .await
        .unwrap_or_else(|_| panic!("timed out waiting for outbound message"))
        .unwrap_or_else(|| panic!("channel closed"))
        .body
}

#[tokio::test]
async fn connecting_announces_hello_then_a_hash_report_per_project() {
    let mut harness = setup(vec![1, 2]);

    match next_outbound(&mut harness).await {
        Message::AgentReport(AgentReport::Hello(hello)) => assert_eq!(hello.project_ids, vec![1, 2]),
        other => panic!("expected hello, got {other:?}"),
    }
    match next_outbound(&mut harness).await {
        Message::AgentReport(AgentReport::HashReport(r)) => assert_eq!(r.project_id, 1),
        other => panic!("expected hash report, got {other:?}"),
    }
    match next_outbound(&mut harness).await {
        Message::AgentReport(AgentReport::HashReport(r)) => assert_eq!(r.project_id, 2),
        other => panic!("expected hash report, got {other:?}"),
    }

    harness.shutdown.cancel();
}

#[tokio::test]
async fn task_saved_push_event_is_applied_to_the_scheduler() {
    let mut harness = setup(vec![1]);
    let _ = next_outbound(&mut harness).await; // hello
    let _ = next_outbound(&mut harness).await; // hash report

    let task = TaskBuilder::new(1, "new-task").build();
    harness
        .to_agent
        .send(Envelope::new(Message::CenterEvent(cronmesh_core::Event::TaskSaved {
            target: cronmesh_core::EventTarget::project(1),
            task: task.clone(),
        })))
        .unwrap_or_else(|_| panic!("send"));

    tokio::time::sleep(Duration::from_millis(50)).await;
    let (hash, _) = harness.scheduler.project_task_hash(1);
    let expected = cronmesh_core::project_task_hash(vec![(task.scheduler_key(), task.definition_fingerprint())]);
    assert_eq!(hash, expected);

    harness.shutdown.cancel();
}

#[tokio::test]
async fn check_running_request_reports_not_running_for_an_unknown_task() {
    let mut harness = setup(vec![1]);
    let _ = next_outbound(&mut harness).await;
    let _ = next_outbound(&mut harness).await;

    let request_id = uuid::Uuid::new_v4();
    harness
        .to_agent
        .send(Envelope {
            id: request_id,
            headers: Default::default(),
            body: Message::Request(RpcRequest::CheckRunning { project_id: 1, task_id: "ghost".into() }),
        })
        .unwrap_or_else(|_| panic!("send"));

    let response = next_outbound(&mut harness).await;
    match response {
        Message::Response(cronmesh_wire::RpcResponse::CheckRunning { running, .. }) => assert!(!running),
        other => panic!("expected check_running response, got {other:?}"),
    }

    harness.shutdown.cancel();
}

#[tokio::test]
async fn kill_task_request_is_always_ok_even_when_nothing_is_running() {
    let mut harness = setup(vec![1]);
    let _ = next_outbound(&mut harness).await;
    let _ = next_outbound(&mut harness).await;

    harness
        .to_agent
        .send(Envelope::new(Message::Request(RpcRequest::KillTask { project_id: 1, task_id: "ghost".into() })))
        .unwrap_or_else(|_| panic!("send"));

    match next_outbound(&mut harness).await {
        Message::Response(cronmesh_wire::RpcResponse::KillTask { status }) => assert!(status.is_ok()),
        other => panic!("expected kill_task response, got {other:?}"),
    }

    harness.shutdown.cancel();
}

#[tokio::test]
async fn schedule_workflow_request_starts_the_task_and_echoes_the_plans_tmp_id() {
    let mut harness = setup(vec![1]);
    let _ = next_outbound(&mut harness).await;
    let _ = next_outbound(&mut harness).await;

    let task = TaskBuilder::new(1, "node").command("true").build();
    harness
        .to_agent
        .send(Envelope::new(Message::Request(RpcRequest::Schedule {
            event: cronmesh_core::Event::ScheduleWorkflow {
                target: cronmesh_core::EventTarget::project(1),
                task,
                run_id: RunId::new(),
                tmp_id: TmpId::new(),
            },
        })))
        .unwrap_or_else(|_| panic!("send"));

    match next_outbound(&mut harness).await {
        Message::Response(cronmesh_wire::RpcResponse::Schedule { status }) => assert!(status.is_ok()),
        other => panic!("expected schedule response, got {other:?}"),
    }

    // The task_finished report follows asynchronously once the process exits.
    match next_outbound(&mut harness).await {
        Message::AgentReport(AgentReport::TaskFinished(report)) => {
            assert_eq!(report.exit_status, cronmesh_core::ExitStatus::Exited(0));
        }
        other => panic!("expected task_finished report, got {other:?}"),
    }

    harness.shutdown.cancel();
}

#[tokio::test]
async fn task_set_refresh_replaces_the_whole_assigned_set_for_one_project() {
    let mut harness = setup(vec![1]);
    let _ = next_outbound(&mut harness).await; // hello
    let _ = next_outbound(&mut harness).await; // hash report

    let stale = TaskBuilder::new(1, "stale").build();
    harness.scheduler.upsert_task(stale.clone());

    let fresh = TaskBuilder::new(1, "fresh").build();
    harness
        .to_agent
        .send(Envelope::new(Message::CenterEvent(cronmesh_core::Event::TaskSetRefresh {
            target: cronmesh_core::EventTarget::project(1),
            project_id: 1,
            tasks: vec![fresh.clone()],
        })))
        .unwrap_or_else(|_| panic!("send"));

    tokio::time::sleep(Duration::from_millis(50)).await;
    let (hash, _) = harness.scheduler.project_task_hash(1);
    let expected = cronmesh_core::project_task_hash(vec![(fresh.scheduler_key(), fresh.definition_fingerprint())]);
    assert_eq!(hash, expected, "stale task must be gone and fresh task present");

    harness.shutdown.cancel();
}
