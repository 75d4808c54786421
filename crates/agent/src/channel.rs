// SPDX-License-Identifier: MIT

//! The agent side of the Event Channel: dials the center, answers its RPC
//! requests, applies its push events, drains the scheduler's outbound
//! report queue, and reconnects with bounded backoff on any failure.

use crate::backoff::Backoff;
use crate::error::{ChannelError, SchedulerError};
use crate::scheduler::AgentScheduler;
use async_trait::async_trait;
use cronmesh_core::{Clock, Event, Plan, SchedulerKey};
use cronmesh_wire::{AgentReport, Envelope, HashReport, Hello, Message, RpcRequest, RpcResponse, ScheduleStatus};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// How often a fresh `hash_report` is pushed even without a reconnect.
pub const DEFAULT_HASH_RECONCILE_INTERVAL: Duration = Duration::from_secs(60);

/// One open Event Channel connection: send an [`Envelope`], receive the
/// next one. The real implementation ([`crate::ws_transport::WsDialer`])
/// wraps `tokio-tungstenite`; tests supply an in-memory fake.
#[async_trait]
pub trait ChannelConnection: Send {
    async fn send(&mut self, envelope: Envelope) -> Result<(), ChannelError>;
    /// `Ok(None)` signals a clean close.
    async fn recv(&mut self) -> Result<Option<Envelope>, ChannelError>;
}

/// Dials a fresh [`ChannelConnection`] to `endpoint`.
#[async_trait]
pub trait ChannelDialer: Send + Sync {
    async fn dial(&self, endpoint: &str) -> Result<Box<dyn ChannelConnection>, ChannelError>;
}

/// Identity this agent announces on every connect: metadata (ip,
/// version, declared project ids).
#[derive(Clone)]
pub struct AgentIdentity {
    pub agent_ip: String,
    pub agent_version: String,
    pub project_ids: Vec<i64>,
    pub organization: String,
    pub region: String,
    pub weight: u32,
}

pub struct AgentChannel<C: Clock, D: ChannelDialer> {
    endpoint: String,
    dialer: D,
    scheduler: Arc<AgentScheduler<C>>,
    identity: AgentIdentity,
    report_rx: mpsc::Receiver<AgentReport>,
    hash_reconcile_interval: Duration,
}

impl<C: Clock, D: ChannelDialer> AgentChannel<C, D> {
    pub fn new(
        endpoint: String,
        dialer: D,
        scheduler: Arc<AgentScheduler<C>>,
        identity: AgentIdentity,
        report_rx: mpsc::Receiver<AgentReport>,
        hash_reconcile_interval: Duration,
    ) -> Self {
        Self { endpoint, dialer, scheduler, identity, report_rx, hash_reconcile_interval }
    }

    /// Runs the reconnect loop until `shutdown` fires.
    pub async fn run(mut self, shutdown: CancellationToken) {
        let mut backoff = Backoff::new();
        loop {
            if shutdown.is_cancelled() {
                return;
            }
            match self.dialer.dial(&self.endpoint).await {
                Ok(conn) => {
                    backoff.reset();
                    info!(endpoint = %self.endpoint, "event channel connected");
                    if !self.drive(conn, &shutdown).await {
                        return;
                    }
                }
                Err(err) => {
                    warn!(endpoint = %self.endpoint, error = %err, "event channel dial failed");
                }
            }
            let delay = backoff.next_delay();
            tokio::select! {
                _ = shutdown.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    /// Drives one connection generation to completion. Returns `false`
    /// once the caller should stop entirely (shutdown, or the report
    /// queue producer has gone away), `true` to reconnect.
    async fn drive(&mut self, mut conn: Box<dyn ChannelConnection>, shutdown: &CancellationToken) -> bool {
        if let Err(err) = self.announce(conn.as_mut()).await {
            warn!(error = %err, "failed to announce identity, reconnecting");
            return true;
        }

        let mut hash_tick = tokio::time::interval(self.hash_reconcile_interval);
        hash_tick.tick().await; // first tick fires immediately; identity announce already covered it

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => return false,
                _ = hash_tick.tick() => {
                    if let Err(err) = self.publish_all_hashes(conn.as_mut()).await {
                        warn!(error = %err, "hash reconcile publish failed, reconnecting");
                        return true;
                    }
                }
                report = self.report_rx.recv() => {
                    let Some(report) = report else { return false };
                    if let Err(err) = conn.send(Envelope::new(Message::AgentReport(report))).await {
                        warn!(error = %err, "failed to publish report, reconnecting");
                        return true;
                    }
                }
                incoming = conn.recv() => {
                    match incoming {
                        Ok(Some(envelope)) => {
                            if let Err(err) = self.handle_inbound(conn.as_mut(), envelope).await {
                                warn!(error = %err, "failed handling inbound envelope, reconnecting");
                                return true;
                            }
                        }
                        Ok(None) => return true,
                        Err(err) => {
                            warn!(error = %err, "event channel read failed, reconnecting");
                            return true;
                        }
                    }
                }
            }
        }
    }

    async fn announce(&self, conn: &mut dyn ChannelConnection) -> Result<(), ChannelError> {
        conn.send(Envelope::new(Message::AgentReport(AgentReport::Hello(Hello {
            agent_ip: self.identity.agent_ip.clone(),
            agent_version: self.identity.agent_version.clone(),
            project_ids: self.identity.project_ids.clone(),
            organization: self.identity.organization.clone(),
            region: self.identity.region.clone(),
            weight: self.identity.weight,
        }))))
        .await?;
        self.publish_all_hashes(conn).await
    }

    async fn publish_all_hashes(&self, conn: &mut dyn ChannelConnection) -> Result<(), ChannelError> {
        for project_id in &self.identity.project_ids {
            let (hash, latest_update_unix_seconds) = self.scheduler.project_task_hash(*project_id);
            conn.send(Envelope::new(Message::AgentReport(AgentReport::HashReport(HashReport {
                project_id: *project_id,
                hash,
                latest_update_unix_seconds,
            }))))
            .await?;
        }
        Ok(())
    }

    async fn handle_inbound(&self, conn: &mut dyn ChannelConnection, envelope: Envelope) -> Result<(), ChannelError> {
        match envelope.body {
            Message::CenterEvent(event) => {
                self.apply_event(event);
                Ok(())
            }
            Message::Request(request) => {
                let response = self.handle_request(request);
                conn.send(Envelope { id: envelope.id, headers: Default::default(), body: Message::Response(response) })
                    .await
            }
            Message::AgentReport(_) | Message::Response(_) => {
                warn!("ignoring agent-direction message received from the center");
                Ok(())
            }
        }
    }

    /// Applies a push-delivered [`Event`].
    fn apply_event(&self, event: Event) {
        match event {
            Event::TaskSaved { task, .. } => self.scheduler.upsert_task(task),
            Event::TaskDeleted { project_id, task_id, .. } => self.scheduler.remove_task(project_id, &task_id),
            Event::TaskSetRefresh { project_id, tasks, .. } => self.scheduler.apply_task_set(project_id, tasks),
            Event::ReloadConfig { .. } => {
                info!("reload_config received; this release takes config only from process startup");
            }
            Event::TaskFinished { .. } => {
                warn!("ignoring task_finished event pushed to an agent; that direction is agent -> center only");
            }
            Event::TaskStop { .. } | Event::ScheduleTmp { .. } | Event::ScheduleWorkflow { .. } => {
                let status = self.handle_schedule_event(event);
                if !status.is_ok() {
                    warn!(%status, "push-delivered schedule event was not accepted");
                }
            }
        }
    }

    /// Answers one of the four RPCs the agent exposes.
    fn handle_request(&self, request: RpcRequest) -> RpcResponse {
        match request {
            RpcRequest::CheckRunning { project_id, task_id } => {
                let key = SchedulerKey::new(project_id, &task_id);
                let (_, running) = self.scheduler.check_task_executing(&key);
                RpcResponse::CheckRunning { running, message: String::new() }
            }
            RpcRequest::KillTask { project_id, task_id } => {
                let key = SchedulerKey::new(project_id, &task_id);
                // Always ok, even if the task was not running.
                self.scheduler.cancel_task(&key);
                RpcResponse::KillTask { status: ScheduleStatus::Ok }
            }
            RpcRequest::ProjectTaskHash { project_id } => {
                let (hash, latest_update_unix_seconds) = self.scheduler.project_task_hash(project_id);
                RpcResponse::ProjectTaskHash { hash, latest_update_unix_seconds }
            }
            RpcRequest::Schedule { event } => RpcResponse::Schedule { status: self.handle_schedule_event(event) },
        }
    }

    fn handle_schedule_event(&self, event: Event) -> ScheduleStatus {
        match event {
            Event::ScheduleTmp { task, tmp_id, .. } => {
                map_start_result(self.scheduler.try_start_task(Plan::active(task), Some(tmp_id)))
            }
            Event::ScheduleWorkflow { task, run_id, tmp_id, .. } => {
                map_start_result(self.scheduler.try_start_task(Plan::workflow_step(task, run_id, tmp_id), None))
            }
            Event::TaskStop { project_id, task_id, .. } => {
                self.scheduler.cancel_task(&SchedulerKey::new(project_id, &task_id));
                ScheduleStatus::Ok
            }
            _ => ScheduleStatus::InvalidArgument,
        }
    }
}

fn map_start_result(result: Result<(), SchedulerError>) -> ScheduleStatus {
    match result {
        Ok(()) => ScheduleStatus::Ok,
        Err(SchedulerError::AlreadyExists) => ScheduleStatus::AlreadyExists,
        Err(SchedulerError::Invalid(_)) => ScheduleStatus::InvalidArgument,
    }
}

#[cfg(test)]
#[path = "channel_tests.rs"]
mod tests;
