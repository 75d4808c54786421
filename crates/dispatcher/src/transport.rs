// SPDX-License-Identifier: MIT

//! The agent-facing RPC surface the Dispatcher (and the Event Channel
//! server) calls through: `CheckRunning`, `Schedule`, `KillTask`,
//! `ProjectTaskHash`.
//!
//! One concrete implementation lives in `cronmesh-center` (a
//! WebSocket-backed client against a connected agent's Event Channel);
//! this trait is the seam `cronmesh-dispatcher` and the workflow engine
//! depend on instead.

use crate::error::TransportError;
use async_trait::async_trait;
use cronmesh_core::Event;
use cronmesh_wire::ScheduleStatus;

#[async_trait]
pub trait AgentTransport: Send + Sync {
    /// `CheckRunning(project_id, task_id) -> {running, message}`.
    async fn check_running(
        &self,
        project_id: i64,
        task_id: &str,
    ) -> Result<(bool, String), TransportError>;

    /// `Schedule(event) -> result`. `event.type` is one of `tmp_schedule`,
    /// `workflow_schedule`, `task_stop`; represented here by the
    /// [`Event`] variant itself.
    async fn schedule(&self, event: Event) -> Result<ScheduleStatus, TransportError>;

    /// `KillTask(project_id, task_id) -> result`. Always `ok`, even when
    /// the task was not running.
    async fn kill_task(
        &self,
        project_id: i64,
        task_id: &str,
    ) -> Result<ScheduleStatus, TransportError>;

    /// `ProjectTaskHash(project_id) -> {hash, latest_update_time}`.
    async fn project_task_hash(&self, project_id: i64) -> Result<(String, u64), TransportError>;

    /// The endpoint this transport talks to, for logging and client-cache
    /// bookkeeping.
    fn endpoint(&self) -> &str;
}
