// SPDX-License-Identifier: MIT

//! The agent-exposed RPC surface, carried over the same Event Channel
//! connection as [`crate::message::Message::CenterEvent`] pushes. The agent
//! exposes `CheckRunning`, `Schedule`, `KillTask`, `ProjectTaskHash`. A
//! [`RpcResponse`] carries the same [`crate::envelope::Envelope::id`] as
//! the [`RpcRequest`] it answers.

use crate::status::ScheduleStatus;
use cronmesh_core::Event;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "call")]
pub enum RpcRequest {
    #[serde(rename = "check_running")]
    CheckRunning { project_id: i64, task_id: String },
    /// `event` is one of `schedule_tmp`, `schedule_workflow`, `task_stop`.
    #[serde(rename = "schedule")]
    Schedule { event: Event },
    #[serde(rename = "kill_task")]
    KillTask { project_id: i64, task_id: String },
    #[serde(rename = "project_task_hash")]
    ProjectTaskHash { project_id: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "call")]
pub enum RpcResponse {
    #[serde(rename = "check_running")]
    CheckRunning { running: bool, message: String },
    #[serde(rename = "schedule")]
    Schedule { status: ScheduleStatus },
    #[serde(rename = "kill_task")]
    KillTask { status: ScheduleStatus },
    #[serde(rename = "project_task_hash")]
    ProjectTaskHash { hash: String, latest_update_unix_seconds: u64 },
}

#[cfg(test)]
#[path = "rpc_tests.rs"]
mod tests;
