// SPDX-License-Identifier: MIT

//! The Task JSON payload carried inside `Schedule` events.

use cronmesh_core::Task;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Wire shape of a [`Task`]. Unknown fields are ignored (the default for
/// `#[derive(Deserialize)]` without `deny_unknown_fields`); missing
/// required fields fail to deserialize, which the caller maps to
/// `invalid_argument`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskPayload {
    pub project_id: i64,
    pub task_id: String,
    pub name: String,
    pub command: String,
    #[serde(default)]
    pub cron: String,
    #[serde(default)]
    pub timeout: i32,
    #[serde(default)]
    pub noseize: bool,
    #[serde(default)]
    pub remark: String,
}

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("failed to unmarshal task: {0}")]
    Unmarshal(#[from] serde_json::Error),
}

impl TaskPayload {
    pub fn decode(bytes: &[u8]) -> Result<Task, PayloadError> {
        let payload: TaskPayload = serde_json::from_slice(bytes)?;
        Ok(payload.into())
    }

    pub fn encode(task: &Task) -> Vec<u8> {
        let payload = TaskPayload::from(task.clone());
        // A `Task` always serializes; an encode failure would be a bug in
        // this module, not a runtime condition callers need to handle.
        serde_json::to_vec(&payload).unwrap_or_default()
    }
}

impl From<Task> for TaskPayload {
    fn from(t: Task) -> Self {
        Self {
            project_id: t.project_id,
            task_id: t.task_id,
            name: t.name,
            command: t.command,
            cron: t.cron,
            timeout: t.timeout,
            noseize: t.noseize,
            remark: t.remark,
        }
    }
}

impl From<TaskPayload> for Task {
    fn from(p: TaskPayload) -> Self {
        Task {
            project_id: p.project_id,
            task_id: p.task_id,
            name: p.name,
            command: p.command,
            cron: p.cron,
            timeout: p.timeout,
            noseize: p.noseize,
            remark: p.remark,
        }
    }
}

#[cfg(test)]
#[path = "task_payload_tests.rs"]
mod tests;
