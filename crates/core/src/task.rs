// SPDX-License-Identifier: MIT

//! A task: the unit of scheduled work, and its scheduler key.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Canonical string identifying a task for concurrency control.
///
/// At most one [`crate::execution::ExecutionRecord`] (agent-side concept,
/// defined in `cronmesh-agent`) may exist per scheduler key at any instant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchedulerKey(String);

impl SchedulerKey {
    pub fn new(project_id: i64, task_id: &str) -> Self {
        Self(format!("{project_id}:{task_id}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SchedulerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A unit of scheduled work. Identity is `(project_id, task_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub project_id: i64,
    pub task_id: String,
    pub name: String,
    pub command: String,
    /// Cron expression; empty means the task is never periodically fired.
    #[serde(default)]
    pub cron: String,
    /// Timeout in seconds; 0 means no timeout.
    #[serde(default)]
    pub timeout: i32,
    /// If set, concurrent refires are silently suppressed rather than
    /// surfaced as `already_exists`.
    #[serde(default)]
    pub noseize: bool,
    #[serde(default)]
    pub remark: String,
}

impl Task {
    /// Validates the fields required by the Schedule RPC:
    /// an empty `task_id` or non-positive `project_id` is rejected as
    /// `invalid_argument` before a [`crate::plan::Plan`] is ever built.
    pub fn validate(&self) -> Result<(), crate::errors::CoreError> {
        if self.task_id.trim().is_empty() {
            return Err(crate::errors::CoreError::EmptyTaskId);
        }
        if self.project_id <= 0 {
            return Err(crate::errors::CoreError::NonPositiveProjectId);
        }
        Ok(())
    }

    pub fn scheduler_key(&self) -> SchedulerKey {
        SchedulerKey::new(self.project_id, &self.task_id)
    }

    /// Whether this task is ever periodically scheduled.
    pub fn is_periodic(&self) -> bool {
        !self.cron.trim().is_empty()
    }

    /// Deterministic fingerprint of the task's definition, used by
    /// [`crate::hash::project_task_hash`] for drift detection. Two tasks
    /// with identical fields (in any field order, since this hashes the
    /// parsed struct rather than raw bytes) produce the same fingerprint.
    pub fn definition_fingerprint(&self) -> u64 {
        let mut hasher = Sha256::new();
        hasher.update(self.project_id.to_le_bytes());
        hasher.update(self.task_id.as_bytes());
        hasher.update(0u8.to_le_bytes()); // field separator
        hasher.update(self.name.as_bytes());
        hasher.update(0u8.to_le_bytes());
        hasher.update(self.command.as_bytes());
        hasher.update(0u8.to_le_bytes());
        hasher.update(self.cron.as_bytes());
        hasher.update(0u8.to_le_bytes());
        hasher.update(self.timeout.to_le_bytes());
        hasher.update([self.noseize as u8]);
        let digest = hasher.finalize();
        u64::from_le_bytes(digest[..8].try_into().unwrap_or([0; 8]))
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
