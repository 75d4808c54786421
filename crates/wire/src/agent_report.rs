// SPDX-License-Identifier: MIT

//! Messages an agent pushes back to the center on the Event Channel,
//! beyond the `task_finished` event: `hello` and `hash_report`.
//!
//! `TaskFinishedReport` mirrors [`cronmesh_core::Event::TaskFinished`]'s
//! fields rather than wrapping the `Event` itself — nesting a second
//! internally-tagged enum inside this one would collide on the `type` key
//! both use for their own tag.

use cronmesh_core::{ExitStatus, TmpId};
use serde::{Deserialize, Serialize};

/// Sent once, immediately after the transport opens, identifying the
/// agent by metadata (ip, version, declared project ids).
///
/// The center derives this connection's [`cronmesh_core::AgentDescriptor`]
/// registration directly from `Hello` rather than requiring a separate
/// out-of-band registry call, since the Event Channel connection is
/// itself the liveness signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hello {
    pub agent_ip: String,
    pub agent_version: String,
    pub project_ids: Vec<i64>,
    #[serde(default)]
    pub organization: String,
    #[serde(default)]
    pub region: String,
    #[serde(default = "default_weight")]
    pub weight: u32,
}

fn default_weight() -> u32 {
    1
}

/// Per-project task-set fingerprint, republished on every reconnect and on
/// the periodic reconciliation interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashReport {
    pub project_id: i64,
    pub hash: String,
    pub latest_update_unix_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFinishedReport {
    pub project_id: i64,
    pub task_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tmp_id: Option<TmpId>,
    pub exit_status: ExitStatus,
    pub duration_ms: u64,
    pub output_tail: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AgentReport {
    #[serde(rename = "hello")]
    Hello(Hello),
    #[serde(rename = "hash_report")]
    HashReport(HashReport),
    #[serde(rename = "task_finished")]
    TaskFinished(TaskFinishedReport),
}

#[cfg(test)]
#[path = "agent_report_tests.rs"]
mod tests;
