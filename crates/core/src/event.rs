// SPDX-License-Identifier: MIT

//! Events passed through the Event Channel.
//!
//! Serializes with `{"type": "event:name", ...fields}`, matching the
//! tagged-enum convention so a new variant forces every `match` in the
//! agent's handler and the center's push path to be updated.

use crate::id::{RunId, TmpId};
use crate::outcome::ExitStatus;
use crate::task::Task;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Which agents an Event is addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventTarget {
    /// Every agent that declares membership in any of these projects.
    Projects(BTreeSet<i64>),
    /// One specific agent, addressed by endpoint.
    Agent(String),
}

impl EventTarget {
    pub fn project(project_id: i64) -> Self {
        EventTarget::Projects(BTreeSet::from([project_id]))
    }
}

/// A tagged value passed through the Event Channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    #[serde(rename = "task_saved")]
    TaskSaved { target: EventTarget, task: Task },

    #[serde(rename = "task_deleted")]
    TaskDeleted { target: EventTarget, project_id: i64, task_id: String },

    #[serde(rename = "schedule_tmp")]
    ScheduleTmp { target: EventTarget, task: Task, tmp_id: TmpId },

    #[serde(rename = "schedule_workflow")]
    ScheduleWorkflow { target: EventTarget, task: Task, run_id: RunId, tmp_id: TmpId },

    #[serde(rename = "task_stop")]
    TaskStop { target: EventTarget, project_id: i64, task_id: String },

    /// Agent → center: one execution has ended.
    #[serde(rename = "task_finished")]
    TaskFinished {
        project_id: i64,
        task_id: String,
        /// Present for workflow-step and tmp dispatches; absent for
        /// periodic fires, which have no correlation id to echo.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tmp_id: Option<TmpId>,
        exit_status: ExitStatus,
        duration_ms: u64,
        /// Tail of captured stdout/stderr, bounded by the agent's sink.
        output_tail: String,
    },

    #[serde(rename = "reload_config")]
    ReloadConfig { target: EventTarget },

    /// Center → agent: the full assigned task set for one project,
    /// replacing whatever the agent currently believes it should be
    /// scheduling. Pushed after a `hash_report` mismatch, or on initial
    /// connect for a project the center has never seen a matching hash
    /// for.
    #[serde(rename = "task_set_refresh")]
    TaskSetRefresh { target: EventTarget, project_id: i64, tasks: Vec<Task> },
}

crate::simple_display! {
    Event {
        TaskSaved(..) => "task_saved",
        TaskDeleted(..) => "task_deleted",
        ScheduleTmp(..) => "schedule_tmp",
        ScheduleWorkflow(..) => "schedule_workflow",
        TaskStop(..) => "task_stop",
        TaskFinished(..) => "task_finished",
        ReloadConfig(..) => "reload_config",
        TaskSetRefresh(..) => "task_set_refresh",
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
