// SPDX-License-Identifier: MIT

//! A scheduled-execution instance, derived from a [`Task`] at dispatch time.

use crate::id::{RunId, TmpId};
use crate::task::Task;
use serde::{Deserialize, Serialize};

/// The kind of dispatch that produced a [`Plan`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanKind {
    /// Fired by the agent's own periodic timer.
    Periodic { next_fire_unix_seconds: u64 },
    /// A one-shot dispatch (`schedule_tmp`).
    Active,
    /// One node of a workflow run.
    WorkflowStep { run_id: RunId, tmp_id: TmpId },
}

crate::simple_display! {
    PlanKind {
        Periodic(..) => "periodic",
        Active => "active",
        WorkflowStep(..) => "workflow-step",
    }
}

/// A dispatch-time instance of a [`Task`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub task: Task,
    pub kind: PlanKind,
}

impl Plan {
    pub fn active(task: Task) -> Self {
        Self { task, kind: PlanKind::Active }
    }

    pub fn periodic(task: Task, next_fire_unix_seconds: u64) -> Self {
        Self { task, kind: PlanKind::Periodic { next_fire_unix_seconds } }
    }

    pub fn workflow_step(task: Task, run_id: RunId, tmp_id: TmpId) -> Self {
        Self { task, kind: PlanKind::WorkflowStep { run_id, tmp_id } }
    }

    /// `true` for plan kinds that treat a concurrent `already_exists` as a
    /// successful dispatch (the task is already running) rather than a
    /// failure (would re-enter a workflow node).
    pub fn already_running_is_success(&self) -> bool {
        !matches!(self.kind, PlanKind::WorkflowStep { .. })
    }
}

#[cfg(test)]
#[path = "plan_tests.rs"]
mod tests;
