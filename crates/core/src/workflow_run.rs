// SPDX-License-Identifier: MIT

//! An in-progress instance of a [`crate::workflow::Workflow`].

use crate::id::{RunId, WorkflowId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-node state. Transitions are monotonic:
/// `pending -> ready -> running -> {succeeded, failed, cancelled, skipped}`.
/// No state decreases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeState {
    Pending,
    Ready,
    Running,
    Succeeded,
    Failed,
    Cancelled,
    Skipped,
}

crate::simple_display! {
    NodeState {
        Pending => "pending",
        Ready => "ready",
        Running => "running",
        Succeeded => "succeeded",
        Failed => "failed",
        Cancelled => "cancelled",
        Skipped => "skipped",
    }
}

impl NodeState {
    pub fn is_terminal(self) -> bool {
        matches!(self, NodeState::Succeeded | NodeState::Failed | NodeState::Cancelled | NodeState::Skipped)
    }

    /// Rank used to enforce monotonic transitions. `pending`/`ready`/`running`
    /// rank below every terminal state, but terminal states are not ordered
    /// among themselves — a node reaches exactly one terminal state once.
    fn rank(self) -> u8 {
        match self {
            NodeState::Pending => 0,
            NodeState::Ready => 1,
            NodeState::Running => 2,
            NodeState::Succeeded | NodeState::Failed | NodeState::Cancelled | NodeState::Skipped => 3,
        }
    }

    /// Whether transitioning from `self` to `next` is a legal, non-decreasing move.
    pub fn can_transition_to(self, next: NodeState) -> bool {
        if self.is_terminal() {
            return false;
        }
        next.rank() >= self.rank()
    }
}

/// Overall run state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

crate::simple_display! {
    RunState {
        Running => "running",
        Succeeded => "succeeded",
        Failed => "failed",
        Cancelled => "cancelled",
    }
}

/// An instance of a [`crate::workflow::Workflow`] in progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowRun {
    pub workflow_id: WorkflowId,
    pub run_id: RunId,
    pub node_states: BTreeMap<String, NodeState>,
    pub started_at_unix_seconds: u64,
    pub ended_at_unix_seconds: Option<u64>,
    pub state: RunState,
}

impl WorkflowRun {
    /// Materialize a fresh run with every node `pending` (the admission
    /// step -- call only after `Workflow::topological_order` has confirmed
    /// the definition is acyclic).
    pub fn admit(
        workflow_id: WorkflowId,
        node_ids: impl IntoIterator<Item = String>,
        started_at_unix_seconds: u64,
    ) -> Self {
        Self {
            workflow_id,
            run_id: RunId::new(),
            node_states: node_ids.into_iter().map(|id| (id, NodeState::Pending)).collect(),
            started_at_unix_seconds,
            ended_at_unix_seconds: None,
            state: RunState::Running,
        }
    }

    pub fn node_state(&self, node_id: &str) -> Option<NodeState> {
        self.node_states.get(node_id).copied()
    }

    /// Attempt a monotonic transition. Returns `false` (no-op) if the move
    /// would decrease state or the node is unknown.
    pub fn transition(&mut self, node_id: &str, next: NodeState) -> bool {
        let Some(current) = self.node_states.get(node_id).copied() else { return false };
        if !current.can_transition_to(next) {
            return false;
        }
        self.node_states.insert(node_id.to_string(), next);
        true
    }

    pub fn is_every_node_terminal(&self) -> bool {
        self.node_states.values().all(|s| s.is_terminal())
    }
}

#[cfg(test)]
#[path = "workflow_run_tests.rs"]
mod tests;
