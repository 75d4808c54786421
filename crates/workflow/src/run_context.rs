// SPDX-License-Identifier: MIT

//! Per-run mutable state, exclusively owned by the Workflow Engine.

use cronmesh_core::{Workflow, WorkflowRun};
use std::collections::HashMap;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// One node's dispatch finished: either it reported `task_finished`, or
/// the Dispatcher itself failed to place it.
#[derive(Debug, Clone)]
pub(crate) struct NodeCompletion {
    pub node_id: String,
    pub success: bool,
}

pub(crate) struct RunContext {
    pub workflow: Workflow,
    pub run: WorkflowRun,
    pub region_hint: String,
    /// `node_id -> hosting agent endpoint`, recorded once Dispatch succeeds
    /// so `kill` can target a `task_stop` directly.
    pub node_agent: HashMap<String, String>,
    pub cancel: CancellationToken,
    pub killed: bool,
    pub completion_tx: mpsc::UnboundedSender<NodeCompletion>,
}
