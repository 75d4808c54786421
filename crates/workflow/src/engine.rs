// SPDX-License-Identifier: MIT

//! Interprets a [`Workflow`] DAG to completion: admits a run, dispatches
//! ready nodes, advances the frontier on each completion, and terminates
//! deterministically.
//!
//! The dispatch loop is one task per run driven by a completion channel
//! rather than recursion over the DAG, since DAG depth is caller-controlled
//! and unbounded.

use crate::error::WorkflowError;
use crate::run_context::{NodeCompletion, RunContext};
use crate::task_lookup::TaskLookup;
use cronmesh_core::{Clock, ExitStatus, NodeState, Plan, RunId, RunState, SystemClock, TmpId, Workflow, WorkflowId};
use cronmesh_dispatcher::{DispatchIntent, Dispatcher, TransportFactory};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

type Correlation = Mutex<HashMap<TmpId, (RunId, String)>>;

pub struct WorkflowEngine<F: TransportFactory + 'static, C: Clock = SystemClock> {
    dispatcher: Arc<Dispatcher<F>>,
    task_lookup: Arc<dyn TaskLookup>,
    clock: C,
    runs: Mutex<HashMap<RunId, Arc<Mutex<RunContext>>>>,
    /// `tmp_id -> (run_id, node_id)`, so an agent's `task_finished` is
    /// matched by this correlation id rather than `(project_id, task_id)`
    /// alone — disambiguates concurrent runs of the same workflow.
    correlation: Arc<Correlation>,
}

impl<F: TransportFactory + 'static> WorkflowEngine<F, SystemClock> {
    pub fn new(dispatcher: Arc<Dispatcher<F>>, task_lookup: Arc<dyn TaskLookup>) -> Self {
        Self::with_clock(dispatcher, task_lookup, SystemClock)
    }
}

impl<F: TransportFactory + 'static, C: Clock> WorkflowEngine<F, C> {
    pub fn with_clock(dispatcher: Arc<Dispatcher<F>>, task_lookup: Arc<dyn TaskLookup>, clock: C) -> Self {
        Self {
            dispatcher,
            task_lookup,
            clock,
            runs: Mutex::new(HashMap::new()),
            correlation: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Admission + initial frontier, then spawns the run's dispatch loop.
    pub fn start(self: &Arc<Self>, workflow: Workflow, region_hint: String) -> Result<RunId, WorkflowError> {
        workflow.topological_order()?;

        let node_ids: Vec<String> = workflow.nodes.iter().map(|n| n.id.clone()).collect();
        let mut run = cronmesh_core::WorkflowRun::admit(
            WorkflowId::from_string(workflow.id.as_str()),
            node_ids,
            self.clock.unix_seconds(),
        );
        for root in workflow.roots() {
            run.transition(&root.id, NodeState::Ready);
        }
        let run_id = run.run_id.clone();

        let (tx, rx) = mpsc::unbounded_channel();
        let ctx = Arc::new(Mutex::new(RunContext {
            workflow,
            run,
            region_hint,
            node_agent: HashMap::new(),
            cancel: tokio_util::sync::CancellationToken::new(),
            killed: false,
            completion_tx: tx,
        }));
        self.runs.lock().insert(run_id.clone(), ctx.clone());

        let engine = self.clone();
        let driven_run_id = run_id.clone();
        tokio::spawn(async move { engine.drive(driven_run_id, ctx, rx).await });

        Ok(run_id)
    }

    /// Snapshot of a run's current state, for querying or for tests.
    pub fn run_state(&self, run_id: &RunId) -> Option<cronmesh_core::WorkflowRun> {
        self.runs.lock().get(run_id).map(|ctx| ctx.lock().run.clone())
    }

    /// Agent → center report ingestion: matches `tmp_id` against the
    /// correlation table and feeds the owning run's completion channel.
    /// Silently ignored if the id is unknown (already-completed run, or a
    /// report for a dispatch this engine never tracked).
    pub fn report_task_finished(&self, tmp_id: &TmpId, exit_status: &ExitStatus) {
        let Some((run_id, node_id)) = self.correlation.lock().remove(tmp_id) else { return };
        let Some(ctx) = self.runs.lock().get(&run_id).cloned() else { return };
        let tx = ctx.lock().completion_tx.clone();
        let _ = tx.send(NodeCompletion { node_id, success: exit_status.is_success() });
    }

    /// External kill.
    pub fn kill(&self, run_id: &RunId) -> Result<(), WorkflowError> {
        let ctx = self.runs.lock().get(run_id).cloned().ok_or(WorkflowError::RunNotFound)?;
        ctx.lock().cancel.cancel();
        Ok(())
    }

    async fn drive(
        self: Arc<Self>,
        run_id: RunId,
        ctx: Arc<Mutex<RunContext>>,
        mut rx: mpsc::UnboundedReceiver<NodeCompletion>,
    ) {
        self.dispatch_ready(&run_id, &ctx);
        if self.finalize_if_terminal(&ctx) {
            info!(%run_id, "workflow run finished");
            return;
        }

        let mut kill_handled = false;
        loop {
            let cancelled = ctx.lock().cancel.clone();
            tokio::select! {
                _ = cancelled.cancelled(), if !kill_handled => {
                    kill_handled = true;
                    self.handle_kill(&ctx).await;
                    if self.finalize_if_terminal(&ctx) {
                        break;
                    }
                }
                maybe = rx.recv() => {
                    match maybe {
                        Some(completion) => {
                            self.apply_completion(&ctx, completion);
                            if !ctx.lock().killed {
                                self.dispatch_ready(&run_id, &ctx);
                            }
                            if self.finalize_if_terminal(&ctx) {
                                break;
                            }
                        }
                        None => break,
                    }
                }
            }
        }
        info!(%run_id, "workflow run finished");
    }

    /// Marks every currently-`Ready` node `Running` and spawns its
    /// dispatch independently — all nodes ready at once may run in
    /// parallel.
    fn dispatch_ready(&self, run_id: &RunId, ctx: &Arc<Mutex<RunContext>>) {
        let (ready_nodes, region_hint) = {
            let mut guard = ctx.lock();
            let ids: Vec<String> = guard
                .run
                .node_states
                .iter()
                .filter(|(_, s)| **s == NodeState::Ready)
                .map(|(id, _)| id.clone())
                .collect();
            let mut nodes = Vec::new();
            for id in &ids {
                guard.run.transition(id, NodeState::Running);
                if let Some(node) = guard.workflow.node(id) {
                    nodes.push(node.clone());
                }
            }
            (nodes, guard.region_hint.clone())
        };

        for node in ready_nodes {
            tokio::spawn(Self::dispatch_one(
                self.dispatcher.clone(),
                self.task_lookup.clone(),
                self.correlation.clone(),
                ctx.clone(),
                run_id.clone(),
                node,
                region_hint.clone(),
            ));
        }
    }

    async fn dispatch_one(
        dispatcher: Arc<Dispatcher<F>>,
        task_lookup: Arc<dyn TaskLookup>,
        correlation: Arc<Correlation>,
        ctx: Arc<Mutex<RunContext>>,
        run_id: RunId,
        node: cronmesh_core::WorkflowNode,
        region_hint: String,
    ) {
        let task = task_lookup.task(node.project_id, &node.task_id).await;
        let Some(task) = task else {
            warn!(node_id = %node.id, "workflow node references unknown task");
            let tx = ctx.lock().completion_tx.clone();
            let _ = tx.send(NodeCompletion { node_id: node.id, success: false });
            return;
        };

        let tmp_id = TmpId::new();
        correlation.lock().insert(tmp_id.clone(), (run_id.clone(), node.id.clone()));
        let plan = Plan::workflow_step(task, run_id, tmp_id.clone());

        match dispatcher.dispatch(DispatchIntent::new(plan).with_region(region_hint)).await {
            Ok(outcome) => {
                ctx.lock().node_agent.insert(node.id.clone(), outcome.endpoint);
            }
            Err(err) => {
                warn!(node_id = %node.id, error = %err, "failed to dispatch workflow node");
                correlation.lock().remove(&tmp_id);
                let tx = ctx.lock().completion_tx.clone();
                let _ = tx.send(NodeCompletion { node_id: node.id, success: false });
            }
        }
    }

    fn apply_completion(&self, ctx: &Arc<Mutex<RunContext>>, completion: NodeCompletion) {
        let mut guard = ctx.lock();
        let next = if completion.success { NodeState::Succeeded } else { NodeState::Failed };
        guard.run.transition(&completion.node_id, next);
        self.propagate(&mut guard);
    }

    /// Ready-set/skip-set recomputation: O(edges) per call, iterated to a
    /// fixpoint since one completion can unlock more than one DAG level.
    fn propagate(&self, guard: &mut RunContext) {
        let mut changed = true;
        while changed {
            changed = false;
            let node_ids: Vec<String> = guard.workflow.nodes.iter().map(|n| n.id.clone()).collect();
            for node_id in node_ids {
                if guard.run.node_state(&node_id) != Some(NodeState::Pending) {
                    continue;
                }
                let Some(node) = guard.workflow.node(&node_id) else { continue };
                if node.depends_on.is_empty() {
                    continue;
                }
                let dep_states: Vec<NodeState> = node
                    .depends_on
                    .iter()
                    .map(|d| guard.run.node_state(d).unwrap_or(NodeState::Pending))
                    .collect();
                let any_failed_like = dep_states
                    .iter()
                    .any(|s| matches!(s, NodeState::Failed | NodeState::Cancelled | NodeState::Skipped));
                let all_succeeded = dep_states.iter().all(|s| *s == NodeState::Succeeded);
                if any_failed_like {
                    if guard.run.transition(&node_id, NodeState::Skipped) {
                        changed = true;
                    }
                } else if all_succeeded && guard.run.transition(&node_id, NodeState::Ready) {
                    changed = true;
                }
            }
        }
    }

    async fn handle_kill(&self, ctx: &Arc<Mutex<RunContext>>) {
        let stops: Vec<(String, i64, String)> = {
            let mut guard = ctx.lock();
            guard.killed = true;
            let ids: Vec<String> = guard.run.node_states.keys().cloned().collect();
            let mut stops = Vec::new();
            for id in ids {
                match guard.run.node_state(&id) {
                    Some(NodeState::Pending) | Some(NodeState::Ready) => {
                        guard.run.transition(&id, NodeState::Cancelled);
                    }
                    Some(NodeState::Running) => {
                        if let (Some(endpoint), Some(node)) =
                            (guard.node_agent.get(&id).cloned(), guard.workflow.node(&id))
                        {
                            stops.push((endpoint, node.project_id, node.task_id.clone()));
                        }
                    }
                    _ => {}
                }
            }
            stops
        };
        for (endpoint, project_id, task_id) in stops {
            let _ = self.dispatcher.stop_on(&endpoint, project_id, &task_id).await;
        }
    }

    /// Finalizes the run's overall [`RunState`] once every node is
    /// terminal. Returns whether the run is now finalized (the drive loop
    /// should stop).
    fn finalize_if_terminal(&self, ctx: &Arc<Mutex<RunContext>>) -> bool {
        let mut guard = ctx.lock();
        if !guard.run.is_every_node_terminal() {
            return false;
        }
        if guard.run.ended_at_unix_seconds.is_some() {
            return true;
        }
        guard.run.state = if guard.killed {
            RunState::Cancelled
        } else if guard.run.node_states.values().any(|s| *s == NodeState::Failed) {
            RunState::Failed
        } else {
            RunState::Succeeded
        };
        guard.run.ended_at_unix_seconds = Some(self.clock.unix_seconds());
        true
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
