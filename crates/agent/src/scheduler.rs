// SPDX-License-Identifier: MIT

//! The per-process Agent Scheduler: owns the Execution Record table and
//! the periodic-fire schedule, starts/cancels tasks, and reports
//! completions.

use crate::error::SchedulerError;
use crate::execution::{ExecutionRecord, ExecutionSnapshot, ExecutionTable};
use crate::periodic::PeriodicRegistry;
use crate::process;
use crate::sink::LogSink;
use cronmesh_core::{Clock, Plan, PlanKind, SchedulerKey, SystemClock, Task, TmpId};
use cronmesh_wire::{AgentReport, TaskFinishedReport};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Notify};
use tracing::warn;

/// Bounded backoff applied when the outbound report queue is momentarily
/// saturated. Failures to publish `task_finished` are retried with
/// bounded backoff; after exhaustion the record is dropped and a local
/// warning emitted.
const PUBLISH_RETRY_ATTEMPTS: u32 = 5;
const PUBLISH_RETRY_BASE_DELAY: Duration = Duration::from_millis(100);

struct ProjectTasks {
    by_task_id: HashMap<String, Task>,
    latest_update_unix_seconds: u64,
}

pub struct AgentScheduler<C: Clock = SystemClock> {
    shell: Vec<String>,
    clock: C,
    table: ExecutionTable,
    periodic: Mutex<PeriodicRegistry>,
    projects: Mutex<HashMap<i64, ProjectTasks>>,
    sink: Arc<dyn LogSink>,
    report_tx: mpsc::Sender<AgentReport>,
    /// Wakes the periodic timer loop early when `apply_task_set` or
    /// `upsert_task` may have introduced an earlier next-fire.
    wake: Notify,
}

impl AgentScheduler<SystemClock> {
    pub fn new(shell: Vec<String>, sink: Arc<dyn LogSink>, report_tx: mpsc::Sender<AgentReport>) -> Self {
        Self::with_clock(shell, sink, report_tx, SystemClock)
    }
}

impl<C: Clock> AgentScheduler<C> {
    pub fn with_clock(
        shell: Vec<String>,
        sink: Arc<dyn LogSink>,
        report_tx: mpsc::Sender<AgentReport>,
        clock: C,
    ) -> Self {
        Self {
            shell,
            clock,
            table: ExecutionTable::new(),
            periodic: Mutex::new(PeriodicRegistry::new()),
            projects: Mutex::new(HashMap::new()),
            sink,
            report_tx,
            wake: Notify::new(),
        }
    }

    /// `check_task_executing(scheduler_key) -> (execution_record?, bool)`.
    /// The bool mirrors the `CheckRunning` RPC's `running` field.
    pub fn check_task_executing(&self, key: &SchedulerKey) -> (Option<ExecutionSnapshot>, bool) {
        let snapshot = self.table.snapshot(key, self.clock.now());
        let running = snapshot.is_some();
        (snapshot, running)
    }

    /// Atomically inserts an Execution Record and launches the task
    /// asynchronously. `tmp_id` is the correlation id to echo on
    /// `task_finished` for one-shot dispatches; workflow-step plans
    /// already carry their own inside [`PlanKind::WorkflowStep`] and this
    /// parameter is ignored for them.
    pub fn try_start_task(
        self: &Arc<Self>,
        plan: Plan,
        tmp_id: Option<TmpId>,
    ) -> Result<(), SchedulerError> {
        plan.task.validate()?;
        let key = plan.task.scheduler_key();
        let resolved_tmp_id = match &plan.kind {
            PlanKind::WorkflowStep { tmp_id, .. } => Some(tmp_id.clone()),
            _ => tmp_id,
        };

        let record = ExecutionRecord::new(plan.clone(), resolved_tmp_id.clone(), self.clock.now());
        let cancel = self.table.insert_if_absent(key.clone(), record).map_err(|_| SchedulerError::AlreadyExists)?;

        let this = self.clone();
        tokio::spawn(async move { this.drive_execution(key, plan, resolved_tmp_id, cancel).await });
        Ok(())
    }

    /// Triggers cancellation for `scheduler_key` if a record exists.
    /// Idempotent; never blocks.
    pub fn cancel_task(&self, key: &SchedulerKey) -> bool {
        self.table.cancel(key)
    }

    async fn drive_execution(
        self: Arc<Self>,
        key: SchedulerKey,
        plan: Plan,
        tmp_id: Option<TmpId>,
        cancel: tokio_util::sync::CancellationToken,
    ) {
        let timeout = if plan.task.timeout > 0 {
            Duration::from_secs(plan.task.timeout as u64)
        } else {
            Duration::ZERO
        };

        let outcome = process::run(
            &key,
            &self.shell,
            &plan.task.command,
            None,
            &[],
            timeout,
            cancel,
            self.sink.clone(),
        )
        .await;

        self.table.remove(&key);

        let report = AgentReport::TaskFinished(TaskFinishedReport {
            project_id: plan.task.project_id,
            task_id: plan.task.task_id.clone(),
            tmp_id,
            exit_status: outcome.exit_status,
            duration_ms: outcome.duration.as_millis() as u64,
            output_tail: outcome.output_tail,
        });
        self.publish_report(report).await;
    }

    async fn publish_report(&self, report: AgentReport) {
        let mut delay = PUBLISH_RETRY_BASE_DELAY;
        let mut pending = report;
        for attempt in 0..PUBLISH_RETRY_ATTEMPTS {
            match self.report_tx.try_send(pending) {
                Ok(()) => return,
                Err(mpsc::error::TrySendError::Full(returned)) => {
                    pending = returned;
                    warn!(attempt, "outbound report queue full, backing off");
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    warn!("outbound report channel closed, dropping report");
                    return;
                }
            }
        }
        warn!("exhausted retries publishing task_finished, dropping report");
    }

    /// `project_task_hash(project_id) -> (hash, latest_update_unix_seconds)`.
    /// Pure function of the currently-assigned definitions.
    pub fn project_task_hash(&self, project_id: i64) -> (String, u64) {
        let projects = self.projects.lock();
        let Some(project) = projects.get(&project_id) else { return (cronmesh_core::project_task_hash(Vec::new()), 0) };
        let entries: Vec<(SchedulerKey, u64)> = project
            .by_task_id
            .values()
            .map(|t| (t.scheduler_key(), t.definition_fingerprint()))
            .collect();
        (cronmesh_core::project_task_hash(entries), project.latest_update_unix_seconds)
    }

    /// Replaces the assigned set for `project_id`: starts periodic
    /// tracking for new/changed entries, removes stale ones without
    /// touching in-flight executions.
    pub fn apply_task_set(&self, project_id: i64, definitions: Vec<Task>) {
        let now = self.clock.unix_seconds();
        let mut projects = self.projects.lock();
        let mut periodic = self.periodic.lock();

        let incoming: HashMap<String, Task> =
            definitions.into_iter().map(|t| (t.task_id.clone(), t)).collect();

        if let Some(existing) = projects.get(&project_id) {
            for (task_id, task) in &existing.by_task_id {
                if !incoming.contains_key(task_id) {
                    periodic.remove(&task.scheduler_key());
                }
            }
        }

        for task in incoming.values() {
            periodic.upsert(task.clone(), now);
        }

        projects.insert(project_id, ProjectTasks { by_task_id: incoming, latest_update_unix_seconds: now });
        drop(periodic);
        drop(projects);
        self.wake.notify_one();
    }

    /// Incremental single-task update, for a `task_saved` Event.
    pub fn upsert_task(&self, task: Task) {
        let now = self.clock.unix_seconds();
        let mut projects = self.projects.lock();
        let mut periodic = self.periodic.lock();
        periodic.upsert(task.clone(), now);
        let entry = projects.entry(task.project_id).or_insert_with(|| ProjectTasks {
            by_task_id: HashMap::new(),
            latest_update_unix_seconds: now,
        });
        entry.by_task_id.insert(task.task_id.clone(), task);
        entry.latest_update_unix_seconds = now;
        drop(periodic);
        drop(projects);
        self.wake.notify_one();
    }

    /// Incremental single-task removal, for a `task_deleted` Event.
    /// Removal does not cancel any in-flight execution of the task.
    pub fn remove_task(&self, project_id: i64, task_id: &str) {
        let now = self.clock.unix_seconds();
        let mut projects = self.projects.lock();
        if let Some(project) = projects.get_mut(&project_id) {
            if let Some(task) = project.by_task_id.remove(task_id) {
                self.periodic.lock().remove(&task.scheduler_key());
                project.latest_update_unix_seconds = now;
            }
        }
    }

    /// Runs the agent-wide periodic timer loop until cancelled. The
    /// periodic timer loop is one independent concurrent activity on
    /// the agent.
    pub async fn run_periodic_loop(self: Arc<Self>, shutdown: tokio_util::sync::CancellationToken) {
        loop {
            let sleep_for = {
                let soonest = self.periodic.lock().soonest();
                match soonest {
                    Some(fire_at) => {
                        let now = self.clock.unix_seconds();
                        Duration::from_secs(fire_at.saturating_sub(now))
                    }
                    None => Duration::from_secs(3600),
                }
            };

            tokio::select! {
                _ = shutdown.cancelled() => return,
                _ = self.wake.notified() => continue,
                _ = tokio::time::sleep(sleep_for) => {}
            }

            let due = self.periodic.lock().take_due(self.clock.unix_seconds());
            for task in due {
                let noseize = task.noseize;
                let next_fire = self.periodic.lock().soonest();
                let plan = Plan::periodic(task, next_fire.unwrap_or(0));
                match self.try_start_task(plan, None) {
                    Ok(()) => {}
                    Err(SchedulerError::AlreadyExists) if noseize => {
                        // Silently skipped: a noseize task that is still
                        // running when its next fire comes due just misses
                        // this fire.
                    }
                    Err(err) => warn!(error = %err, "periodic fire skipped"),
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
