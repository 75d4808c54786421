// SPDX-License-Identifier: MIT

//! The Execution Record table: the agent's exclusively-owned map of
//! currently-executing tasks, keyed by scheduler key.

use cronmesh_core::{Plan, SchedulerKey, TmpId};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// In-memory state of one currently-running task.
///
/// The cancellation handle is a [`CancellationToken`]: cloning it out of
/// the table's critical section and triggering it is safe and non-blocking.
pub struct ExecutionRecord {
    pub plan: Plan,
    /// Correlation id to echo on `task_finished`. Always present for
    /// workflow-step plans (carried on [`cronmesh_core::PlanKind::WorkflowStep`]);
    /// present for one-shot plans only when the dispatching `schedule_tmp`
    /// event carried one; absent for periodic fires, which have no
    /// correlation id to echo.
    pub tmp_id: Option<TmpId>,
    pub started_at: Instant,
    pub cancel: CancellationToken,
}

impl ExecutionRecord {
    pub fn new(plan: Plan, tmp_id: Option<TmpId>, started_at: Instant) -> Self {
        Self { plan, tmp_id, started_at, cancel: CancellationToken::new() }
    }
}

/// A snapshot safe to hand to a caller without holding the table's lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionSnapshot {
    pub scheduler_key: SchedulerKey,
    pub running_ms: u64,
}

/// The table itself: concurrent lookup/insert/remove, one critical
/// section serializes all updates.
#[derive(Default)]
pub struct ExecutionTable {
    inner: Mutex<HashMap<SchedulerKey, ExecutionRecord>>,
}

impl ExecutionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new record iff none exists for `key`. Returns the
    /// cancellation token of the newly-inserted record on success.
    pub fn insert_if_absent(
        &self,
        key: SchedulerKey,
        record: ExecutionRecord,
    ) -> Result<CancellationToken, ()> {
        let mut inner = self.inner.lock();
        if inner.contains_key(&key) {
            return Err(());
        }
        let token = record.cancel.clone();
        inner.insert(key, record);
        Ok(token)
    }

    /// Removes and returns the record for `key`, if any. Terminal
    /// executions are removed here and become unobservable.
    pub fn remove(&self, key: &SchedulerKey) -> Option<ExecutionRecord> {
        self.inner.lock().remove(key)
    }

    /// Triggers cancellation for `key` if a record exists. Idempotent:
    /// [`CancellationToken::cancel`] is a no-op if already cancelled.
    /// Never blocks on the running task itself.
    pub fn cancel(&self, key: &SchedulerKey) -> bool {
        let inner = self.inner.lock();
        match inner.get(key) {
            Some(record) => {
                record.cancel.cancel();
                true
            }
            None => false,
        }
    }

    pub fn snapshot(&self, key: &SchedulerKey, now: Instant) -> Option<ExecutionSnapshot> {
        let inner = self.inner.lock();
        inner.get(key).map(|record| ExecutionSnapshot {
            scheduler_key: key.clone(),
            running_ms: now.saturating_duration_since(record.started_at).as_millis() as u64,
        })
    }

    pub fn contains(&self, key: &SchedulerKey) -> bool {
        self.inner.lock().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "execution_tests.rs"]
mod tests;
