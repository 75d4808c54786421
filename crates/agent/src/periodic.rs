// SPDX-License-Identifier: MIT

//! The ordered schedule of periodic tasks, keyed by soonest next fire.
//!
//! A single agent-wide structure backs the timer loop: it does not
//! maintain one schedule per project, since the loop sleeps until the
//! single soonest fire across every project the agent serves.

use cronmesh_core::{SchedulerKey, Task};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Computes the next fire time strictly after `after_unix_seconds` for a
/// cron expression. Empty cron expressions never fire.
pub fn next_fire_after(cron_expr: &str, after_unix_seconds: u64) -> Option<u64> {
    if cron_expr.trim().is_empty() {
        return None;
    }
    let schedule = cron::Schedule::from_str(cron_expr).ok()?;
    let after = chrono::DateTime::from_timestamp(after_unix_seconds as i64, 0)?;
    schedule.after(&after).next().map(|dt| dt.timestamp().max(0) as u64)
}

/// One tracked periodic task.
struct Entry {
    task: Task,
    next_fire_unix_seconds: u64,
}

/// Ordered by `(next_fire_unix_seconds, scheduler_key)` so the soonest
/// entries sort first and ties break deterministically.
#[derive(Default)]
pub struct PeriodicRegistry {
    by_key: BTreeMap<SchedulerKey, Entry>,
}

impl PeriodicRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `task` (or reschedules it, recomputing from `now` rather
    /// than preserving any previously-computed fire — callers only invoke
    /// this for new or changed definitions). No-op if the task is not
    /// periodic.
    pub fn upsert(&mut self, task: Task, now_unix_seconds: u64) {
        let Some(next_fire) = next_fire_after(&task.cron, now_unix_seconds) else {
            self.by_key.remove(&task.scheduler_key());
            return;
        };
        let key = task.scheduler_key();
        self.by_key.insert(key, Entry { task, next_fire_unix_seconds: next_fire });
    }

    pub fn remove(&mut self, key: &SchedulerKey) {
        self.by_key.remove(key);
    }

    /// The soonest next fire across every tracked task, if any.
    pub fn soonest(&self) -> Option<u64> {
        self.by_key.values().map(|e| e.next_fire_unix_seconds).min()
    }

    /// Every task whose next fire is `<= now`, rescheduled from `now`.
    /// Missed fires during a process pause are not back-filled — only
    /// the next fire is taken.
    pub fn take_due(&mut self, now_unix_seconds: u64) -> Vec<Task> {
        let due_keys: Vec<SchedulerKey> = self
            .by_key
            .iter()
            .filter(|(_, e)| e.next_fire_unix_seconds <= now_unix_seconds)
            .map(|(k, _)| k.clone())
            .collect();

        let mut due = Vec::with_capacity(due_keys.len());
        for key in due_keys {
            if let Some(entry) = self.by_key.remove(&key) {
                due.push(entry.task.clone());
                self.upsert(entry.task, now_unix_seconds);
            }
        }
        due
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

#[cfg(test)]
#[path = "periodic_tests.rs"]
mod tests;
