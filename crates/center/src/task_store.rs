// SPDX-License-Identifier: MIT

//! In-memory stand-in for the relational store that owns task/project
//! definitions (the real schema is out of scope here). Backs
//! [`cronmesh_workflow::TaskLookup`] and the center's own
//! hash-reconciliation comparisons.

use async_trait::async_trait;
use cronmesh_core::{project_task_hash, Task};
use cronmesh_workflow::TaskLookup;
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Default)]
struct ProjectTasks {
    by_task_id: HashMap<String, Task>,
}

/// `project_id -> task_id -> Task`. Single-process, in-memory, and
/// authoritative for this deployment -- the seam a production build
/// backs with the real relational store instead.
#[derive(Default)]
pub struct InMemoryTaskStore {
    projects: Mutex<HashMap<i64, ProjectTasks>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save_task(&self, task: Task) {
        self.projects
            .lock()
            .entry(task.project_id)
            .or_default()
            .by_task_id
            .insert(task.task_id.clone(), task);
    }

    pub fn delete_task(&self, project_id: i64, task_id: &str) -> Option<Task> {
        self.projects.lock().get_mut(&project_id).and_then(|p| p.by_task_id.remove(task_id))
    }

    pub fn get(&self, project_id: i64, task_id: &str) -> Option<Task> {
        self.projects.lock().get(&project_id).and_then(|p| p.by_task_id.get(task_id).cloned())
    }

    pub fn tasks_for_project(&self, project_id: i64) -> Vec<Task> {
        self.projects.lock().get(&project_id).map(|p| p.by_task_id.values().cloned().collect()).unwrap_or_default()
    }

    /// The center's authoritative fingerprint for a project, computed the
    /// same way an agent computes its own, so the two are directly
    /// comparable.
    pub fn hash_for_project(&self, project_id: i64) -> String {
        let entries =
            self.tasks_for_project(project_id).iter().map(|t| (t.scheduler_key(), t.definition_fingerprint())).collect();
        project_task_hash(entries)
    }
}

#[async_trait]
impl TaskLookup for InMemoryTaskStore {
    async fn task(&self, project_id: i64, task_id: &str) -> Option<Task> {
        self.get(project_id, task_id)
    }
}

#[cfg(test)]
#[path = "task_store_tests.rs"]
mod tests;
