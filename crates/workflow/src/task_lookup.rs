// SPDX-License-Identifier: MIT

//! Resolves a [`crate::WorkflowNode`]'s `(project_id, task_id)` reference
//! to the full [`Task`] definition needed to build a [`cronmesh_core::Plan`].
//!
//! The relational store that owns task definitions is out of scope;
//! this trait is the seam. `cronmesh-center` backs it with the persisted
//! project/task tables.

use async_trait::async_trait;
use cronmesh_core::Task;

#[async_trait]
pub trait TaskLookup: Send + Sync {
    async fn task(&self, project_id: i64, task_id: &str) -> Option<Task>;
}
