// SPDX-License-Identifier: MIT

//! Validation errors shared by every crate that accepts a [`crate::task::Task`]
//! or [`crate::workflow::Workflow`] from the wire.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("task_id must not be empty")]
    EmptyTaskId,
    #[error("project_id must be positive")]
    NonPositiveProjectId,
    #[error(transparent)]
    Workflow(#[from] crate::workflow::WorkflowDefinitionError),
}
