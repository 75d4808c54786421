// SPDX-License-Identifier: MIT

//! Errors surfaced by [`crate::WorkflowEngine`].

use cronmesh_core::WorkflowDefinitionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Definition(#[from] WorkflowDefinitionError),
    #[error("workflow run not found")]
    RunNotFound,
    #[error("workflow node {0:?} references a task not known to this engine")]
    UnknownTask(String),
}
