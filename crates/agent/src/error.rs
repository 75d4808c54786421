// SPDX-License-Identifier: MIT

//! Errors surfaced by [`crate::scheduler::AgentScheduler`] and the Event
//! Channel client.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// `try_start_task` found an existing [`crate::execution::ExecutionRecord`]
    /// for the plan's scheduler key.
    #[error("task already executing for this scheduler key")]
    AlreadyExists,
    /// The task's own validation failed, mapped to `invalid_argument`.
    #[error(transparent)]
    Invalid(#[from] cronmesh_core::CoreError),
}

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("malformed envelope: {0}")]
    Codec(String),
    #[error("channel closed")]
    Closed,
}
