// SPDX-License-Identifier: MIT

//! Terminal error kinds a [`crate::Dispatcher::dispatch`] call can return.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// No live agent serves `(project_id, region_hint)`.
    #[error("no live agents serve this project/region")]
    NoAgents,
    /// Every candidate agent was tried and each failed with a retryable
    /// transport error.
    #[error("all candidate agents were unavailable")]
    AllUnavailable,
    /// An agent was reached but rejected the dispatch (`already_exists`
    /// for a workflow kind, or `aborted`/`internal`).
    #[error("agent rejected the dispatch: {0}")]
    Rejected(String),
    /// The task payload itself was invalid.
    #[error("invalid task")]
    InvalidTask,
}

/// Transport-layer failure from one RPC attempt. Only `Unavailable` and
/// `DeadlineExceeded` are retried; anything else is surfaced immediately.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("agent unavailable")]
    Unavailable,
    #[error("rpc deadline exceeded")]
    DeadlineExceeded,
    #[error("transport error: {0}")]
    Transport(String),
}

impl TransportError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, TransportError::Unavailable | TransportError::DeadlineExceeded | TransportError::Transport(_))
    }
}
