// SPDX-License-Identifier: MIT

//! Terminal outcome of one task execution, as reported on `task_finished`.

use serde::{Deserialize, Serialize};

/// Sentinel exit code used when the shell command could not be spawned at
/// all (e.g. the interpreter binary is missing). Chosen to fall outside the
/// 0-255 range a real process can return, so callers can distinguish "ran
/// and returned 255" from "never ran".
pub const SPAWN_FAILURE_EXIT_CODE: i32 = -1;

/// How an execution ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitStatus {
    /// The process ran to completion with the given exit code.
    Exited(i32),
    /// The process was terminated by a signal (unix) before exiting normally.
    Signalled(i32),
    /// The timeout armed for the task elapsed before the process exited.
    TimedOut,
    /// The execution was cancelled (explicit stop, or workflow kill).
    Cancelled,
    /// The shell command could not be spawned.
    SpawnFailed(String),
}

impl ExitStatus {
    /// Whether the task should be considered successful for workflow
    /// propagation purposes (exit code 0, and nothing else).
    pub fn is_success(&self) -> bool {
        matches!(self, ExitStatus::Exited(0))
    }

    /// The exit code to report on the wire, using
    /// [`SPAWN_FAILURE_EXIT_CODE`] for statuses that never produced one.
    pub fn code(&self) -> i32 {
        match self {
            ExitStatus::Exited(code) => *code,
            ExitStatus::Signalled(sig) => -*sig,
            ExitStatus::TimedOut | ExitStatus::Cancelled | ExitStatus::SpawnFailed(_) => {
                SPAWN_FAILURE_EXIT_CODE
            }
        }
    }
}

#[cfg(test)]
#[path = "outcome_tests.rs"]
mod tests;
