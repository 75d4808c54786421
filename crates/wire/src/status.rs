// SPDX-License-Identifier: MIT

//! Status codes returned by the `Schedule` RPC.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    /// Dispatched (task stop is always `ok`, even if the task was not running).
    Ok,
    /// Payload unmarshal failed.
    InvalidArgument,
    /// Task already executing on that agent (for tmp/workflow kinds).
    AlreadyExists,
    /// Plan could not be built or task could not be started.
    Aborted,
    /// Workflow plan construction failed.
    Internal,
}

cronmesh_core::simple_display! {
    ScheduleStatus {
        Ok => "ok",
        InvalidArgument => "invalid_argument",
        AlreadyExists => "already_exists",
        Aborted => "aborted",
        Internal => "internal",
    }
}

impl ScheduleStatus {
    pub fn is_ok(self) -> bool {
        matches!(self, ScheduleStatus::Ok)
    }

    /// Transient-transport retry only applies to RPC-layer failures (see
    /// `cronmesh_dispatcher::DispatchError`); none of these application-level
    /// codes are retried by the dispatcher on their own.
    pub fn is_conflict(self) -> bool {
        matches!(self, ScheduleStatus::AlreadyExists)
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
