// SPDX-License-Identifier: MIT

//! The body carried by every [`crate::envelope::Envelope`] on the Event
//! Channel, in either direction.

use crate::agent_report::AgentReport;
use crate::rpc::{RpcRequest, RpcResponse};
use cronmesh_core::Event;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "direction")]
pub enum Message {
    /// Center → agent: a push event (`task_saved`, `task_deleted`,
    /// `task_stop`, `reload_config`). `schedule_tmp`/`schedule_workflow`
    /// are requested via [`Message::Request`] instead, since `Schedule` is
    /// an RPC with a status reply.
    #[serde(rename = "event")]
    CenterEvent(Event),
    /// Agent → center: `hello`, `hash_report`, `task_finished`.
    #[serde(rename = "report")]
    AgentReport(AgentReport),
    /// Center → agent: one of `CheckRunning`, `Schedule`, `KillTask`,
    /// `ProjectTaskHash`. The reply carries the request's
    /// [`crate::envelope::Envelope::id`].
    #[serde(rename = "request")]
    Request(RpcRequest),
    /// Agent → center: the reply to a [`Message::Request`].
    #[serde(rename = "response")]
    Response(RpcResponse),
}

impl From<Event> for Message {
    fn from(event: Event) -> Self {
        Message::CenterEvent(event)
    }
}

impl From<AgentReport> for Message {
    fn from(report: AgentReport) -> Self {
        Message::AgentReport(report)
    }
}

impl From<RpcRequest> for Message {
    fn from(request: RpcRequest) -> Self {
        Message::Request(request)
    }
}

impl From<RpcResponse> for Message {
    fn from(response: RpcResponse) -> Self {
        Message::Response(response)
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
