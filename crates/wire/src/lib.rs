// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cronmesh-wire: the Event Channel's wire format — envelopes, the
//! bidirectional message body, newline-delimited JSON framing, and the
//! Task/Schedule-status payload shapes carried inside them.

pub mod agent_report;
pub mod codec;
pub mod envelope;
pub mod message;
pub mod rpc;
pub mod status;
pub mod task_payload;

pub use agent_report::{AgentReport, HashReport, Hello, TaskFinishedReport};
pub use codec::{CodecError, EnvelopeCodec};
pub use envelope::{Envelope, HEADER_AGENT_IP, HEADER_AGENT_VERSION};
pub use message::Message;
pub use rpc::{RpcRequest, RpcResponse};
pub use status::ScheduleStatus;
pub use task_payload::{PayloadError, TaskPayload};
