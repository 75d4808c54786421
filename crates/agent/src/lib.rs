// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cronmesh-agent: the per-process Agent Scheduler and its Event Channel
//! client.

pub mod backoff;
pub mod channel;
pub mod error;
pub mod execution;
pub mod periodic;
pub mod process;
pub mod scheduler;
pub mod sink;
pub mod ws_transport;

pub use channel::{AgentChannel, AgentIdentity, ChannelConnection, ChannelDialer};
pub use error::{ChannelError, SchedulerError};
pub use execution::{ExecutionRecord, ExecutionSnapshot, ExecutionTable};
pub use periodic::PeriodicRegistry;
pub use scheduler::AgentScheduler;
pub use sink::{LogSink, StreamKind, TailBuffer, TracingLogSink};
pub use ws_transport::WsDialer;
