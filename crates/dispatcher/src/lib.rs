// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cronmesh-dispatcher: maps a single dispatch intent to exactly one live
//! agent, issues the `Schedule` RPC, and handles retry/fallback on
//! transient failures.

pub mod client_cache;
pub mod dispatcher;
pub mod error;
pub mod intent;
pub mod select;
pub mod transport;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use client_cache::{ClientCache, TransportFactory};
pub use dispatcher::Dispatcher;
pub use error::{DispatchError, TransportError};
pub use intent::{DispatchIntent, DispatchOutcome};
pub use transport::AgentTransport;
