// SPDX-License-Identifier: MIT

//! Centralized environment variable access for the center crate: each
//! override lives behind one named accessor rather than scattered
//! `std::env::var` calls.

use std::time::Duration;

/// Overrides the listen address from `CenterConfig::listen_address`.
pub fn listen_address() -> Option<String> {
    std::env::var("CRONMESH_CENTER_LISTEN_ADDRESS").ok()
}

/// Overrides `CenterConfig::dispatch_timeout_secs`.
pub fn dispatch_timeout() -> Option<Duration> {
    std::env::var("CRONMESH_CENTER_DISPATCH_TIMEOUT_MS").ok().and_then(|s| s.parse::<u64>().ok()).map(Duration::from_millis)
}

/// Overrides `CenterConfig::log_level`.
pub fn log_level() -> Option<String> {
    std::env::var("CRONMESH_CENTER_LOG_LEVEL").ok().filter(|s| !s.is_empty())
}
