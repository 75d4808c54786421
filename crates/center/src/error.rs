// SPDX-License-Identifier: MIT

//! Errors surfaced by the center-side Event Channel host and agent
//! registry glue.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("malformed envelope: {0}")]
    Codec(String),
    #[error("connection closed")]
    Closed,
}

#[derive(Debug, Error)]
pub enum CenterError {
    #[error(transparent)]
    Registry(#[from] cronmesh_registry::RegistryError),
    #[error("agent {0:?} is not currently connected")]
    AgentNotConnected(String),
    #[error("failed to bind listener on {address}: {source}")]
    Bind { address: String, #[source] source: std::io::Error },
}
