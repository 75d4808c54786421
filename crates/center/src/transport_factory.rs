// SPDX-License-Identifier: MIT

//! The live-connection table the Dispatcher's
//! [`cronmesh_dispatcher::TransportFactory`] seam is backed by on the
//! center side, plus the stub returned for an endpoint with no open
//! connection.

use crate::agent_handle::AgentHandle;
use async_trait::async_trait;
use cronmesh_core::Event;
use cronmesh_dispatcher::{AgentTransport, TransportError, TransportFactory};
use cronmesh_wire::ScheduleStatus;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// `endpoint -> live AgentHandle`, populated on `hello` and cleared when
/// the session's read loop exits. This is the center-side analogue of an
/// agent-stub cache -- except there is nothing to redial: the agent owns
/// the dial direction, so a missing entry means "no connection right
/// now", not "stale, reconnect it".
#[derive(Default)]
pub struct ConnectionTable {
    by_endpoint: Mutex<HashMap<String, Arc<AgentHandle>>>,
}

impl ConnectionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, handle: Arc<AgentHandle>) {
        self.by_endpoint.lock().insert(handle.endpoint().to_string(), handle);
    }

    pub fn remove(&self, endpoint: &str) -> Option<Arc<AgentHandle>> {
        self.by_endpoint.lock().remove(endpoint)
    }

    pub fn get(&self, endpoint: &str) -> Option<Arc<AgentHandle>> {
        self.by_endpoint.lock().get(endpoint).cloned()
    }

    pub fn all(&self) -> Vec<Arc<AgentHandle>> {
        self.by_endpoint.lock().values().cloned().collect()
    }
}

/// Placeholder [`AgentTransport`] for an endpoint the
/// [`ConnectionTable`] doesn't currently hold a connection for. Every
/// call fails retryable, so the Dispatcher's candidate loop moves on to
/// the next agent rather than treating this as a hard error.
struct DisconnectedTransport {
    endpoint: String,
}

#[async_trait]
impl AgentTransport for DisconnectedTransport {
    async fn check_running(&self, _project_id: i64, _task_id: &str) -> Result<(bool, String), TransportError> {
        Err(TransportError::Unavailable)
    }

    async fn schedule(&self, _event: Event) -> Result<ScheduleStatus, TransportError> {
        Err(TransportError::Unavailable)
    }

    async fn kill_task(&self, _project_id: i64, _task_id: &str) -> Result<ScheduleStatus, TransportError> {
        Err(TransportError::Unavailable)
    }

    async fn project_task_hash(&self, _project_id: i64) -> Result<(String, u64), TransportError> {
        Err(TransportError::Unavailable)
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

pub struct CenterTransportFactory {
    connections: Arc<ConnectionTable>,
}

impl CenterTransportFactory {
    pub fn new(connections: Arc<ConnectionTable>) -> Self {
        Self { connections }
    }
}

impl TransportFactory for CenterTransportFactory {
    fn connect(&self, endpoint: &str) -> Arc<dyn AgentTransport> {
        if let Some(handle) = self.connections.get(endpoint) {
            return handle;
        }
        Arc::new(DisconnectedTransport { endpoint: endpoint.to_string() })
    }
}

#[cfg(test)]
#[path = "transport_factory_tests.rs"]
mod tests;
