// SPDX-License-Identifier: MIT

//! The center's live handle to one connected agent: issues RPCs over the
//! agent-initiated Event Channel connection and pushes fire-and-forget
//! [`Event`]s.
//!
//! The agent dials the center at startup, so there is no outbound
//! connection for the center to
//! (re)dial itself -- [`crate::transport_factory::CenterTransportFactory`]
//! looks up the live [`AgentHandle`] for an endpoint instead of
//! connecting one.

use cronmesh_core::Event;
use cronmesh_dispatcher::{AgentTransport, TransportError};
use cronmesh_registry::LeaseHandle;
use cronmesh_wire::{Envelope, Message, RpcRequest, RpcResponse, ScheduleStatus};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

/// How long an RPC issued through an [`AgentHandle`] waits for a reply
/// before the attempt is considered a (retryable) transport failure.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

type PendingTable = Mutex<HashMap<Uuid, oneshot::Sender<RpcResponse>>>;

/// Live, per-connection state for one agent. Cloned freely (it's
/// `Arc`-free internally: the type itself is cheap to share behind an
/// `Arc` at the call site) -- the [`crate::session::AgentSession`] read
/// loop and every [`AgentTransport`] call share the same outbound queue
/// and pending-request table.
pub struct AgentHandle {
    endpoint: String,
    pub(crate) project_ids: Vec<i64>,
    pub(crate) organization: String,
    pub(crate) region: String,
    pub(crate) weight: u32,
    lease: LeaseHandle,
    outbound_tx: mpsc::UnboundedSender<Envelope>,
    pending: PendingTable,
    request_timeout: Duration,
}

impl AgentHandle {
    pub fn new(
        endpoint: String,
        project_ids: Vec<i64>,
        organization: String,
        region: String,
        weight: u32,
        lease: LeaseHandle,
        outbound_tx: mpsc::UnboundedSender<Envelope>,
    ) -> Self {
        Self {
            endpoint,
            project_ids,
            organization,
            region,
            weight,
            lease,
            outbound_tx,
            pending: Mutex::new(HashMap::new()),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// The registry lease this connection holds, kept alive on every
    /// `hash_report` -- the Event Channel connection doubles as the
    /// liveness signal, so there is no separate keepalive RPC.
    pub fn lease(&self) -> &LeaseHandle {
        &self.lease
    }

    pub fn serves_project(&self, project_id: i64) -> bool {
        self.project_ids.contains(&project_id)
    }

    /// Fire-and-forget push: `task_saved`, `task_deleted`,
    /// `task_set_refresh`, `reload_config`. No reply is awaited; a dead
    /// connection is detected on the next RPC attempt or the session's own
    /// read loop exit.
    pub fn push_event(&self, event: Event) -> Result<(), TransportError> {
        self.outbound_tx
            .send(Envelope::new(Message::CenterEvent(event)))
            .map_err(|_| TransportError::Unavailable)
    }

    /// Resolves a pending request by its envelope id, called from the
    /// session's read loop when a [`Message::Response`] arrives. Silently
    /// ignored if the id is unknown (duplicate reply, or the requester
    /// already gave up on timeout).
    pub(crate) fn resolve(&self, id: Uuid, response: RpcResponse) {
        if let Some(tx) = self.pending.lock().remove(&id) {
            let _ = tx.send(response);
        }
    }

    /// Fails every in-flight request, called when the connection closes
    /// so callers blocked in [`Self::request`] don't hang until their own
    /// timeout.
    pub(crate) fn fail_all_pending(&self) {
        for (_, tx) in self.pending.lock().drain() {
            drop(tx); // dropping the sender fails the receiver with RecvError
        }
    }

    async fn request(&self, request: RpcRequest) -> Result<RpcResponse, TransportError> {
        let id = Uuid::new_v4();
        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(id, tx);

        let envelope = Envelope { id, headers: Default::default(), body: Message::Request(request) };
        if self.outbound_tx.send(envelope).is_err() {
            self.pending.lock().remove(&id);
            return Err(TransportError::Unavailable);
        }

        match tokio::time::timeout(self.request_timeout, rx).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(_)) => Err(TransportError::Unavailable), // sender dropped: connection closed
            Err(_) => {
                self.pending.lock().remove(&id);
                Err(TransportError::DeadlineExceeded)
            }
        }
    }
}

#[async_trait::async_trait]
impl AgentTransport for AgentHandle {
    async fn check_running(&self, project_id: i64, task_id: &str) -> Result<(bool, String), TransportError> {
        match self.request(RpcRequest::CheckRunning { project_id, task_id: task_id.to_string() }).await? {
            RpcResponse::CheckRunning { running, message } => Ok((running, message)),
            _ => Err(TransportError::Transport("unexpected response to check_running".into())),
        }
    }

    async fn schedule(&self, event: Event) -> Result<ScheduleStatus, TransportError> {
        match self.request(RpcRequest::Schedule { event }).await? {
            RpcResponse::Schedule { status } => Ok(status),
            _ => Err(TransportError::Transport("unexpected response to schedule".into())),
        }
    }

    async fn kill_task(&self, project_id: i64, task_id: &str) -> Result<ScheduleStatus, TransportError> {
        match self.request(RpcRequest::KillTask { project_id, task_id: task_id.to_string() }).await? {
            RpcResponse::KillTask { status } => Ok(status),
            _ => Err(TransportError::Transport("unexpected response to kill_task".into())),
        }
    }

    async fn project_task_hash(&self, project_id: i64) -> Result<(String, u64), TransportError> {
        match self.request(RpcRequest::ProjectTaskHash { project_id }).await? {
            RpcResponse::ProjectTaskHash { hash, latest_update_unix_seconds } => {
                Ok((hash, latest_update_unix_seconds))
            }
            _ => Err(TransportError::Transport("unexpected response to project_task_hash".into())),
        }
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[cfg(test)]
#[path = "agent_handle_tests.rs"]
mod tests;
