// SPDX-License-Identifier: MIT

//! Drives one accepted Event Channel connection: reads the opening
//! `hello`, registers the agent, then answers reports and RPC replies
//! until the connection closes.

use crate::agent_handle::AgentHandle;
use crate::center::Center;
use crate::connection::CenterConnection;
use cronmesh_core::{AgentDescriptor, ExitStatus};
use cronmesh_registry::Registry;
use cronmesh_wire::{AgentReport, Envelope, Message};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Runs one connection to completion. Always returns once the connection
/// closes or errors; never panics on a malformed frame from the peer --
/// a single bad agent never takes the center down.
pub async fn run(mut conn: Box<dyn CenterConnection>, center: Arc<Center>) {
    let hello = match await_hello(conn.as_mut()).await {
        Some(hello) => hello,
        None => {
            warn!("connection closed before sending hello");
            return;
        }
    };

    let descriptor = AgentDescriptor {
        endpoint: hello.agent_ip.clone(),
        organization: hello.organization.clone(),
        region: hello.region.clone(),
        project_ids: hello.project_ids.iter().copied().collect::<BTreeSet<_>>(),
        weight: hello.weight,
        version: hello.agent_version.clone(),
        registered_at_unix_seconds: center.clock_unix_seconds(),
    };
    let lease = match center.registry().register(descriptor, center.lease_ttl()).await {
        Ok(lease) => lease,
        Err(err) => {
            warn!(endpoint = %hello.agent_ip, error = %err, "failed to register agent, dropping connection");
            return;
        }
    };

    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Envelope>();
    let handle = Arc::new(AgentHandle::new(
        hello.agent_ip.clone(),
        hello.project_ids.clone(),
        hello.organization.clone(),
        hello.region.clone(),
        hello.weight,
        lease.clone(),
        outbound_tx,
    ));

    center.connections().insert(handle.clone());
    info!(endpoint = %hello.agent_ip, projects = ?hello.project_ids, "agent connected");

    loop {
        tokio::select! {
            outbound = outbound_rx.recv() => {
                match outbound {
                    Some(envelope) => {
                        if let Err(err) = conn.send(envelope).await {
                            warn!(endpoint = %hello.agent_ip, error = %err, "failed writing to agent, closing");
                            break;
                        }
                    }
                    None => break, // every AgentHandle/Dispatcher reference dropped
                }
            }
            incoming = conn.recv() => {
                match incoming {
                    Ok(Some(envelope)) => handle_incoming(envelope, &handle, &center).await,
                    Ok(None) => {
                        info!(endpoint = %hello.agent_ip, "agent closed the connection");
                        break;
                    }
                    Err(err) => {
                        warn!(endpoint = %hello.agent_ip, error = %err, "event channel read failed, closing");
                        break;
                    }
                }
            }
        }
    }

    center.connections().remove(&hello.agent_ip);
    handle.fail_all_pending();
    let _ = center.registry().deregister(&lease).await;
}

async fn await_hello(conn: &mut dyn CenterConnection) -> Option<cronmesh_wire::Hello> {
    loop {
        match conn.recv().await {
            Ok(Some(Envelope { body: Message::AgentReport(AgentReport::Hello(hello)), .. })) => return Some(hello),
            Ok(Some(_)) => {
                warn!("ignoring message received before hello");
                continue;
            }
            Ok(None) => return None,
            Err(err) => {
                warn!(error = %err, "failed waiting for hello");
                return None;
            }
        }
    }
}

async fn handle_incoming(envelope: Envelope, handle: &Arc<AgentHandle>, center: &Arc<Center>) {
    match envelope.body {
        Message::Response(response) => handle.resolve(envelope.id, response),
        Message::AgentReport(AgentReport::Hello(_)) => {
            warn!("ignoring duplicate hello on an already-established connection");
        }
        Message::AgentReport(AgentReport::HashReport(report)) => {
            center.reconcile_hash(handle, report.project_id, &report.hash).await;
        }
        Message::AgentReport(AgentReport::TaskFinished(report)) => {
            if let Some(tmp_id) = &report.tmp_id {
                center.workflow().report_task_finished(tmp_id, &report.exit_status);
            }
            log_task_finished(&report.project_id, &report.task_id, &report.exit_status);
        }
        Message::CenterEvent(_) | Message::Request(_) => {
            warn!("ignoring agent -> center message traveling in the wrong direction");
        }
    }
}

fn log_task_finished(project_id: &i64, task_id: &str, exit_status: &ExitStatus) {
    info!(project_id, task_id, ?exit_status, "task_finished");
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
