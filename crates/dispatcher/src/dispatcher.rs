// SPDX-License-Identifier: MIT

//! Maps one [`crate::intent::DispatchIntent`] to exactly one live agent
//! and issues the `Schedule` RPC.

use crate::client_cache::{ClientCache, TransportFactory};
use crate::error::DispatchError;
use crate::intent::{DispatchIntent, DispatchOutcome};
use crate::select::weighted_choice;
use cronmesh_core::{AgentDescriptor, Event, EventTarget, Plan, PlanKind, TmpId};
use cronmesh_registry::{LookupFilter, Registry};
use cronmesh_wire::ScheduleStatus;
use rand::thread_rng;
use std::sync::Arc;
use tracing::{info, warn};

/// Up to `min(3, |candidates|)` attempts total.
const MAX_ATTEMPTS: usize = 3;

pub struct Dispatcher<F: TransportFactory> {
    organization: String,
    registry: Arc<dyn Registry>,
    cache: ClientCache<F>,
}

impl<F: TransportFactory> Dispatcher<F> {
    pub fn new(organization: impl Into<String>, registry: Arc<dyn Registry>, factory: F) -> Self {
        Self { organization: organization.into(), registry, cache: ClientCache::new(factory) }
    }

    #[tracing::instrument(skip(self, intent), fields(project_id = intent.plan.task.project_id, task_id = %intent.plan.task.task_id))]
    pub async fn dispatch(&self, intent: DispatchIntent) -> Result<DispatchOutcome, DispatchError> {
        intent.plan.task.validate().map_err(|_| DispatchError::InvalidTask)?;

        let filter = LookupFilter::new(
            self.organization.clone(),
            intent.region_hint.clone(),
            intent.plan.task.project_id,
        );
        let mut candidates: Vec<AgentDescriptor> =
            self.registry.lookup(&filter).await.into_iter().filter(|a| !a.is_draining()).collect();
        if candidates.is_empty() {
            return Err(DispatchError::NoAgents);
        }

        let attempts = MAX_ATTEMPTS.min(candidates.len());
        let (event, tmp_id) = build_event(&intent.plan)?;

        let mut rng = thread_rng();
        for attempt in 0..attempts {
            let Some(idx) = weighted_choice(&mut rng, &candidates) else { break };
            let candidate = candidates.remove(idx);
            let transport = self.cache.get_or_connect(&candidate.endpoint);

            match transport.schedule(event.clone()).await {
                Ok(status) => {
                    return self.handle_status(status, &intent.plan, &candidate.endpoint, &tmp_id);
                }
                Err(transport_err) if transport_err.is_retryable() => {
                    warn!(endpoint = %candidate.endpoint, attempt, error = %transport_err, "transport error, trying next candidate");
                    self.cache.evict(&candidate.endpoint);
                    continue;
                }
                Err(transport_err) => {
                    return Err(DispatchError::Rejected(transport_err.to_string()));
                }
            }
        }
        Err(DispatchError::AllUnavailable)
    }

    /// Direct stop to a specific, already-known hosting agent — the
    /// Workflow Engine knows which agent is running a node, so this
    /// bypasses candidate selection entirely.
    pub async fn stop_on(
        &self,
        endpoint: &str,
        project_id: i64,
        task_id: &str,
    ) -> Result<ScheduleStatus, DispatchError> {
        let transport = self.cache.get_or_connect(endpoint);
        let event = Event::TaskStop {
            target: EventTarget::Agent(endpoint.to_string()),
            project_id,
            task_id: task_id.to_string(),
        };
        transport.schedule(event).await.map_err(|e| DispatchError::Rejected(e.to_string()))
    }

    fn handle_status(
        &self,
        status: ScheduleStatus,
        plan: &Plan,
        endpoint: &str,
        tmp_id: &TmpId,
    ) -> Result<DispatchOutcome, DispatchError> {
        match status {
            ScheduleStatus::Ok => {
                info!(endpoint, "dispatched");
                Ok(DispatchOutcome { endpoint: endpoint.to_string(), tmp_id: tmp_id.clone() })
            }
            ScheduleStatus::AlreadyExists if plan.already_running_is_success() => {
                Ok(DispatchOutcome { endpoint: endpoint.to_string(), tmp_id: tmp_id.clone() })
            }
            ScheduleStatus::AlreadyExists => {
                Err(DispatchError::Rejected("already_exists".to_string()))
            }
            ScheduleStatus::InvalidArgument => Err(DispatchError::InvalidTask),
            ScheduleStatus::Aborted | ScheduleStatus::Internal => {
                Err(DispatchError::Rejected(status.to_string()))
            }
        }
    }
}

/// Builds the wire [`Event`] for a plan. Periodic plans are fired locally
/// by the agent's own timer and never flow through the Dispatcher;
/// constructing one here is a caller bug.
fn build_event(plan: &Plan) -> Result<(Event, TmpId), DispatchError> {
    match &plan.kind {
        PlanKind::Active => {
            let tmp_id = TmpId::new();
            let target = EventTarget::project(plan.task.project_id);
            Ok((Event::ScheduleTmp { target, task: plan.task.clone(), tmp_id: tmp_id.clone() }, tmp_id))
        }
        PlanKind::WorkflowStep { run_id, tmp_id } => {
            let target = EventTarget::project(plan.task.project_id);
            Ok((
                Event::ScheduleWorkflow {
                    target,
                    task: plan.task.clone(),
                    run_id: run_id.clone(),
                    tmp_id: tmp_id.clone(),
                },
                tmp_id.clone(),
            ))
        }
        PlanKind::Periodic { .. } => Err(DispatchError::InvalidTask),
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
