// SPDX-License-Identifier: MIT

//! Ties the Registry, the live agent connections, the Dispatcher, and the
//! Workflow Engine together behind the handful of operations the HTTP/CLI
//! edge (out of scope here) would otherwise call directly: task CRUD
//! pushes, workflow start/kill, hash reconciliation.

use crate::task_store::InMemoryTaskStore;
use crate::transport_factory::{CenterTransportFactory, ConnectionTable};
use cronmesh_core::{CenterConfig, Clock, Event, EventTarget, RunId, SystemClock, Task, Workflow};
use cronmesh_dispatcher::{AgentTransport, Dispatcher};
use cronmesh_registry::Registry;
use cronmesh_workflow::{TaskLookup, WorkflowEngine, WorkflowError};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::agent_handle::AgentHandle;

pub struct Center {
    config: CenterConfig,
    registry: Arc<dyn Registry>,
    task_store: Arc<InMemoryTaskStore>,
    connections: Arc<ConnectionTable>,
    dispatcher: Arc<Dispatcher<CenterTransportFactory>>,
    workflow: Arc<WorkflowEngine<CenterTransportFactory>>,
    clock: SystemClock,
}

impl Center {
    pub fn new(config: CenterConfig, registry: Arc<dyn Registry>, task_store: Arc<InMemoryTaskStore>) -> Self {
        let connections = Arc::new(ConnectionTable::new());
        let factory = CenterTransportFactory::new(connections.clone());
        let dispatcher = Arc::new(Dispatcher::new(config.organization.clone(), registry.clone(), factory));
        let lookup: Arc<dyn TaskLookup> = task_store.clone();
        let workflow = Arc::new(WorkflowEngine::new(dispatcher.clone(), lookup));
        Self { config, registry, task_store, connections, dispatcher, workflow, clock: SystemClock }
    }

    pub fn registry(&self) -> &Arc<dyn Registry> {
        &self.registry
    }

    pub fn connections(&self) -> &Arc<ConnectionTable> {
        &self.connections
    }

    pub fn workflow(&self) -> &Arc<WorkflowEngine<CenterTransportFactory>> {
        &self.workflow
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher<CenterTransportFactory>> {
        &self.dispatcher
    }

    pub fn task_store(&self) -> &Arc<InMemoryTaskStore> {
        &self.task_store
    }

    pub fn lease_ttl(&self) -> Duration {
        self.config.lease_ttl()
    }

    pub fn listen_address(&self) -> &str {
        &self.config.listen_address
    }

    pub fn clock_unix_seconds(&self) -> u64 {
        self.clock.unix_seconds()
    }

    /// Saves a task definition and pushes `task_saved` to every agent
    /// declaring membership in its project.
    pub fn save_task(&self, task: Task) {
        let project_id = task.project_id;
        self.task_store.save_task(task.clone());
        self.push_to_project(project_id, Event::TaskSaved { target: EventTarget::project(project_id), task });
    }

    /// Deletes a task definition and pushes `task_deleted`.
    pub fn delete_task(&self, project_id: i64, task_id: &str) {
        self.task_store.delete_task(project_id, task_id);
        self.push_to_project(
            project_id,
            Event::TaskDeleted { target: EventTarget::project(project_id), project_id, task_id: task_id.to_string() },
        );
    }

    /// Stops a task wherever it may be running. The center does not track
    /// which single agent a non-workflow dispatch landed on, so the stop
    /// is broadcast to every agent declaring the project -- idempotent,
    /// since stopping a task that isn't running is not an error.
    pub fn kill_task(&self, project_id: i64, task_id: &str) {
        self.push_to_project(
            project_id,
            Event::TaskStop { target: EventTarget::project(project_id), project_id, task_id: task_id.to_string() },
        );
    }

    pub fn start_workflow(&self, workflow: Workflow, region_hint: String) -> Result<RunId, WorkflowError> {
        self.workflow.start(workflow, region_hint)
    }

    pub fn kill_workflow(&self, run_id: &RunId) -> Result<(), WorkflowError> {
        self.workflow.kill(run_id)
    }

    /// Compares an agent's reported task-set hash against this center's
    /// own view and pushes a full refresh on mismatch.
    pub async fn reconcile_hash(&self, handle: &Arc<AgentHandle>, project_id: i64, reported_hash: &str) {
        let _ = self.registry.keepalive(handle.lease()).await;
        let expected = self.task_store.hash_for_project(project_id);
        if expected == reported_hash {
            return;
        }
        let tasks = self.task_store.tasks_for_project(project_id);
        info!(endpoint = handle.endpoint(), project_id, "task-set hash mismatch, pushing refresh");
        if let Err(err) = handle.push_event(Event::TaskSetRefresh {
            target: EventTarget::project(project_id),
            project_id,
            tasks,
        }) {
            warn!(endpoint = handle.endpoint(), error = %err, "failed to push task-set refresh");
        }
    }

    fn push_to_project(&self, project_id: i64, event: Event) {
        for handle in self.connections.all() {
            if handle.serves_project(project_id) {
                if let Err(err) = handle.push_event(event.clone()) {
                    warn!(endpoint = handle.endpoint(), error = %err, "failed to push event");
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "center_tests.rs"]
mod tests;
