// SPDX-License-Identifier: MIT

//! Test builders shared across crates. Gated behind `test-support` so
//! downstream crates can depend on `cronmesh-core` with this feature only
//! in `[dev-dependencies]`.

use crate::agent_descriptor::AgentDescriptor;
use crate::task::Task;
use std::collections::BTreeSet;

pub struct TaskBuilder(Task);

impl TaskBuilder {
    pub fn new(project_id: i64, task_id: impl Into<String>) -> Self {
        let task_id = task_id.into();
        Self(Task {
            project_id,
            name: task_id.clone(),
            task_id,
            command: "true".into(),
            cron: String::new(),
            timeout: 0,
            noseize: false,
            remark: String::new(),
        })
    }

    pub fn command(mut self, command: impl Into<String>) -> Self {
        self.0.command = command.into();
        self
    }

    pub fn cron(mut self, cron: impl Into<String>) -> Self {
        self.0.cron = cron.into();
        self
    }

    pub fn timeout(mut self, seconds: i32) -> Self {
        self.0.timeout = seconds;
        self
    }

    pub fn noseize(mut self, noseize: bool) -> Self {
        self.0.noseize = noseize;
        self
    }

    pub fn build(self) -> Task {
        self.0
    }
}

pub struct AgentDescriptorBuilder(AgentDescriptor);

impl AgentDescriptorBuilder {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self(AgentDescriptor {
            endpoint: endpoint.into(),
            organization: "test-org".into(),
            region: "test-region".into(),
            project_ids: BTreeSet::new(),
            weight: 1,
            version: "test".into(),
            registered_at_unix_seconds: 0,
        })
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.0.region = region.into();
        self
    }

    pub fn weight(mut self, weight: u32) -> Self {
        self.0.weight = weight;
        self
    }

    pub fn project(mut self, project_id: i64) -> Self {
        self.0.project_ids.insert(project_id);
        self
    }

    pub fn build(self) -> AgentDescriptor {
        self.0
    }
}
