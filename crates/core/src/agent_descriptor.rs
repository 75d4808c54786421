// SPDX-License-Identifier: MIT

//! Service-discovery record for one agent process.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A live agent, as seen by the Registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDescriptor {
    pub endpoint: String,
    pub organization: String,
    pub region: String,
    pub project_ids: BTreeSet<i64>,
    /// Non-negative dispatch weight; zero means draining (retains running
    /// tasks, accepts no new dispatches).
    pub weight: u32,
    pub version: String,
    pub registered_at_unix_seconds: u64,
}

impl AgentDescriptor {
    pub fn is_draining(&self) -> bool {
        self.weight == 0
    }

    /// Region "`*`" or empty in a lookup filter matches any region.
    pub fn matches_region(&self, region_hint: &str) -> bool {
        region_hint.is_empty() || region_hint == "*" || self.region == region_hint
    }

    pub fn serves_project(&self, project_id: i64) -> bool {
        self.project_ids.contains(&project_id)
    }
}

#[cfg(test)]
#[path = "agent_descriptor_tests.rs"]
mod tests;
