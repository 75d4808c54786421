// SPDX-License-Identifier: MIT

//! A single dispatch intent: run this plan now, optionally constrained
//! to a region.

use cronmesh_core::Plan;

#[derive(Debug, Clone)]
pub struct DispatchIntent {
    pub plan: Plan,
    /// Empty matches any region.
    pub region_hint: String,
}

impl DispatchIntent {
    pub fn new(plan: Plan) -> Self {
        Self { plan, region_hint: String::new() }
    }

    pub fn with_region(mut self, region_hint: impl Into<String>) -> Self {
        self.region_hint = region_hint.into();
        self
    }
}

/// The chosen agent and, for dispatches the caller may want to correlate
/// against a later `task_finished`, the id that was put on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub endpoint: String,
    pub tmp_id: cronmesh_core::TmpId,
}
