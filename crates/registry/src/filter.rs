// SPDX-License-Identifier: MIT

//! The `(organization, region, project_id)` filter used by [`crate::Registry::lookup`]
//! and [`crate::Registry::watch`].

/// Selects the set of agents a [`crate::Registry::lookup`] or
/// [`crate::Registry::watch`] call is interested in.
///
/// `region` of `""` or `"*"` matches any region (mirrored by
/// [`cronmesh_core::AgentDescriptor::matches_region`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupFilter {
    pub organization: String,
    pub region: String,
    pub project_id: i64,
}

impl LookupFilter {
    pub fn new(organization: impl Into<String>, region: impl Into<String>, project_id: i64) -> Self {
        Self { organization: organization.into(), region: region.into(), project_id }
    }

    pub fn matches(&self, descriptor: &cronmesh_core::AgentDescriptor) -> bool {
        descriptor.organization == self.organization
            && descriptor.matches_region(&self.region)
            && descriptor.serves_project(self.project_id)
    }
}

#[cfg(test)]
#[path = "filter_tests.rs"]
mod tests;
