// SPDX-License-Identifier: MIT

//! The add/remove stream returned by [`crate::Registry::watch`].

use cronmesh_core::AgentDescriptor;

/// One change observed by a [`crate::Registry::watch`] subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    Added(AgentDescriptor),
    Removed(AgentDescriptor),
}
