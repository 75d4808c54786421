// SPDX-License-Identifier: MIT

//! The discovery trait other crates depend on. This core does not
//! implement its own service-discovery transport;
//! [`crate::InMemoryRegistry`] is the single-binary/test implementation,
//! and this trait is the seam a production deployment swaps an
//! etcd/Consul/k8s-backed implementation behind.

use crate::error::RegistryError;
use crate::filter::LookupFilter;
use crate::lease::LeaseHandle;
use crate::subscription::Subscription;
use async_trait::async_trait;
use cronmesh_core::AgentDescriptor;
use std::time::Duration;

#[async_trait]
pub trait Registry: Send + Sync {
    /// Agent appears. Returns a lease the agent must renew within `ttl`.
    async fn register(
        &self,
        descriptor: AgentDescriptor,
        ttl: Duration,
    ) -> Result<LeaseHandle, RegistryError>;

    /// Renews a lease's TTL, resetting its expiry clock.
    async fn keepalive(&self, lease: &LeaseHandle) -> Result<(), RegistryError>;

    /// Graceful departure; removes the descriptor immediately and emits a
    /// `Removed` event to current watchers.
    async fn deregister(&self, lease: &LeaseHandle) -> Result<(), RegistryError>;

    /// Subscribe to added/removed changes matching `filter`.
    async fn watch(&self, filter: LookupFilter) -> Subscription;

    /// Synchronous snapshot query.
    async fn lookup(&self, filter: &LookupFilter) -> Vec<AgentDescriptor>;
}
