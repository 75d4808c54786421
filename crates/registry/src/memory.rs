// SPDX-License-Identifier: MIT

//! Single-process `Registry` implementation. Used for the single-binary
//! deployment and for every test in this workspace that needs a registry.

use crate::error::RegistryError;
use crate::filter::LookupFilter;
use crate::lease::LeaseHandle;
use crate::registry_trait::Registry;
use crate::subscription::Subscription;
use crate::watch::WatchEvent;
use async_trait::async_trait;
use cronmesh_core::{AgentDescriptor, Clock, LeaseId, SystemClock};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::broadcast;

const WATCH_CHANNEL_CAPACITY: usize = 256;

struct Entry {
    lease_id: LeaseId,
    descriptor: AgentDescriptor,
    /// Unix-seconds deadline, computed from the clock at register/keepalive time.
    expires_at_unix_seconds: u64,
}

struct Inner {
    /// Keyed by endpoint: an agent reappearing with the same endpoint
    /// replaces the prior descriptor.
    by_endpoint: HashMap<String, Entry>,
}

/// In-memory [`Registry`]. Lease expiry is swept lazily on every
/// operation plus on an explicit [`InMemoryRegistry::sweep_expired`] call
/// a background task can drive on an interval — there is no hidden timer
/// thread, so tests using [`cronmesh_core::FakeClock`] see exactly the
/// expirations their clock advances produce.
pub struct InMemoryRegistry<C: Clock = SystemClock> {
    clock: C,
    inner: Mutex<Inner>,
    watch_tx: broadcast::Sender<WatchEvent>,
}

impl InMemoryRegistry<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for InMemoryRegistry<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> InMemoryRegistry<C> {
    pub fn with_clock(clock: C) -> Self {
        let (watch_tx, _) = broadcast::channel(WATCH_CHANNEL_CAPACITY);
        Self { clock, inner: Mutex::new(Inner { by_endpoint: HashMap::new() }), watch_tx }
    }

    /// Remove every entry whose lease has expired, broadcasting a
    /// `Removed` event for each. Returns the removed descriptors.
    pub fn sweep_expired(&self) -> Vec<AgentDescriptor> {
        let now = self.clock.unix_seconds();
        let mut removed = Vec::new();
        {
            let mut inner = self.inner.lock();
            inner.by_endpoint.retain(|_, entry| {
                if entry.expires_at_unix_seconds <= now {
                    removed.push(entry.descriptor.clone());
                    false
                } else {
                    true
                }
            });
        }
        for descriptor in &removed {
            let _ = self.watch_tx.send(WatchEvent::Removed(descriptor.clone()));
        }
        removed
    }

    fn find_by_lease(&self, lease: &LeaseHandle) -> Option<String> {
        let inner = self.inner.lock();
        inner
            .by_endpoint
            .iter()
            .find(|(_, entry)| entry.lease_id == lease.id)
            .map(|(endpoint, _)| endpoint.clone())
    }
}

#[async_trait]
impl<C: Clock> Registry for InMemoryRegistry<C> {
    async fn register(
        &self,
        descriptor: AgentDescriptor,
        ttl: Duration,
    ) -> Result<LeaseHandle, RegistryError> {
        if ttl.is_zero() {
            return Err(RegistryError::ZeroTtl);
        }
        self.sweep_expired();
        let lease = LeaseHandle::new(ttl);
        let entry = Entry {
            lease_id: lease.id.clone(),
            descriptor: descriptor.clone(),
            expires_at_unix_seconds: self.clock.unix_seconds() + ttl.as_secs(),
        };
        self.inner.lock().by_endpoint.insert(descriptor.endpoint.clone(), entry);
        let _ = self.watch_tx.send(WatchEvent::Added(descriptor));
        Ok(lease)
    }

    async fn keepalive(&self, lease: &LeaseHandle) -> Result<(), RegistryError> {
        self.sweep_expired();
        let endpoint = self.find_by_lease(lease).ok_or(RegistryError::LeaseNotFound)?;
        let mut inner = self.inner.lock();
        let entry = inner.by_endpoint.get_mut(&endpoint).ok_or(RegistryError::LeaseNotFound)?;
        entry.expires_at_unix_seconds = self.clock.unix_seconds() + lease.ttl.as_secs();
        Ok(())
    }

    async fn deregister(&self, lease: &LeaseHandle) -> Result<(), RegistryError> {
        let endpoint = self.find_by_lease(lease).ok_or(RegistryError::LeaseNotFound)?;
        let removed = self.inner.lock().by_endpoint.remove(&endpoint);
        if let Some(entry) = removed {
            let _ = self.watch_tx.send(WatchEvent::Removed(entry.descriptor));
            Ok(())
        } else {
            Err(RegistryError::LeaseNotFound)
        }
    }

    async fn watch(&self, filter: LookupFilter) -> Subscription {
        Subscription::new(self.watch_tx.subscribe(), filter)
    }

    async fn lookup(&self, filter: &LookupFilter) -> Vec<AgentDescriptor> {
        self.sweep_expired();
        self.inner
            .lock()
            .by_endpoint
            .values()
            .map(|e| &e.descriptor)
            .filter(|d| filter.matches(d))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
