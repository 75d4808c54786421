// SPDX-License-Identifier: MIT

//! A lease handle returned by [`crate::Registry::register`].

use cronmesh_core::LeaseId;
use std::time::Duration;

/// Opaque handle an agent holds for as long as it wants to remain
/// registered. `keepalive`/`deregister` take this by value (by reference
/// in the trait) rather than the raw endpoint string, so a caller cannot
/// accidentally renew or drop someone else's registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaseHandle {
    pub id: LeaseId,
    pub ttl: Duration,
}

impl LeaseHandle {
    pub fn new(ttl: Duration) -> Self {
        Self { id: LeaseId::new(), ttl }
    }
}
