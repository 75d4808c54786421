// SPDX-License-Identifier: MIT

//! Center-side agent-stub cache: recreated on each redial, closing the
//! previous stub before the new one is installed so no two live stubs
//! ever exist for the same endpoint.

use crate::transport::AgentTransport;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Builds a fresh [`AgentTransport`] for an endpoint. Implemented once in
/// `cronmesh-center` for the real WebSocket-backed client; tests supply a
/// closure or fake.
pub trait TransportFactory: Send + Sync {
    fn connect(&self, endpoint: &str) -> Arc<dyn AgentTransport>;
}

impl<F> TransportFactory for F
where
    F: Fn(&str) -> Arc<dyn AgentTransport> + Send + Sync,
{
    fn connect(&self, endpoint: &str) -> Arc<dyn AgentTransport> {
        self(endpoint)
    }
}

/// Caches one stub per agent endpoint. `redial` drops the previous stub
/// (an `Arc` whose last reference goes out of scope here, running whatever
/// `Drop` the concrete transport has for closing its connection) before
/// the replacement is inserted, so no two live stubs for the same
/// endpoint ever coexist.
pub struct ClientCache<F: TransportFactory> {
    factory: F,
    stubs: Mutex<HashMap<String, Arc<dyn AgentTransport>>>,
}

impl<F: TransportFactory> ClientCache<F> {
    pub fn new(factory: F) -> Self {
        Self { factory, stubs: Mutex::new(HashMap::new()) }
    }

    /// Returns the cached stub for `endpoint`, connecting one if absent.
    pub fn get_or_connect(&self, endpoint: &str) -> Arc<dyn AgentTransport> {
        if let Some(stub) = self.stubs.lock().get(endpoint).cloned() {
            return stub;
        }
        let stub = self.factory.connect(endpoint);
        self.stubs.lock().insert(endpoint.to_string(), stub.clone());
        stub
    }

    /// Forces a fresh connection for `endpoint`, closing the previous one
    /// first. Called after a transport error so a stale stub is never
    /// reused for the retry.
    pub fn redial(&self, endpoint: &str) -> Arc<dyn AgentTransport> {
        let old = self.stubs.lock().remove(endpoint);
        drop(old);
        let stub = self.factory.connect(endpoint);
        self.stubs.lock().insert(endpoint.to_string(), stub.clone());
        stub
    }

    pub fn evict(&self, endpoint: &str) {
        self.stubs.lock().remove(endpoint);
    }
}

#[cfg(test)]
#[path = "client_cache_tests.rs"]
mod tests;
