// SPDX-License-Identifier: MIT

//! Handle returned by [`crate::Registry::watch`].

use crate::filter::LookupFilter;
use crate::watch::WatchEvent;
use tokio::sync::broadcast;

/// A live subscription to registry changes matching a [`crate::LookupFilter`].
///
/// Wraps a [`broadcast::Receiver`] rather than exposing it directly so the
/// lag-handling policy (skip ahead, log, keep reading) and the filter
/// predicate live in one place.
pub struct Subscription {
    inner: broadcast::Receiver<WatchEvent>,
    filter: LookupFilter,
}

impl Subscription {
    pub(crate) fn new(inner: broadcast::Receiver<WatchEvent>, filter: LookupFilter) -> Self {
        Self { inner, filter }
    }

    fn matches(&self, event: &WatchEvent) -> bool {
        match event {
            WatchEvent::Added(d) | WatchEvent::Removed(d) => self.filter.matches(d),
        }
    }

    /// Await the next matching change. Returns `None` once the registry
    /// itself has been dropped; a slow subscriber that falls behind the
    /// broadcast buffer silently skips ahead to the oldest event still
    /// retained (center-side watchers reconcile via `lookup` anyway, so a
    /// dropped intermediate event is not a correctness issue).
    pub async fn recv(&mut self) -> Option<WatchEvent> {
        loop {
            match self.inner.recv().await {
                Ok(event) if self.matches(&event) => return Some(event),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
