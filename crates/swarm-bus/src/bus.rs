//! Synchronous, typed, subscription-ordered publish/subscribe event bus.
//!
//! Unlike a channel-based bus, `publish` delivers to every matching
//! subscriber on the publisher's own thread, in the order subscriptions were
//! registered, before returning. Subscribers are iterated over a
//! copy-on-write snapshot so a handler may subscribe or unsubscribe without
//! deadlocking the bus.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use swarm_types::{EventKind, SwarmEvent};
use tracing::warn;

/// Opaque handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Clone)]
struct Subscriber {
    id: SubscriptionId,
    kind: EventKind,
    handler: Arc<dyn Fn(&SwarmEvent) + Send + Sync>,
}

/// Shared event bus. Clone it cheaply — all clones see the same subscriber
/// list.
#[derive(Clone)]
pub struct EventBus {
    subscribers: Arc<RwLock<Arc<Vec<Subscriber>>>>,
    next_id: Arc<AtomicU64>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(RwLock::new(Arc::new(Vec::new()))),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Register `handler` for every event of kind `kind`. Returns a handle
    /// that can later be passed to [`EventBus::unsubscribe`].
    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&SwarmEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut guard = self.subscribers.write();
        let mut next = (**guard).clone();
        next.push(Subscriber { id, kind, handler: Arc::new(handler) });
        *guard = Arc::new(next);
        id
    }

    /// Remove a previously registered subscription. No-op if already
    /// removed.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        let mut guard = self.subscribers.write();
        if !guard.iter().any(|s| s.id == id) {
            return;
        }
        let next: Vec<Subscriber> = (**guard).iter().filter(|s| s.id != id).cloned().collect();
        *guard = Arc::new(next);
    }

    /// Deliver `event` to every current subscriber of its exact kind, in
    /// subscription order. A panicking handler is caught and logged; it
    /// never prevents delivery to the remaining subscribers.
    pub fn publish(&self, event: SwarmEvent) {
        self.publish_filtered(event, |_| true);
    }

    /// Like [`EventBus::publish`], but only dispatches to handlers when
    /// `predicate(&event)` holds.
    pub fn publish_filtered(&self, event: SwarmEvent, predicate: impl Fn(&SwarmEvent) -> bool) {
        let kind = event.kind();
        if !predicate(&event) {
            return;
        }
        // Snapshot outside the lock: a handler that calls subscribe/unsubscribe
        // during delivery mutates a *new* Arc, leaving this iteration's view
        // untouched.
        let snapshot = self.subscribers.read().clone();
        for sub in snapshot.iter().filter(|s| s.kind == kind) {
            let handler = &sub.handler;
            let result = catch_unwind(AssertUnwindSafe(|| handler(&event)));
            if result.is_err() {
                warn!(subscription = sub.id.0, ?kind, "event bus handler panicked");
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
