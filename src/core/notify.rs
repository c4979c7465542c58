//! Change-notification registry wiring graph objects to inspector fields.
//!
//! Observers register a callback for [`GraphNotice`]s; emitting invokes
//! every callback synchronously, in registration order. There is no
//! filtering on the hub side - notices are cheap and each observer matches
//! the variants (and object ids) it cares about.
//!
//! Registrations are revocable: subscribe() returns a [`SubscriptionId`],
//! watch() returns an RAII [`Subscription`] guard that unsubscribes on
//! drop. Inspector fields hold these guards next to their widget state so
//! a destroyed field never has its callback invoked again.
//!
//! Threading: emit() may be called from any thread (the busy broadcast
//! comes from worker threads). Callbacks must confine themselves to
//! flipping flags; widget state is only touched on the UI thread during
//! the frame. Callbacks are cloned out of the registry before invocation,
//! so a callback may itself (un)subscribe without deadlocking.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::graph::events::GraphNotice;

type Callback = Arc<dyn Fn(&GraphNotice) + Send + Sync>;

/// Identifies one registered callback; returned by subscribe().
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Shared observer registry. Cloning yields another handle to the same
/// registry; the graph hands clones to its nodes and attributes.
#[derive(Clone)]
pub struct NotifyHub {
    observers: Arc<RwLock<Vec<(SubscriptionId, Callback)>>>,
    next_id: Arc<AtomicU64>,
}

impl Default for NotifyHub {
    fn default() -> Self {
        Self::new()
    }
}

impl NotifyHub {
    pub fn new() -> Self {
        Self {
            observers: Arc::new(RwLock::new(Vec::new())),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Register a callback for every notice. Keep callbacks to flag flips;
    /// mutate state on the UI thread.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&GraphNotice) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.observers
            .write()
            .expect("observer registry poisoned")
            .push((id, Arc::new(callback)));
        id
    }

    /// Register and get an RAII guard; dropping the guard unsubscribes.
    pub fn watch<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&GraphNotice) + Send + Sync + 'static,
    {
        Subscription {
            hub: self.clone(),
            id: self.subscribe(callback),
        }
    }

    /// Remove one registered callback.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.observers
            .write()
            .expect("observer registry poisoned")
            .retain(|(sub_id, _)| *sub_id != id);
    }

    /// Invoke every observer with `notice`, in registration order.
    pub fn emit(&self, notice: GraphNotice) {
        let callbacks: Vec<Callback> = self
            .observers
            .read()
            .expect("observer registry poisoned")
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();
        for cb in callbacks {
            cb(&notice);
        }
    }
}

impl std::fmt::Debug for NotifyHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifyHub")
            .field("observers", &self.observers.read().map(|o| o.len()).unwrap_or(0))
            .finish()
    }
}

/// RAII registration guard. Dropping it revokes the callback.
pub struct Subscription {
    hub: NotifyHub,
    id: SubscriptionId,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.hub.unsubscribe(self.id);
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
