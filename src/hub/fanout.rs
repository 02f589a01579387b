//! The fan-out hub implementation.

use super::types::{HubStats, SubscriptionHandle, SubscriptionId};
use crate::error::FeedError;
use crate::types::{EventKind, FeedEvent};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// A subscriber callback. Runs synchronously on the delivery thread.
pub(super) type Callback = Arc<dyn Fn(&FeedEvent) + Send + Sync>;

/// Hook receiving isolated failures (conversion errors, subscriber
/// panics, channel overflow). Never invoked while a registry lock is held.
type ErrorHook = Arc<dyn Fn(&FeedError) + Send + Sync>;

/// One registered subscriber.
#[derive(Clone)]
struct Subscriber {
    id: SubscriptionId,
    callback: Callback,
}

/// Per-kind dispatch counters.
#[derive(Default)]
struct DispatchCounters {
    status: AtomicU64,
    deleted_status: AtomicU64,
    friends_list: AtomicU64,
}

impl DispatchCounters {
    fn increment(&self, kind: EventKind) {
        match kind {
            EventKind::Status => self.status.fetch_add(1, Ordering::Relaxed),
            EventKind::DeletedStatus => self.deleted_status.fetch_add(1, Ordering::Relaxed),
            EventKind::FriendsList => self.friends_list.fetch_add(1, Ordering::Relaxed),
            EventKind::Unrecognized => return,
        };
    }
}

/// Shared hub state. Handles hold a weak reference to this so release
/// stays safe after the hub is dropped.
pub(crate) struct HubInner {
    /// Subscriber registries, one ordered collection per kind. Mutated
    /// only via register/release; never shared by reference with callers.
    registry: RwLock<HashMap<EventKind, Vec<Subscriber>>>,

    /// Counter for generating subscription IDs.
    next_id: AtomicU64,

    /// Optional side-channel for isolated failures.
    error_hook: RwLock<Option<ErrorHook>>,

    /// Dispatch counts per kind.
    counters: DispatchCounters,
}

impl HubInner {
    /// Remove a subscriber by identity. Idempotent.
    pub(crate) fn release(&self, kind: EventKind, id: SubscriptionId) {
        let mut registry = self.registry.write();
        if let Some(subscribers) = registry.get_mut(&kind) {
            let before = subscribers.len();
            subscribers.retain(|s| s.id != id);
            if subscribers.len() < before {
                debug!(%id, %kind, "subscription released");
            }
        }
    }

    /// Surface an error through the hook, if one is installed. The hook
    /// is cloned out of the lock before invocation so it may itself call
    /// back into the hub.
    pub(crate) fn report(&self, err: &FeedError) {
        let hook = self.error_hook.read().clone();
        if let Some(hook) = hook {
            hook(err);
        }
    }
}

/// The central router: receives converted events and synchronously
/// delivers each to every subscriber registered for its kind, in
/// registration order at dispatch time.
///
/// Callbacks run on the caller's thread. A slow or blocking subscriber
/// delays delivery to every subscriber behind it in the same dispatch and
/// to all subsequent records; there is no internal queue and no timeout.
pub struct FanoutHub {
    inner: Arc<HubInner>,
}

impl FanoutHub {
    /// Create an empty hub. One hub per streaming connection; it has a
    /// single lifecycle state and no persistence across connections.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(HubInner {
                registry: RwLock::new(HashMap::new()),
                next_id: AtomicU64::new(1),
                error_hook: RwLock::new(None),
                counters: DispatchCounters::default(),
            }),
        }
    }

    /// Register a callback for `kind`.
    ///
    /// The callback receives only events classified strictly after
    /// registration; there is no replay.
    pub fn register(
        &self,
        kind: EventKind,
        callback: impl Fn(&FeedEvent) + Send + Sync + 'static,
    ) -> SubscriptionHandle {
        let id = self.allocate_id();
        self.insert(kind, id, Arc::new(callback))
    }

    /// Install the error hook. Replaces any previous hook.
    pub fn set_error_hook(&self, hook: impl Fn(&FeedError) + Send + Sync + 'static) {
        *self.inner.error_hook.write() = Some(Arc::new(hook));
    }

    /// Deliver one event to every subscriber currently registered for its
    /// kind.
    ///
    /// The registry is snapshotted under the lock, then callbacks run in
    /// registration order with the lock released. A panicking callback is
    /// caught, surfaced through the error hook, and does not stop
    /// delivery to the remaining snapshot members or unregister the
    /// offender.
    pub fn dispatch(&self, event: &FeedEvent) {
        let kind = event.kind();

        let snapshot: Vec<Subscriber> = {
            let registry = self.inner.registry.read();
            registry.get(&kind).cloned().unwrap_or_default()
        };

        for subscriber in &snapshot {
            let result = catch_unwind(AssertUnwindSafe(|| (subscriber.callback)(event)));
            if let Err(payload) = result {
                let reason = panic_reason(&payload);
                warn!(id = %subscriber.id, %kind, %reason, "subscriber panicked during dispatch");
                self.inner.report(&FeedError::Subscriber {
                    id: subscriber.id,
                    kind,
                    reason,
                });
            }
        }

        self.inner.counters.increment(kind);
    }

    /// Hub statistics.
    pub fn stats(&self) -> HubStats {
        let active_subscriptions = self.inner.registry.read().values().map(Vec::len).sum();
        HubStats {
            active_subscriptions,
            status_dispatched: self.inner.counters.status.load(Ordering::Relaxed),
            deleted_status_dispatched: self
                .inner
                .counters
                .deleted_status
                .load(Ordering::Relaxed),
            friends_list_dispatched: self.inner.counters.friends_list.load(Ordering::Relaxed),
        }
    }

    pub(super) fn allocate_id(&self) -> SubscriptionId {
        SubscriptionId(self.inner.next_id.fetch_add(1, Ordering::SeqCst))
    }

    pub(super) fn insert(
        &self,
        kind: EventKind,
        id: SubscriptionId,
        callback: Callback,
    ) -> SubscriptionHandle {
        self.inner
            .registry
            .write()
            .entry(kind)
            .or_default()
            .push(Subscriber { id, callback });

        debug!(%id, %kind, "subscription registered");

        SubscriptionHandle {
            id,
            kind,
            hub: Arc::downgrade(&self.inner),
        }
    }

    pub(crate) fn report(&self, err: &FeedError) {
        self.inner.report(err);
    }

    pub(super) fn downgrade(&self) -> std::sync::Weak<HubInner> {
        Arc::downgrade(&self.inner)
    }
}

impl Default for FanoutHub {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for FanoutHub {
    /// Clones share the same registries; useful for registering from
    /// inside a subscriber callback.
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Best-effort description of a panic payload.
fn panic_reason(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
