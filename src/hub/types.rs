//! Subscription identity and handle types.

use super::fanout::HubInner;
use crate::types::EventKind;
use std::fmt;
use std::sync::Weak;

/// Unique identifier for a subscription. Synthetic, never content-derived.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

impl fmt::Debug for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubscriptionId({})", self.0)
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle to a registered subscriber.
///
/// Its sole operation is [`release`](Self::release), which removes the
/// subscriber from the hub's registry. The handle carries an identity and
/// a weak back-reference, not a live reference into the registry, so
/// release is safe at any time: repeatedly, from inside the executing
/// callback, or after the hub itself is gone.
///
/// Dropping the handle without calling `release` leaves the subscriber
/// registered until the hub is torn down.
pub struct SubscriptionHandle {
    pub(super) id: SubscriptionId,
    pub(super) kind: EventKind,
    pub(super) hub: Weak<HubInner>,
}

impl SubscriptionHandle {
    /// The identity of this subscription.
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// The kind this subscription receives.
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Remove the subscriber from its kind's registry.
    ///
    /// Idempotent: releasing an already-released handle is a no-op. Takes
    /// effect no later than the next dispatch for this kind; an in-flight
    /// dispatch that already snapshotted the registry is unaffected.
    pub fn release(&self) {
        if let Some(hub) = self.hub.upgrade() {
            hub.release(self.kind, self.id);
        }
    }
}

impl fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Hub statistics.
#[derive(Clone, Copy, Debug, Default)]
pub struct HubStats {
    /// Currently registered subscribers across all kinds.
    pub active_subscriptions: usize,
    /// Events dispatched per kind since the hub was created.
    pub status_dispatched: u64,
    pub deleted_status_dispatched: u64,
    pub friends_list_dispatched: u64,
}
