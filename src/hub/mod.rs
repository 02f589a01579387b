//! Fan-out hub: per-kind subscriber registries and subscription lifetime.
//!
//! One hub routes every converted event to the subscribers registered for
//! its kind. Dispatch is synchronous on the delivery thread and follows a
//! snapshot-then-iterate discipline: the registry for the event's kind is
//! snapshotted under the lock, then callbacks run with the lock released,
//! so a subscriber may register or release subscriptions from inside its
//! own callback without deadlocking.
//!
//! Guarantees:
//! - Subscribers of one kind never observe or block dispatch to another
//!   kind (per-kind registries, no cross-kind ordering).
//! - For a fixed kind, subscribers see events in classification order.
//! - A panicking subscriber is isolated: remaining snapshot members still
//!   run, and the offender stays registered.
//! - Releasing a handle is idempotent, safe after the hub is gone, and
//!   takes effect no later than the next dispatch for that kind. It does
//!   not affect a dispatch whose snapshot was already taken.

mod channel;
mod fanout;
mod types;

pub use channel::EventChannel;
pub use fanout::FanoutHub;
pub use types::{HubStats, SubscriptionHandle, SubscriptionId};
