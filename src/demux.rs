//! The demultiplexer pipeline tying classification, conversion, and
//! fan-out together.

use crate::classify::{classify, split_records};
use crate::convert::ConverterRegistry;
use crate::error::FeedError;
use crate::hub::{EventChannel, FanoutHub, HubStats, SubscriptionHandle};
use crate::types::{DeletedStatus, EventKind, FeedEvent, FriendsList, Status};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::warn;

/// Demultiplexer statistics.
#[derive(Clone, Copy, Debug, Default)]
pub struct DemuxStats {
    /// Raw records processed.
    pub records_seen: u64,
    /// Records matching no known shape (silently dropped, not an error).
    pub unrecognized: u64,
    /// Records that matched a shape but failed conversion.
    pub conversion_failures: u64,
    /// Fan-out statistics.
    pub hub: HubStats,
}

/// Demultiplexes one raw record feed into typed event streams.
///
/// Create one per streaming connection and wire the transport's delivery
/// callback to [`on_record`](Self::on_record). Processing is fully
/// synchronous on the calling thread: normalize, classify, convert, then
/// dispatch to every subscriber of the matching kind. There is no internal
/// queue, so a slow or blocking subscriber delays delivery to all other
/// subscribers of the same dispatch and to all subsequent records.
///
/// The transport is expected to invoke `on_record` once per record, in
/// arrival order, never concurrently for the same connection. Different
/// `Demux` instances are fully independent.
pub struct Demux {
    converters: ConverterRegistry,
    hub: FanoutHub,
    records_seen: AtomicU64,
    unrecognized: AtomicU64,
    conversion_failures: AtomicU64,
}

impl Demux {
    /// Create a demultiplexer with the standard converter set.
    pub fn new() -> Self {
        Self {
            converters: ConverterRegistry::standard(),
            hub: FanoutHub::new(),
            records_seen: AtomicU64::new(0),
            unrecognized: AtomicU64::new(0),
            conversion_failures: AtomicU64::new(0),
        }
    }

    /// Inbound boundary: a raw payload arrived from the transport.
    ///
    /// Normally one record per call; a batched payload of several
    /// newline-delimited records is split and each record processed
    /// independently, in payload order.
    pub fn on_record(&self, payload: &str) {
        for record in split_records(payload) {
            self.process(record);
        }
    }

    /// Classify, convert, and dispatch one normalized record.
    fn process(&self, record: &str) {
        self.records_seen.fetch_add(1, Ordering::Relaxed);

        let kind = classify(record);
        if kind == EventKind::Unrecognized {
            self.unrecognized.fetch_add(1, Ordering::Relaxed);
            return;
        }

        // Every recognized kind has a converter by construction.
        let Some(converter) = self.converters.get(kind) else {
            return;
        };

        match converter.convert(record) {
            Ok(event) => self.hub.dispatch(&event),
            Err(err) => {
                self.conversion_failures.fetch_add(1, Ordering::Relaxed);
                warn!(%kind, %err, "dropping record that failed conversion");
                self.hub.report(&err);
            }
        }
    }

    // --- Subscription surface ---

    /// Subscribe a callback to status updates.
    pub fn on_status(
        &self,
        callback: impl Fn(&Status) + Send + Sync + 'static,
    ) -> SubscriptionHandle {
        self.hub.register(EventKind::Status, move |event| {
            if let FeedEvent::Status(status) = event {
                callback(status);
            }
        })
    }

    /// Subscribe a callback to deletion notices.
    pub fn on_deleted_status(
        &self,
        callback: impl Fn(&DeletedStatus) + Send + Sync + 'static,
    ) -> SubscriptionHandle {
        self.hub.register(EventKind::DeletedStatus, move |event| {
            if let FeedEvent::DeletedStatus(deleted) = event {
                callback(deleted);
            }
        })
    }

    /// Subscribe a callback to friends-list records.
    pub fn on_friends_list(
        &self,
        callback: impl Fn(&FriendsList) + Send + Sync + 'static,
    ) -> SubscriptionHandle {
        self.hub.register(EventKind::FriendsList, move |event| {
            if let FeedEvent::FriendsList(friends) = event {
                callback(friends);
            }
        })
    }

    /// Channel-backed status subscription for pull-style consumers.
    pub fn status_channel(&self, buffer: usize) -> EventChannel<Status> {
        self.hub.channel(EventKind::Status, buffer, |event| match event {
            FeedEvent::Status(status) => Some(status.clone()),
            _ => None,
        })
    }

    /// Channel-backed deletion-notice subscription.
    pub fn deleted_status_channel(&self, buffer: usize) -> EventChannel<DeletedStatus> {
        self.hub
            .channel(EventKind::DeletedStatus, buffer, |event| match event {
                FeedEvent::DeletedStatus(deleted) => Some(deleted.clone()),
                _ => None,
            })
    }

    /// Channel-backed friends-list subscription.
    pub fn friends_list_channel(&self, buffer: usize) -> EventChannel<FriendsList> {
        self.hub
            .channel(EventKind::FriendsList, buffer, |event| match event {
                FeedEvent::FriendsList(friends) => Some(friends.clone()),
                _ => None,
            })
    }

    /// Install the side-channel error hook (conversion failures,
    /// subscriber panics, channel overflow). Replaces any previous hook.
    pub fn set_error_hook(&self, hook: impl Fn(&FeedError) + Send + Sync + 'static) {
        self.hub.set_error_hook(hook);
    }

    /// The underlying fan-out hub, for untyped registration.
    pub fn hub(&self) -> &FanoutHub {
        &self.hub
    }

    /// Pipeline statistics.
    pub fn stats(&self) -> DemuxStats {
        DemuxStats {
            records_seen: self.records_seen.load(Ordering::Relaxed),
            unrecognized: self.unrecognized.load(Ordering::Relaxed),
            conversion_failures: self.conversion_failures.load(Ordering::Relaxed),
            hub: self.hub.stats(),
        }
    }
}

impl Default for Demux {
    fn default() -> Self {
        Self::new()
    }
}
