//! Channel-backed subscriptions.
//!
//! A convenience layer over callback registration for consumers that want
//! to pull events from their own thread instead of running on the delivery
//! thread. Events are pushed into a bounded channel; if the buffer is full
//! the event is dropped for that subscriber only (reported through the
//! error hook) rather than blocking delivery to everyone else.

use super::fanout::FanoutHub;
use super::types::SubscriptionHandle;
use crate::error::FeedError;
use crate::types::{EventKind, FeedEvent};
use crossbeam_channel::{bounded, Receiver, RecvError, RecvTimeoutError, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

/// A subscription drained through a bounded channel.
pub struct EventChannel<T> {
    handle: SubscriptionHandle,
    receiver: Receiver<T>,
}

impl<T> EventChannel<T> {
    /// Receive the next event (blocking).
    pub fn recv(&self) -> Result<T, RecvError> {
        self.receiver.recv()
    }

    /// Try to receive an event (non-blocking).
    pub fn try_recv(&self) -> Result<T, TryRecvError> {
        self.receiver.try_recv()
    }

    /// Receive with timeout.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<T, RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// The underlying subscription handle.
    pub fn handle(&self) -> &SubscriptionHandle {
        &self.handle
    }

    /// Release the underlying subscription. Buffered events remain
    /// receivable.
    pub fn release(&self) {
        self.handle.release();
    }
}

impl FanoutHub {
    /// Register a channel-backed subscription for `kind`.
    ///
    /// `extract` projects the dispatched event into the channel's item
    /// type; returning `None` skips that event. A full buffer drops the
    /// event for this subscriber and surfaces
    /// [`FeedError::BufferOverflow`] through the error hook; the delivery
    /// thread is never blocked.
    pub fn channel<T, F>(&self, kind: EventKind, buffer: usize, extract: F) -> EventChannel<T>
    where
        T: Send + 'static,
        F: Fn(&FeedEvent) -> Option<T> + Send + Sync + 'static,
    {
        let (sender, receiver) = bounded(buffer);
        let id = self.allocate_id();
        let hub = self.downgrade();

        let callback = Arc::new(move |event: &FeedEvent| {
            let Some(value) = extract(event) else {
                return;
            };
            match sender.try_send(value) {
                Ok(()) => {}
                Err(crossbeam_channel::TrySendError::Full(_)) => {
                    if let Some(hub) = hub.upgrade() {
                        hub.report(&FeedError::BufferOverflow {
                            id,
                            kind: event.kind(),
                        });
                    }
                }
                // Receiver gone; nothing left to deliver to.
                Err(crossbeam_channel::TrySendError::Disconnected(_)) => {}
            }
        });

        let handle = self.insert(kind, id, callback);
        EventChannel { handle, receiver }
    }
}
