//! Error types for the feed demultiplexer.
//!
//! Nothing here is fatal: the worst outcome of any single bad record or
//! bad subscriber is a dropped event. Errors never propagate back into the
//! delivery path; they are surfaced through the error hook installed on the
//! hub (see [`crate::hub::FanoutHub::set_error_hook`]).

use crate::hub::SubscriptionId;
use crate::types::EventKind;
use thiserror::Error;

/// Main error type for demultiplexer operations.
#[derive(Debug, Error)]
pub enum FeedError {
    /// A record matched a shape but its payload could not be converted.
    /// The record is dropped; the stream continues.
    #[error("conversion failed for {kind} record: {reason}")]
    Conversion { kind: EventKind, reason: String },

    /// A subscriber callback panicked during dispatch. The subscriber
    /// stays registered; remaining subscribers in the same dispatch still
    /// run.
    #[error("subscriber {id} panicked during {kind} dispatch: {reason}")]
    Subscriber {
        id: SubscriptionId,
        kind: EventKind,
        reason: String,
    },

    /// A channel subscriber's buffer was full; that event was dropped for
    /// that subscriber only.
    #[error("subscriber {id} buffer full, dropped {kind} event")]
    BufferOverflow { id: SubscriptionId, kind: EventKind },
}

impl FeedError {
    /// Build a conversion error from a serde failure.
    pub(crate) fn conversion(kind: EventKind, err: serde_json::Error) -> Self {
        FeedError::Conversion {
            kind,
            reason: err.to_string(),
        }
    }
}

/// Result type for demultiplexer operations.
pub type Result<T> = std::result::Result<T, FeedError>;
