//! # Feed Demultiplexer
//!
//! Turns one continuous feed of raw text records from a long-lived
//! streaming connection into multiple independently-subscribable typed
//! event streams.
//!
//! ## Core Concepts
//!
//! - **Classification**: an ordered table of cheap shape predicates tags
//!   each record with a kind (first match wins)
//! - **Conversion**: one converter per kind turns the raw record into a
//!   typed event; a malformed record is dropped, never fatal
//! - **Fan-out**: every converted event is delivered synchronously to all
//!   subscribers registered for its kind, in registration order
//! - **Subscriptions**: handles with a single idempotent `release`
//!   operation; attach and detach at any time without disturbing others
//!
//! The transport that opens and authenticates the connection is an
//! external collaborator: it simply invokes [`Demux::on_record`] once per
//! arrived record, in order, never concurrently for one connection.
//!
//! ## Example
//!
//! ```
//! use feedmux::Demux;
//!
//! let demux = Demux::new();
//!
//! let statuses = demux.on_status(|status| {
//!     println!("@{}: {}", status.user.screen_name, status.text);
//! });
//! let _friends = demux.on_friends_list(|friends| {
//!     println!("following: {}", friends.ids);
//! });
//!
//! // Driven by the transport's delivery callback:
//! demux.on_record(r#"{"user":{"screen_name":"ann"},"text":"hi"}"#);
//! demux.on_record(r#"{"friends":[1,2,3]}"#);
//!
//! statuses.release();
//! ```

pub mod classify;
pub mod convert;
pub mod demux;
pub mod error;
pub mod hub;
pub mod types;

// Re-exports
pub use convert::{Converter, ConverterRegistry};
pub use demux::{Demux, DemuxStats};
pub use error::{FeedError, Result};
pub use hub::{EventChannel, FanoutHub, HubStats, SubscriptionHandle, SubscriptionId};
pub use types::{
    DeletedStatus, Entities, EventKind, FeedEvent, FriendsList, Hashtag, Status, UrlEntity,
    User, UserMention,
};
