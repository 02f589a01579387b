//! Core types for the feed demultiplexer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification tag assigned to a raw record.
///
/// This is a closed set: new kinds are added by registering a new
/// predicate/converter pair, never by subclassing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A full status update.
    Status,
    /// A deletion notice for a previously-delivered status.
    DeletedStatus,
    /// The friends list sent at the start of a user stream.
    FriendsList,
    /// Matched no known shape; dropped, never delivered.
    Unrecognized,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Status => write!(f, "status"),
            EventKind::DeletedStatus => write!(f, "deleted_status"),
            EventKind::FriendsList => write!(f, "friends_list"),
            EventKind::Unrecognized => write!(f, "unrecognized"),
        }
    }
}

/// A typed domain event produced from one raw record.
#[derive(Clone, Debug)]
pub enum FeedEvent {
    Status(Status),
    DeletedStatus(DeletedStatus),
    FriendsList(FriendsList),
}

impl FeedEvent {
    /// The kind this event dispatches under.
    pub fn kind(&self) -> EventKind {
        match self {
            FeedEvent::Status(_) => EventKind::Status,
            FeedEvent::DeletedStatus(_) => EventKind::DeletedStatus,
            FeedEvent::FriendsList(_) => EventKind::FriendsList,
        }
    }
}

/// A full status update.
///
/// Deserialization is lenient: only `text` is required, everything else
/// falls back to defaults so partially-populated payloads still convert.
/// Unknown fields are ignored.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Status {
    #[serde(default)]
    pub id: u64,

    pub text: String,

    #[serde(default)]
    pub user: User,

    #[serde(default)]
    pub entities: Entities,

    #[serde(default)]
    pub created_at: Option<String>,
}

/// Author of a status.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: u64,
    pub screen_name: String,
    pub name: String,
}

/// Entities attached to a status.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Entities {
    pub hashtags: Vec<Hashtag>,
    pub urls: Vec<UrlEntity>,
    pub user_mentions: Vec<UserMention>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Hashtag {
    pub text: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UrlEntity {
    pub url: String,
    pub expanded_url: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserMention {
    pub id: u64,
    pub screen_name: String,
}

/// A deletion notice.
///
/// The deletion schema is not parsed further; subscribers get the
/// original record content.
#[derive(Clone, Debug)]
pub struct DeletedStatus {
    /// The raw record as delivered by the transport.
    pub raw: String,
}

/// The friends list sent when a user stream opens.
#[derive(Clone, Debug)]
pub struct FriendsList {
    /// Friend identifiers, comma-joined in payload order (e.g. `"1,2,3"`).
    pub ids: String,

    /// The raw record as delivered by the transport.
    pub raw: String,
}
