//! Per-kind converters from raw record text to typed events.
//!
//! Each converter handles exactly one [`EventKind`] and is a pure function
//! of its input text. Converters never panic on malformed input that
//! nevertheless matched the classifier: they return a
//! [`FeedError::Conversion`] which the pipeline swallows, dropping that
//! single record without disturbing the stream.

use crate::error::{FeedError, Result};
use crate::types::{DeletedStatus, EventKind, FeedEvent, FriendsList, Status};
use serde::Deserialize;

/// A converter for one fixed kind.
pub trait Converter: Send + Sync {
    /// The kind this converter produces.
    fn kind(&self) -> EventKind;

    /// Convert a raw record into a typed event.
    fn convert(&self, raw: &str) -> Result<FeedEvent>;
}

/// Converts full status records via a lenient structured parse.
pub struct StatusConverter;

impl Converter for StatusConverter {
    fn kind(&self) -> EventKind {
        EventKind::Status
    }

    fn convert(&self, raw: &str) -> Result<FeedEvent> {
        let status: Status = serde_json::from_str(raw)
            .map_err(|e| FeedError::conversion(EventKind::Status, e))?;
        Ok(FeedEvent::Status(status))
    }
}

/// Converts deletion notices. The deletion schema is not parsed; the
/// event carries the raw record content. This converter cannot fail.
pub struct DeleteConverter;

impl Converter for DeleteConverter {
    fn kind(&self) -> EventKind {
        EventKind::DeletedStatus
    }

    fn convert(&self, raw: &str) -> Result<FeedEvent> {
        Ok(FeedEvent::DeletedStatus(DeletedStatus {
            raw: raw.to_string(),
        }))
    }
}

/// Converts friends-list records into a comma-joined id sequence.
pub struct FriendsConverter;

#[derive(Deserialize)]
struct FriendsPayload {
    friends: Vec<u64>,
}

impl Converter for FriendsConverter {
    fn kind(&self) -> EventKind {
        EventKind::FriendsList
    }

    fn convert(&self, raw: &str) -> Result<FeedEvent> {
        let payload: FriendsPayload = serde_json::from_str(raw)
            .map_err(|e| FeedError::conversion(EventKind::FriendsList, e))?;

        let ids = payload
            .friends
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");

        Ok(FeedEvent::FriendsList(FriendsList {
            ids,
            raw: raw.to_string(),
        }))
    }
}

/// Registry selecting the converter for a kind.
pub struct ConverterRegistry {
    converters: Vec<Box<dyn Converter>>,
}

impl ConverterRegistry {
    /// Registry with the standard converter for each recognized kind.
    pub fn standard() -> Self {
        Self {
            converters: vec![
                Box::new(StatusConverter),
                Box::new(DeleteConverter),
                Box::new(FriendsConverter),
            ],
        }
    }

    /// Look up the converter for `kind`. Returns `None` for
    /// [`EventKind::Unrecognized`].
    pub fn get(&self, kind: EventKind) -> Option<&dyn Converter> {
        self.converters
            .iter()
            .find(|c| c.kind() == kind)
            .map(|c| c.as_ref())
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_conversion() {
        let event = StatusConverter
            .convert(r#"{"id":7,"user":{"id":1,"screen_name":"ann"},"text":"hi"}"#)
            .unwrap();
        match event {
            FeedEvent::Status(status) => {
                assert_eq!(status.id, 7);
                assert_eq!(status.text, "hi");
                assert_eq!(status.user.screen_name, "ann");
            }
            other => panic!("expected Status, got {:?}", other),
        }
    }

    #[test]
    fn test_status_conversion_malformed() {
        // Matched the shape sniff but is not valid JSON.
        let result = StatusConverter.convert(r#"{"text":"unterminated}"#);
        assert!(matches!(
            result,
            Err(FeedError::Conversion {
                kind: EventKind::Status,
                ..
            })
        ));
    }

    #[test]
    fn test_delete_conversion_keeps_raw() {
        let raw = r#"{"delete":{"status":{"id":5}}}"#;
        let event = DeleteConverter.convert(raw).unwrap();
        match event {
            FeedEvent::DeletedStatus(deleted) => assert_eq!(deleted.raw, raw),
            other => panic!("expected DeletedStatus, got {:?}", other),
        }
    }

    #[test]
    fn test_friends_conversion_joins_ids() {
        let raw = r#"{"friends":[1,2,3]}"#;
        let event = FriendsConverter.convert(raw).unwrap();
        match event {
            FeedEvent::FriendsList(friends) => {
                assert_eq!(friends.ids, "1,2,3");
                assert_eq!(friends.raw, raw);
            }
            other => panic!("expected FriendsList, got {:?}", other),
        }
    }

    #[test]
    fn test_friends_conversion_empty_list() {
        let event = FriendsConverter.convert(r#"{"friends":[]}"#).unwrap();
        match event {
            FeedEvent::FriendsList(friends) => assert_eq!(friends.ids, ""),
            other => panic!("expected FriendsList, got {:?}", other),
        }
    }

    #[test]
    fn test_friends_conversion_malformed() {
        let result = FriendsConverter.convert(r#"{"friends":"nope"}"#);
        assert!(matches!(
            result,
            Err(FeedError::Conversion {
                kind: EventKind::FriendsList,
                ..
            })
        ));
    }

    #[test]
    fn test_registry_selects_by_kind() {
        let registry = ConverterRegistry::standard();
        assert_eq!(
            registry.get(EventKind::Status).unwrap().kind(),
            EventKind::Status
        );
        assert_eq!(
            registry.get(EventKind::DeletedStatus).unwrap().kind(),
            EventKind::DeletedStatus
        );
        assert_eq!(
            registry.get(EventKind::FriendsList).unwrap().kind(),
            EventKind::FriendsList
        );
        assert!(registry.get(EventKind::Unrecognized).is_none());
    }
}
