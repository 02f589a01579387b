//! Record normalization and shape classification.
//!
//! Classification is deliberately cheap: an ordered table of syntactic
//! shape predicates evaluated top-to-bottom, first match wins. Most feed
//! volume is ordinary status updates, so the common case must be decided
//! by O(1) short-circuit pattern tests rather than a full structured parse.
//! Predicates look only at the record text, never at network or
//! application state. A record matching no predicate is `Unrecognized`
//! and is discarded upstream with no side effects.

use crate::types::EventKind;

/// One entry in the ordered matcher table.
struct ShapeRule {
    kind: EventKind,
    matches: fn(&str) -> bool,
}

/// Ordered matcher table. Earlier entries take priority, so the specific
/// outer-key shapes must precede the catch-all status shape.
const SHAPE_RULES: &[ShapeRule] = &[
    ShapeRule {
        kind: EventKind::DeletedStatus,
        matches: is_delete_notice,
    },
    ShapeRule {
        kind: EventKind::FriendsList,
        matches: is_friends_list,
    },
    ShapeRule {
        kind: EventKind::Status,
        matches: is_status,
    },
];

/// Trim whitespace and line termination from a raw record before
/// classification.
pub fn normalize(raw: &str) -> &str {
    raw.trim()
}

/// Split a transport payload into discrete records.
///
/// The transport contract is one record per callback, but a batching
/// transport delivering several newline-delimited records in one payload
/// still demultiplexes correctly: each non-empty line is treated as one
/// record.
pub fn split_records(payload: &str) -> impl Iterator<Item = &str> {
    payload.lines().map(normalize).filter(|line| !line.is_empty())
}

/// Classify a normalized record by its syntactic shape.
///
/// Returns the kind of the first matching predicate, or
/// [`EventKind::Unrecognized`] if none match.
pub fn classify(text: &str) -> EventKind {
    for rule in SHAPE_RULES {
        if (rule.matches)(text) {
            return rule.kind;
        }
    }
    EventKind::Unrecognized
}

/// True if the record's outer key is `key`, i.e. it starts with
/// `{"key"` modulo whitespace after the brace.
fn has_outer_key(text: &str, key: &str) -> bool {
    let Some(rest) = text.strip_prefix('{') else {
        return false;
    };
    let rest = rest.trim_start();
    let Some(rest) = rest.strip_prefix('"') else {
        return false;
    };
    rest.starts_with(key)
}

fn is_delete_notice(text: &str) -> bool {
    has_outer_key(text, "delete")
}

fn is_friends_list(text: &str) -> bool {
    has_outer_key(text, "friends")
}

/// A status looks like a JSON object carrying a `"text"` key. This is a
/// shape sniff, not a parse: the converter decides whether the payload is
/// actually well-formed.
fn is_status(text: &str) -> bool {
    text.starts_with('{') && text.ends_with('}') && text.contains("\"text\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_status() {
        assert_eq!(
            classify(r#"{"user":{"id":1},"text":"hi"}"#),
            EventKind::Status
        );
        assert_eq!(classify(r#"{"text":"hello world"}"#), EventKind::Status);
    }

    #[test]
    fn test_classify_delete_notice() {
        assert_eq!(
            classify(r#"{"delete":{"status":{"id":5}}}"#),
            EventKind::DeletedStatus
        );
        // Whitespace after the brace still matches.
        assert_eq!(
            classify(r#"{ "delete": {"status": {"id": 5}} }"#),
            EventKind::DeletedStatus
        );
    }

    #[test]
    fn test_classify_friends_list() {
        assert_eq!(classify(r#"{"friends":[1,2,3]}"#), EventKind::FriendsList);
        // friends_str variant shares the prefix.
        assert_eq!(
            classify(r#"{"friends_str":["1","2"]}"#),
            EventKind::FriendsList
        );
    }

    #[test]
    fn test_classify_unrecognized() {
        assert_eq!(classify(""), EventKind::Unrecognized);
        assert_eq!(classify("not json"), EventKind::Unrecognized);
        assert_eq!(classify(r#"{"limit":{"track":5}}"#), EventKind::Unrecognized);
        assert_eq!(classify(r#"{"id":1}"#), EventKind::Unrecognized);
        assert_eq!(classify("[1,2,3]"), EventKind::Unrecognized);
    }

    #[test]
    fn test_first_match_wins() {
        // A delete notice containing the word "text" inside is still a
        // delete notice: the earlier rule takes priority.
        assert_eq!(
            classify(r#"{"delete":{"status":{"id":5,"text":"gone"}}}"#),
            EventKind::DeletedStatus
        );
    }

    #[test]
    fn test_normalize_trims_line_termination() {
        assert_eq!(normalize("  {\"text\":\"hi\"}\r\n"), "{\"text\":\"hi\"}");
    }

    #[test]
    fn test_split_records_on_batched_payload() {
        let payload = "{\"text\":\"a\"}\r\n{\"delete\":{}}\n\n{\"friends\":[1]}\n";
        let records: Vec<&str> = split_records(payload).collect();
        assert_eq!(
            records,
            vec!["{\"text\":\"a\"}", "{\"delete\":{}}", "{\"friends\":[1]}"]
        );
    }
}
