use crate::common::{ChatMessage, RawMessage};

use super::normalize::normalize;
use super::seen_index::SeenIndex;

/// Filters fetched message batches down to the ones not rendered yet.
#[derive(Debug, Default)]
pub struct MessageSynchronizer {
    seen: SeenIndex,
}

impl MessageSynchronizer {
    /// Returns the unseen messages of `batch` in server order and records them
    /// as seen. Malformed entries are logged and skipped without being indexed.
    pub fn ingest(&mut self, batch: Vec<RawMessage>) -> Vec<ChatMessage> {
        let mut fresh = Vec::new();

        for raw in batch {
            let message = match normalize(raw) {
                Ok(message) => message,
                Err(err) => {
                    log::warn!("Dropping invalid message: {err}");
                    continue;
                }
            };

            let key = match message.canonical_key() {
                Ok(key) => key,
                Err(err) => {
                    log::warn!("Failed to serialize message for dedup: {err}");
                    continue;
                }
            };

            if self.seen.admit(key) {
                fresh.push(message);
            }
        }

        fresh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn batch(values: Value) -> Vec<RawMessage> {
        serde_json::from_value(values).unwrap()
    }

    #[test]
    fn identical_snapshot_renders_nothing_new() {
        let mut sync = MessageSynchronizer::default();

        let first = sync.ingest(batch(json!([{"username": "a", "content": "hi"}])));
        assert_eq!(first, vec![ChatMessage::new("a", "hi")]);
        assert_eq!(sync.seen.len(), 1);

        let second = sync.ingest(batch(json!([{"username": "a", "content": "hi"}])));
        assert!(second.is_empty());
        assert_eq!(sync.seen.len(), 1);
    }

    #[test]
    fn appends_only_unseen_in_server_order() {
        let mut sync = MessageSynchronizer::default();
        sync.ingest(batch(json!([{"username": "a", "content": "1"}])));

        let fresh = sync.ingest(batch(json!([
            {"username": "a", "content": "1"},
            {"username": "b", "content": "3"},
            "{\"username\":\"c\",\"content\":\"2\"}",
        ])));
        let contents: Vec<_> = fresh.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["3", "2"]);
    }

    #[test]
    fn duplicates_within_one_batch_render_once() {
        let mut sync = MessageSynchronizer::default();
        let fresh = sync.ingest(batch(json!([
            {"username": "a", "content": "hi"},
            "{\"username\":\"a\",\"content\":\"hi\"}",
        ])));
        assert_eq!(fresh.len(), 1);
    }

    #[test]
    fn malformed_message_is_not_indexed_and_can_arrive_later() {
        let mut sync = MessageSynchronizer::default();

        let fresh = sync.ingest(batch(json!([{"username": "a"}])));
        assert!(fresh.is_empty());
        assert_eq!(sync.seen.len(), 0);

        let fresh = sync.ingest(batch(json!([{"username": "a", "content": "fixed"}])));
        assert_eq!(fresh.len(), 1);

        let fresh = sync.ingest(batch(json!([{"username": "a", "content": "fixed"}])));
        assert!(fresh.is_empty());
    }

    #[test]
    fn messages_differing_in_any_field_are_distinct() {
        let mut sync = MessageSynchronizer::default();
        let fresh = sync.ingest(batch(json!([
            {"username": "a", "content": "hi", "timestamp": "10:00"},
            {"username": "a", "content": "hi", "timestamp": "10:01"},
        ])));
        assert_eq!(fresh.len(), 2);
    }
}
