use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::shape::{unwrap_envelope, Envelope};
use crate::tree::find_values;

/// One unparsed feed entry: the value found under a `tweet_results` key.
///
/// Kept as a raw JSON tree so cached batches replay byte-for-byte and so the
/// decoder in [`crate::shape`] sees exactly what the upstream sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawNode(pub Value);

impl RawNode {
    /// The `result` envelope, if present.
    #[must_use]
    pub fn result(&self) -> Option<&Value> {
        self.0.get("result")
    }

    /// Numeric id of the outer post, looking through a visibility wrapper.
    ///
    /// `None` for tombstones and nodes without a parseable `rest_id`.
    #[must_use]
    pub fn post_id(&self) -> Option<i64> {
        match unwrap_envelope(self.result()?) {
            Envelope::Post(post) => rest_id(post),
            Envelope::Tombstone => None,
        }
    }

    /// Whether `id` appears as any `rest_id` inside the node, including the
    /// ids of its repost and quote targets.
    #[must_use]
    pub fn mentions_id(&self, id: i64) -> bool {
        find_values(&self.0, "rest_id")
            .into_iter()
            .filter_map(Value::as_str)
            .any(|raw| raw.parse::<i64>().is_ok_and(|found| found == id))
    }
}

pub(crate) fn rest_id(value: &Value) -> Option<i64> {
    value.get("rest_id")?.as_str()?.parse().ok()
}

/// Which of an identity's feeds is crawled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedKind {
    /// The identity's own posts and replies.
    Timeline,
    /// Posts the identity liked.
    Likes,
}

impl FeedKind {
    /// Upstream operation name, used as the final path segment.
    #[must_use]
    pub fn operation(self) -> &'static str {
        match self {
            Self::Timeline => "UserTweetsAndReplies",
            Self::Likes => "Likes",
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Timeline => "timeline",
            Self::Likes => "likes",
        }
    }
}

impl std::fmt::Display for FeedKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One decoded page of a feed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeedPage {
    /// Nodes in feed order, newest first.
    pub nodes: Vec<RawNode>,
    /// Cursor for the next (older) page; `None` when the feed is exhausted.
    pub next_cursor: Option<String>,
}

/// A resolved account: numeric id plus display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub name: String,
    pub screen_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn post_id_reads_plain_result() {
        let node = RawNode(json!({"result": {"__typename": "Tweet", "rest_id": "123"}}));
        assert_eq!(node.post_id(), Some(123));
    }

    #[test]
    fn post_id_looks_through_visibility_wrapper() {
        let node = RawNode(json!({
            "result": {
                "__typename": "TweetWithVisibilityResults",
                "tweet": {"rest_id": "456"}
            }
        }));
        assert_eq!(node.post_id(), Some(456));
    }

    #[test]
    fn post_id_is_none_for_tombstone_and_garbage() {
        let tomb = RawNode(json!({"result": {"__typename": "TweetTombstone"}}));
        assert_eq!(tomb.post_id(), None);
        let bad = RawNode(json!({"result": {"rest_id": "not-a-number"}}));
        assert_eq!(bad.post_id(), None);
        assert_eq!(RawNode(json!({})).post_id(), None);
    }

    #[test]
    fn mentions_id_searches_nested_targets() {
        let node = RawNode(json!({"result": {
            "rest_id": "300",
            "legacy": {"retweeted_status_result": {"result": {"rest_id": "100"}}}
        }}));
        assert!(node.mentions_id(300));
        assert!(node.mentions_id(100));
        assert!(!node.mentions_id(99));
        assert!(!RawNode(json!({"result": {"rest_id": "x"}})).mentions_id(0));
    }

    #[test]
    fn raw_node_serializes_transparently() {
        let value = json!({"result": {"rest_id": "1"}});
        let node = RawNode(value.clone());
        assert_eq!(serde_json::to_value(&node).unwrap(), value);
    }
}
