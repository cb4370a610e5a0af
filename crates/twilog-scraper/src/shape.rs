//! Named shapes of a feed post.
//!
//! The upstream tree is weakly typed. Everything downstream matches on the
//! two small enums here instead of probing nested fields ad hoc.

use serde_json::Value;

const VISIBILITY_WRAPPER: &str = "TweetWithVisibilityResults";
const TOMBSTONE: &str = "TweetTombstone";

static NULL: Value = Value::Null;

/// The contents of a `result` envelope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Envelope<'a> {
    /// A post, with any visibility-limited wrapper already removed.
    Post(&'a Value),
    /// A deleted post; contributes nothing.
    Tombstone,
}

fn typename(value: &Value) -> Option<&str> {
    value.get("__typename").and_then(Value::as_str)
}

/// Decodes one `result` value, unwrapping a visibility wrapper by one level.
#[must_use]
pub fn unwrap_envelope(result: &Value) -> Envelope<'_> {
    let post = if typename(result) == Some(VISIBILITY_WRAPPER) {
        result.get("tweet").unwrap_or(&NULL)
    } else {
        result
    };
    if typename(post) == Some(TOMBSTONE) {
        Envelope::Tombstone
    } else {
        Envelope::Post(post)
    }
}

/// How a post embeds other posts.
///
/// Targets are the raw `result` values and may themselves be visibility
/// wrappers or tombstones.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PostShape<'a> {
    Plain,
    Repost { target: &'a Value },
    Quote { target: &'a Value },
    /// A repost whose target also carries a quote. The quote is the one
    /// nested inside the repost target when present, else the outer post's.
    RepostOfQuote { repost: &'a Value, quote: &'a Value },
}

fn embedded<'a>(value: &'a Value, pointer: &str) -> Option<&'a Value> {
    value.pointer(pointer).filter(|v| !is_empty(v))
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

impl<'a> PostShape<'a> {
    #[must_use]
    pub fn decode(post: &'a Value) -> Self {
        let repost = embedded(post, "/legacy/retweeted_status_result/result");
        let nested_quote = repost
            .filter(|r| r.get("rest_id").is_some())
            .and_then(|r| embedded(r, "/quoted_status_result/result"));
        let quote = nested_quote.or_else(|| embedded(post, "/quoted_status_result/result"));

        match (repost, quote) {
            (None, None) => Self::Plain,
            (Some(target), None) => Self::Repost { target },
            (None, Some(target)) => Self::Quote { target },
            (Some(repost), Some(quote)) => Self::RepostOfQuote { repost, quote },
        }
    }

    #[must_use]
    pub fn repost_target(self) -> Option<&'a Value> {
        match self {
            Self::Repost { target } | Self::RepostOfQuote { repost: target, .. } => Some(target),
            Self::Plain | Self::Quote { .. } => None,
        }
    }

    #[must_use]
    pub fn quote_target(self) -> Option<&'a Value> {
        match self {
            Self::Quote { target } | Self::RepostOfQuote { quote: target, .. } => Some(target),
            Self::Plain | Self::Repost { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_post_has_no_targets() {
        let post = json!({"rest_id": "1", "legacy": {"full_text": "hi"}});
        assert_eq!(PostShape::decode(&post), PostShape::Plain);
    }

    #[test]
    fn visibility_wrapper_is_unwrapped_once() {
        let result = json!({
            "__typename": "TweetWithVisibilityResults",
            "tweet": {"rest_id": "9"}
        });
        let Envelope::Post(post) = unwrap_envelope(&result) else {
            panic!("expected a post");
        };
        assert_eq!(post["rest_id"], "9");
    }

    #[test]
    fn tombstone_inside_wrapper_is_detected() {
        let result = json!({
            "__typename": "TweetWithVisibilityResults",
            "tweet": {"__typename": "TweetTombstone"}
        });
        assert_eq!(unwrap_envelope(&result), Envelope::Tombstone);
    }

    #[test]
    fn direct_repost_and_direct_quote() {
        let repost = json!({"legacy": {"retweeted_status_result": {"result": {"rest_id": "50"}}}});
        assert!(matches!(
            PostShape::decode(&repost),
            PostShape::Repost { target } if target["rest_id"] == "50"
        ));

        let quote = json!({"quoted_status_result": {"result": {"rest_id": "60"}}});
        assert!(matches!(
            PostShape::decode(&quote),
            PostShape::Quote { target } if target["rest_id"] == "60"
        ));
    }

    #[test]
    fn repost_of_quote_takes_the_nested_quote() {
        let post = json!({
            "legacy": {"retweeted_status_result": {"result": {
                "rest_id": "50",
                "quoted_status_result": {"result": {"rest_id": "40"}}
            }}},
            "quoted_status_result": {"result": {"rest_id": "41"}}
        });
        let shape = PostShape::decode(&post);
        assert_eq!(shape.repost_target().unwrap()["rest_id"], "50");
        assert_eq!(shape.quote_target().unwrap()["rest_id"], "40");
    }

    #[test]
    fn empty_embedded_results_are_ignored() {
        let post = json!({
            "legacy": {"retweeted_status_result": {"result": {}}},
            "quoted_status_result": {}
        });
        assert_eq!(PostShape::decode(&post), PostShape::Plain);
    }
}
