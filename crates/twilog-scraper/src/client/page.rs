use serde_json::{json, Value};

use crate::error::ScraperError;
use crate::tree::{find_first, find_values};
use crate::types::{FeedKind, FeedPage, RawNode};

use super::{Credentials, FeedClient};

const BOTTOM_CURSOR: &str = "Bottom";

impl FeedClient {
    /// Fetches one page of `kind` for the account `user_id`.
    ///
    /// `cursor` is the bottom cursor returned by the previous page, or `None`
    /// for the newest page.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::RateLimited`]: HTTP 429 after all retries.
    /// - [`ScraperError::NotFound`]: HTTP 404 (not retried).
    /// - [`ScraperError::UnexpectedStatus`]: any other non-2xx status.
    /// - [`ScraperError::Http`]: network failure after all retries.
    /// - [`ScraperError::Deserialize`]: the body is not JSON.
    pub async fn fetch_page(
        &self,
        credentials: &Credentials,
        kind: FeedKind,
        user_id: &str,
        count: u32,
        cursor: Option<&str>,
    ) -> Result<FeedPage, ScraperError> {
        let mut variables = json!({
            "userId": user_id,
            "count": count,
            "includePromotedContent": false,
            "withVoice": true,
        });
        if let Some(cursor) = cursor {
            variables["cursor"] = Value::String(cursor.to_owned());
        }

        let body = self
            .get_json(credentials, kind.operation(), &variables)
            .await?;
        let page = decode_page(&body);
        tracing::debug!(
            feed = %kind,
            nodes = page.nodes.len(),
            has_next = page.next_cursor.is_some(),
            "decoded feed page"
        );
        Ok(page)
    }
}

/// Extracts the raw nodes and the bottom cursor from one response body.
///
/// Only the first `entries` array is read; pinned posts are delivered outside
/// it and are therefore ignored. A body without entries decodes to an empty,
/// exhausted page.
#[must_use]
pub fn decode_page(body: &Value) -> FeedPage {
    let Some(entries) = find_first(body, "entries") else {
        return FeedPage::default();
    };

    let nodes = find_values(entries, "tweet_results")
        .into_iter()
        .filter(|v| v.as_object().is_some_and(|m| !m.is_empty()))
        .cloned()
        .map(RawNode)
        .collect();

    let next_cursor = entries
        .as_array()
        .into_iter()
        .flatten()
        .find(|entry| {
            find_values(entry, "cursorType")
                .into_iter()
                .any(|t| t.as_str() == Some(BOTTOM_CURSOR))
        })
        .and_then(|entry| find_first(entry, "value"))
        .and_then(Value::as_str)
        .map(str::to_owned);

    FeedPage { nodes, next_cursor }
}
