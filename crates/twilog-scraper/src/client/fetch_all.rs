//! Watermark-bounded multi-page fetch for `FeedClient`.

use std::collections::HashSet;

use twilog_core::FeedSettings;

use crate::error::ScraperError;
use crate::rate_limit::polite_delay;
use crate::types::{FeedKind, RawNode};

use super::{Credentials, FeedClient};

/// Paging limits for one fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchWindow {
    pub page_size: u32,
    /// Ceiling on collected nodes, applied before the trailing drop.
    pub max_nodes: usize,
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl FetchWindow {
    #[must_use]
    pub fn from_settings(settings: &FeedSettings) -> Self {
        Self {
            page_size: settings.page_size,
            max_nodes: settings.max_nodes(),
            min_delay_ms: settings.min_delay_ms,
            max_delay_ms: settings.max_delay_ms,
        }
    }
}

impl FeedClient {
    /// Fetches the newest nodes of a feed down to `watermark`, newest first.
    ///
    /// Pages are requested until one of:
    /// - a node carries the watermark id as one of its `rest_id`s (that node
    ///   is still collected),
    /// - `window.max_nodes` nodes have been collected,
    /// - a page adds no post id that was not already collected,
    /// - the upstream returns no bottom cursor.
    ///
    /// The watermark is matched by id, not compared numerically. Likes are
    /// ordered by like time, and a conversation module lists an older parent
    /// post ahead of the reply.
    ///
    /// Nodes without a post id (tombstones) are kept once each and never
    /// count as new.
    ///
    /// A random pause from `[min_delay_ms, max_delay_ms]` precedes every page
    /// request except the first.
    ///
    /// The last collected node is dropped from the result. The feed shares a
    /// boundary node between consecutive crawls; the next crawl from the same
    /// watermark observes it again.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Self::fetch_page`]. Nodes gathered from
    /// earlier pages are discarded on failure.
    pub async fn fetch_feed(
        &self,
        credentials: &Credentials,
        kind: FeedKind,
        user_id: &str,
        watermark: Option<i64>,
        window: &FetchWindow,
    ) -> Result<Vec<RawNode>, ScraperError> {
        let mut nodes: Vec<RawNode> = Vec::new();
        let mut seen: HashSet<i64> = HashSet::new();
        let mut cursor: Option<String> = None;
        let mut is_first_page = true;

        loop {
            if !is_first_page {
                polite_delay(window.min_delay_ms, window.max_delay_ms).await;
            }
            is_first_page = false;

            let page = self
                .fetch_page(credentials, kind, user_id, window.page_size, cursor.as_deref())
                .await?;

            let mut added = 0usize;
            let mut crossed = false;
            for node in page.nodes {
                match node.post_id() {
                    Some(id) => {
                        if !seen.insert(id) {
                            continue;
                        }
                        added += 1;
                    }
                    None => {
                        if nodes.contains(&node) {
                            continue;
                        }
                    }
                }
                crossed = watermark.is_some_and(|mark| node.mentions_id(mark));
                nodes.push(node);

                if crossed || nodes.len() >= window.max_nodes {
                    break;
                }
            }

            tracing::debug!(feed = %kind, added, total = nodes.len(), crossed, "fetched page");

            if crossed || added == 0 || nodes.len() >= window.max_nodes {
                break;
            }
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        nodes.truncate(window.max_nodes);
        nodes.pop();
        Ok(nodes)
    }
}
