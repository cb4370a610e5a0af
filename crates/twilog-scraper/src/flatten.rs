//! Flattening and validation of one fetched batch.
//!
//! [`flatten`] turns each [`RawNode`] into one to three [`FlatRecord`]s
//! (the outer post, then its repost target, then its quote target) and
//! validates every record before returning. A single malformed record
//! aborts the whole batch with [`ScraperError::Structure`].

use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use twilog_core::time::parse_feed_timestamp;

use crate::error::ScraperError;
use crate::shape::{unwrap_envelope, Envelope, PostShape};
use crate::tree::find_values;
use crate::types::{rest_id, RawNode};

static SOURCE_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<.+?>([^<]*?)<.+?>$").expect("valid source label regex"));

/// Live profile counters carried on the author sub-object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileCounters {
    pub statuses: i64,
    pub favourites: i64,
    pub media: i64,
    pub following: i64,
    pub followers: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub user_id: String,
    pub name: String,
    pub screen_name: String,
    /// `None` when the upstream omitted any of the counters.
    pub counters: Option<ProfileCounters>,
}

/// A repost or quote target referenced by a record. The id is absent when
/// the target is a tombstone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbeddedRef {
    pub id: Option<i64>,
}

/// A validated post annotated with the time it appeared in the feed.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatRecord {
    pub id: i64,
    pub created_at: NaiveDateTime,
    pub appeared_at: NaiveDateTime,
    pub author: Author,
    /// Client label extracted from the source anchor.
    pub via: String,
    pub text: String,
    pub repost_of: Option<EmbeddedRef>,
    pub quote_of: Option<EmbeddedRef>,
    /// Raw `extended_entities.media` items.
    pub attachments: Vec<Value>,
    /// Every `expanded_url` under `entities`, in document order.
    pub expanded_urls: Vec<String>,
}

impl FlatRecord {
    /// `https://twitter.com/{screen_name}/status/{id}`.
    #[must_use]
    pub fn url(&self) -> String {
        format!(
            "https://twitter.com/{}/status/{}",
            self.author.screen_name, self.id
        )
    }
}

#[derive(Deserialize)]
struct PostBody {
    rest_id: String,
    source: String,
    core: CoreBody,
    legacy: PostLegacy,
}

#[derive(Deserialize)]
struct CoreBody {
    user_results: UserResults,
}

#[derive(Deserialize)]
struct UserResults {
    result: UserBody,
}

#[derive(Deserialize)]
struct UserBody {
    rest_id: String,
    legacy: UserLegacy,
}

#[derive(Deserialize)]
struct UserLegacy {
    name: String,
    screen_name: String,
    statuses_count: Option<i64>,
    favourites_count: Option<i64>,
    media_count: Option<i64>,
    friends_count: Option<i64>,
    followers_count: Option<i64>,
}

#[derive(Deserialize)]
struct PostLegacy {
    full_text: String,
    #[serde(default)]
    entities: Value,
    #[serde(default)]
    extended_entities: Option<ExtendedEntities>,
}

#[derive(Deserialize)]
struct ExtendedEntities {
    #[serde(default)]
    media: Vec<Value>,
}

/// Flattens a batch of raw nodes, preserving feed order.
///
/// # Errors
///
/// Returns [`ScraperError::Structure`] if any node lacks its `result`
/// envelope, a creation timestamp, or the required author, `legacy`,
/// `rest_id` and `source` sub-structure.
pub fn flatten(nodes: &[RawNode]) -> Result<Vec<FlatRecord>, ScraperError> {
    let mut records = Vec::with_capacity(nodes.len());

    for (index, node) in nodes.iter().enumerate() {
        let result = node
            .result()
            .ok_or_else(|| ScraperError::structure(format!("node {index} has no result envelope")))?;
        let Envelope::Post(post) = unwrap_envelope(result) else {
            continue;
        };

        let appeared_at = created_at(post)?;
        let shape = PostShape::decode(post);

        let candidates = std::iter::once(post)
            .chain(shape.repost_target())
            .chain(shape.quote_target());
        for candidate in candidates {
            if let Envelope::Post(target) = unwrap_envelope(candidate) {
                records.push(validate(target, appeared_at)?);
            }
        }
    }

    Ok(records)
}

fn created_at(post: &Value) -> Result<NaiveDateTime, ScraperError> {
    let raw = post
        .pointer("/legacy/created_at")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            ScraperError::structure(format!("post {} has no legacy.created_at", describe(post)))
        })?;
    parse_feed_timestamp(raw).map_err(|e| {
        ScraperError::structure(format!("post {}: bad created_at {raw:?}: {e}", describe(post)))
    })
}

fn describe(post: &Value) -> &str {
    post.get("rest_id").and_then(Value::as_str).unwrap_or("<unknown>")
}

fn validate(post: &Value, appeared_at: NaiveDateTime) -> Result<FlatRecord, ScraperError> {
    let body = PostBody::deserialize(post).map_err(|e| {
        ScraperError::structure(format!("post {} is malformed: {e}", describe(post)))
    })?;

    let user_id_empty = body.core.user_results.result.rest_id.is_empty();
    if body.rest_id.is_empty() || body.source.is_empty() || user_id_empty {
        return Err(ScraperError::structure(format!(
            "post {} has an empty rest_id or source",
            describe(post)
        )));
    }
    let id = body.rest_id.parse::<i64>().map_err(|e| {
        ScraperError::structure(format!("post id {:?} is not numeric: {e}", body.rest_id))
    })?;
    let via = source_label(&body.source)
        .ok_or_else(|| ScraperError::structure(format!("post {id}: unrecognised source markup")))?;
    let created_at = created_at(post)?;

    let shape = PostShape::decode(post);
    let user = body.core.user_results.result;
    let legacy = user.legacy;
    let counters = match (
        legacy.statuses_count,
        legacy.favourites_count,
        legacy.media_count,
        legacy.friends_count,
        legacy.followers_count,
    ) {
        (Some(statuses), Some(favourites), Some(media), Some(following), Some(followers)) => {
            Some(ProfileCounters {
                statuses,
                favourites,
                media,
                following,
                followers,
            })
        }
        _ => None,
    };

    let expanded_urls = find_values(&body.legacy.entities, "expanded_url")
        .into_iter()
        .filter_map(Value::as_str)
        .filter(|u| !u.is_empty())
        .map(str::to_owned)
        .collect();

    Ok(FlatRecord {
        id,
        created_at,
        appeared_at,
        author: Author {
            user_id: user.rest_id,
            name: legacy.name,
            screen_name: legacy.screen_name,
            counters,
        },
        via,
        text: body.legacy.full_text,
        repost_of: shape.repost_target().map(embedded_ref),
        quote_of: shape.quote_target().map(embedded_ref),
        attachments: body
            .legacy
            .extended_entities
            .map(|e| e.media)
            .unwrap_or_default(),
        expanded_urls,
    })
}

fn embedded_ref(target: &Value) -> EmbeddedRef {
    let id = match unwrap_envelope(target) {
        Envelope::Post(post) => rest_id(post),
        Envelope::Tombstone => None,
    };
    EmbeddedRef { id }
}

/// Extracts the text between the tags of `<a href="...">Label</a>`.
#[must_use]
pub fn source_label(markup: &str) -> Option<String> {
    SOURCE_LABEL_RE
        .captures(markup)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_owned())
}

#[cfg(test)]
#[path = "flatten_test.rs"]
mod tests;
