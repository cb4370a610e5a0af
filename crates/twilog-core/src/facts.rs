//! Typed fact records derived from one feed crawl.
//!
//! All timestamps are UTC+9 wall-clock values (see [`crate::time`]).

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// One archived post from the account's own feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostFact {
    pub post_id: i64,
    pub text: String,
    /// Client label extracted from the source anchor, e.g. `"Twitter Web App"`.
    pub via: String,
    /// `https://twitter.com/{screen_name}/status/{post_id}`.
    pub url: String,
    pub user_id: String,
    pub user_name: String,
    pub screen_name: String,
    pub is_repost: bool,
    pub repost_target_id: Option<i64>,
    pub is_quote: bool,
    pub quote_target_id: Option<i64>,
    pub has_media: bool,
    pub has_external_link: bool,
    /// When the post itself was authored.
    pub created_at: NaiveDateTime,
    /// When the post showed up in the crawled feed. Equals `created_at` for
    /// top-level posts and the outer post's `created_at` for repost and quote
    /// targets.
    pub appeared_at: NaiveDateTime,
    pub registered_at: NaiveDateTime,
}

/// A post found in an identity's likes feed.
///
/// The `post` carries the liked post's own author; `liked_by_*` is the
/// identity whose likes were crawled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LikedPostFact {
    pub post: PostFact,
    pub liked_by_user_id: String,
    pub liked_by_user_name: String,
    pub liked_by_screen_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Photo,
    Video,
    AnimatedGif,
}

impl MediaKind {
    /// Maps the upstream `type` tag. Unknown tags are not projectable.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "photo" => Some(Self::Photo),
            "video" => Some(Self::Video),
            "animated_gif" => Some(Self::AnimatedGif),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Photo => "photo",
            Self::Video => "video",
            Self::AnimatedGif => "animated_gif",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One media attachment of a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaFact {
    pub post_id: i64,
    pub post_text: String,
    pub post_via: String,
    pub post_url: String,
    pub media_filename: String,
    /// Full-resolution URL.
    pub media_url: String,
    pub media_thumbnail_url: String,
    pub media_kind: MediaKind,
    /// Byte size from a best-effort probe; `-1` when the probe failed.
    pub media_size: i64,
    pub created_at: NaiveDateTime,
    pub appeared_at: NaiveDateTime,
    pub registered_at: NaiveDateTime,
}

/// One outbound URL of a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalLinkFact {
    pub post_id: i64,
    pub post_text: String,
    pub post_via: String,
    pub post_url: String,
    pub external_link_url: String,
    /// Classified site tag such as `"pixiv"`; empty when unclassified.
    pub external_link_type: String,
    pub created_at: NaiveDateTime,
    pub appeared_at: NaiveDateTime,
    pub registered_at: NaiveDateTime,
}

/// Live profile counters of the crawled identity for one crawl cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricFact {
    pub screen_name: String,
    pub status_count: i64,
    pub favorite_count: i64,
    pub media_count: i64,
    pub following_count: i64,
    pub followers_count: i64,
    pub registered_at: NaiveDateTime,
}

/// The slice of a stored post that the stats aggregation reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostHistory {
    pub appeared_at: NaiveDateTime,
    pub text: String,
}

/// A [`MetricFact`] merged with aggregates over the identity's full history.
///
/// Aggregates whose denominator is zero are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsFact {
    pub metric: MetricFact,
    pub min_appeared_at: NaiveDateTime,
    pub max_appeared_at: NaiveDateTime,
    pub duration_days: i64,
    pub count_all: i64,
    pub appeared_days: i64,
    pub non_appeared_days: i64,
    pub average_post_by_day: Option<f64>,
    pub max_post_num_by_day: i64,
    pub max_post_day: NaiveDate,
    pub post_length_sum: i64,
    pub post_length_by_count: Option<f64>,
    pub post_length_by_day: Option<f64>,
    /// Percentage of posts containing `@`, rounded to two decimals.
    pub communication_ratio: Option<f64>,
    pub increase_following_by_day: Option<f64>,
    pub increase_followers_by_day: Option<f64>,
    pub ff_ratio: Option<f64>,
    pub ff_ratio_inverse: Option<f64>,
    pub available_following: i64,
    pub rest_available_following: i64,
}
