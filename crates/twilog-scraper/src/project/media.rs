use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_json::Value;

use twilog_core::{MediaFact, MediaKind};

use crate::flatten::FlatRecord;
use crate::probe::{media_size, SizeProbe};

use super::dedup::{chronological, dedup_by_key};

const MP4: &str = "video/mp4";
const THUMBNAIL_SUFFIX: &str = ":large";
const ORIGINAL_SUFFIX: &str = ":orig";

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum RawMedia {
    Photo {
        media_url_https: String,
    },
    Video {
        media_url_https: String,
        video_info: VideoInfo,
    },
    AnimatedGif {
        media_url_https: String,
        video_info: VideoInfo,
    },
}

#[derive(Deserialize)]
struct VideoInfo {
    #[serde(default)]
    variants: Vec<VideoVariant>,
}

#[derive(Deserialize)]
struct VideoVariant {
    content_type: String,
    #[serde(default)]
    bitrate: Option<i64>,
    url: String,
}

/// A projectable attachment with its derived URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    pub filename: String,
    pub url: String,
    pub thumbnail_url: String,
    pub kind: MediaKind,
}

/// Decodes one `extended_entities.media` entry.
///
/// Returns `None` for unknown kinds, missing URLs, and videos without an
/// mp4 variant.
#[must_use]
pub fn decode_media(raw: &Value) -> Option<MediaItem> {
    match RawMedia::deserialize(raw).ok()? {
        RawMedia::Photo { media_url_https } => Some(MediaItem {
            filename: file_name(&media_url_https)?,
            url: format!("{media_url_https}{ORIGINAL_SUFFIX}"),
            thumbnail_url: format!("{media_url_https}{THUMBNAIL_SUFFIX}"),
            kind: MediaKind::Photo,
        }),
        RawMedia::Video {
            media_url_https,
            video_info,
        } => video_item(&media_url_https, &video_info, MediaKind::Video),
        RawMedia::AnimatedGif {
            media_url_https,
            video_info,
        } => video_item(&media_url_https, &video_info, MediaKind::AnimatedGif),
    }
}

fn video_item(thumbnail: &str, info: &VideoInfo, kind: MediaKind) -> Option<MediaItem> {
    // first variant wins a bitrate tie
    let best = info
        .variants
        .iter()
        .filter(|v| v.content_type == MP4)
        .filter_map(|v| v.bitrate.map(|b| (b, v)))
        .fold(None::<(i64, &VideoVariant)>, |best, (bitrate, v)| match best {
            Some((top, _)) if top >= bitrate => best,
            _ => Some((bitrate, v)),
        })?
        .1;

    let url = strip_query(&best.url);
    Some(MediaItem {
        filename: file_name(&url)?,
        url,
        thumbnail_url: format!("{thumbnail}{ORIGINAL_SUFFIX}"),
        kind,
    })
}

fn strip_query(raw: &str) -> String {
    match reqwest::Url::parse(raw) {
        Ok(mut url) => {
            url.set_query(None);
            url.set_fragment(None);
            url.to_string()
        }
        Err(_) => raw.split(['?', '#']).next().unwrap_or(raw).to_owned(),
    }
}

fn file_name(raw: &str) -> Option<String> {
    let path = reqwest::Url::parse(raw)
        .map(|u| u.path().to_owned())
        .unwrap_or_else(|_| raw.to_owned());
    path.rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
}

/// Media rows for a flattened batch, one per (post id, filename), oldest
/// first. Sizes come from `probe`; a failed probe stores `-1`.
pub async fn project_media<P: SizeProbe>(
    records: &[FlatRecord],
    probe: &P,
    registered_at: NaiveDateTime,
) -> Vec<MediaFact> {
    let pending: Vec<(&FlatRecord, MediaItem)> = records
        .iter()
        .flat_map(|r| r.attachments.iter().filter_map(decode_media).map(move |m| (r, m)))
        .collect();
    let pending = dedup_by_key(pending, |(r, m)| (r.id, m.filename.clone()));

    let mut facts = Vec::with_capacity(pending.len());
    for (record, item) in pending {
        let media_size = media_size(probe, &item.url).await;
        facts.push(MediaFact {
            post_id: record.id,
            post_text: record.text.clone(),
            post_via: record.via.clone(),
            post_url: record.url(),
            media_filename: item.filename,
            media_url: item.url,
            media_thumbnail_url: item.thumbnail_url,
            media_kind: item.kind,
            media_size,
            created_at: record.created_at,
            appeared_at: record.appeared_at,
            registered_at,
        });
    }
    chronological(facts)
}

#[cfg(test)]
#[path = "media_test.rs"]
mod tests;
