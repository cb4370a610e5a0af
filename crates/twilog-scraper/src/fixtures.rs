//! JSON builders for feed nodes used across unit tests.

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{json, Value};

use crate::types::RawNode;

pub(crate) const SOURCE: &str =
    r#"<a href="https://mobile.twitter.com" rel="nofollow">Twitter Web App</a>"#;

fn utc(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

/// Upstream-formatted timestamp for 2024-01-`day` at `hour`:00 UTC.
pub(crate) fn stamp(day: u32, hour: u32) -> String {
    utc(day, hour)
        .and_utc()
        .format("%a %b %d %H:%M:%S +0000 %Y")
        .to_string()
}

/// The UTC+9 wall-clock value [`stamp`] parses to.
pub(crate) fn jst(day: u32, hour: u32) -> NaiveDateTime {
    utc(day, hour) + chrono::Duration::hours(9)
}

pub(crate) fn user(screen_name: &str) -> Value {
    json!({
        "result": {
            "__typename": "User",
            "rest_id": format!("{screen_name}_id"),
            "legacy": {
                "name": format!("{screen_name} name"),
                "screen_name": screen_name,
                "statuses_count": 1200,
                "favourites_count": 3400,
                "media_count": 56,
                "friends_count": 78,
                "followers_count": 910
            }
        }
    })
}

/// A plain post body (the value under `result`).
pub(crate) fn post(id: i64, screen_name: &str, day: u32, hour: u32, text: &str) -> Value {
    json!({
        "__typename": "Tweet",
        "rest_id": id.to_string(),
        "source": SOURCE,
        "core": {"user_results": user(screen_name)},
        "legacy": {
            "full_text": text,
            "created_at": stamp(day, hour),
            "entities": {"hashtags": [], "urls": []}
        }
    })
}

pub(crate) fn node(post: Value) -> RawNode {
    RawNode(json!({ "result": post }))
}

pub(crate) fn with_repost(mut outer: Value, target: Value) -> Value {
    outer["legacy"]["retweeted_status_result"] = json!({ "result": target });
    outer
}

pub(crate) fn with_quote(mut outer: Value, target: Value) -> Value {
    outer["quoted_status_result"] = json!({ "result": target });
    outer
}

pub(crate) fn with_media(mut post: Value, media: Vec<Value>) -> Value {
    post["legacy"]["extended_entities"] = json!({ "media": media });
    post
}

pub(crate) fn with_urls(mut post: Value, urls: &[&str]) -> Value {
    let entries: Vec<Value> = urls
        .iter()
        .map(|u| json!({"url": "https://t.co/x", "expanded_url": u}))
        .collect();
    post["legacy"]["entities"]["urls"] = Value::Array(entries);
    post
}

pub(crate) fn photo(name: &str) -> Value {
    json!({
        "type": "photo",
        "media_url_https": format!("https://pbs.twimg.com/media/{name}")
    })
}

pub(crate) fn video(kind: &str, variants: Value) -> Value {
    json!({
        "type": kind,
        "media_url_https": "https://pbs.twimg.com/ext_tw_video_thumb/1/pu/img/thumb.jpg",
        "video_info": { "variants": variants }
    })
}
