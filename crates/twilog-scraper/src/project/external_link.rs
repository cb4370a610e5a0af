use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;

use twilog_core::ExternalLinkFact;

use crate::flatten::FlatRecord;

use super::dedup::finalize;

/// Known link forms, checked in order. The first match names the type.
static LINK_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"^https://www.pixiv.net/artworks/[0-9]+", "pixiv"),
        (r"^https://www.pixiv.net/novel/show.php\?id=[0-9]+", "pixiv_novel"),
        (r"^https?://nijie.info/view.php\?id=[0-9]+", "nijie"),
        (r"^https?://nijie.info/view_popup.php\?id=[0-9]+", "nijie"),
        (r"^https://seiga.nicovideo.jp/seiga/(im)[0-9]+", "nico_seiga"),
        (r"^http://nico.ms/(im)[0-9]+", "nico_seiga"),
        (r"^https://skeb.jp/@(.+?)/works/([0-9]+)", "skeb"),
    ]
    .into_iter()
    .map(|(pattern, tag)| (Regex::new(pattern).expect("valid link pattern"), tag))
    .collect()
});

/// Site tag for a known link form, or `""` when unclassified.
#[must_use]
pub fn classify_link(url: &str) -> &'static str {
    LINK_PATTERNS
        .iter()
        .find(|(re, _)| re.is_match(url))
        .map_or("", |(_, tag)| *tag)
}

/// Link rows for a flattened batch, one per (post id, URL), oldest first.
#[must_use]
pub fn project_external_links(
    records: &[FlatRecord],
    registered_at: NaiveDateTime,
) -> Vec<ExternalLinkFact> {
    let facts: Vec<ExternalLinkFact> = records
        .iter()
        .flat_map(|r| {
            r.expanded_urls.iter().map(move |url| ExternalLinkFact {
                post_id: r.id,
                post_text: r.text.clone(),
                post_via: r.via.clone(),
                post_url: r.url(),
                external_link_url: url.clone(),
                external_link_type: classify_link(url).to_owned(),
                created_at: r.created_at,
                appeared_at: r.appeared_at,
                registered_at,
            })
        })
        .collect();

    let unclassified = facts.iter().filter(|f| f.external_link_type.is_empty()).count();
    if unclassified > 0 {
        tracing::debug!(unclassified, total = facts.len(), "unclassified external links");
    }
    finalize(facts, |f| (f.post_id, f.external_link_url.clone()))
}
