use chrono::NaiveDateTime;

use twilog_core::PostFact;

use crate::flatten::FlatRecord;

use super::dedup::finalize;
use super::media::decode_media;

/// Maps one record to its post row.
#[must_use]
pub fn to_post_fact(record: &FlatRecord, registered_at: NaiveDateTime) -> PostFact {
    PostFact {
        post_id: record.id,
        text: record.text.clone(),
        via: record.via.clone(),
        url: record.url(),
        user_id: record.author.user_id.clone(),
        user_name: record.author.name.clone(),
        screen_name: record.author.screen_name.clone(),
        is_repost: record.repost_of.is_some(),
        repost_target_id: record.repost_of.and_then(|r| r.id),
        is_quote: record.quote_of.is_some(),
        quote_target_id: record.quote_of.and_then(|r| r.id),
        has_media: record.attachments.iter().any(|m| decode_media(m).is_some()),
        has_external_link: !record.expanded_urls.is_empty(),
        created_at: record.created_at,
        appeared_at: record.appeared_at,
        registered_at,
    }
}

/// Post rows for a flattened batch, one per post id, oldest first.
#[must_use]
pub fn project_posts(records: &[FlatRecord], registered_at: NaiveDateTime) -> Vec<PostFact> {
    let facts: Vec<PostFact> = records
        .iter()
        .map(|r| to_post_fact(r, registered_at))
        .collect();
    finalize(facts, |f| f.post_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{jst, node, photo, post, with_media, with_quote, with_repost, with_urls};
    use crate::flatten::flatten;

    #[test]
    fn repost_scenario_marks_only_the_outer_post() {
        let outer = with_repost(post(100, "alice", 5, 0, "RT"), post(50, "bob", 2, 0, "old"));
        let records = flatten(&[node(outer)]).unwrap();
        let facts = project_posts(&records, jst(31, 0));

        // oldest first after the final reversal
        assert_eq!(facts.len(), 2);
        let target = &facts[0];
        let outer = &facts[1];

        assert_eq!(outer.post_id, 100);
        assert!(outer.is_repost);
        assert_eq!(outer.repost_target_id, Some(50));
        assert!(!outer.is_quote);

        assert_eq!(target.post_id, 50);
        assert!(!target.is_repost);
        assert!(target.repost_target_id.is_none());
        assert_eq!(target.screen_name, "bob");
        assert_eq!(target.appeared_at, jst(5, 0));
        assert_eq!(target.created_at, jst(2, 0));
        assert_eq!(target.registered_at, jst(31, 0));
    }

    #[test]
    fn quote_sets_quote_flag_and_target() {
        let outer = with_quote(post(70, "alice", 5, 0, "qt"), post(60, "bob", 1, 0, "src"));
        let facts = project_posts(&flatten(&[node(outer)]).unwrap(), jst(31, 0));
        let outer = facts.iter().find(|f| f.post_id == 70).unwrap();
        assert!(outer.is_quote);
        assert_eq!(outer.quote_target_id, Some(60));
        assert_eq!(outer.url, "https://twitter.com/alice/status/70");
        assert_eq!(outer.via, "Twitter Web App");
    }

    #[test]
    fn repeated_target_is_kept_once() {
        let shared = post(50, "bob", 1, 0, "popular");
        let nodes = vec![
            node(with_repost(post(102, "alice", 6, 0, "RT"), shared.clone())),
            node(with_repost(post(101, "carol", 5, 0, "RT"), shared)),
        ];
        let facts = project_posts(&flatten(&nodes).unwrap(), jst(31, 0));
        let ids: Vec<i64> = facts.iter().map(|f| f.post_id).collect();
        // first occurrence (appeared on day 6) survives
        assert_eq!(ids, vec![101, 50, 102]);
        let kept = facts.iter().find(|f| f.post_id == 50).unwrap();
        assert_eq!(kept.appeared_at, jst(6, 0));
    }

    #[test]
    fn media_and_link_flags() {
        let p = with_urls(
            with_media(post(80, "alice", 5, 0, "pic"), vec![photo("a.jpg")]),
            &["https://example.com"],
        );
        let plain = with_media(post(81, "alice", 5, 1, "odd"), vec![serde_json::json!({"type": "unknown"})]);
        let facts = project_posts(&flatten(&[node(plain), node(p)]).unwrap(), jst(31, 0));
        let with = facts.iter().find(|f| f.post_id == 80).unwrap();
        let without = facts.iter().find(|f| f.post_id == 81).unwrap();
        assert!(with.has_media && with.has_external_link);
        assert!(!without.has_media && !without.has_external_link);
    }
}
