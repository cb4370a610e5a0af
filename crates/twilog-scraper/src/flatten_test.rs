use serde_json::json;

use super::*;
use crate::fixtures::{jst, node, post, with_media, with_quote, with_repost, with_urls};

#[test]
fn plain_post_flattens_to_one_record() {
    let nodes = vec![node(post(10, "alice", 3, 1, "hello"))];
    let records = flatten(&nodes).unwrap();

    assert_eq!(records.len(), 1);
    let r = &records[0];
    assert_eq!(r.id, 10);
    assert_eq!(r.created_at, jst(3, 1));
    assert_eq!(r.appeared_at, jst(3, 1));
    assert_eq!(r.via, "Twitter Web App");
    assert_eq!(r.text, "hello");
    assert_eq!(r.author.screen_name, "alice");
    assert_eq!(r.author.user_id, "alice_id");
    assert_eq!(r.author.counters.unwrap().followers, 910);
    assert!(r.repost_of.is_none());
    assert!(r.quote_of.is_none());
    assert_eq!(r.url(), "https://twitter.com/alice/status/10");
}

#[test]
fn repost_target_inherits_outer_appeared_at() {
    // id=100 at T1 reposts id=50 authored at T0
    let outer = with_repost(post(100, "alice", 5, 12, "RT @bob: old"), post(50, "bob", 2, 8, "old"));
    let records = flatten(&[node(outer)]).unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, 100);
    assert_eq!(records[0].appeared_at, jst(5, 12));
    assert_eq!(records[0].created_at, jst(5, 12));
    assert_eq!(records[0].repost_of, Some(EmbeddedRef { id: Some(50) }));

    assert_eq!(records[1].id, 50);
    assert_eq!(records[1].appeared_at, jst(5, 12));
    assert_eq!(records[1].created_at, jst(2, 8));
    assert!(records[1].repost_of.is_none());
}

#[test]
fn repost_of_quote_emits_outer_repost_then_nested_quote() {
    let quoted = post(40, "carol", 1, 0, "original");
    let reposted = with_quote(post(50, "bob", 2, 0, "look at this"), quoted);
    let outer = with_repost(post(100, "alice", 4, 0, "RT"), reposted);

    let records = flatten(&[node(outer)]).unwrap();
    let ids: Vec<i64> = records.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![100, 50, 40]);
    assert!(records.iter().all(|r| r.appeared_at == jst(4, 0)));
    assert_eq!(records[2].created_at, jst(1, 0));
    assert_eq!(records[0].quote_of, Some(EmbeddedRef { id: Some(40) }));
    assert_eq!(records[1].quote_of, Some(EmbeddedRef { id: Some(40) }));
}

#[test]
fn tombstoned_node_contributes_nothing() {
    let nodes = vec![
        crate::types::RawNode(json!({"result": {"__typename": "TweetTombstone"}})),
        node(post(11, "alice", 3, 0, "kept")),
    ];
    let records = flatten(&nodes).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, 11);
}

#[test]
fn tombstoned_quote_target_is_referenced_but_not_emitted() {
    let outer = with_quote(
        post(12, "alice", 3, 0, "quoting a deleted post"),
        json!({"__typename": "TweetTombstone"}),
    );
    let records = flatten(&[node(outer)]).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].quote_of, Some(EmbeddedRef { id: None }));
}

#[test]
fn visibility_wrapped_target_is_unwrapped() {
    let wrapped = json!({
        "__typename": "TweetWithVisibilityResults",
        "tweet": post(60, "dave", 1, 0, "limited")
    });
    let outer = with_quote(post(13, "alice", 3, 0, "qt"), wrapped);
    let records = flatten(&[node(outer)]).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].id, 60);
    assert_eq!(records[0].quote_of, Some(EmbeddedRef { id: Some(60) }));
}

#[test]
fn missing_source_aborts_whole_batch() {
    let mut broken = post(14, "alice", 3, 0, "no source");
    broken.as_object_mut().unwrap().remove("source");
    let nodes = vec![node(post(15, "alice", 3, 1, "fine")), node(broken)];
    let err = flatten(&nodes).unwrap_err();
    assert!(matches!(err, ScraperError::Structure { .. }), "{err:?}");
}

#[test]
fn malformed_repost_target_aborts() {
    let outer = with_repost(post(16, "alice", 3, 0, "RT"), json!({"rest_id": "17"}));
    assert!(matches!(
        flatten(&[node(outer)]),
        Err(ScraperError::Structure { .. })
    ));
}

#[test]
fn missing_result_envelope_aborts() {
    let nodes = vec![crate::types::RawNode(json!({"tweet": {}}))];
    assert!(matches!(flatten(&nodes), Err(ScraperError::Structure { .. })));
}

#[test]
fn collects_expanded_urls_and_attachments() {
    let p = with_urls(
        with_media(post(18, "alice", 3, 0, "links"), vec![json!({"type": "photo"})]),
        &["https://example.com/a", "https://example.com/b"],
    );
    let records = flatten(&[node(p)]).unwrap();
    assert_eq!(
        records[0].expanded_urls,
        vec!["https://example.com/a", "https://example.com/b"]
    );
    assert_eq!(records[0].attachments.len(), 1);
}

#[test]
fn source_label_extracts_anchor_text() {
    assert_eq!(
        source_label(r#"<a href="http://x" rel="nofollow">Tweetbot for iΟS</a>"#).as_deref(),
        Some("Tweetbot for iΟS")
    );
    assert_eq!(source_label("plain text"), None);
}
