use chrono::NaiveDateTime;

use twilog_core::MetricFact;

use crate::flatten::FlatRecord;

/// Live counters of `screen_name`, from the last record it authored.
///
/// Scans from the end of the flattened batch. Returns `None` when the batch
/// holds no self-authored record with counters, e.g. a batch of reposts.
#[must_use]
pub fn project_metric(
    records: &[FlatRecord],
    screen_name: &str,
    registered_at: NaiveDateTime,
) -> Option<MetricFact> {
    records.iter().rev().find_map(|r| {
        if r.author.screen_name != screen_name {
            return None;
        }
        let counters = r.author.counters?;
        Some(MetricFact {
            screen_name: r.author.screen_name.clone(),
            status_count: counters.statuses,
            favorite_count: counters.favourites,
            media_count: counters.media,
            following_count: counters.following,
            followers_count: counters.followers,
            registered_at,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{jst, node, post, with_repost};
    use crate::flatten::flatten;

    #[test]
    fn reads_counters_from_self_authored_record() {
        let mut older = post(10, "alice", 1, 0, "old");
        older["core"]["user_results"]["result"]["legacy"]["followers_count"] = 5.into();
        let nodes = vec![node(post(11, "alice", 2, 0, "new")), node(older)];
        let metric = project_metric(&flatten(&nodes).unwrap(), "alice", jst(31, 0)).unwrap();

        // scanned from the end, so the oldest self-authored record wins
        assert_eq!(metric.followers_count, 5);
        assert_eq!(metric.screen_name, "alice");
        assert_eq!(metric.status_count, 1200);
        assert_eq!(metric.favorite_count, 3400);
        assert_eq!(metric.media_count, 56);
        assert_eq!(metric.following_count, 78);
        assert_eq!(metric.registered_at, jst(31, 0));
    }

    #[test]
    fn batch_of_reposts_of_others_yields_nothing() {
        let outer = with_repost(post(20, "carol", 3, 0, "RT"), post(5, "bob", 1, 0, "x"));
        let records = flatten(&[node(outer)]).unwrap();
        assert!(project_metric(&records, "alice", jst(31, 0)).is_none());
    }

    #[test]
    fn record_without_counters_is_passed_over() {
        let mut p = post(30, "alice", 3, 0, "x");
        p["core"]["user_results"]["result"]["legacy"]
            .as_object_mut()
            .unwrap()
            .remove("media_count");
        let records = flatten(&[node(p)]).unwrap();
        assert!(project_metric(&records, "alice", jst(31, 0)).is_none());
    }
}
