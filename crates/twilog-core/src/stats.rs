//! Usage statistics over an identity's full archived history.
//!
//! [`compute_stats`] merges one live [`MetricFact`] with aggregates computed
//! over every stored post of the identity. Calendar days are UTC+9 days,
//! because stored `appeared_at` values are UTC+9 wall-clock times.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use thiserror::Error;

use crate::facts::{MetricFact, PostHistory, StatsFact};

/// Lower bound of the following-slot heuristic.
const FOLLOWING_FLOOR: i64 = 5000;
const FOLLOWING_HEADROOM: f64 = 1.1;

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("no stored posts for {screen_name}; stats need at least one")]
    EmptyHistory { screen_name: String },
}

/// Computes derived usage metrics for one crawl cycle.
///
/// Ratios whose denominator is zero (no day span, nobody followed, no
/// followers) are `None`.
///
/// # Errors
///
/// Returns [`StatsError::EmptyHistory`] when `history` is empty; the time
/// span and every per-post average are undefined in that case.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn compute_stats(metric: MetricFact, history: &[PostHistory]) -> Result<StatsFact, StatsError> {
    let (Some(min_appeared_at), Some(max_appeared_at)) = (
        history.iter().map(|p| p.appeared_at).min(),
        history.iter().map(|p| p.appeared_at).max(),
    ) else {
        return Err(StatsError::EmptyHistory {
            screen_name: metric.screen_name,
        });
    };

    let duration_days = (max_appeared_at - min_appeared_at).num_days();
    let count_all = history.len() as i64;

    let mut by_day: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for post in history {
        *by_day.entry(post.appeared_at.date()).or_default() += 1;
    }
    let appeared_days = by_day.len() as i64;
    let non_appeared_days = duration_days - appeared_days;

    // Earliest day wins a tie for the peak.
    let (max_post_day, max_post_num_by_day) = by_day
        .iter()
        .fold((min_appeared_at.date(), 0_i64), |best, (day, count)| {
            if *count > best.1 {
                (*day, *count)
            } else {
                best
            }
        });

    let post_length_sum: i64 = history.iter().map(|p| p.text.chars().count() as i64).sum();
    let communication_count = history.iter().filter(|p| p.text.contains('@')).count() as i64;

    let following = metric.following_count;
    let followers = metric.followers_count;
    let ff_ratio = ratio(followers as f64, following as f64);
    let ff_ratio_inverse = ff_ratio.and_then(|r| ratio(1.0, r));

    let available_following =
        FOLLOWING_FLOOR.max((followers as f64 * FOLLOWING_HEADROOM).round_ties_even() as i64);
    let rest_available_following = available_following - following;

    Ok(StatsFact {
        min_appeared_at,
        max_appeared_at,
        duration_days,
        count_all,
        appeared_days,
        non_appeared_days,
        average_post_by_day: ratio(count_all as f64, appeared_days as f64),
        max_post_num_by_day,
        max_post_day,
        post_length_sum,
        post_length_by_count: ratio(post_length_sum as f64, count_all as f64),
        post_length_by_day: ratio(post_length_sum as f64, appeared_days as f64),
        communication_ratio: ratio(communication_count as f64 * 100.0, count_all as f64)
            .map(round_2),
        increase_following_by_day: ratio(following as f64, duration_days as f64),
        increase_followers_by_day: ratio(followers as f64, duration_days as f64),
        ff_ratio,
        ff_ratio_inverse,
        available_following,
        rest_available_following,
        metric,
    })
}

fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        None
    } else {
        Some(numerator / denominator)
    }
}

fn round_2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn post(day: u32, hour: u32, text: &str) -> PostHistory {
        PostHistory {
            appeared_at: at(day, hour),
            text: text.to_string(),
        }
    }

    fn metric(following: i64, followers: i64) -> MetricFact {
        MetricFact {
            screen_name: "alice".to_string(),
            status_count: 100,
            favorite_count: 50,
            media_count: 10,
            following_count: following,
            followers_count: followers,
            registered_at: at(31, 0),
        }
    }

    #[test]
    fn empty_history_is_rejected() {
        let err = compute_stats(metric(10, 10), &[]).unwrap_err();
        assert!(matches!(err, StatsError::EmptyHistory { ref screen_name } if screen_name == "alice"));
    }

    #[test]
    fn aggregates_span_days_and_lengths() {
        let history = vec![
            post(1, 9, "hello"),
            post(1, 21, "@bob hi"),
            post(3, 8, "abc"),
            post(11, 10, "日本語"),
        ];
        let stats = compute_stats(metric(200, 100), &history).unwrap();

        assert_eq!(stats.min_appeared_at, at(1, 9));
        assert_eq!(stats.max_appeared_at, at(11, 10));
        assert_eq!(stats.duration_days, 10);
        assert_eq!(stats.count_all, 4);
        assert_eq!(stats.appeared_days, 3);
        assert_eq!(stats.non_appeared_days, 7);
        assert_eq!(stats.average_post_by_day, Some(4.0 / 3.0));
        assert_eq!(stats.max_post_num_by_day, 2);
        assert_eq!(stats.max_post_day, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        // chars, not bytes: "日本語" counts as 3
        assert_eq!(stats.post_length_sum, 5 + 7 + 3 + 3);
        assert_eq!(stats.post_length_by_count, Some(18.0 / 4.0));
        assert_eq!(stats.post_length_by_day, Some(6.0));
        assert_eq!(stats.communication_ratio, Some(25.0));
        assert_eq!(stats.increase_following_by_day, Some(20.0));
        assert_eq!(stats.increase_followers_by_day, Some(10.0));
        assert_eq!(stats.ff_ratio, Some(0.5));
        assert_eq!(stats.ff_ratio_inverse, Some(2.0));
        assert_eq!(stats.available_following, 5000);
        assert_eq!(stats.rest_available_following, 4800);
        assert_eq!(stats.metric.followers_count, 100);
    }

    #[test]
    fn peak_day_tie_prefers_earliest_day() {
        let history = vec![post(5, 1, "a"), post(5, 2, "b"), post(2, 1, "c"), post(2, 3, "d")];
        let stats = compute_stats(metric(1, 1), &history).unwrap();
        assert_eq!(stats.max_post_num_by_day, 2);
        assert_eq!(stats.max_post_day, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    }

    #[test]
    fn single_day_history_guards_growth_rates() {
        let history = vec![post(4, 1, "one"), post(4, 23, "two")];
        let stats = compute_stats(metric(10, 20), &history).unwrap();
        assert_eq!(stats.duration_days, 0);
        assert_eq!(stats.non_appeared_days, -1);
        assert!(stats.increase_following_by_day.is_none());
        assert!(stats.increase_followers_by_day.is_none());
        assert_eq!(stats.ff_ratio, Some(2.0));
    }

    #[test]
    fn zero_following_guards_follow_ratio() {
        let stats = compute_stats(metric(0, 30), &[post(1, 0, "x")]).unwrap();
        assert!(stats.ff_ratio.is_none());
        assert!(stats.ff_ratio_inverse.is_none());
    }

    #[test]
    fn zero_followers_guards_inverse_ratio() {
        let stats = compute_stats(metric(30, 0), &[post(1, 0, "x")]).unwrap();
        assert_eq!(stats.ff_ratio, Some(0.0));
        assert!(stats.ff_ratio_inverse.is_none());
    }

    #[test]
    fn available_following_scales_with_large_follower_counts() {
        let stats = compute_stats(metric(6000, 10_000), &[post(1, 0, "x")]).unwrap();
        assert_eq!(stats.available_following, 11_000);
        assert_eq!(stats.rest_available_following, 5000);
    }

    #[test]
    fn communication_ratio_rounds_to_two_decimals() {
        let history = vec![post(1, 0, "@a"), post(1, 1, "b"), post(1, 2, "c")];
        let stats = compute_stats(metric(1, 1), &history).unwrap();
        assert_eq!(stats.communication_ratio, Some(33.33));
    }
}
