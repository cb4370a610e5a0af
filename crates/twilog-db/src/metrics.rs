//! Database operations for the `metrics` table.

use chrono::{NaiveDate, NaiveDateTime};
use sqlx::PgPool;

use twilog_core::{MetricFact, StatsFact};

use crate::DbError;

/// A row from the `metrics` table.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct MetricRow {
    pub screen_name: String,
    pub status_count: i64,
    pub favorite_count: i64,
    pub media_count: i64,
    pub following_count: i64,
    pub followers_count: i64,
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
    pub communication_ratio: Option<f64>,
    pub increase_following_by_day: Option<f64>,
    pub increase_followers_by_day: Option<f64>,
    pub ff_ratio: Option<f64>,
    pub ff_ratio_inverse: Option<f64>,
    pub available_following: i64,
    pub rest_available_following: i64,
    pub registered_at: NaiveDateTime,
}

impl MetricRow {
    /// The live counters of this row, without the aggregates.
    #[must_use]
    pub fn counters(&self) -> MetricFact {
        MetricFact {
            screen_name: self.screen_name.clone(),
            status_count: self.status_count,
            favorite_count: self.favorite_count,
            media_count: self.media_count,
            following_count: self.following_count,
            followers_count: self.followers_count,
            registered_at: self.registered_at,
        }
    }
}

/// Upserts one metric row keyed by `(screen_name, registered_at)`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_metric(pool: &PgPool, stats: &StatsFact) -> Result<(), DbError> {
    let metric = &stats.metric;

    sqlx::query(
        "INSERT INTO metrics \
             (screen_name, status_count, favorite_count, media_count, following_count, \
              followers_count, min_appeared_at, max_appeared_at, duration_days, count_all, \
              appeared_days, non_appeared_days, average_post_by_day, max_post_num_by_day, \
              max_post_day, post_length_sum, post_length_by_count, post_length_by_day, \
              communication_ratio, increase_following_by_day, increase_followers_by_day, \
              ff_ratio, ff_ratio_inverse, available_following, rest_available_following, \
              registered_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, \
                 $17, $18, $19, $20, $21, $22, $23, $24, $25, $26) \
         ON CONFLICT (screen_name, registered_at) DO UPDATE SET \
             status_count              = EXCLUDED.status_count, \
             favorite_count            = EXCLUDED.favorite_count, \
             media_count               = EXCLUDED.media_count, \
             following_count           = EXCLUDED.following_count, \
             followers_count           = EXCLUDED.followers_count, \
             min_appeared_at           = EXCLUDED.min_appeared_at, \
             max_appeared_at           = EXCLUDED.max_appeared_at, \
             duration_days             = EXCLUDED.duration_days, \
             count_all                 = EXCLUDED.count_all, \
             appeared_days             = EXCLUDED.appeared_days, \
             non_appeared_days         = EXCLUDED.non_appeared_days, \
             average_post_by_day       = EXCLUDED.average_post_by_day, \
             max_post_num_by_day       = EXCLUDED.max_post_num_by_day, \
             max_post_day              = EXCLUDED.max_post_day, \
             post_length_sum           = EXCLUDED.post_length_sum, \
             post_length_by_count      = EXCLUDED.post_length_by_count, \
             post_length_by_day        = EXCLUDED.post_length_by_day, \
             communication_ratio       = EXCLUDED.communication_ratio, \
             increase_following_by_day = EXCLUDED.increase_following_by_day, \
             increase_followers_by_day = EXCLUDED.increase_followers_by_day, \
             ff_ratio                  = EXCLUDED.ff_ratio, \
             ff_ratio_inverse          = EXCLUDED.ff_ratio_inverse, \
             available_following       = EXCLUDED.available_following, \
             rest_available_following  = EXCLUDED.rest_available_following",
    )
    .bind(&metric.screen_name)
    .bind(metric.status_count)
    .bind(metric.favorite_count)
    .bind(metric.media_count)
    .bind(metric.following_count)
    .bind(metric.followers_count)
    .bind(stats.min_appeared_at)
    .bind(stats.max_appeared_at)
    .bind(stats.duration_days)
    .bind(stats.count_all)
    .bind(stats.appeared_days)
    .bind(stats.non_appeared_days)
    .bind(stats.average_post_by_day)
    .bind(stats.max_post_num_by_day)
    .bind(stats.max_post_day)
    .bind(stats.post_length_sum)
    .bind(stats.post_length_by_count)
    .bind(stats.post_length_by_day)
    .bind(stats.communication_ratio)
    .bind(stats.increase_following_by_day)
    .bind(stats.increase_followers_by_day)
    .bind(stats.ff_ratio)
    .bind(stats.ff_ratio_inverse)
    .bind(stats.available_following)
    .bind(stats.rest_available_following)
    .bind(metric.registered_at)
    .execute(pool)
    .await?;

    tracing::debug!(screen_name = %metric.screen_name, "upserted metric");
    Ok(())
}

/// The most recently registered metric row for `screen_name`, if any.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn latest_metric(pool: &PgPool, screen_name: &str) -> Result<Option<MetricRow>, DbError> {
    let row = sqlx::query_as::<_, MetricRow>(
        "SELECT * FROM metrics \
         WHERE screen_name = $1 \
         ORDER BY registered_at DESC \
         LIMIT 1",
    )
    .bind(screen_name)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}
