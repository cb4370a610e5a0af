//! Database operations for the `posts` table.

use chrono::NaiveDateTime;
use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::{PgPool, Postgres};

use twilog_core::{PostFact, PostHistory};

use crate::DbError;

/// Highest stored post id authored by `screen_name`; the posts-feed watermark.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn select_max_post_id(pool: &PgPool, screen_name: &str) -> Result<Option<i64>, DbError> {
    let max_id = sqlx::query_scalar::<_, Option<i64>>(
        "SELECT MAX(post_id) FROM posts WHERE screen_name = $1",
    )
    .bind(screen_name)
    .fetch_one(pool)
    .await?;

    Ok(max_id)
}

/// Binds the [`PostFact`] columns shared by `posts` and `liked_posts`, from
/// `post_id` through `has_external_link`. Timestamps are bound by the caller.
pub(crate) fn bind_post_columns<'q>(
    query: Query<'q, Postgres, PgArguments>,
    post: &'q PostFact,
) -> Query<'q, Postgres, PgArguments> {
    query
        .bind(post.post_id)
        .bind(&post.text)
        .bind(&post.via)
        .bind(&post.url)
        .bind(&post.user_id)
        .bind(&post.user_name)
        .bind(&post.screen_name)
        .bind(post.is_repost)
        .bind(post.repost_target_id)
        .bind(post.is_quote)
        .bind(post.quote_target_id)
        .bind(post.has_media)
        .bind(post.has_external_link)
}

/// Upserts a batch of posts in one transaction.
///
/// On `post_id` conflict every column except the key and the three
/// timestamps is overwritten. An empty batch issues no statements.
///
/// Returns the number of rows written.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any statement fails; the batch is rolled back.
pub async fn upsert_posts(pool: &PgPool, posts: &[PostFact]) -> Result<usize, DbError> {
    if posts.is_empty() {
        return Ok(0);
    }

    let mut tx = pool.begin().await?;

    for post in posts {
        let query = sqlx::query(
            "INSERT INTO posts \
                 (post_id, text, via, url, user_id, user_name, screen_name, \
                  is_repost, repost_target_id, is_quote, quote_target_id, \
                  has_media, has_external_link, created_at, appeared_at, registered_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) \
             ON CONFLICT (post_id) DO UPDATE SET \
                 text              = EXCLUDED.text, \
                 via               = EXCLUDED.via, \
                 url               = EXCLUDED.url, \
                 user_id           = EXCLUDED.user_id, \
                 user_name         = EXCLUDED.user_name, \
                 screen_name       = EXCLUDED.screen_name, \
                 is_repost         = EXCLUDED.is_repost, \
                 repost_target_id  = EXCLUDED.repost_target_id, \
                 is_quote          = EXCLUDED.is_quote, \
                 quote_target_id   = EXCLUDED.quote_target_id, \
                 has_media         = EXCLUDED.has_media, \
                 has_external_link = EXCLUDED.has_external_link",
        );
        bind_post_columns(query, post)
            .bind(post.created_at)
            .bind(post.appeared_at)
            .bind(post.registered_at)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    tracing::debug!(count = posts.len(), "upserted posts");
    Ok(posts.len())
}

/// Every stored post authored by `screen_name`, oldest appearance first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_post_history(
    pool: &PgPool,
    screen_name: &str,
) -> Result<Vec<PostHistory>, DbError> {
    let rows = sqlx::query_as::<_, (NaiveDateTime, String)>(
        "SELECT appeared_at, text FROM posts \
         WHERE screen_name = $1 \
         ORDER BY appeared_at, post_id",
    )
    .bind(screen_name)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(appeared_at, text)| PostHistory { appeared_at, text })
        .collect())
}
