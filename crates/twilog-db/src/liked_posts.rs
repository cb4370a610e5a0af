//! Database operations for the `liked_posts` table.

use sqlx::PgPool;

use twilog_core::LikedPostFact;

use crate::posts::bind_post_columns;
use crate::DbError;

/// Highest stored liked-post id for the liking identity; the likes-feed
/// watermark.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn select_max_liked_post_id(
    pool: &PgPool,
    liked_by_screen_name: &str,
) -> Result<Option<i64>, DbError> {
    let max_id = sqlx::query_scalar::<_, Option<i64>>(
        "SELECT MAX(post_id) FROM liked_posts WHERE liked_by_screen_name = $1",
    )
    .bind(liked_by_screen_name)
    .fetch_one(pool)
    .await?;

    Ok(max_id)
}

/// Upserts a batch of liked posts in one transaction, keyed by
/// `(liked_by_screen_name, post_id)`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any statement fails; the batch is rolled back.
pub async fn upsert_liked_posts(pool: &PgPool, liked: &[LikedPostFact]) -> Result<usize, DbError> {
    if liked.is_empty() {
        return Ok(0);
    }

    let mut tx = pool.begin().await?;

    for fact in liked {
        let query = sqlx::query(
            "INSERT INTO liked_posts \
                 (post_id, text, via, url, user_id, user_name, screen_name, \
                  is_repost, repost_target_id, is_quote, quote_target_id, \
                  has_media, has_external_link, \
                  liked_by_screen_name, liked_by_user_id, liked_by_user_name, \
                  created_at, appeared_at, registered_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, \
                     $14, $15, $16, $17, $18, $19) \
             ON CONFLICT (liked_by_screen_name, post_id) DO UPDATE SET \
                 text               = EXCLUDED.text, \
                 via                = EXCLUDED.via, \
                 url                = EXCLUDED.url, \
                 user_id            = EXCLUDED.user_id, \
                 user_name          = EXCLUDED.user_name, \
                 screen_name        = EXCLUDED.screen_name, \
                 is_repost          = EXCLUDED.is_repost, \
                 repost_target_id   = EXCLUDED.repost_target_id, \
                 is_quote           = EXCLUDED.is_quote, \
                 quote_target_id    = EXCLUDED.quote_target_id, \
                 has_media          = EXCLUDED.has_media, \
                 has_external_link  = EXCLUDED.has_external_link, \
                 liked_by_user_id   = EXCLUDED.liked_by_user_id, \
                 liked_by_user_name = EXCLUDED.liked_by_user_name",
        );
        bind_post_columns(query, &fact.post)
            .bind(&fact.liked_by_screen_name)
            .bind(&fact.liked_by_user_id)
            .bind(&fact.liked_by_user_name)
            .bind(fact.post.created_at)
            .bind(fact.post.appeared_at)
            .bind(fact.post.registered_at)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    tracing::debug!(count = liked.len(), "upserted liked posts");
    Ok(liked.len())
}
