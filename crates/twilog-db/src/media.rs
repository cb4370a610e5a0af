use sqlx::PgPool;

use twilog_core::MediaFact;

use crate::DbError;

/// Upserts media rows in one transaction, keyed by
/// `(post_id, media_filename, registered_at)`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any statement fails; the batch is rolled back.
pub async fn upsert_media(pool: &PgPool, media: &[MediaFact]) -> Result<usize, DbError> {
    if media.is_empty() {
        return Ok(0);
    }

    let mut tx = pool.begin().await?;

    for fact in media {
        sqlx::query(
            "INSERT INTO media \
                 (post_id, post_text, post_via, post_url, media_filename, media_url, \
                  media_thumbnail_url, media_kind, media_size, \
                  created_at, appeared_at, registered_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             ON CONFLICT (post_id, media_filename, registered_at) DO UPDATE SET \
                 post_text           = EXCLUDED.post_text, \
                 post_via            = EXCLUDED.post_via, \
                 post_url            = EXCLUDED.post_url, \
                 media_url           = EXCLUDED.media_url, \
                 media_thumbnail_url = EXCLUDED.media_thumbnail_url, \
                 media_kind          = EXCLUDED.media_kind, \
                 media_size          = EXCLUDED.media_size",
        )
        .bind(fact.post_id)
        .bind(&fact.post_text)
        .bind(&fact.post_via)
        .bind(&fact.post_url)
        .bind(&fact.media_filename)
        .bind(&fact.media_url)
        .bind(&fact.media_thumbnail_url)
        .bind(fact.media_kind.as_str())
        .bind(fact.media_size)
        .bind(fact.created_at)
        .bind(fact.appeared_at)
        .bind(fact.registered_at)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    tracing::debug!(count = media.len(), "upserted media");
    Ok(media.len())
}
