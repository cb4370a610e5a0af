use sqlx::PgPool;

use twilog_core::ExternalLinkFact;

use crate::DbError;

/// Upserts outbound-link rows in one transaction, keyed by
/// `(post_id, external_link_url, registered_at)`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any statement fails; the batch is rolled back.
pub async fn upsert_external_links(
    pool: &PgPool,
    links: &[ExternalLinkFact],
) -> Result<usize, DbError> {
    if links.is_empty() {
        return Ok(0);
    }

    let mut tx = pool.begin().await?;

    for fact in links {
        sqlx::query(
            "INSERT INTO external_links \
                 (post_id, post_text, post_via, post_url, external_link_url, external_link_type, \
                  created_at, appeared_at, registered_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             ON CONFLICT (post_id, external_link_url, registered_at) DO UPDATE SET \
                 post_text          = EXCLUDED.post_text, \
                 post_via           = EXCLUDED.post_via, \
                 post_url           = EXCLUDED.post_url, \
                 external_link_type = EXCLUDED.external_link_type",
        )
        .bind(fact.post_id)
        .bind(&fact.post_text)
        .bind(&fact.post_via)
        .bind(&fact.post_url)
        .bind(&fact.external_link_url)
        .bind(&fact.external_link_type)
        .bind(fact.created_at)
        .bind(fact.appeared_at)
        .bind(fact.registered_at)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    tracing::debug!(count = links.len(), "upserted external links");
    Ok(links.len())
}
