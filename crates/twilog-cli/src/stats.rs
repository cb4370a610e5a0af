//! `twilog stats`: read-only recomputation of the latest metric row.

use twilog_core::{compute_stats, ScreenName};

/// Recomputes stats for `target` from its stored post history and the
/// counters of its latest stored metric row, and prints them as JSON.
///
/// Nothing is written.
///
/// # Errors
///
/// Returns an error if the screen name is invalid, no metric row has been
/// stored yet, the target has no stored posts or a query fails.
pub(crate) async fn run_stats(pool: &sqlx::PgPool, target: &str) -> anyhow::Result<()> {
    let screen_name = ScreenName::new(target)?;

    let latest = twilog_db::latest_metric(pool, screen_name.as_str())
        .await?
        .ok_or_else(|| {
            anyhow::anyhow!("no stored metric for {screen_name}; run `twilog crawl` first")
        })?;
    let history = twilog_db::list_post_history(pool, screen_name.as_str()).await?;

    let stats = compute_stats(latest.counters(), &history)?;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
