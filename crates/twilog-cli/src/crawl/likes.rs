use twilog_core::TargetConfig;
use twilog_scraper::project::{project_external_links, project_liked_posts, project_media};
use twilog_scraper::{flatten, Credentials, FeedKind, IdentityCache};

use super::{require_credentials, CrawlContext, CrawlStatus};

/// Crawls the posts `target` has liked, down to the stored likes watermark.
///
/// Mirrors the posts cycle with a LikedPost stage in place of the Post stage
/// and no Metric stage. In replay mode the liking identity comes from the
/// cached identity file.
pub(super) async fn crawl_likes(
    ctx: &CrawlContext<'_>,
    target: &TargetConfig,
    credentials: Option<&Credentials>,
    identities: &mut IdentityCache,
) -> anyhow::Result<CrawlStatus> {
    let screen_name = target.screen_name.as_str();
    tracing::info!(screen_name, feed = %FeedKind::Likes, "crawl started");

    let (liker, nodes) = if ctx.options.from_cache {
        (
            ctx.cache.load_identity(screen_name)?,
            ctx.cache.load_nodes(screen_name, FeedKind::Likes)?,
        )
    } else {
        let credentials = require_credentials(credentials, screen_name)?;
        let liker = identities
            .resolve(ctx.client, credentials, screen_name)
            .await?;
        let watermark = twilog_db::select_max_liked_post_id(ctx.pool, screen_name).await?;
        tracing::debug!(screen_name, ?watermark, "likes watermark");

        let nodes = ctx
            .client
            .fetch_feed(credentials, FeedKind::Likes, &liker.user_id, watermark, &ctx.window)
            .await?;
        if !nodes.is_empty() {
            ctx.cache.store_nodes(screen_name, FeedKind::Likes, &nodes)?;
            ctx.cache.store_identity(screen_name, &liker)?;
        }
        (liker, nodes)
    };

    if nodes.is_empty() {
        tracing::info!(screen_name, "no new likes");
        return Ok(CrawlStatus::NoUpdate);
    }

    let records = flatten(&nodes)?;

    let liked = project_liked_posts(&records, &liker, ctx.registered_at);
    if !ctx.skip_write(screen_name, "liked_posts", liked.len()) {
        let written = twilog_db::upsert_liked_posts(ctx.pool, &liked).await?;
        tracing::info!(screen_name, count = written, "liked posts upserted");
    }

    let media = project_media(&records, ctx.probe, ctx.registered_at).await;
    if !ctx.skip_write(screen_name, "media", media.len()) {
        let written = twilog_db::upsert_media(ctx.pool, &media).await?;
        tracing::info!(screen_name, count = written, "media upserted");
    }

    let links = project_external_links(&records, ctx.registered_at);
    if !ctx.skip_write(screen_name, "external_links", links.len()) {
        let written = twilog_db::upsert_external_links(ctx.pool, &links).await?;
        tracing::info!(screen_name, count = written, "external links upserted");
    }

    Ok(CrawlStatus::Done)
}
