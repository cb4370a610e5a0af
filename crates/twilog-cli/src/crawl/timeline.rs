//! The posts cycle: Post, Media, ExternalLink, then Metric and Stats.

use chrono::NaiveDateTime;

use twilog_core::{compute_stats, ExternalLinkFact, MediaFact, MetricFact, PostFact, TargetConfig};
use twilog_scraper::project::{project_external_links, project_media, project_metric, project_posts};
use twilog_scraper::{flatten, Credentials, FeedKind, FlatRecord, IdentityCache, SizeProbe};

use super::{require_credentials, CrawlContext, CrawlStatus};

/// Everything one posts batch produces, in write order.
#[derive(Debug)]
pub(super) struct TimelineFacts {
    pub posts: Vec<PostFact>,
    pub media: Vec<MediaFact>,
    pub links: Vec<ExternalLinkFact>,
    /// `None` when the batch holds no self-authored post; no stats follow.
    pub metric: Option<MetricFact>,
}

pub(super) async fn project_timeline<P: SizeProbe>(
    records: &[FlatRecord],
    screen_name: &str,
    probe: &P,
    registered_at: NaiveDateTime,
) -> TimelineFacts {
    TimelineFacts {
        posts: project_posts(records, registered_at),
        media: project_media(records, probe, registered_at).await,
        links: project_external_links(records, registered_at),
        metric: project_metric(records, screen_name, registered_at),
    }
}

/// Crawls `target`'s own feed down to the stored watermark and upserts every
/// fact derived from it.
///
/// Flattening finishes for the whole batch before anything is written, so a
/// structural failure persists nothing. The Metric stage is skipped when the
/// batch holds no self-authored post.
pub(super) async fn crawl_timeline(
    ctx: &CrawlContext<'_>,
    target: &TargetConfig,
    credentials: Option<&Credentials>,
    identities: &mut IdentityCache,
) -> anyhow::Result<CrawlStatus> {
    let screen_name = target.screen_name.as_str();
    tracing::info!(screen_name, feed = %FeedKind::Timeline, "crawl started");

    let nodes = if ctx.options.from_cache {
        ctx.cache.load_nodes(screen_name, FeedKind::Timeline)?
    } else {
        let credentials = require_credentials(credentials, screen_name)?;
        let identity = identities
            .resolve(ctx.client, credentials, screen_name)
            .await?;
        let watermark = twilog_db::select_max_post_id(ctx.pool, screen_name).await?;
        tracing::debug!(screen_name, ?watermark, "posts watermark");

        let nodes = ctx
            .client
            .fetch_feed(
                credentials,
                FeedKind::Timeline,
                &identity.user_id,
                watermark,
                &ctx.window,
            )
            .await?;
        if !nodes.is_empty() {
            ctx.cache.store_nodes(screen_name, FeedKind::Timeline, &nodes)?;
            ctx.cache.store_identity(screen_name, &identity)?;
        }
        nodes
    };

    if nodes.is_empty() {
        tracing::info!(screen_name, "no new posts");
        return Ok(CrawlStatus::NoUpdate);
    }

    let records = flatten(&nodes)?;
    tracing::info!(screen_name, nodes = nodes.len(), count = records.len(), "batch flattened");

    let facts = project_timeline(&records, screen_name, ctx.probe, ctx.registered_at).await;

    if !ctx.skip_write(screen_name, "posts", facts.posts.len()) {
        let written = twilog_db::upsert_posts(ctx.pool, &facts.posts).await?;
        tracing::info!(screen_name, count = written, "posts upserted");
    }

    if !ctx.skip_write(screen_name, "media", facts.media.len()) {
        let written = twilog_db::upsert_media(ctx.pool, &facts.media).await?;
        tracing::info!(screen_name, count = written, "media upserted");
    }

    if !ctx.skip_write(screen_name, "external_links", facts.links.len()) {
        let written = twilog_db::upsert_external_links(ctx.pool, &facts.links).await?;
        tracing::info!(screen_name, count = written, "external links upserted");
    }

    let Some(metric) = facts.metric else {
        tracing::info!(screen_name, "no self-authored post in batch; metric skipped");
        return Ok(CrawlStatus::Done);
    };
    if ctx.skip_write(screen_name, "metric", 1) {
        return Ok(CrawlStatus::Done);
    }

    let history = twilog_db::list_post_history(ctx.pool, screen_name).await?;
    let stats = compute_stats(metric, &history)?;
    twilog_db::upsert_metric(ctx.pool, &stats).await?;
    tracing::info!(
        screen_name,
        count_all = stats.count_all,
        followers = stats.metric.followers_count,
        "metric upserted"
    );

    Ok(CrawlStatus::Done)
}
