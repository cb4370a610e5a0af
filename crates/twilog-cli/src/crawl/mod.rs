//! Crawl command handlers for the CLI.
//!
//! Targets are processed one at a time. Each target runs a posts cycle and
//! then a likes cycle; a failed cycle is logged and skipped rather than
//! propagated so a single bad target does not abort the full run.

mod cache;
mod likes;
mod timeline;

use chrono::NaiveDateTime;

use twilog_core::{AppConfig, TargetConfig, TargetsFile};
use twilog_scraper::{Credentials, FeedClient, FetchWindow, HeadProbe, IdentityCache};

use self::cache::CacheDir;

/// Flags of `twilog crawl`.
#[derive(Debug, Clone, Default)]
pub(crate) struct CrawlOptions {
    pub target: Option<String>,
    pub from_cache: bool,
    pub dry_run: bool,
}

/// Outcome of one feed cycle for one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CrawlStatus {
    /// The fetch returned nothing past the watermark.
    NoUpdate,
    Done,
}

impl std::fmt::Display for CrawlStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CrawlStatus::NoUpdate => write!(f, "no update"),
            CrawlStatus::Done => write!(f, "done"),
        }
    }
}

/// Shared, read-only state for every cycle of one run.
struct CrawlContext<'a> {
    pool: &'a sqlx::PgPool,
    client: &'a FeedClient,
    probe: &'a HeadProbe,
    window: FetchWindow,
    cache: &'a CacheDir,
    options: &'a CrawlOptions,
    /// Taken once per run and stamped on every fact.
    registered_at: NaiveDateTime,
}

impl CrawlContext<'_> {
    /// Returns `true`, after logging, when `stage` must not be written.
    fn skip_write(&self, screen_name: &str, stage: &'static str, count: usize) -> bool {
        if self.options.dry_run {
            tracing::info!(screen_name, stage, count, "dry-run: not writing");
        }
        self.options.dry_run
    }
}

fn require_credentials<'c>(
    credentials: Option<&'c Credentials>,
    screen_name: &str,
) -> anyhow::Result<&'c Credentials> {
    credentials.ok_or_else(|| {
        anyhow::anyhow!("target '{screen_name}' has no ct0/auth_token configured")
    })
}

/// Picks the targets to crawl.
///
/// With `filter`, returns the single enabled target whose screen name
/// matches case-insensitively, or an error. Without it, returns every
/// enabled target in file order; disabled ones are logged and skipped.
fn select_targets<'t>(
    targets: &'t TargetsFile,
    filter: Option<&str>,
) -> anyhow::Result<Vec<&'t TargetConfig>> {
    if let Some(wanted) = filter {
        let target = targets
            .targets
            .iter()
            .find(|t| t.screen_name.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| anyhow::anyhow!("target '{wanted}' not found in targets file"))?;
        if !target.is_enabled() {
            anyhow::bail!("target '{wanted}' is disabled in the targets file");
        }
        return Ok(vec![target]);
    }

    for skipped in targets.targets.iter().filter(|t| !t.is_enabled()) {
        tracing::info!(screen_name = %skipped.screen_name, "skipping disabled target");
    }
    Ok(targets.enabled().collect())
}

/// Runs the posts and likes cycles for every selected target.
///
/// # Errors
///
/// Returns an error if the targets file cannot be loaded, the filter matches
/// nothing, a client cannot be constructed, or every selected target failed.
/// Individual cycle failures are logged and skipped, not propagated.
pub(crate) async fn run_crawl(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    options: &CrawlOptions,
) -> anyhow::Result<()> {
    let targets_file = twilog_core::load_targets(&config.targets_path)?;
    let targets = select_targets(&targets_file, options.target.as_deref())?;
    if targets.is_empty() {
        println!(
            "no enabled targets in {}; nothing to crawl",
            config.targets_path.display()
        );
        return Ok(());
    }

    let client = FeedClient::new(&config.feed)
        .map_err(|e| anyhow::anyhow!("failed to build feed client: {e}"))?;
    let probe = HeadProbe::new(config.feed.media_probe_timeout_secs, &config.feed.user_agent)
        .map_err(|e| anyhow::anyhow!("failed to build media probe: {e}"))?;
    let cache = CacheDir::new(&config.cache_dir);

    let ctx = CrawlContext {
        pool,
        client: &client,
        probe: &probe,
        window: FetchWindow::from_settings(&config.feed),
        cache: &cache,
        options,
        registered_at: twilog_core::time::registered_now(),
    };

    let reports = crawl_targets(&ctx, &targets).await;
    let failed: Vec<&str> = reports
        .iter()
        .filter(|r| r.failed())
        .map(|r| r.screen_name.as_str())
        .collect();
    let failed_targets = failed.len();

    if failed_targets > 0 {
        tracing::warn!(
            failed_targets,
            total_targets = targets.len(),
            ?failed,
            "some targets failed during the crawl"
        );
    }
    if failed_targets == targets.len() {
        anyhow::bail!("all {failed_targets} targets failed");
    }

    Ok(())
}

/// Per-target result of one run. A cycle that failed is `None`.
#[derive(Debug)]
struct TargetReport {
    screen_name: String,
    timeline: Option<CrawlStatus>,
    likes: Option<CrawlStatus>,
}

impl TargetReport {
    fn failed(&self) -> bool {
        self.timeline.is_none() || self.likes.is_none()
    }
}

/// Runs both cycles for each target in order. Errors are logged and recorded
/// in the report; the next cycle and target proceed regardless.
async fn crawl_targets(ctx: &CrawlContext<'_>, targets: &[&TargetConfig]) -> Vec<TargetReport> {
    let mut identities = IdentityCache::new();
    let mut reports = Vec::with_capacity(targets.len());

    for target in targets {
        let screen_name = target.screen_name.as_str();
        let credentials = Credentials::from_target(target);

        let timeline =
            match timeline::crawl_timeline(ctx, target, credentials.as_ref(), &mut identities).await {
                Ok(status) => {
                    tracing::info!(screen_name, %status, "timeline cycle finished");
                    Some(status)
                }
                Err(e) => {
                    tracing::error!(screen_name, error = format!("{e:#}"), "timeline cycle failed");
                    None
                }
            };

        let likes = match likes::crawl_likes(ctx, target, credentials.as_ref(), &mut identities).await {
            Ok(status) => {
                tracing::info!(screen_name, %status, "likes cycle finished");
                Some(status)
            }
            Err(e) => {
                tracing::error!(screen_name, error = format!("{e:#}"), "likes cycle failed");
                None
            }
        };

        reports.push(TargetReport {
            screen_name: screen_name.to_owned(),
            timeline,
            likes,
        });
    }

    reports
}
