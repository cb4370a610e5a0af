//! Throttling for feed requests.
//!
//! Two mechanisms live here: exponential backoff around a single request
//! ([`retry_with_backoff`]) and the randomized pause between consecutive
//! pages of one crawl ([`polite_delay`]).

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

/// Returns `true` if `err` is transient and worth another attempt.
///
/// Retriable: [`ScraperError::RateLimited`] (429), [`ScraperError::Http`]
/// (network failure) and 5xx [`ScraperError::UnexpectedStatus`]. Everything
/// else, in particular 404 and shape errors, is returned immediately.
fn is_retriable(err: &ScraperError) -> bool {
    match err {
        ScraperError::RateLimited { .. } | ScraperError::Http(_) => true,
        ScraperError::UnexpectedStatus { status, .. } => *status >= 500,
        ScraperError::Deserialize { .. }
        | ScraperError::NotFound { .. }
        | ScraperError::Structure { .. }
        | ScraperError::UserNotFound { .. }
        | ScraperError::InvalidBaseUrl { .. } => false,
    }
}

/// Executes `operation`, retrying transient errors with exponential backoff.
///
/// The wait before the n-th retry is `backoff_base_secs * 2^(n-1)` seconds.
/// With `max_retries = 3` the operation is attempted at most 4 times.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let mut attempt = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if !is_retriable(&err) || attempt >= max_retries {
            return Err(err);
        }

        let delay_secs = backoff_base_secs.saturating_mul(1u64 << attempt.min(62));
        tracing::warn!(
            attempt,
            max_retries,
            delay_secs,
            error = %err,
            "transient feed error, retrying after backoff"
        );
        tokio::time::sleep(Duration::from_secs(delay_secs)).await;
        attempt += 1;
    }
}

/// Draws a pause length uniformly from `[min_ms, max_ms]`.
///
/// An inverted window collapses to `min_ms`.
pub(crate) fn draw_delay_ms(min_ms: u64, max_ms: u64) -> u64 {
    if max_ms <= min_ms {
        return min_ms;
    }
    rand::random_range(min_ms..=max_ms)
}

/// Sleeps for a random duration between two page requests.
pub(crate) async fn polite_delay(min_ms: u64, max_ms: u64) {
    let delay_ms = draw_delay_ms(min_ms, max_ms);
    if delay_ms > 0 {
        tracing::debug!(delay_ms, "pausing between feed pages");
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }
}
