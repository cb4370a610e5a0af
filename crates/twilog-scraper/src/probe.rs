//! Best-effort media size lookup.

use std::future::Future;
use std::time::Duration;

use reqwest::header::CONTENT_LENGTH;
use reqwest::Client;

use crate::error::ScraperError;

/// Stored size when the probe fails.
pub const UNKNOWN_SIZE: i64 = -1;

/// Looks up the byte size of a remote resource.
pub trait SizeProbe {
    /// Reported `Content-Length`; `0` when the server omits it.
    fn content_length(&self, url: &str) -> impl Future<Output = Result<u64, ScraperError>> + Send;
}

/// Probes with an HTTP `HEAD` request.
pub struct HeadProbe {
    client: Client,
}

impl HeadProbe {
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }
}

impl SizeProbe for HeadProbe {
    fn content_length(&self, url: &str) -> impl Future<Output = Result<u64, ScraperError>> + Send {
        let request = self.client.head(url);
        let url = url.to_owned();
        async move {
            let response = request.send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(ScraperError::UnexpectedStatus {
                    status: status.as_u16(),
                    url,
                });
            }
            Ok(response
                .headers()
                .get(CONTENT_LENGTH)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(0))
        }
    }
}

/// Size of `url` in bytes, or [`UNKNOWN_SIZE`] when the probe fails.
pub async fn media_size<P: SizeProbe>(probe: &P, url: &str) -> i64 {
    match probe.content_length(url).await {
        Ok(len) => i64::try_from(len).unwrap_or(UNKNOWN_SIZE),
        Err(e) => {
            tracing::warn!(url, error = %e, "media size probe failed");
            UNKNOWN_SIZE
        }
    }
}
