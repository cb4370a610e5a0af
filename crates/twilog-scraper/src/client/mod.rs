//! HTTP client for the upstream feed API.

mod fetch_all;
mod identity;
mod page;

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, COOKIE, RETRY_AFTER};
use reqwest::Client;
use serde_json::Value;

use twilog_core::{FeedSettings, TargetConfig};

use crate::error::ScraperError;
use crate::rate_limit::retry_with_backoff;

pub use fetch_all::FetchWindow;
pub use identity::IdentityCache;
pub use page::decode_page;

const CSRF_HEADER: &str = "x-csrf-token";
const USER_LOOKUP_OPERATION: &str = "UserByScreenName";

/// Session cookies of the account a crawl runs as.
#[derive(Clone)]
pub struct Credentials {
    pub ct0: String,
    pub auth_token: String,
}

impl Credentials {
    /// Cookies configured for `target`, if both are present and non-empty.
    #[must_use]
    pub fn from_target(target: &TargetConfig) -> Option<Self> {
        let ct0 = target.ct0.as_deref().filter(|v| !v.is_empty())?;
        let auth_token = target.auth_token.as_deref().filter(|v| !v.is_empty())?;
        Some(Self {
            ct0: ct0.to_owned(),
            auth_token: auth_token.to_owned(),
        })
    }

    fn cookie_header(&self) -> String {
        format!("auth_token={}; ct0={}", self.auth_token, self.ct0)
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("ct0", &"[redacted]")
            .field("auth_token", &"[redacted]")
            .finish()
    }
}

/// HTTP client for the cursor-paginated feed endpoints.
///
/// Maps 429 to [`ScraperError::RateLimited`], 404 to
/// [`ScraperError::NotFound`] and other non-2xx statuses to
/// [`ScraperError::UnexpectedStatus`]. Transient failures are retried with
/// exponential backoff up to `max_retries` additional attempts.
pub struct FeedClient {
    client: Client,
    base_url: String,
    bearer_token: Option<String>,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl FeedClient {
    /// Creates a client from the feed settings, targeting `settings.base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidBaseUrl`] if the base URL is not an
    /// absolute http(s) URL, or [`ScraperError::Http`] if the underlying
    /// `reqwest::Client` cannot be constructed.
    pub fn new(settings: &FeedSettings) -> Result<Self, ScraperError> {
        Self::with_base_url(settings, &settings.base_url)
    }

    /// Like [`Self::new`] but against an explicit base URL.
    ///
    /// # Errors
    ///
    /// Same as [`Self::new`].
    pub fn with_base_url(settings: &FeedSettings, base_url: &str) -> Result<Self, ScraperError> {
        let parsed = reqwest::Url::parse(base_url).map_err(|e| ScraperError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ScraperError::InvalidBaseUrl {
                base_url: base_url.to_owned(),
                reason: format!("unsupported scheme {}", parsed.scheme()),
            });
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&settings.user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            bearer_token: settings.bearer_token.clone(),
            max_retries: settings.max_retries,
            backoff_base_secs: settings.retry_backoff_base_secs,
        })
    }

    fn endpoint_url(&self, operation: &str) -> String {
        format!("{}/{operation}", self.base_url)
    }

    /// Issues one authenticated GET with `variables` as its JSON query
    /// parameter and returns the decoded body, retrying transient failures.
    async fn get_json(
        &self,
        credentials: &Credentials,
        operation: &str,
        variables: &Value,
    ) -> Result<Value, ScraperError> {
        let url = self.endpoint_url(operation);
        let variables = variables.to_string();

        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.clone();
            let variables = variables.clone();
            async move {
                let mut request = self
                    .client
                    .get(&url)
                    .query(&[("variables", variables.as_str())])
                    .header(CSRF_HEADER, &credentials.ct0)
                    .header(COOKIE, credentials.cookie_header());
                if let Some(token) = &self.bearer_token {
                    request = request.header(AUTHORIZATION, format!("Bearer {token}"));
                }

                let response = request.send().await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(60);
                    return Err(ScraperError::RateLimited {
                        endpoint: operation.to_owned(),
                        retry_after_secs,
                    });
                }

                if status == reqwest::StatusCode::NOT_FOUND {
                    return Err(ScraperError::NotFound { url });
                }

                if !status.is_success() {
                    return Err(ScraperError::UnexpectedStatus {
                        status: status.as_u16(),
                        url,
                    });
                }

                let body = response.text().await?;
                serde_json::from_str::<Value>(&body).map_err(|e| ScraperError::Deserialize {
                    context: format!("{operation} response"),
                    source: e,
                })
            }
        })
        .await
    }
}
