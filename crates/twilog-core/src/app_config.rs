use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Transport and pagination knobs for the upstream feed API.
#[derive(Clone)]
pub struct FeedSettings {
    pub base_url: String,
    pub bearer_token: Option<String>,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Nodes requested per page.
    pub page_size: u32,
    /// Page multiplier; a single fetch never returns more than
    /// `page_size * page_limit` nodes.
    pub page_limit: u32,
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
    pub max_retries: u32,
    pub retry_backoff_base_secs: u64,
    pub media_probe_timeout_secs: u64,
}

impl FeedSettings {
    /// Upper bound on the number of nodes gathered by one fetch.
    #[must_use]
    pub fn max_nodes(&self) -> usize {
        let total = u64::from(self.page_size) * u64::from(self.page_limit);
        usize::try_from(total).unwrap_or(usize::MAX)
    }
}

impl std::fmt::Debug for FeedSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedSettings")
            .field("base_url", &self.base_url)
            .field(
                "bearer_token",
                &self.bearer_token.as_ref().map(|_| "[redacted]"),
            )
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("page_size", &self.page_size)
            .field("page_limit", &self.page_limit)
            .field("min_delay_ms", &self.min_delay_ms)
            .field("max_delay_ms", &self.max_delay_ms)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_secs", &self.retry_backoff_base_secs)
            .field("media_probe_timeout_secs", &self.media_probe_timeout_secs)
            .finish()
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub log_level: String,
    pub targets_path: PathBuf,
    pub cache_dir: PathBuf,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub feed: FeedSettings,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("targets_path", &self.targets_path)
            .field("cache_dir", &self.cache_dir)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("feed", &self.feed)
            .finish()
    }
}
