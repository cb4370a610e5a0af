use crate::app_config::{AppConfig, Environment, FeedSettings};
use crate::ConfigError;

const DEFAULT_FEED_BASE_URL: &str = "https://x.com/i/api/graphql";
const DEFAULT_FEED_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("TWILOG_ENV", "development"))?;
    let log_level = or_default("TWILOG_LOG_LEVEL", "info");
    let targets_path = PathBuf::from(or_default("TWILOG_TARGETS_PATH", "./config/targets.yaml"));
    let cache_dir = PathBuf::from(or_default("TWILOG_CACHE_DIR", "./cache"));

    let db_max_connections = parse_u32("TWILOG_DB_MAX_CONNECTIONS", "5")?;
    let db_min_connections = parse_u32("TWILOG_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("TWILOG_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let feed = FeedSettings {
        base_url: or_default("TWILOG_FEED_BASE_URL", DEFAULT_FEED_BASE_URL),
        bearer_token: lookup("TWILOG_FEED_BEARER_TOKEN")
            .ok()
            .filter(|t| !t.is_empty()),
        request_timeout_secs: parse_u64("TWILOG_FEED_REQUEST_TIMEOUT_SECS", "30")?,
        user_agent: or_default("TWILOG_FEED_USER_AGENT", DEFAULT_FEED_USER_AGENT),
        page_size: parse_u32("TWILOG_FEED_PAGE_SIZE", "20")?,
        page_limit: parse_u32("TWILOG_FEED_PAGE_LIMIT", "15")?,
        min_delay_ms: parse_u64("TWILOG_FEED_MIN_DELAY_MS", "1000")?,
        max_delay_ms: parse_u64("TWILOG_FEED_MAX_DELAY_MS", "3000")?,
        max_retries: parse_u32("TWILOG_FEED_MAX_RETRIES", "3")?,
        retry_backoff_base_secs: parse_u64("TWILOG_FEED_RETRY_BACKOFF_BASE_SECS", "5")?,
        media_probe_timeout_secs: parse_u64("TWILOG_MEDIA_PROBE_TIMEOUT_SECS", "10")?,
    };

    validate_feed_settings(&feed)?;

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        targets_path,
        cache_dir,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        feed,
    })
}

fn validate_feed_settings(feed: &FeedSettings) -> Result<(), ConfigError> {
    if feed.page_size == 0 {
        return Err(ConfigError::Validation(
            "TWILOG_FEED_PAGE_SIZE must be at least 1".to_string(),
        ));
    }
    if feed.page_limit == 0 {
        return Err(ConfigError::Validation(
            "TWILOG_FEED_PAGE_LIMIT must be at least 1".to_string(),
        ));
    }
    if feed.min_delay_ms > feed.max_delay_ms {
        return Err(ConfigError::Validation(format!(
            "TWILOG_FEED_MIN_DELAY_MS ({}) exceeds TWILOG_FEED_MAX_DELAY_MS ({})",
            feed.min_delay_ms, feed.max_delay_ms
        )));
    }
    Ok(())
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "TWILOG_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
