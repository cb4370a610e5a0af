pub mod app_config;
pub mod config;
pub mod facts;
pub mod screen_name;
pub mod stats;
pub mod targets;
pub mod time;

pub use app_config::{AppConfig, Environment, FeedSettings};
pub use config::{load_app_config, load_app_config_from_env};
pub use facts::{
    ExternalLinkFact, LikedPostFact, MediaFact, MediaKind, MetricFact, PostFact, PostHistory,
    StatsFact,
};
pub use screen_name::ScreenName;
pub use stats::{compute_stats, StatsError};
pub use targets::{load_targets, TargetConfig, TargetStatus, TargetsFile};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read targets file {path}: {source}")]
    TargetsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse targets file: {0}")]
    TargetsFileParse(#[from] serde_yaml::Error),

    #[error("config validation failed: {0}")]
    Validation(String),
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid screen name \"{0}\": must match ^[0-9A-Za-z_]+$")]
    InvalidScreenName(String),
}
