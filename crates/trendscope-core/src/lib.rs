//! Domain types, configuration, and the aggregation engine for trendscope.
//!
//! Everything in this crate is synchronous and free of I/O apart from config
//! loading. The collector feeds raw platform records through [`normalize`],
//! merges the results with [`hashtags`] and [`trending`], and rolls each
//! channel's snapshot into its [`rollup`] history. [`directory`] builds the
//! cross-region view the query layer serves.

mod app_config;
mod config;
pub mod directory;
pub mod hashtags;
pub mod normalize;
mod regions;
pub mod rollup;
pub mod snapshot;
pub mod trending;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{build_app_config, load_api_keys, load_app_config, load_app_config_from_env};
pub use directory::{
    dedup_first_seen, directory_additions, ChannelKeyed, CreatedWindow, DirectoryQuery, SortKey,
};
pub use hashtags::HashtagTable;
pub use normalize::{enrich, metadata_batches, normalize_cycle, CycleDigest, METADATA_BATCH_SIZE};
pub use regions::{load_regions, RegionsFile};
pub use rollup::{
    period_keys, ChannelHistory, DailyPoint, GrowthReport, HistorySeries, MetricGrowth,
    MonthBucket, PeriodStats, QuarterBucket, RetentionPolicy, RollupError, RollupOutcome,
};
pub use snapshot::{
    ChannelMetadata, ChannelProfile, ChannelSnapshot, RawVideo, TrendWindow, TrendingChannel,
};
pub use trending::RegionTrendingSet;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read regions file at {path}: {source}")]
    RegionsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse regions file: {0}")]
    RegionsFileParse(#[from] serde_yaml::Error),

    #[error("no regions configured")]
    NoRegions,

    #[error("no YouTube API keys configured (set TRENDSCOPE_YOUTUBE_API_KEYS or provide {0})")]
    MissingCredentials(String),

    #[error("validation error: {0}")]
    Validation(String),
}
