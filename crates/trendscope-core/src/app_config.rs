use std::net::SocketAddr;
use std::path::PathBuf;

use crate::rollup::RetentionPolicy;

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

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub data_dir: PathBuf,
    pub regions_path: PathBuf,
    /// Keys from `TRENDSCOPE_YOUTUBE_API_KEYS`; empty when the keys file is used.
    pub youtube_api_keys: Vec<String>,
    pub api_keys_path: PathBuf,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub max_pages: u32,
    pub max_concurrent_regions: usize,
    pub retention: RetentionPolicy,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("data_dir", &self.data_dir)
            .field("regions_path", &self.regions_path)
            .field(
                "youtube_api_keys",
                &format!("[{} redacted]", self.youtube_api_keys.len()),
            )
            .field("api_keys_path", &self.api_keys_path)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("max_pages", &self.max_pages)
            .field("max_concurrent_regions", &self.max_concurrent_regions)
            .field("retention", &self.retention)
            .finish()
    }
}
