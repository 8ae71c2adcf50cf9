use crate::app_config::{AppConfig, Environment};
use crate::rollup::RetentionPolicy;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default, so an empty environment yields a valid
/// development config. API keys are not required here; [`load_api_keys`]
/// enforces their presence for the commands that call the platform.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
pub fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_optional_usize = |var: &str| -> Result<Option<usize>, ConfigError> {
        match lookup(var) {
            Ok(raw) if !raw.trim().is_empty() => raw
                .trim()
                .parse::<usize>()
                .map(Some)
                .map_err(|e| invalid(var, e.to_string())),
            _ => Ok(None),
        }
    };

    let env = parse_environment(&or_default("TRENDSCOPE_ENV", "development"))?;

    let bind_addr = or_default("TRENDSCOPE_BIND_ADDR", "0.0.0.0:5000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("TRENDSCOPE_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("TRENDSCOPE_LOG_LEVEL", "info");
    let data_dir = PathBuf::from(or_default("TRENDSCOPE_DATA_DIR", "./data"));
    let regions_path = PathBuf::from(or_default(
        "TRENDSCOPE_REGIONS_PATH",
        "./config/regions.yaml",
    ));
    let youtube_api_keys = lookup("TRENDSCOPE_YOUTUBE_API_KEYS")
        .map(|raw| split_keys(&raw))
        .unwrap_or_default();
    let api_keys_path = PathBuf::from(or_default("TRENDSCOPE_API_KEYS_PATH", "./api_keys.txt"));

    let request_timeout_secs = parse_u64("TRENDSCOPE_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("TRENDSCOPE_USER_AGENT", "trendscope/0.1 (trending-collector)");
    let max_retries = parse_u32("TRENDSCOPE_MAX_RETRIES", "2")?;
    let retry_backoff_base_ms = parse_u64("TRENDSCOPE_RETRY_BACKOFF_BASE_MS", "1000")?;
    let max_pages = parse_u32("TRENDSCOPE_MAX_PAGES", "1")?;
    if max_pages == 0 {
        return Err(invalid("TRENDSCOPE_MAX_PAGES", "must be at least 1".into()));
    }
    let max_concurrent_regions = parse_usize("TRENDSCOPE_MAX_CONCURRENT_REGIONS", "1")?;

    let retention = RetentionPolicy {
        max_daily: parse_optional_usize("TRENDSCOPE_HISTORY_MAX_DAILY")?,
        max_monthly: parse_optional_usize("TRENDSCOPE_HISTORY_MAX_MONTHLY")?,
        max_quarterly: parse_optional_usize("TRENDSCOPE_HISTORY_MAX_QUARTERLY")?,
    };

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        data_dir,
        regions_path,
        youtube_api_keys,
        api_keys_path,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_ms,
        max_pages,
        max_concurrent_regions,
        retention,
    })
}

/// Resolve the YouTube API keys for this process.
///
/// Keys from `TRENDSCOPE_YOUTUBE_API_KEYS` take precedence; otherwise the
/// comma-separated keys file at `api_keys_path` is read.
///
/// # Errors
///
/// Returns [`ConfigError::MissingCredentials`] when neither source yields a key.
pub fn load_api_keys(config: &AppConfig) -> Result<Vec<String>, ConfigError> {
    if !config.youtube_api_keys.is_empty() {
        return Ok(config.youtube_api_keys.clone());
    }

    let path = config.api_keys_path.display().to_string();
    let keys = std::fs::read_to_string(&config.api_keys_path)
        .map(|content| split_keys(&content))
        .unwrap_or_default();

    if keys.is_empty() {
        return Err(ConfigError::MissingCredentials(path));
    }
    Ok(keys)
}

fn split_keys(raw: &str) -> Vec<String> {
    raw.split([',', '\n'])
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "production" => Ok(Environment::Production),
        "test" => Ok(Environment::Test),
        other => Err(ConfigError::InvalidEnvVar {
            var: "TRENDSCOPE_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
