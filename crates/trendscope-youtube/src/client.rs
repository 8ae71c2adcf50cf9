//! HTTP client for the YouTube Data API v3.
//!
//! Wraps `reqwest` with key rotation, Google error-envelope handling, retry on
//! transient failures, and conversion of list items into domain records.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use trendscope_core::{AppConfig, ChannelMetadata, RawVideo, METADATA_BATCH_SIZE};

use crate::error::YoutubeError;
use crate::keys::ApiKeyPool;
use crate::normalize::{parse_channels, parse_videos};
use crate::retry::retry_with_backoff;
use crate::types::{ErrorEnvelope, ListResponse};

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3/";
const PAGE_SIZE: &str = "50";
const QUOTA_REASONS: [&str; 2] = ["quotaExceeded", "dailyLimitExceeded"];

/// Transport and paging knobs for [`YoutubeClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    /// Upper bound on `nextPageToken` follow-ups per trending list, at least 1.
    pub max_pages: u32,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: "trendscope/0.1 (trending-collector)".to_string(),
            max_retries: 2,
            retry_backoff_base_ms: 1_000,
            max_pages: 1,
        }
    }
}

impl ClientSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            timeout_secs: config.request_timeout_secs,
            user_agent: config.user_agent.clone(),
            max_retries: config.max_retries,
            retry_backoff_base_ms: config.retry_backoff_base_ms,
            max_pages: config.max_pages,
        }
    }
}

/// Client for the `videos` and `channels` list endpoints.
///
/// Use [`YoutubeClient::new`] for production or
/// [`YoutubeClient::with_base_url`] to point at a mock server in tests.
#[derive(Debug)]
pub struct YoutubeClient {
    client: Client,
    keys: ApiKeyPool,
    base_url: Url,
    settings: ClientSettings,
}

impl YoutubeClient {
    /// Creates a client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`YoutubeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(keys: ApiKeyPool, settings: ClientSettings) -> Result<Self, YoutubeError> {
        Self::with_base_url(keys, settings, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`YoutubeError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`YoutubeError::Config`] if `base_url` is not a valid URL.
    pub fn with_base_url(
        keys: ApiKeyPool,
        settings: ClientSettings,
        base_url: &str,
    ) -> Result<Self, YoutubeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(settings.user_agent.as_str())
            .build()?;

        // Exactly one trailing slash so `join("videos")` appends a segment
        // instead of replacing the last one.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| YoutubeError::Config(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            client,
            keys,
            base_url,
            settings,
        })
    }

    /// Fetches the most-popular chart for one region and category.
    ///
    /// Follows `nextPageToken` for up to `max_pages` pages. Items that do not
    /// convert are dropped and logged.
    ///
    /// # Errors
    ///
    /// - [`YoutubeError::QuotaExceeded`] when the key's quota is spent.
    /// - [`YoutubeError::Api`] for any other error envelope (e.g. a region
    ///   that has no chart for the category).
    /// - [`YoutubeError::Http`] on network failure or 5xx after retries.
    /// - [`YoutubeError::Deserialize`] if the page is not a list response.
    pub async fn list_trending(
        &self,
        region: &str,
        category: &str,
    ) -> Result<Vec<RawVideo>, YoutubeError> {
        let mut videos = Vec::new();
        let mut page_token: Option<String> = None;

        for page in 0..self.settings.max_pages.max(1) {
            let mut params = vec![
                ("part", "snippet,statistics"),
                ("chart", "mostPopular"),
                ("regionCode", region),
                ("videoCategoryId", category),
                ("maxResults", PAGE_SIZE),
            ];
            if let Some(token) = page_token.as_deref() {
                params.push(("pageToken", token));
            }

            let list = self.fetch_list("videos", &params).await?;
            let parsed = parse_videos(list.items, region, category);
            if parsed.dropped > 0 {
                tracing::warn!(
                    region,
                    category,
                    page,
                    dropped = parsed.dropped,
                    "youtube: dropped malformed video items"
                );
            }
            videos.extend(parsed.records);

            match list.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        tracing::debug!(region, category, count = videos.len(), "youtube: trending list fetched");
        Ok(videos)
    }

    /// Fetches snippet and statistics for up to 50 channels.
    ///
    /// Channels the API does not return (deleted, terminated) are simply absent
    /// from the result.
    ///
    /// # Errors
    ///
    /// - [`YoutubeError::BatchTooLarge`] if more than 50 ids are given.
    /// - Otherwise as [`YoutubeClient::list_trending`].
    pub async fn channel_metadata(
        &self,
        ids: &[String],
    ) -> Result<Vec<ChannelMetadata>, YoutubeError> {
        if ids.len() > METADATA_BATCH_SIZE {
            return Err(YoutubeError::BatchTooLarge {
                requested: ids.len(),
                limit: METADATA_BATCH_SIZE,
            });
        }
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let joined = ids.join(",");
        let params = [
            ("part", "snippet,statistics"),
            ("id", joined.as_str()),
            ("maxResults", PAGE_SIZE),
        ];
        let list = self.fetch_list("channels", &params).await?;
        let parsed = parse_channels(list.items);
        if parsed.dropped > 0 {
            tracing::warn!(
                requested = ids.len(),
                dropped = parsed.dropped,
                "youtube: dropped malformed channel items"
            );
        }
        Ok(parsed.records)
    }

    /// One list request with retry; a fresh key is picked for every attempt.
    async fn fetch_list(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<ListResponse, YoutubeError> {
        retry_with_backoff(
            self.settings.max_retries,
            self.settings.retry_backoff_base_ms,
            || async move {
                let url = self.build_url(endpoint, params)?;
                let body = self.request_json(&url).await?;
                serde_json::from_value(body).map_err(|e| YoutubeError::Deserialize {
                    context: endpoint.to_string(),
                    source: e,
                })
            },
        )
        .await
    }

    /// Builds the request URL with percent-encoded query parameters and a
    /// key drawn from the pool.
    fn build_url(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Url, YoutubeError> {
        let mut url = self
            .base_url
            .join(endpoint)
            .map_err(|e| YoutubeError::Config(format!("invalid endpoint '{endpoint}': {e}")))?;
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("key", self.keys.pick());
        }
        Ok(url)
    }

    /// Sends a GET request and parses the body as JSON.
    ///
    /// 5xx responses surface as [`YoutubeError::Http`] so they are retried;
    /// other non-2xx responses are decoded from the Google error envelope.
    async fn request_json(&self, url: &Url) -> Result<serde_json::Value, YoutubeError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        let response = if status.is_server_error() {
            response.error_for_status()?
        } else {
            response
        };

        let body = response.text().await?;
        if !status.is_success() {
            return Err(api_error(status, &body));
        }
        serde_json::from_str(&body).map_err(|e| YoutubeError::Deserialize {
            context: url.path().to_string(),
            source: e,
        })
    }
}

fn api_error(status: StatusCode, body: &str) -> YoutubeError {
    let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) else {
        return YoutubeError::Api {
            status: status.as_u16(),
            reason: "unknown".to_string(),
            message: body.chars().take(200).collect(),
        };
    };

    let reason = envelope.error.reason().to_string();
    if status == StatusCode::FORBIDDEN && QUOTA_REASONS.contains(&reason.as_str()) {
        return YoutubeError::QuotaExceeded(envelope.error.message);
    }
    YoutubeError::Api {
        status: status.as_u16(),
        reason,
        message: envelope.error.message,
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
