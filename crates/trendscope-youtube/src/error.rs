use thiserror::Error;

/// Errors returned by the YouTube Data API client.
#[derive(Debug, Error)]
pub enum YoutubeError {
    /// Network or TLS failure, or a 5xx status from the API.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-2xx status and a Google error envelope.
    #[error("YouTube API error {status} ({reason}): {message}")]
    Api {
        status: u16,
        reason: String,
        message: String,
    },

    /// The project's daily quota is spent for the key that was used.
    #[error("YouTube API quota exceeded: {0}")]
    QuotaExceeded(String),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// More channel ids than one `channels` request accepts.
    #[error("channel batch of {requested} ids exceeds the limit of {limit}")]
    BatchTooLarge { requested: usize, limit: usize },

    /// Client construction was given unusable settings.
    #[error("invalid client configuration: {0}")]
    Config(String),
}
