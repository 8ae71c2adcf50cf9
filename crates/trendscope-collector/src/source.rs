use async_trait::async_trait;
use trendscope_core::{ChannelMetadata, RawVideo};
use trendscope_youtube::{YoutubeClient, YoutubeError};

/// Where trending lists and channel metadata come from.
///
/// Every call may fail on its own; callers skip the failed slice and carry on.
#[async_trait]
pub trait TrendingSource: Send + Sync {
    async fn list_trending(&self, region: &str, category: &str)
        -> Result<Vec<RawVideo>, YoutubeError>;

    /// At most 50 ids per call.
    async fn channel_metadata(&self, ids: &[String]) -> Result<Vec<ChannelMetadata>, YoutubeError>;
}

#[async_trait]
impl TrendingSource for YoutubeClient {
    async fn list_trending(
        &self,
        region: &str,
        category: &str,
    ) -> Result<Vec<RawVideo>, YoutubeError> {
        YoutubeClient::list_trending(self, region, category).await
    }

    async fn channel_metadata(&self, ids: &[String]) -> Result<Vec<ChannelMetadata>, YoutubeError> {
        YoutubeClient::channel_metadata(self, ids).await
    }
}
