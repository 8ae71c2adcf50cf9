//! Client for the YouTube Data API v3 `videos` and `channels` endpoints.

mod client;
mod error;
mod keys;
pub mod normalize;
mod retry;
pub mod types;

pub use client::{ClientSettings, YoutubeClient};
pub use error::YoutubeError;
pub use keys::ApiKeyPool;
