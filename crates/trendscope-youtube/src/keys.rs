//! Rotation across several API keys to spread daily quota.

use std::fmt;

use crate::error::YoutubeError;

/// A non-empty set of API keys; each request uses one picked at random.
#[derive(Clone)]
pub struct ApiKeyPool {
    keys: Vec<String>,
}

impl ApiKeyPool {
    /// Builds a pool from raw keys, dropping blanks and surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`YoutubeError::Config`] if no usable key remains.
    pub fn new<I, S>(keys: I) -> Result<Self, YoutubeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keys: Vec<String> = keys
            .into_iter()
            .map(|k| k.as_ref().trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        if keys.is_empty() {
            return Err(YoutubeError::Config("API key pool is empty".to_string()));
        }
        Ok(Self { keys })
    }

    /// One key, chosen uniformly at random.
    #[must_use]
    pub fn pick(&self) -> &str {
        let index = rand::random_range(0..self.keys.len());
        &self.keys[index]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl fmt::Debug for ApiKeyPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeyPool")
            .field("keys", &format_args!("[{} redacted]", self.keys.len()))
            .finish()
    }
}
