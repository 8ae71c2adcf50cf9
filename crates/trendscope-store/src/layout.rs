//! File layout under the data directory.

use std::path::{Path, PathBuf};

use crate::error::StoreError;

pub(crate) const HISTORY_DIR: &str = "history";
pub(crate) const TRENDING_DIR: &str = "trending";
pub(crate) const DIRECTORY_DIR: &str = "directory";
pub(crate) const HASHTAGS_FILE: &str = "hashtags.txt";

const MAX_KEY_LEN: usize = 128;

/// Accepts `[A-Za-z0-9_-]{1,128}`, which covers channel ids and region codes
/// and keeps every key a plain file name.
///
/// # Errors
///
/// Returns [`StoreError::InvalidKey`] for anything else.
pub fn validate_key(key: &str) -> Result<&str, StoreError> {
    let valid = !key.is_empty()
        && key.len() <= MAX_KEY_LEN
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
    if valid {
        Ok(key)
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Layout {
    root: PathBuf,
}

impl Layout {
    pub(crate) fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub(crate) fn root(&self) -> &Path {
        &self.root
    }

    pub(crate) fn dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub(crate) fn history(&self, channel_id: &str) -> Result<PathBuf, StoreError> {
        self.keyed(HISTORY_DIR, channel_id)
    }

    pub(crate) fn trending(&self, region: &str) -> Result<PathBuf, StoreError> {
        self.keyed(TRENDING_DIR, region)
    }

    pub(crate) fn directory(&self, region: &str) -> Result<PathBuf, StoreError> {
        self.keyed(DIRECTORY_DIR, region)
    }

    pub(crate) fn hashtags(&self) -> PathBuf {
        self.root.join(HASHTAGS_FILE)
    }

    fn keyed(&self, dir: &str, key: &str) -> Result<PathBuf, StoreError> {
        let key = validate_key(key)?;
        Ok(self.root.join(dir).join(format!("{key}.json")))
    }
}
