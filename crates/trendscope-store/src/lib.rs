//! File-backed persistence for trendscope.
//!
//! One JSON document per unit of state under a data directory:
//!
//! | unit | path |
//! |---|---|
//! | channel history | `history/{channel_id}.json` |
//! | region trending set | `trending/{REGION}.json` |
//! | region directory | `directory/{REGION}.json` |
//! | hashtag table | `hashtags.txt` |
//!
//! Every write goes through a temp file and a rename. The `modify_*` helpers
//! hold a per-unit lock for the whole read-modify-write; the locks live in the
//! [`Store`] value, so all writers must share one `Store` (clones share it).

mod document;
mod error;
mod layout;
mod locks;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;
use trendscope_core::{ChannelHistory, ChannelProfile, HashtagTable, RegionTrendingSet};

pub use error::StoreError;
pub use layout::validate_key;

use document::{list_keys, read_json, read_text, write_atomic, write_json};
use layout::{Layout, DIRECTORY_DIR, HISTORY_DIR, TRENDING_DIR};
use locks::KeyedLocks;

#[derive(Debug, Clone)]
pub struct Store {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    layout: Layout,
    history_locks: KeyedLocks,
    trending_locks: KeyedLocks,
    directory_locks: KeyedLocks,
    hashtags_lock: Mutex<()>,
}

impl Store {
    /// Opens a store rooted at `root`, creating the directory tree if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if a directory cannot be created.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let layout = Layout::new(root.into());
        for dir in [HISTORY_DIR, TRENDING_DIR, DIRECTORY_DIR] {
            let path = layout.dir(dir);
            tokio::fs::create_dir_all(&path)
                .await
                .map_err(|e| StoreError::io(&path, e))?;
        }
        tracing::debug!(root = %layout.root().display(), "store: opened");

        Ok(Self {
            inner: Arc::new(Inner {
                layout,
                history_locks: KeyedLocks::default(),
                trending_locks: KeyedLocks::default(),
                directory_locks: KeyedLocks::default(),
                hashtags_lock: Mutex::new(()),
            }),
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        self.inner.layout.root()
    }

    /// Checks that the data directory is still present and is a directory.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if it cannot be inspected or is not a
    /// directory.
    pub async fn health(&self) -> Result<(), StoreError> {
        let root = self.root();
        let meta = tokio::fs::metadata(root)
            .await
            .map_err(|e| StoreError::io(root, e))?;
        if meta.is_dir() {
            Ok(())
        } else {
            Err(StoreError::io(
                root,
                std::io::Error::new(std::io::ErrorKind::NotADirectory, "data dir is not a directory"),
            ))
        }
    }

    // -----------------------------------------------------------------------
    // channel histories
    // -----------------------------------------------------------------------

    /// Loads a channel's history; `None` when absent or corrupt.
    ///
    /// # Errors
    ///
    /// [`StoreError::InvalidKey`] for a malformed id, [`StoreError::Io`] on
    /// read failure.
    pub async fn load_history(&self, channel_id: &str) -> Result<Option<ChannelHistory>, StoreError> {
        let path = self.inner.layout.history(channel_id)?;
        read_history(&path, channel_id).await
    }

    /// Read-modify-write of one channel history under its lock.
    ///
    /// A missing or corrupt document starts as an empty history for
    /// `channel_id`. The document is written only when `f` returns `Ok`.
    ///
    /// # Errors
    ///
    /// Whatever `f` returns, or a [`StoreError`] converted into `E`.
    pub async fn modify_history<T, E, F>(&self, channel_id: &str, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut ChannelHistory) -> Result<T, E>,
        E: From<StoreError>,
    {
        let path = self.inner.layout.history(channel_id)?;
        let _guard = self.inner.history_locks.acquire(channel_id).await;

        let mut history = read_history(&path, channel_id)
            .await?
            .unwrap_or_else(|| ChannelHistory::new(channel_id, ""));
        let out = f(&mut history)?;
        write_json(&path, &history).await?;
        Ok(out)
    }

    // -----------------------------------------------------------------------
    // region trending sets
    // -----------------------------------------------------------------------

    /// Loads a region's trending set; empty when absent or corrupt.
    ///
    /// # Errors
    ///
    /// [`StoreError::InvalidKey`] for a malformed region, [`StoreError::Io`]
    /// on read failure.
    pub async fn load_trending(&self, region: &str) -> Result<RegionTrendingSet, StoreError> {
        let path = self.inner.layout.trending(region)?;
        Ok(read_json(&path).await?.unwrap_or_default())
    }

    /// Read-modify-write of one region's trending set under its lock.
    ///
    /// # Errors
    ///
    /// [`StoreError`] on invalid region or I/O failure.
    pub async fn modify_trending<T, F>(&self, region: &str, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut RegionTrendingSet) -> T,
    {
        let path = self.inner.layout.trending(region)?;
        let _guard = self.inner.trending_locks.acquire(region).await;

        let mut set: RegionTrendingSet = read_json(&path).await?.unwrap_or_default();
        let out = f(&mut set);
        write_json(&path, &set).await?;
        Ok(out)
    }

    /// Region codes with a stored trending set, ascending.
    ///
    /// # Errors
    ///
    /// [`StoreError::Io`] if the directory cannot be listed.
    pub async fn trending_regions(&self) -> Result<Vec<String>, StoreError> {
        list_keys(&self.inner.layout.dir(TRENDING_DIR)).await
    }

    /// Every stored trending set in region-code order.
    ///
    /// # Errors
    ///
    /// [`StoreError::Io`] on listing or read failure.
    pub async fn load_all_trending(&self) -> Result<Vec<(String, RegionTrendingSet)>, StoreError> {
        let mut sets = Vec::new();
        for region in self.trending_regions().await? {
            let set = self.load_trending(&region).await?;
            sets.push((region, set));
        }
        Ok(sets)
    }

    // -----------------------------------------------------------------------
    // region directories
    // -----------------------------------------------------------------------

    /// Loads a region's channel directory; empty when absent or corrupt.
    ///
    /// # Errors
    ///
    /// [`StoreError::InvalidKey`] for a malformed region, [`StoreError::Io`]
    /// on read failure.
    pub async fn load_directory(&self, region: &str) -> Result<Vec<ChannelProfile>, StoreError> {
        let path = self.inner.layout.directory(region)?;
        Ok(read_json(&path).await?.unwrap_or_default())
    }

    /// Read-modify-write of one region's directory under its lock.
    ///
    /// # Errors
    ///
    /// [`StoreError`] on invalid region or I/O failure.
    pub async fn modify_directory<T, F>(&self, region: &str, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Vec<ChannelProfile>) -> T,
    {
        let path = self.inner.layout.directory(region)?;
        let _guard = self.inner.directory_locks.acquire(region).await;

        let mut profiles: Vec<ChannelProfile> = read_json(&path).await?.unwrap_or_default();
        let out = f(&mut profiles);
        write_json(&path, &profiles).await?;
        Ok(out)
    }

    /// Region codes with a stored directory, ascending.
    ///
    /// # Errors
    ///
    /// [`StoreError::Io`] if the directory cannot be listed.
    pub async fn directory_regions(&self) -> Result<Vec<String>, StoreError> {
        list_keys(&self.inner.layout.dir(DIRECTORY_DIR)).await
    }

    /// Every stored directory in region-code order.
    ///
    /// # Errors
    ///
    /// [`StoreError::Io`] on listing or read failure.
    pub async fn load_all_directories(
        &self,
    ) -> Result<Vec<(String, Vec<ChannelProfile>)>, StoreError> {
        let mut dirs = Vec::new();
        for region in self.directory_regions().await? {
            let profiles = self.load_directory(&region).await?;
            dirs.push((region, profiles));
        }
        Ok(dirs)
    }

    // -----------------------------------------------------------------------
    // hashtag table
    // -----------------------------------------------------------------------

    /// Loads the global hashtag table; empty when absent.
    ///
    /// # Errors
    ///
    /// [`StoreError::Io`] on read failure.
    pub async fn load_hashtags(&self) -> Result<HashtagTable, StoreError> {
        let text = read_text(&self.inner.layout.hashtags()).await?;
        Ok(text.map(|t| HashtagTable::parse(&t)).unwrap_or_default())
    }

    /// Read-modify-write of the hashtag table under its lock.
    ///
    /// # Errors
    ///
    /// [`StoreError::Io`] on read or write failure.
    pub async fn modify_hashtags<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut HashtagTable) -> T,
    {
        let path = self.inner.layout.hashtags();
        let _guard = self.inner.hashtags_lock.lock().await;

        let mut table = read_text(&path)
            .await?
            .map(|t| HashtagTable::parse(&t))
            .unwrap_or_default();
        let out = f(&mut table);
        write_atomic(&path, table.render().as_bytes()).await?;
        Ok(out)
    }
}

/// Reads a history document, treating one filed under another channel's key
/// as corrupt.
async fn read_history(path: &Path, channel_id: &str) -> Result<Option<ChannelHistory>, StoreError> {
    let history: Option<ChannelHistory> = read_json(path).await?;
    Ok(history.filter(|h| {
        let matches = h.channel_id == channel_id;
        if !matches {
            tracing::warn!(
                path = %path.display(),
                stored = %h.channel_id,
                "store: history filed under another channel id, treating as absent"
            );
        }
        matches
    }))
}
