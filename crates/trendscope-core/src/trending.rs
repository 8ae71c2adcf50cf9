//! Per-region roster of every channel that has trended there.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::snapshot::ChannelSnapshot;

/// `channel_id → latest ChannelSnapshot` for one region.
///
/// Upsert-only: a later cycle replaces a channel's whole record, and channels
/// missing from a cycle stay as they were. Serialized as a JSON array ordered
/// by `channel_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionTrendingSet {
    channels: BTreeMap<String, ChannelSnapshot>,
}

impl RegionTrendingSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace or insert the record for each snapshot's channel.
    ///
    /// Returns how many of the snapshots were channels not previously in the set.
    pub fn upsert<I>(&mut self, snapshots: I) -> usize
    where
        I: IntoIterator<Item = ChannelSnapshot>,
    {
        let mut added = 0;
        for snapshot in snapshots {
            if self
                .channels
                .insert(snapshot.channel_id.clone(), snapshot)
                .is_none()
            {
                added += 1;
            }
        }
        added
    }

    #[must_use]
    pub fn get(&self, channel_id: &str) -> Option<&ChannelSnapshot> {
        self.channels.get(channel_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn channel_ids(&self) -> impl Iterator<Item = &str> {
        self.channels.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChannelSnapshot> {
        self.channels.values()
    }

    #[must_use]
    pub fn into_snapshots(self) -> Vec<ChannelSnapshot> {
        self.channels.into_values().collect()
    }
}

impl FromIterator<ChannelSnapshot> for RegionTrendingSet {
    fn from_iter<I: IntoIterator<Item = ChannelSnapshot>>(iter: I) -> Self {
        let mut set = Self::new();
        set.upsert(iter);
        set
    }
}

impl Serialize for RegionTrendingSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.channels.values())
    }
}

impl<'de> Deserialize<'de> for RegionTrendingSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let list = Vec::<ChannelSnapshot>::deserialize(deserializer)?;
        Ok(list.into_iter().collect())
    }
}
