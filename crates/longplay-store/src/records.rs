//! Track and segment metadata records.

use crate::{KvStore, StoreKey};
use longplay_core::{AudioSpec, Result, SampleFormat, SegmentId, TrackId};
use serde::{Deserialize, Serialize};

/// Persisted track metadata. `data` lists segment ids in sample order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackRecord {
    pub name: String,
    pub format: SampleFormat,
    pub sample_rate: u32,
    pub channels: u16,
    pub data: Vec<SegmentId>,
}

impl TrackRecord {
    pub fn spec(&self) -> AudioSpec {
        AudioSpec::new(self.format, self.sample_rate, self.channels)
    }
}

/// Persisted segment metadata: the count of valid samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentRecord {
    pub len: usize,
}

pub async fn load_track(store: &dyn KvStore, id: TrackId) -> Result<Option<TrackRecord>> {
    match store.get(&StoreKey::track(id)).await? {
        Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        None => Ok(None),
    }
}

pub async fn save_track(store: &dyn KvStore, id: TrackId, record: &TrackRecord) -> Result<()> {
    store
        .put(&StoreKey::track(id), serde_json::to_vec(record)?)
        .await
}

pub async fn load_segment(store: &dyn KvStore, id: SegmentId) -> Result<Option<SegmentRecord>> {
    match store.get(&StoreKey::segment(id)).await? {
        Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        None => Ok(None),
    }
}

pub async fn save_segment(store: &dyn KvStore, id: SegmentId, record: SegmentRecord) -> Result<()> {
    store
        .put(&StoreKey::segment(id), serde_json::to_vec(&record)?)
        .await
}
