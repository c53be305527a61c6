//! Tracks: a sample tree plus format metadata and the streaming edits on it.
//!
//! Edits on one track are not synchronized internally; callers keep at most
//! one append, overwrite or replace in flight per track. Concurrent reads
//! are safe.

mod append;
mod overwrite;
mod read;
mod replace;

pub use overwrite::OverwriteOptions;
pub use read::ReadOptions;

use crate::cache::SegmentCache;
use crate::segment::Segment;
use crate::tree::SampleTree;
use longplay_codec::{Filter, FilterGraph};
use longplay_core::{AudioSpec, Error, Result, TrackId};
use longplay_store::records::{load_segment, load_track, save_segment, save_track};
use longplay_store::{SegmentRecord, StoreKey, TrackRecord};
use std::sync::Arc;
use tracing::debug;

/// An ordered, editable sequence of samples at a fixed spec.
pub struct Track {
    id: TrackId,
    name: String,
    spec: AudioSpec,
    tree: SampleTree,
    cache: Arc<SegmentCache>,
    filter: Arc<dyn Filter>,
}

impl Track {
    /// Empty track. Nothing is persisted until the first append or [`persist`](Self::persist).
    pub fn create(
        name: impl Into<String>,
        spec: AudioSpec,
        cache: Arc<SegmentCache>,
        filter: Arc<dyn Filter>,
    ) -> Self {
        Self {
            id: TrackId::new(),
            name: name.into(),
            spec,
            tree: SampleTree::new(),
            cache,
            filter,
        }
    }

    /// Rebuild a persisted track from its track and segment records.
    pub async fn load(id: TrackId, cache: Arc<SegmentCache>, filter: Arc<dyn Filter>) -> Result<Self> {
        let store = cache.store().as_ref();
        let record = load_track(store, id).await?.ok_or(Error::TrackNotFound(id))?;

        let mut segments = Vec::with_capacity(record.data.len());
        for segment_id in &record.data {
            let SegmentRecord { len } = load_segment(store, *segment_id)
                .await?
                .ok_or(Error::SegmentNotFound(*segment_id))?;
            segments.push(Segment::with_len(*segment_id, len));
        }

        debug!(track = %id, segments = segments.len(), "loaded track");
        Ok(Self {
            id,
            spec: record.spec(),
            name: record.name,
            tree: SampleTree::from_segments(segments),
            cache,
            filter,
        })
    }

    /// Write the track record and every segment record.
    pub async fn persist(&self) -> Result<()> {
        let store = self.cache.store().as_ref();
        for segment in &self.tree {
            save_segment(store, segment.id, SegmentRecord { len: segment.len }).await?;
        }
        save_track(store, self.id, &self.record()).await
    }

    /// Remove the track record and every segment's entries from the store.
    pub async fn delete(self) -> Result<()> {
        let store = self.cache.store();
        for segment in &self.tree {
            for key in StoreKey::all_for_segment(segment.id) {
                store.delete(&key).await?;
            }
        }
        store.delete(&StoreKey::track(self.id)).await?;
        debug!(track = %self.id, segments = self.tree.segment_count(), "deleted track");
        Ok(())
    }

    pub fn record(&self) -> TrackRecord {
        TrackRecord {
            name: self.name.clone(),
            format: self.spec.format,
            sample_rate: self.spec.sample_rate,
            channels: self.spec.channels,
            data: self.tree.iter().map(|segment| segment.id).collect(),
        }
    }

    pub fn id(&self) -> TrackId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn spec(&self) -> &AudioSpec {
        &self.spec
    }

    pub fn tree(&self) -> &SampleTree {
        &self.tree
    }

    pub fn cache(&self) -> &Arc<SegmentCache> {
        &self.cache
    }

    /// Total samples across all channels.
    pub fn duration(&self) -> u64 {
        self.tree.duration()
    }

    pub fn duration_seconds(&self) -> f64 {
        self.spec.samples_to_seconds(self.duration())
    }

    pub fn segment_count(&self) -> usize {
        self.tree.segment_count()
    }

    pub fn height(&self) -> usize {
        self.tree.height()
    }

    /// Run `graph` over the whole track, writing the result back in place.
    pub async fn apply_filter(&self, graph: &FilterGraph) -> Result<()> {
        self.apply_filter_range(0, self.duration(), graph).await
    }

    /// Run `graph` over `[start, end)`, writing the result back in place.
    ///
    /// The source read keeps each segment open so the overwrite pass writes
    /// into the same buffers; the overwrite then closes every segment twice.
    /// The track's duration is unchanged: surplus filter output is dropped and
    /// a short output leaves the tail of the range as it was.
    pub async fn apply_filter_range(&self, start: u64, end: u64, graph: &FilterGraph) -> Result<()> {
        let source = self.stream(start, end, ReadOptions { keep_open: true });
        let filtered = self.filter.apply(source, graph)?;
        self.overwrite(start, end, filtered, OverwriteOptions { close_twice: true })
            .await?;
        debug!(track = %self.id, start, end, ?graph, "applied filter");
        Ok(())
    }

    /// Remove `[start, end)`.
    pub async fn clip(&mut self, start: u64, end: u64) -> Result<()> {
        self.replace(start, end, None).await
    }

    /// Splice `track` in at sample `at`, consuming it.
    pub async fn insert(&mut self, at: u64, track: Track) -> Result<()> {
        self.replace(at, at, Some(track)).await
    }
}

impl std::fmt::Debug for Track {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Track")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("spec", &self.spec)
            .field("segments", &self.tree.segment_count())
            .field("duration", &self.duration())
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use longplay_codec::DspFilter;
    use longplay_store::KvStore;

    #[tokio::test]
    async fn test_persist_and_load() {
        let (_store, cache) = cache_with_capacity(8);
        let track = filled(&cache, &ramp(0..20)).await;

        let loaded = Track::load(track.id(), cache.clone(), Arc::new(DspFilter::default()))
            .await
            .unwrap();
        assert_eq!(loaded.name(), "test");
        assert_eq!(loaded.spec(), track.spec());
        assert_eq!(lens(&loaded), vec![8, 8, 4]);
        assert_eq!(samples(&loaded).await, ramp(0..20));
    }

    #[tokio::test]
    async fn test_load_unknown_track() {
        let (_store, cache) = cache_with_capacity(8);
        let err = Track::load(TrackId::new(), cache, Arc::new(DspFilter::default()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::TrackNotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_removes_all_entries() {
        let (store, cache) = cache_with_capacity(8);
        let track = filled(&cache, &ramp(0..20)).await;
        assert!(!store.is_empty());

        track.delete().await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_record_lists_segments_in_order() {
        let (store, cache) = cache_with_capacity(4);
        let track = filled(&cache, &ramp(0..10)).await;

        let record = track.record();
        let order: Vec<_> = track.tree().iter().map(|s| s.id).collect();
        assert_eq!(record.data, order);
        assert!(store.contains(&StoreKey::track(track.id())).await.unwrap());
    }

    #[tokio::test]
    async fn test_apply_filter_in_place() {
        let (_store, cache) = cache_with_capacity(8);
        let track = filled(&cache, &[100, 200, 300, 400, 500, 600, 700, 800, 900, 1000]).await;

        track.apply_filter(&FilterGraph::Gain(2.0)).await.unwrap();

        assert_eq!(track.duration(), 10);
        assert!(all_closed(&track));
        assert_eq!(
            samples(&track).await,
            vec![200, 400, 600, 800, 1000, 1200, 1400, 1600, 1800, 2000]
        );
    }

    #[tokio::test]
    async fn test_duration_seconds() {
        let (_store, cache) = cache_with_capacity(8);
        let track = filled(&cache, &ramp(0..12)).await;
        assert_eq!(track.duration_seconds(), 12.0);
    }
}
