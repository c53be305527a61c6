//! Project: the catalog of open tracks and the edits addressed by track id.

use crate::builder::ProjectBuilder;
use crate::{Error, Result};
use futures::stream::{self, StreamExt, TryStreamExt};
use longplay_codec::{Filter, FilterGraph};
use longplay_core::{AudioSpec, FrameStream, StoreConfig, TrackId};
use longplay_store::Namespace;
use longplay_tree::{ReadOptions, SegmentCache, Track};
use std::sync::Arc;
use tracing::info;

/// Owns a set of tracks sharing one store, codec, filter and config.
///
/// Tracks are addressed by [`TrackId`]; edits that combine tracks move the
/// source track out of the catalog and into the target.
pub struct Project {
    tracks: Vec<Track>,
    cache: Arc<SegmentCache>,
    filter: Arc<dyn Filter>,
}

impl Project {
    pub fn builder() -> ProjectBuilder {
        ProjectBuilder::default()
    }

    pub(crate) fn from_parts(cache: Arc<SegmentCache>, filter: Arc<dyn Filter>) -> Self {
        Self {
            tracks: Vec::new(),
            cache,
            filter,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        self.cache.config()
    }

    pub fn cache(&self) -> &Arc<SegmentCache> {
        &self.cache
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Ids of the open tracks, in the order they were added.
    pub fn track_ids(&self) -> Vec<TrackId> {
        self.tracks.iter().map(Track::id).collect()
    }

    pub fn track(&self, id: TrackId) -> Option<&Track> {
        self.tracks.iter().find(|track| track.id() == id)
    }

    pub fn track_mut(&mut self, id: TrackId) -> Option<&mut Track> {
        self.tracks.iter_mut().find(|track| track.id() == id)
    }

    fn position(&self, id: TrackId) -> Result<usize> {
        self.tracks
            .iter()
            .position(|track| track.id() == id)
            .ok_or(Error::Core(longplay_core::Error::TrackNotFound(id)))
    }

    fn get(&self, id: TrackId) -> Result<&Track> {
        let index = self.position(id)?;
        Ok(&self.tracks[index])
    }

    fn get_mut(&mut self, id: TrackId) -> Result<&mut Track> {
        let index = self.position(id)?;
        Ok(&mut self.tracks[index])
    }

    fn new_track(&self, name: impl Into<String>, spec: AudioSpec) -> Track {
        Track::create(name, spec, self.cache.clone(), self.filter.clone())
    }

    /// Add an empty track and persist its record.
    pub async fn create_track(&mut self, name: impl Into<String>, spec: AudioSpec) -> Result<TrackId> {
        let track = self.new_track(name, spec);
        track.persist().await?;
        let id = track.id();
        info!(track = %id, name = track.name(), %spec, "created track");
        self.tracks.push(track);
        Ok(id)
    }

    /// Create a track and append `input` to it.
    ///
    /// A failed import leaves the partially filled track out of the catalog
    /// and removes whatever it had persisted.
    pub async fn import(
        &mut self,
        name: impl Into<String>,
        spec: AudioSpec,
        input: FrameStream<'_>,
    ) -> Result<TrackId> {
        let mut track = self.new_track(name, spec);
        if let Err(e) = track.append(input).await {
            track.delete().await?;
            return Err(e.into());
        }

        let id = track.id();
        info!(
            track = %id,
            name = track.name(),
            seconds = track.duration_seconds(),
            segments = track.segment_count(),
            "imported track"
        );
        self.tracks.push(track);
        Ok(id)
    }

    /// Load a persisted track into the catalog. Already open tracks are left as they are.
    pub async fn open_track(&mut self, id: TrackId) -> Result<()> {
        if self.track(id).is_some() {
            return Ok(());
        }
        let track = Track::load(id, self.cache.clone(), self.filter.clone()).await?;
        info!(track = %id, name = track.name(), "opened track");
        self.tracks.push(track);
        Ok(())
    }

    /// Ids of every track persisted in the store, open or not.
    pub async fn stored_tracks(&self) -> Result<Vec<TrackId>> {
        let keys = self.cache.store().list(Namespace::Track).await?;
        let mut ids = keys
            .into_iter()
            .map(|key| {
                key.id
                    .parse::<TrackId>()
                    .map_err(|e| Error::InvalidTrackId(key.id.clone(), e))
            })
            .collect::<Result<Vec<_>>>()?;
        ids.sort();
        Ok(ids)
    }

    /// Close a track and delete it with all of its segments.
    pub async fn remove_track(&mut self, id: TrackId) -> Result<()> {
        let index = self.position(id)?;
        let track = self.tracks.remove(index);
        track.delete().await?;
        info!(track = %id, "removed track");
        Ok(())
    }

    /// Copy `[start, end)` of a track into a new track.
    pub async fn extract(
        &mut self,
        id: TrackId,
        start: u64,
        end: u64,
        name: impl Into<String>,
    ) -> Result<TrackId> {
        let source = self.get(id)?;
        let mut extracted = self.new_track(name, *source.spec());
        extracted
            .append(source.stream(start, end, ReadOptions::default()))
            .await?;

        let extracted_id = extracted.id();
        info!(track = %extracted_id, from = %id, start, end, "extracted track");
        self.tracks.push(extracted);
        Ok(extracted_id)
    }

    pub async fn clip(&mut self, id: TrackId, start: u64, end: u64) -> Result<()> {
        self.get_mut(id)?.clip(start, end).await?;
        Ok(())
    }

    /// Move `source` into `id` at sample `at`.
    pub async fn insert(&mut self, id: TrackId, at: u64, source: TrackId) -> Result<()> {
        self.replace(id, at, at, Some(source)).await
    }

    /// Replace `[start, end)` of `id` with the track `replacement`, which
    /// leaves the catalog and is adopted by `id`. `None` clips.
    pub async fn replace(
        &mut self,
        id: TrackId,
        start: u64,
        end: u64,
        replacement: Option<TrackId>,
    ) -> Result<()> {
        let target = self.get(id)?;
        let target_spec = *target.spec();

        // Reject before the replacement leaves the catalog
        let clamped = end.min(target.duration());
        if start > clamped {
            return Err(longplay_core::Error::InvalidRange {
                start,
                end: clamped,
            }
            .into());
        }

        let replacement = match replacement {
            Some(other) if other == id => {
                return Err(longplay_core::Error::InvalidConfig(format!(
                    "track {id} cannot be spliced into itself"
                ))
                .into())
            }
            Some(other) => {
                let found = *self.get(other)?.spec();
                if found != target_spec {
                    return Err(longplay_core::Error::FormatMismatch {
                        expected: target_spec,
                        found,
                    }
                    .into());
                }
                let index = self.position(other)?;
                Some(self.tracks.remove(index))
            }
            None => None,
        };

        self.get_mut(id)?.replace(start, end, replacement).await?;
        Ok(())
    }

    /// Run `graph` over each listed track in place.
    ///
    /// At most `filter_workers` tracks are processed at once; each track's
    /// own pipeline runs sequentially. Duplicate ids are filtered once.
    pub async fn filter_tracks(&self, ids: &[TrackId], graph: &FilterGraph) -> Result<()> {
        let mut unique = ids.to_vec();
        unique.sort();
        unique.dedup();

        let tracks = unique
            .into_iter()
            .map(|id| self.get(id))
            .collect::<Result<Vec<_>>>()?;
        let count = tracks.len();

        stream::iter(tracks)
            .map(|track| track.apply_filter(graph))
            .buffer_unordered(self.config().filter_workers)
            .try_collect::<Vec<()>>()
            .await?;

        info!(tracks = count, ?graph, "filtered tracks");
        Ok(())
    }
}

impl std::fmt::Debug for Project {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Project")
            .field("tracks", &self.tracks)
            .field("cache", &self.cache)
            .finish()
    }
}
