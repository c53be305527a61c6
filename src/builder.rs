//! Builder for configuring and constructing a [`Project`].

use crate::{Project, Result};
use longplay_codec::{Codec, DspFilter, Filter, WavCodec};
use longplay_core::StoreConfig;
use longplay_store::{KvStore, MemoryStore};
use longplay_tree::SegmentCache;
use std::sync::Arc;

/// Collaborators left unset fall back to an in-memory store, the WAV codec
/// and the built-in DSP filter.
///
/// # Example
///
/// ```ignore
/// use longplay::prelude::*;
///
/// let project = Project::builder()
///     .store(Arc::new(DirStore::open("./session").await?))
///     .segment_seconds(10)
///     .filter_workers(2)
///     .build()?;
/// ```
#[derive(Default)]
pub struct ProjectBuilder {
    store: Option<Arc<dyn KvStore>>,
    codec: Option<Arc<dyn Codec>>,
    filter: Option<Arc<dyn Filter>>,
    config: StoreConfig,
}

impl ProjectBuilder {
    pub fn store(mut self, store: Arc<dyn KvStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn codec(mut self, codec: Arc<dyn Codec>) -> Self {
        self.codec = Some(codec);
        self
    }

    pub fn filter(mut self, filter: Arc<dyn Filter>) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    /// Default: 30
    pub fn segment_seconds(mut self, seconds: u32) -> Self {
        self.config.segment_seconds = seconds;
        self
    }

    /// Fixed segment capacity in samples, regardless of format.
    pub fn segment_capacity(mut self, samples: usize) -> Self {
        self.config.segment_capacity = Some(samples);
        self
    }

    /// Default: 4
    pub fn filter_workers(mut self, workers: usize) -> Self {
        self.config.filter_workers = workers;
        self
    }

    /// Default: 512 x 64
    pub fn waveform_size(mut self, width: u32, height: u32) -> Self {
        self.config.waveform_width = width;
        self.config.waveform_height = height;
        self
    }

    pub fn tolerate_missing_data(mut self, tolerate: bool) -> Self {
        self.config.tolerate_missing_data = tolerate;
        self
    }

    pub fn build(self) -> Result<Project> {
        self.config.validate()?;

        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryStore::new()));
        let codec = self.codec.unwrap_or_else(|| Arc::new(WavCodec::default()));
        let filter = self
            .filter
            .unwrap_or_else(|| Arc::new(DspFilter::default()));

        let cache = Arc::new(SegmentCache::new(store, codec, self.config));
        Ok(Project::from_parts(cache, filter))
    }
}

impl std::fmt::Debug for ProjectBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectBuilder")
            .field("store", &self.store.is_some())
            .field("codec", &self.codec.as_ref().map(|c| c.name().to_string()))
            .field("filter", &self.filter.is_some())
            .field("config", &self.config)
            .finish()
    }
}
