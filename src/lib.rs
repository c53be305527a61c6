//! # Longplay - Segmented Sample Store
//!
//! Editing back end for long audio recordings: gigabyte-scale tracks are
//! kept as trees of independently compressed segments, so seeking, streamed
//! ingestion and in-place or duration-changing edits never load a whole
//! track into memory.
//!
//! ## Architecture
//!
//! Longplay is an umbrella crate that coordinates:
//! - **longplay-core** - Sample formats, buffers, frames, stream adapter, errors, config
//! - **longplay-store** - Namespaced key-value persistence (memory, directory)
//! - **longplay-codec** - WAV codec and filter graphs (conversion, resampling, gain)
//! - **longplay-analysis** - Waveform summaries and rendered waveform images
//! - **longplay-tree** - Segment tree, segment cache and streaming track edits
//!
//! ## Quick Start
//!
//! ```ignore
//! use longplay::prelude::*;
//!
//! let mut project = Project::builder().build()?;
//!
//! // Stream frames in from any source
//! let id = project.import("Interview", spec, frames).await?;
//!
//! // Edit by sample offset
//! project.clip(id, 44_100 * 2 * 60, 44_100 * 2 * 90).await?;
//! project.filter_tracks(&[id], &FilterGraph::Gain(0.5)).await?;
//!
//! // Read back lazily
//! let track = project.track(id).unwrap();
//! let mut frames = track.stream(0, track.duration(), ReadOptions::default());
//! ```
//!
//! ## Feature Flags
//!
//! - `default` - Everything below
//! - `dir-store` - Directory-backed store on `tokio::fs`

/// Re-export of longplay-core for direct access
pub use longplay_core as core;

pub use longplay_analysis as analysis;
pub use longplay_codec as codec;
pub use longplay_store as store;
pub use longplay_tree as tree;

// Core types
pub use longplay_core::{
    AudioSpec, Frame, FrameOrigin, FrameStream, Layout, SampleBuffer, SampleFormat, SegmentId,
    StoreConfig, StreamAdapter, TrackId,
};

// Collaborators
pub use longplay_codec::{Codec, DspFilter, Filter, FilterGraph, ResampleQuality, WavCodec};
pub use longplay_store::{KvStore, MemoryStore, Namespace, StoreKey};

#[cfg(feature = "dir-store")]
pub use longplay_store::DirStore;

// Segment store
pub use longplay_tree::{OverwriteOptions, ReadOptions, SampleTree, Segment, SegmentCache, Track};

mod builder;
mod error;
mod project;

pub use builder::ProjectBuilder;
pub use error::{Error, Result};
pub use project::Project;

/// Convenience prelude for common imports
pub mod prelude {
    pub use crate::{Project, ProjectBuilder};

    pub use crate::core::{AudioSpec, Frame, SampleBuffer, SampleFormat, StoreConfig, TrackId};

    pub use crate::codec::FilterGraph;
    pub use crate::tree::{OverwriteOptions, ReadOptions, Track};

    pub use crate::store::{KvStore, MemoryStore};

    #[cfg(feature = "dir-store")]
    pub use crate::store::DirStore;

    pub use std::sync::Arc;
}
