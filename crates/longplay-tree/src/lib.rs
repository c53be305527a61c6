//! # Longplay Tree
//!
//! The segmented sample store behind every longplay track.
//!
//! A track's samples are split across [`Segment`]s held in an order-statistics
//! [`SampleTree`]. Each segment is compressed at rest and decompressed on
//! demand through the [`SegmentCache`], which reference-counts open buffers,
//! shares one decompression between concurrent openers, and flushes
//! modifications when the last opener closes.
//!
//! [`Track`] builds the streaming edits on top:
//! - [`Track::append`]: ingest a frame stream, filling and creating segments
//! - [`Track::stream`]: lazy ranged reads
//! - [`Track::overwrite`]: in-place writes over a range
//! - [`Track::replace`]: clip, insert and splice
//!
//! ## Example
//!
//! ```ignore
//! use longplay_tree::{SegmentCache, Track, ReadOptions};
//!
//! let cache = Arc::new(SegmentCache::new(store, codec, StoreConfig::default()));
//! let mut track = Track::create("Interview", spec, cache, filter);
//! track.append(input).await?;
//! track.clip(start, end).await?;
//! let frames = track.stream(0, track.duration(), ReadOptions::default());
//! ```

pub mod cache;
pub mod segment;
pub mod track;
pub mod tree;

pub use cache::{CacheEntry, RawBuffer, SegmentCache};
pub use segment::{NodeIndex, Segment};
pub use track::{OverwriteOptions, ReadOptions, Track};
pub use tree::SampleTree;
