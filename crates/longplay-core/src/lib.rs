//! # Longplay Core
//!
//! Shared vocabulary for the longplay segmented sample store.
//!
//! - **Formats**: [`SampleFormat`] and [`AudioSpec`] describe interleaved PCM
//! - **Buffers**: [`SampleBuffer`] is a tagged union over sample representations
//! - **Frames**: [`Frame`] carries a buffer plus its layout and optional segment origin
//! - **Streams**: [`StreamAdapter`] is the pull-based, push-back-capable frame sequence
//! - **Config**: [`StoreConfig`] tunes segment capacity, rendering and workers
//!
//! ## Example
//!
//! ```rust
//! use longplay_core::{AudioSpec, Frame, SampleBuffer, SampleFormat};
//!
//! let spec = AudioSpec::new(SampleFormat::S16, 48000, 2);
//! let frame = Frame::interleaved(spec, SampleBuffer::S16(vec![0; 960]));
//! assert_eq!(frame.len(), 960);
//! assert_eq!(spec.samples_to_seconds(frame.len() as u64), 0.01);
//! ```

pub mod buffer;
pub mod config;
pub mod error;
pub mod format;
pub mod frame;
pub mod id;
pub mod stream;

pub use buffer::SampleBuffer;
pub use config::StoreConfig;
pub use error::{Error, Result};
pub use format::{AudioSpec, SampleFormat};
pub use frame::{Frame, FrameOrigin, Layout};
pub use id::{SegmentId, TrackId};
pub use stream::{FrameStream, StreamAdapter};
