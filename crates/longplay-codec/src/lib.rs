//! # Longplay Codec
//!
//! Codec and filter collaborators for the longplay sample store.
//!
//! The tree layer treats both as black boxes:
//! - [`Codec`]: compressed bytes ↔ sample frames ([`WavCodec`] via hound)
//! - [`Filter`]: lazy frame-stream transforms described by a [`FilterGraph`]
//!   ([`DspFilter`] handles format/channel conversion, resampling and gain)
//!
//! ## Example
//!
//! ```ignore
//! use longplay_codec::{DspFilter, Filter, FilterGraph};
//!
//! let filter = DspFilter::default();
//! let converted = filter.apply(input, &FilterGraph::Convert(track_spec))?;
//! ```

pub mod codec;
pub mod dsp;
pub mod filter;
pub mod wav;

pub use codec::Codec;
pub use dsp::ResampleQuality;
pub use filter::{DspFilter, Filter, FilterGraph};
pub use wav::WavCodec;
