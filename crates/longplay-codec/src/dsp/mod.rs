//! DSP helpers used by [`DspFilter`](crate::DspFilter)
//!
//! - [`remix`]: channel up/down-mixing of interleaved `f32`
//! - [`apply_gain`]: linear gain
//! - [`StreamResampler`]: incremental sample-rate conversion via rubato

mod convert;
mod resample;

pub use convert::{apply_gain, remix};
pub use resample::{ResampleQuality, StreamResampler};
