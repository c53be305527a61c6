//! # Longplay Analysis
//!
//! Waveform overviews for longplay segments.
//!
//! - **Summaries**: min/max/RMS blocks over the first channel
//! - **Rendering**: PNG images drawn from a summary, stored alongside each
//!   segment so an editor can draw a long track without decoding it
//!
//! All functions operate on raw `&[f32]` sample buffers.
//!
//! ## Example
//!
//! ```rust
//! use longplay_analysis::{compute_summary, render_png};
//!
//! let samples: Vec<f32> = (0..4800).map(|i| (i as f32 * 0.01).sin()).collect();
//! let summary = compute_summary(&samples, 1, 64);
//! let png = render_png(&summary, 128, 32).unwrap();
//! assert_eq!(&png[1..4], b"PNG");
//! ```

pub mod render;
pub mod waveform;

pub use render::{render_png, RenderError};
pub use waveform::{compute_summary, summarize_for_width, WaveformBlock, WaveformSummary};
