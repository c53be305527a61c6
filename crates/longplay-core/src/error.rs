//! Error types for longplay.

use crate::format::AudioSpec;
use crate::id::{SegmentId, TrackId};
use std::sync::Arc;
use thiserror::Error;

/// Error type shared by every longplay subsystem.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid range: start={start}, end={end}")]
    InvalidRange { start: u64, end: u64 },

    #[error("Format mismatch: expected {expected}, found {found}")]
    FormatMismatch { expected: AudioSpec, found: AudioSpec },

    #[error("Sample type mismatch: {0}")]
    SampleTypeMismatch(String),

    #[error("Track not found: {0}")]
    TrackNotFound(TrackId),

    #[error("Segment not found: {0}")]
    SegmentNotFound(SegmentId),

    /// The segment claims samples but its compressed bytes are gone.
    #[error("Compressed data missing for segment {0}")]
    MissingSegmentData(SegmentId),

    /// A segment buffer was addressed while nobody held it open.
    #[error("Segment {0} is not open")]
    SegmentNotOpen(SegmentId),

    /// Decompression failed; every waiter of the shared load sees the same cause.
    #[error("Failed to load segment {segment}: {source}")]
    Load {
        segment: SegmentId,
        source: Arc<Error>,
    },

    #[error("Store error: {0}")]
    Store(String),

    #[error("Codec error: {0}")]
    Codec(String),

    #[error("Filter error: {0}")]
    Filter(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
