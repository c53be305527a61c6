//! Sample frames: the unit that flows through streams.

use crate::buffer::SampleBuffer;
use crate::error::{Error, Result};
use crate::format::AudioSpec;
use crate::id::SegmentId;

/// Channel arrangement of a frame's buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// `L R L R ...`
    #[default]
    Interleaved,
    /// All of channel 0, then all of channel 1, ...
    Planar,
}

/// Where a frame's samples live inside a track.
///
/// Frames produced by a track read carry their origin so a downstream
/// overwrite can write back into the same segment buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameOrigin {
    pub segment: SegmentId,
    /// Offset of the frame's first sample within the segment.
    pub offset: usize,
}

/// A run of samples with its spec and layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub spec: AudioSpec,
    pub layout: Layout,
    pub data: SampleBuffer,
    pub origin: Option<FrameOrigin>,
}

impl Frame {
    /// Interleaved frame without an origin.
    pub fn interleaved(spec: AudioSpec, data: SampleBuffer) -> Self {
        Self {
            spec,
            layout: Layout::Interleaved,
            data,
            origin: None,
        }
    }

    /// Planar frame: `data` holds each channel's samples back to back.
    pub fn planar(spec: AudioSpec, data: SampleBuffer) -> Self {
        Self {
            spec,
            layout: Layout::Planar,
            data,
            origin: None,
        }
    }

    pub fn with_origin(mut self, origin: FrameOrigin) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Number of samples across all channels.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Rearrange planar data into interleaved order. Interleaved frames pass through.
    pub fn into_interleaved(self) -> Result<Self> {
        if self.layout == Layout::Interleaved {
            return Ok(self);
        }
        let channels = self.spec.channels as usize;
        if channels == 0 || self.data.len() % channels != 0 {
            return Err(Error::InvalidRange {
                start: 0,
                end: self.data.len() as u64,
            });
        }
        let per_channel = self.data.len() / channels;
        let data = match &self.data {
            SampleBuffer::U8(v) => SampleBuffer::U8(interleave(v, channels, per_channel)),
            SampleBuffer::S16(v) => SampleBuffer::S16(interleave(v, channels, per_channel)),
            SampleBuffer::S32(v) => SampleBuffer::S32(interleave(v, channels, per_channel)),
            SampleBuffer::F32(v) => SampleBuffer::F32(interleave(v, channels, per_channel)),
        };
        Ok(Self {
            spec: self.spec,
            layout: Layout::Interleaved,
            data,
            origin: self.origin,
        })
    }

    /// Split an interleaved frame at sample `at`, keeping the head.
    ///
    /// The returned tail inherits the origin shifted by `at`.
    pub fn split_off(&mut self, at: usize) -> Self {
        let at = at.min(self.len());
        let tail = self.data.split_off(at);
        Self {
            spec: self.spec,
            layout: self.layout,
            data: tail,
            origin: self.origin.map(|o| FrameOrigin {
                segment: o.segment,
                offset: o.offset + at,
            }),
        }
    }
}

fn interleave<T: Copy>(planar: &[T], channels: usize, per_channel: usize) -> Vec<T> {
    let mut out = Vec::with_capacity(planar.len());
    for i in 0..per_channel {
        for ch in 0..channels {
            out.push(planar[ch * per_channel + i]);
        }
    }
    out
}
