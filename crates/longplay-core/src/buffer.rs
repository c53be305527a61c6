//! Tagged sample buffers.
//!
//! A [`SampleBuffer`] owns a run of interleaved samples in one of the
//! [`SampleFormat`] representations. The representation is always explicit;
//! mixing representations is an error, and conversion goes through
//! normalized `f32`.

use crate::error::{Error, Result};
use crate::format::SampleFormat;
use std::ops::Range;

/// A contiguous run of samples tagged with its representation.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleBuffer {
    U8(Vec<u8>),
    S16(Vec<i16>),
    S32(Vec<i32>),
    F32(Vec<f32>),
}

/// Apply `$body` to the inner vector whatever its representation.
macro_rules! each_repr {
    ($buf:expr, $v:ident => $body:expr) => {
        match $buf {
            SampleBuffer::U8($v) => $body,
            SampleBuffer::S16($v) => $body,
            SampleBuffer::S32($v) => $body,
            SampleBuffer::F32($v) => $body,
        }
    };
}

/// Apply `$body` to a pair of buffers sharing a representation,
/// or fail with a type mismatch.
macro_rules! zip_repr {
    ($a:expr, $b:expr, ($x:ident, $y:ident) => $body:expr) => {
        match ($a, $b) {
            (SampleBuffer::U8($x), SampleBuffer::U8($y)) => $body,
            (SampleBuffer::S16($x), SampleBuffer::S16($y)) => $body,
            (SampleBuffer::S32($x), SampleBuffer::S32($y)) => $body,
            (SampleBuffer::F32($x), SampleBuffer::F32($y)) => $body,
            (a, b) => {
                return Err(Error::SampleTypeMismatch(format!(
                    "{} vs {}",
                    a.format(),
                    b.format()
                )))
            }
        }
    };
}

const U8_SILENCE: u8 = 128;

impl SampleBuffer {
    /// An empty buffer of the given representation.
    pub fn new(format: SampleFormat) -> Self {
        Self::with_capacity(format, 0)
    }

    pub fn with_capacity(format: SampleFormat, capacity: usize) -> Self {
        match format {
            SampleFormat::U8 => SampleBuffer::U8(Vec::with_capacity(capacity)),
            SampleFormat::S16 => SampleBuffer::S16(Vec::with_capacity(capacity)),
            SampleFormat::S32 => SampleBuffer::S32(Vec::with_capacity(capacity)),
            SampleFormat::F32 => SampleBuffer::F32(Vec::with_capacity(capacity)),
        }
    }

    /// A buffer of `len` silent samples.
    pub fn silence(format: SampleFormat, len: usize) -> Self {
        match format {
            SampleFormat::U8 => SampleBuffer::U8(vec![U8_SILENCE; len]),
            SampleFormat::S16 => SampleBuffer::S16(vec![0; len]),
            SampleFormat::S32 => SampleBuffer::S32(vec![0; len]),
            SampleFormat::F32 => SampleBuffer::F32(vec![0.0; len]),
        }
    }

    pub fn format(&self) -> SampleFormat {
        match self {
            SampleBuffer::U8(_) => SampleFormat::U8,
            SampleBuffer::S16(_) => SampleFormat::S16,
            SampleBuffer::S32(_) => SampleFormat::S32,
            SampleBuffer::F32(_) => SampleFormat::F32,
        }
    }

    pub fn len(&self) -> usize {
        each_repr!(self, v => v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the samples in `range`.
    pub fn slice(&self, range: Range<usize>) -> Result<Self> {
        self.check_range(&range)?;
        Ok(match self {
            SampleBuffer::U8(v) => SampleBuffer::U8(v[range].to_vec()),
            SampleBuffer::S16(v) => SampleBuffer::S16(v[range].to_vec()),
            SampleBuffer::S32(v) => SampleBuffer::S32(v[range].to_vec()),
            SampleBuffer::F32(v) => SampleBuffer::F32(v[range].to_vec()),
        })
    }

    /// Split at `at`, keeping `[0, at)` and returning `[at, len)`.
    pub fn split_off(&mut self, at: usize) -> Self {
        let at = at.min(self.len());
        match self {
            SampleBuffer::U8(v) => SampleBuffer::U8(v.split_off(at)),
            SampleBuffer::S16(v) => SampleBuffer::S16(v.split_off(at)),
            SampleBuffer::S32(v) => SampleBuffer::S32(v.split_off(at)),
            SampleBuffer::F32(v) => SampleBuffer::F32(v.split_off(at)),
        }
    }

    pub fn truncate(&mut self, len: usize) {
        each_repr!(self, v => v.truncate(len))
    }

    /// Grow with silence or shrink to exactly `len` samples.
    pub fn resize(&mut self, len: usize) {
        match self {
            SampleBuffer::U8(v) => v.resize(len, U8_SILENCE),
            SampleBuffer::S16(v) => v.resize(len, 0),
            SampleBuffer::S32(v) => v.resize(len, 0),
            SampleBuffer::F32(v) => v.resize(len, 0.0),
        }
    }

    /// Overwrite `[dst, dst + src_range.len())` with `src[src_range]`.
    pub fn copy_from(&mut self, dst: usize, src: &SampleBuffer, src_range: Range<usize>) -> Result<()> {
        src.check_range(&src_range)?;
        let end = dst + src_range.len();
        if end > self.len() {
            return Err(Error::InvalidRange {
                start: dst as u64,
                end: end as u64,
            });
        }
        zip_repr!(self, src, (d, s) => d[dst..end].copy_from_slice(&s[src_range]));
        Ok(())
    }

    /// Move `src` within the buffer so it starts at `dest`.
    pub fn copy_within(&mut self, src: Range<usize>, dest: usize) -> Result<()> {
        self.check_range(&src)?;
        if dest + src.len() > self.len() {
            return Err(Error::InvalidRange {
                start: dest as u64,
                end: (dest + src.len()) as u64,
            });
        }
        each_repr!(self, v => v.copy_within(src, dest));
        Ok(())
    }

    /// Append all samples of `other`.
    pub fn extend_from(&mut self, other: &SampleBuffer) -> Result<()> {
        zip_repr!(self, other, (d, s) => d.extend_from_slice(s));
        Ok(())
    }

    /// Join buffers of one representation into a single contiguous buffer.
    pub fn concat(format: SampleFormat, parts: &[SampleBuffer]) -> Result<Self> {
        let total = parts.iter().map(SampleBuffer::len).sum();
        let mut out = Self::with_capacity(format, total);
        for part in parts {
            out.extend_from(part)?;
        }
        Ok(out)
    }

    /// Samples normalized to `f32` in -1.0..=1.0.
    pub fn to_f32(&self) -> Vec<f32> {
        match self {
            SampleBuffer::U8(v) => v.iter().map(|&s| (s as f32 - 128.0) / 128.0).collect(),
            SampleBuffer::S16(v) => v.iter().map(|&s| s as f32 / 32768.0).collect(),
            SampleBuffer::S32(v) => v.iter().map(|&s| (s as f64 / 2147483648.0) as f32).collect(),
            SampleBuffer::F32(v) => v.clone(),
        }
    }

    /// Encode normalized `f32` samples into `format`, clipping out-of-range values.
    pub fn from_f32(format: SampleFormat, samples: &[f32]) -> Self {
        match format {
            SampleFormat::U8 => SampleBuffer::U8(
                samples
                    .iter()
                    .map(|&s| (s.clamp(-1.0, 1.0) * 128.0 + 128.0).round().min(255.0) as u8)
                    .collect(),
            ),
            SampleFormat::S16 => SampleBuffer::S16(
                samples
                    .iter()
                    .map(|&s| (s.clamp(-1.0, 1.0) * 32768.0).round().min(32767.0) as i16)
                    .collect(),
            ),
            SampleFormat::S32 => SampleBuffer::S32(
                samples
                    .iter()
                    .map(|&s| {
                        (s.clamp(-1.0, 1.0) as f64 * 2147483648.0)
                            .round()
                            .min(2147483647.0) as i32
                    })
                    .collect(),
            ),
            SampleFormat::F32 => SampleBuffer::F32(samples.to_vec()),
        }
    }

    /// Re-encode into another representation. Same-format conversion is a copy.
    pub fn convert(&self, format: SampleFormat) -> Self {
        if self.format() == format {
            return self.clone();
        }
        Self::from_f32(format, &self.to_f32())
    }

    fn check_range(&self, range: &Range<usize>) -> Result<()> {
        if range.start > range.end || range.end > self.len() {
            return Err(Error::InvalidRange {
                start: range.start as u64,
                end: range.end as u64,
            });
        }
        Ok(())
    }
}
