//! Sample formats and stream specifications.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Interleaved PCM sample encodings a track can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleFormat {
    /// Unsigned 8-bit, silence at 128
    U8,
    /// Signed 16-bit
    S16,
    /// Signed 32-bit
    S32,
    /// 32-bit float, nominal range -1.0..=1.0
    F32,
}

impl SampleFormat {
    /// Size of one sample in bytes.
    pub fn bytes_per_sample(&self) -> usize {
        match self {
            SampleFormat::U8 => 1,
            SampleFormat::S16 => 2,
            SampleFormat::S32 | SampleFormat::F32 => 4,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SampleFormat::U8 => "u8",
            SampleFormat::S16 => "s16",
            SampleFormat::S32 => "s32",
            SampleFormat::F32 => "f32",
        }
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Format, rate and channel count shared by every sample of a track.
///
/// Sample counts throughout longplay are counts of individual interleaved
/// values, so one second of audio is `sample_rate * channels` samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AudioSpec {
    pub format: SampleFormat,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioSpec {
    pub fn new(format: SampleFormat, sample_rate: u32, channels: u16) -> Self {
        Self {
            format,
            sample_rate,
            channels,
        }
    }

    /// Interleaved samples per second of audio.
    pub fn samples_per_second(&self) -> u64 {
        self.sample_rate as u64 * self.channels as u64
    }

    /// Convert seconds to an interleaved sample offset, rounded down to a
    /// whole channel group so offsets never split a multi-channel frame.
    pub fn seconds_to_samples(&self, seconds: f64) -> u64 {
        if seconds <= 0.0 || !seconds.is_finite() {
            return 0;
        }
        let frames = (seconds * self.sample_rate as f64).floor() as u64;
        frames * self.channels as u64
    }

    /// Convert an interleaved sample count to seconds.
    pub fn samples_to_seconds(&self, samples: u64) -> f64 {
        let per_second = self.samples_per_second();
        if per_second == 0 {
            return 0.0;
        }
        samples as f64 / per_second as f64
    }

    /// Same rate and channel layout with a different sample format.
    pub fn with_format(self, format: SampleFormat) -> Self {
        Self { format, ..self }
    }
}

impl fmt::Display for AudioSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}Hz/{}ch", self.format, self.sample_rate, self.channels)
    }
}
