//! Store configuration.

use crate::error::{Error, Result};
use crate::format::AudioSpec;

/// Configuration for segment sizing, waveform rendering and bulk filtering.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Seconds of audio a fresh segment can hold (default: 30)
    pub segment_seconds: u32,
    /// Fixed segment capacity in samples, overriding `segment_seconds`
    pub segment_capacity: Option<usize>,
    /// Rendered waveform image width in pixels (default: 512)
    pub waveform_width: u32,
    /// Rendered waveform image height in pixels (default: 64)
    pub waveform_height: u32,
    /// Per-track pipelines allowed to run at once during bulk filtering (default: 4)
    pub filter_workers: usize,
    /// Decode a segment with missing compressed bytes as empty instead of failing
    pub tolerate_missing_data: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            segment_seconds: 30,
            segment_capacity: None,
            waveform_width: 512,
            waveform_height: 64,
            filter_workers: 4,
            tolerate_missing_data: false,
        }
    }
}

impl StoreConfig {
    /// Config with a fixed per-segment capacity in samples.
    pub fn with_segment_capacity(capacity: usize) -> Self {
        Self {
            segment_capacity: Some(capacity),
            ..Default::default()
        }
    }

    /// Samples a freshly allocated segment buffer holds for `spec`.
    pub fn segment_capacity(&self, spec: &AudioSpec) -> usize {
        match self.segment_capacity {
            Some(capacity) => capacity,
            None => (spec.samples_per_second() * self.segment_seconds as u64) as usize,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.segment_capacity == Some(0) {
            return Err(Error::InvalidConfig("segment_capacity must be non-zero".into()));
        }
        if self.segment_capacity.is_none() && self.segment_seconds == 0 {
            return Err(Error::InvalidConfig("segment_seconds must be non-zero".into()));
        }
        if self.waveform_width == 0 || self.waveform_height == 0 {
            return Err(Error::InvalidConfig(format!(
                "waveform size {}x{} must be non-zero",
                self.waveform_width, self.waveform_height
            )));
        }
        if self.filter_workers == 0 {
            return Err(Error::InvalidConfig("filter_workers must be at least 1".into()));
        }
        Ok(())
    }
}
