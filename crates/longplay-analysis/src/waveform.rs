//! Per-segment waveform summaries.
//!
//! A segment's first channel is reduced to fixed-size blocks of min, max and
//! RMS level, the data behind one rendered waveform column.

/// Levels of one run of samples.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WaveformBlock {
    pub min: f32,
    pub max: f32,
    pub rms: f32,
}

impl WaveformBlock {
    /// Levels of `samples`; all zero when empty.
    fn measure(samples: impl Iterator<Item = f32>) -> Self {
        let (count, min, max, energy) = samples.fold(
            (0usize, f32::INFINITY, f32::NEG_INFINITY, 0.0f64),
            |(count, min, max, energy), s| (count + 1, min.min(s), max.max(s), energy + (s * s) as f64),
        );
        if count == 0 {
            return Self::default();
        }
        Self {
            min,
            max,
            rms: (energy / count as f64).sqrt() as f32,
        }
    }

    /// Largest absolute excursion in the block.
    pub fn peak(&self) -> f32 {
        self.min.abs().max(self.max.abs())
    }
}

/// Block levels for one channel of a segment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WaveformSummary {
    pub blocks: Vec<WaveformBlock>,
    /// Channel samples folded into each block (the last block may hold fewer).
    pub samples_per_block: usize,
    /// Channel samples covered by the summary.
    pub total_samples: usize,
}

impl WaveformSummary {
    pub fn new(samples_per_block: usize) -> Self {
        Self {
            samples_per_block,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn peak(&self) -> f32 {
        self.blocks.iter().map(WaveformBlock::peak).fold(0.0, f32::max)
    }
}

/// Summarize channel 0 of interleaved `samples` in blocks of
/// `samples_per_block` channel samples.
pub fn compute_summary(samples: &[f32], channels: usize, samples_per_block: usize) -> WaveformSummary {
    if channels == 0 || samples_per_block == 0 {
        return WaveformSummary::new(samples_per_block);
    }

    // Truncate to whole channel groups, then keep every `channels`-th sample
    let first_channel: Vec<f32> = samples
        .chunks_exact(channels)
        .map(|group| group[0])
        .collect();

    WaveformSummary {
        blocks: first_channel
            .chunks(samples_per_block)
            .map(|block| WaveformBlock::measure(block.iter().copied()))
            .collect(),
        samples_per_block,
        total_samples: first_channel.len(),
    }
}

/// Summary with one block per pixel column of a `width`-wide image, or one
/// block per sample when there are fewer samples than columns.
pub fn summarize_for_width(samples: &[f32], channels: usize, width: u32) -> WaveformSummary {
    let frames = samples.len() / channels.max(1);
    let per_block = frames.div_ceil(width.max(1) as usize).max(1);
    compute_summary(samples, channels, per_block)
}
