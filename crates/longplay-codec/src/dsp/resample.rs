//! Incremental resampling using rubato
//!
//! Frames arrive one at a time, so the resampler buffers input until a full
//! chunk is available and flushes the remainder (zero padded) at the end.
//! Total output is trimmed to `ceil(input * target / source)` frames.

use longplay_core::{Error, Result};
use rubato::{FftFixedIn, Resampler};

/// Resampling quality presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResampleQuality {
    /// Fast resampling (lower quality)
    Fast,
    /// Balanced quality/speed (default)
    #[default]
    Medium,
    /// High quality
    High,
}

impl ResampleQuality {
    fn chunk_size(&self) -> usize {
        match self {
            ResampleQuality::Fast => 512,
            ResampleQuality::Medium => 1024,
            ResampleQuality::High => 2048,
        }
    }

    fn sub_chunks(&self) -> usize {
        match self {
            ResampleQuality::Fast => 1,
            ResampleQuality::Medium => 2,
            ResampleQuality::High => 4,
        }
    }
}

/// Streaming sample-rate converter over interleaved `f32`.
pub struct StreamResampler {
    resampler: FftFixedIn<f32>,
    channels: usize,
    source_rate: u32,
    target_rate: u32,
    pending: Vec<Vec<f32>>,
    input_frames: u64,
    output_frames: u64,
}

impl StreamResampler {
    pub fn new(
        source_rate: u32,
        target_rate: u32,
        channels: usize,
        quality: ResampleQuality,
    ) -> Result<Self> {
        if source_rate == 0 || target_rate == 0 || channels == 0 {
            return Err(Error::Filter(format!(
                "cannot resample {source_rate}Hz -> {target_rate}Hz with {channels} channels"
            )));
        }
        let resampler = FftFixedIn::<f32>::new(
            source_rate as usize,
            target_rate as usize,
            quality.chunk_size(),
            quality.sub_chunks(),
            channels,
        )
        .map_err(|e| Error::Filter(e.to_string()))?;

        Ok(Self {
            resampler,
            channels,
            source_rate,
            target_rate,
            pending: vec![Vec::new(); channels],
            input_frames: 0,
            output_frames: 0,
        })
    }

    pub fn source_rate(&self) -> u32 {
        self.source_rate
    }

    /// Feed interleaved input; returns whatever interleaved output is ready.
    pub fn push(&mut self, interleaved: &[f32]) -> Result<Vec<f32>> {
        for frame in interleaved.chunks_exact(self.channels) {
            for (ch, &s) in frame.iter().enumerate() {
                self.pending[ch].push(s);
            }
        }
        self.input_frames += (interleaved.len() / self.channels) as u64;

        let mut out = Vec::new();
        while self.pending[0].len() >= self.resampler.input_frames_next() {
            let needed = self.resampler.input_frames_next();
            let chunk: Vec<Vec<f32>> = self
                .pending
                .iter_mut()
                .map(|p| p.drain(..needed).collect())
                .collect();
            self.process(&chunk, &mut out)?;
        }
        Ok(out)
    }

    /// Flush buffered input and the resampler's delay line.
    pub fn finish(&mut self) -> Result<Vec<f32>> {
        let expected = self.expected_output_frames();
        let mut out = Vec::new();

        while self.output_frames < expected {
            let needed = self.resampler.input_frames_next();
            let chunk: Vec<Vec<f32>> = self
                .pending
                .iter_mut()
                .map(|p| {
                    let mut chunk: Vec<f32> = p.drain(..p.len().min(needed)).collect();
                    chunk.resize(needed, 0.0);
                    chunk
                })
                .collect();
            if self.process(&chunk, &mut out)? == 0 {
                break;
            }
        }

        Ok(out)
    }

    fn expected_output_frames(&self) -> u64 {
        (self.input_frames as f64 * self.target_rate as f64 / self.source_rate as f64).ceil() as u64
    }

    /// Resample one chunk, appending at most the still-expected output.
    /// Returns the number of frames the resampler produced.
    fn process(&mut self, chunk: &[Vec<f32>], out: &mut Vec<f32>) -> Result<usize> {
        let output = self
            .resampler
            .process(chunk, None)
            .map_err(|e| Error::Filter(e.to_string()))?;

        let frames = output.first().map_or(0, Vec::len);
        let allowed = self.expected_output_frames().saturating_sub(self.output_frames);
        let take = (frames as u64).min(allowed) as usize;

        for i in 0..take {
            for channel in &output {
                out.push(channel[i]);
            }
        }
        self.output_frames += take as u64;
        Ok(frames)
    }
}
