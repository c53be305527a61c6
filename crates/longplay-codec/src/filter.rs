//! Filter collaborator: lazy transforms over frame streams.

use crate::dsp::{apply_gain, remix, ResampleQuality, StreamResampler};
use futures::stream::{self, StreamExt};
use longplay_core::{AudioSpec, Error, Frame, FrameStream, Result, SampleBuffer};

/// Description of a filter pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterGraph {
    /// Normalize layout, channels, sample rate and sample format to the spec
    Convert(AudioSpec),
    /// Linear gain, keeping the input spec
    Gain(f32),
    /// Apply each graph in order
    Chain(Vec<FilterGraph>),
}

/// Applies a [`FilterGraph`] to a frame stream.
///
/// Building the pipeline is synchronous; work happens as the returned
/// stream is polled. Output frames never carry a segment origin.
pub trait Filter: Send + Sync {
    fn apply<'a>(&self, input: FrameStream<'a>, graph: &FilterGraph) -> Result<FrameStream<'a>>;
}

/// Built-in filter implementation.
#[derive(Debug, Clone, Default)]
pub struct DspFilter {
    pub resample_quality: ResampleQuality,
}

impl DspFilter {
    pub fn new(resample_quality: ResampleQuality) -> Self {
        Self { resample_quality }
    }
}

impl Filter for DspFilter {
    fn apply<'a>(&self, input: FrameStream<'a>, graph: &FilterGraph) -> Result<FrameStream<'a>> {
        match graph {
            FilterGraph::Convert(target) => Ok(convert(input, *target, self.resample_quality)),
            FilterGraph::Gain(gain) => {
                let gain = *gain;
                Ok(input
                    .map(move |frame| frame.and_then(|frame| gain_frame(frame, gain)))
                    .boxed())
            }
            FilterGraph::Chain(graphs) => graphs
                .iter()
                .try_fold(input, |stream, graph| self.apply(stream, graph)),
        }
    }
}

fn gain_frame(frame: Frame, gain: f32) -> Result<Frame> {
    let frame = frame.into_interleaved()?;
    let mut samples = frame.data.to_f32();
    apply_gain(&mut samples, gain);
    Ok(Frame::interleaved(
        frame.spec,
        SampleBuffer::from_f32(frame.spec.format, &samples),
    ))
}

struct ConvertState<'a> {
    input: FrameStream<'a>,
    target: AudioSpec,
    quality: ResampleQuality,
    resampler: Option<StreamResampler>,
    finished: bool,
}

fn convert(input: FrameStream<'_>, target: AudioSpec, quality: ResampleQuality) -> FrameStream<'_> {
    let state = ConvertState {
        input,
        target,
        quality,
        resampler: None,
        finished: false,
    };

    stream::try_unfold(state, |mut state| async move {
        next_converted(&mut state)
            .await
            .map(|frame| frame.map(|frame| (frame, state)))
    })
    .boxed()
}

async fn next_converted(state: &mut ConvertState<'_>) -> Result<Option<Frame>> {
    loop {
        if state.finished {
            return Ok(None);
        }

        let Some(frame) = state.input.next().await else {
            state.finished = true;
            let tail = match state.resampler.as_mut() {
                Some(resampler) => resampler.finish()?,
                None => Vec::new(),
            };
            if tail.is_empty() {
                return Ok(None);
            }
            return Ok(Some(encode(state.target, &tail)));
        };

        let frame = frame?.into_interleaved()?;
        if frame.spec == state.target {
            return Ok(Some(Frame::interleaved(frame.spec, frame.data)));
        }

        let samples = remix(
            &frame.data.to_f32(),
            frame.spec.channels as usize,
            state.target.channels as usize,
        );

        if frame.spec.sample_rate == state.target.sample_rate {
            return Ok(Some(encode(state.target, &samples)));
        }

        let mut resampler = match state.resampler.take() {
            Some(resampler) if resampler.source_rate() != frame.spec.sample_rate => {
                return Err(Error::Filter(format!(
                    "sample rate changed mid-stream: {}Hz -> {}Hz",
                    resampler.source_rate(),
                    frame.spec.sample_rate
                )));
            }
            Some(resampler) => resampler,
            None => StreamResampler::new(
                frame.spec.sample_rate,
                state.target.sample_rate,
                state.target.channels as usize,
                state.quality,
            )?,
        };

        let out = resampler.push(&samples)?;
        state.resampler = Some(resampler);
        if !out.is_empty() {
            return Ok(Some(encode(state.target, &out)));
        }
    }
}

fn encode(spec: AudioSpec, samples: &[f32]) -> Frame {
    Frame::interleaved(spec, SampleBuffer::from_f32(spec.format, samples))
}
