//! Test helpers and fixtures for longplay integration tests
//!
//! Tracks in these tests are mono S16 at 1 Hz, so one sample is one second
//! and sample offsets read directly as positions in the ramp fixtures.

#![allow(dead_code)]

pub mod tolerances;

use futures::stream::{self, StreamExt};
use longplay::prelude::*;
use longplay::FrameStream;

/// Mono S16 at 1 Hz
pub fn mono() -> AudioSpec {
    AudioSpec::new(SampleFormat::S16, 1, 1)
}

/// Install a test subscriber once; `RUST_LOG`-style filtering is not needed here.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Project over a fresh in-memory store with a fixed segment capacity.
pub fn test_project(capacity: usize) -> Project {
    init_tracing();
    Project::builder()
        .segment_capacity(capacity)
        .build()
        .expect("Failed to build test project")
}

/// `0, 1, 2, ...` as i16 samples.
pub fn ramp(range: std::ops::Range<i16>) -> Vec<i16> {
    range.collect()
}

/// One frame per chunk, in the given spec.
pub fn frames_in(spec: AudioSpec, chunks: Vec<Vec<i16>>) -> FrameStream<'static> {
    let frames: Vec<_> = chunks
        .into_iter()
        .map(|chunk| Ok(Frame::interleaved(spec, SampleBuffer::S16(chunk))))
        .collect();
    stream::iter(frames).boxed()
}

pub fn frames(chunks: Vec<Vec<i16>>) -> FrameStream<'static> {
    frames_in(mono(), chunks)
}

pub async fn import(project: &mut Project, samples: Vec<i16>) -> TrackId {
    project
        .import("fixture", mono(), frames(vec![samples]))
        .await
        .expect("Failed to import fixture")
}

/// Every sample of a track, as i16.
pub async fn samples(track: &Track) -> Vec<i16> {
    match track.read_all(0, track.duration()).await.expect("read failed") {
        SampleBuffer::S16(v) => v,
        other => panic!("unexpected format {:?}", other.format()),
    }
}

pub fn segment_lens(track: &Track) -> Vec<usize> {
    track.tree().iter().map(|s| s.len).collect()
}
