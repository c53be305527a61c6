//! Append and read-back tests

use crate::helpers::tolerances::{INT16_EPSILON, RESAMPLE_EPSILON};
use crate::helpers::*;
use approx::assert_abs_diff_eq;
use futures::stream::{self, StreamExt};
use futures::TryStreamExt;
use longplay::prelude::*;

#[tokio::test]
async fn test_three_frames_fill_one_segment() {
    let mut project = test_project(1024);
    let id = project
        .import(
            "short",
            mono(),
            frames(vec![vec![1, 2, 3, 4], vec![5, 6, 7, 8], vec![9, 10, 11, 12]]),
        )
        .await
        .unwrap();

    let track = project.track(id).unwrap();
    assert_eq!(track.duration(), 12);
    assert_eq!(segment_lens(track), vec![12]);
    assert_eq!(samples(track).await, (1..=12).collect::<Vec<i16>>());
}

#[tokio::test]
async fn test_twenty_samples_at_capacity_eight() {
    let mut project = test_project(8);
    let id = import(&mut project, ramp(0..20)).await;

    let track = project.track(id).unwrap();
    assert_eq!(segment_lens(track), vec![8, 8, 4]);
    let root = track.tree().root().unwrap();
    assert_eq!(track.tree().subtree_duration(root), 20);
    assert_eq!(samples(track).await, ramp(0..20));
}

#[tokio::test]
async fn test_round_trip_of_many_uneven_frames() {
    let mut project = test_project(7);
    let chunks: Vec<Vec<i16>> = (0..40)
        .map(|i| ramp(i * 100..i * 100 + (i % 5) + 1))
        .collect();
    let expected: Vec<i16> = chunks.iter().flatten().copied().collect();

    let id = project.import("uneven", mono(), frames(chunks)).await.unwrap();
    let track = project.track(id).unwrap();

    assert_eq!(track.duration(), expected.len() as u64);
    assert_eq!(samples(track).await, expected);
    assert!(track.height() <= 5);
}

#[tokio::test]
async fn test_every_offset_reads_its_sample() {
    let mut project = test_project(6);
    let id = import(&mut project, ramp(0..50)).await;
    let track = project.track(id).unwrap();

    for offset in 0..50u64 {
        let one = track.read_all(offset, offset + 1).await.unwrap();
        assert_eq!(one, SampleBuffer::S16(vec![offset as i16]));
    }
}

#[tokio::test]
async fn test_planar_stereo_input_stored_interleaved() {
    let mut project = test_project(64);
    let stereo = AudioSpec::new(SampleFormat::S16, 1, 2);
    let planar = Frame::planar(stereo, SampleBuffer::S16(vec![1, 2, 3, 10, 20, 30]));

    let id = project
        .import("stereo", stereo, stream::iter(vec![Ok(planar)]).boxed())
        .await
        .unwrap();

    let track = project.track(id).unwrap();
    assert_eq!(samples(track).await, vec![1, 10, 2, 20, 3, 30]);
    assert_eq!(track.duration_seconds(), 3.0);
}

#[tokio::test]
async fn test_float_input_converted_to_track_format() {
    let mut project = test_project(64);
    let float = AudioSpec::new(SampleFormat::F32, 1, 1);
    let input = Frame::interleaved(float, SampleBuffer::F32(vec![0.0, 0.5, -0.25]));

    let id = project
        .import("float", mono(), stream::iter(vec![Ok(input)]).boxed())
        .await
        .unwrap();

    let stored = project.track(id).unwrap().read_all(0, 3).await.unwrap().to_f32();
    assert_abs_diff_eq!(stored[0], 0.0, epsilon = INT16_EPSILON);
    assert_abs_diff_eq!(stored[1], 0.5, epsilon = INT16_EPSILON);
    assert_abs_diff_eq!(stored[2], -0.25, epsilon = INT16_EPSILON);
}

#[tokio::test]
async fn test_resampled_input_length() {
    let mut project = test_project(100_000);
    let source = AudioSpec::new(SampleFormat::F32, 22_050, 1);
    let target = AudioSpec::new(SampleFormat::F32, 44_100, 1);
    let tone: Vec<f32> = (0..22_050)
        .map(|i| (2.0 * std::f32::consts::PI * 220.0 * i as f32 / 22_050.0).sin() * 0.5)
        .collect();
    let input = Frame::interleaved(source, SampleBuffer::F32(tone));

    let id = project
        .import("upsampled", target, stream::iter(vec![Ok(input)]).boxed())
        .await
        .unwrap();

    let track = project.track(id).unwrap();
    assert_eq!(track.duration(), 44_100);
    assert_abs_diff_eq!(track.duration_seconds(), 1.0, epsilon = 1e-9);

    // Peak level survives resampling
    let stored = track.read_all(4_000, 40_000).await.unwrap().to_f32();
    let peak = stored.iter().fold(0.0f32, |a, s| a.max(s.abs()));
    assert_abs_diff_eq!(peak, 0.5, epsilon = RESAMPLE_EPSILON);
}

#[tokio::test]
async fn test_stream_frames_carry_origins() {
    let mut project = test_project(8);
    let id = import(&mut project, ramp(0..20)).await;
    let track = project.track(id).unwrap();

    let frames: Vec<Frame> = track
        .stream_seconds(4.0, 12.0, ReadOptions::default())
        .try_collect()
        .await
        .unwrap();

    let origins: Vec<_> = frames.iter().map(|f| f.origin.unwrap()).collect();
    assert_eq!(origins.len(), 2);
    assert_eq!(origins[0].offset, 4);
    assert_eq!(origins[1].offset, 0);
    assert_ne!(origins[0].segment, origins[1].segment);
    assert!(track.tree().iter().all(|s| s.entry().readers() == 0));
}
