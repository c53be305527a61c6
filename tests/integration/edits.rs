//! Duration-changing and in-place edits through the project.

use crate::helpers::*;
use longplay::prelude::*;
use longplay::{Namespace, StoreKey};

#[tokio::test]
async fn test_replace_middle_with_shorter_track() {
    let mut project = test_project(8);
    let id = import(&mut project, ramp(0..20)).await;
    let patch = import(&mut project, vec![100, 101, 102]).await;

    project.replace(id, 5, 10, Some(patch)).await.unwrap();

    let track = project.track(id).unwrap();
    assert_eq!(track.duration(), 18);
    let data = samples(track).await;
    assert_eq!(&data[5..8], &[100, 101, 102]);
    assert_eq!(&data[..5], &ramp(0..5)[..]);
    assert_eq!(&data[8..], &ramp(10..20)[..]);

    // The patch track was absorbed
    assert!(project.track(patch).is_none());
    assert_eq!(project.len(), 1);
}

#[tokio::test]
async fn test_clip_reduces_duration_by_range() {
    for (a, b) in [(0u64, 4u64), (3, 17), (8, 16), (15, 20), (0, 20), (7, 7)] {
        let mut project = test_project(8);
        let id = import(&mut project, ramp(0..20)).await;

        project.clip(id, a, b).await.unwrap();

        let track = project.track(id).unwrap();
        assert_eq!(track.duration(), 20 - (b - a), "clip [{a}, {b})");
        let expected: Vec<i16> = ramp(0..20)
            .into_iter()
            .enumerate()
            .filter(|(i, _)| (*i as u64) < a || (*i as u64) >= b)
            .map(|(_, s)| s)
            .collect();
        assert_eq!(samples(track).await, expected);
        assert!(segment_lens(track).iter().all(|&len| len > 0));
    }
}

#[tokio::test]
async fn test_insert_increases_duration() {
    let mut project = test_project(8);
    let id = import(&mut project, ramp(0..20)).await;
    let inserted = import(&mut project, vec![-5; 11]).await;

    project.insert(id, 9, inserted).await.unwrap();

    let track = project.track(id).unwrap();
    assert_eq!(track.duration(), 31);
    let data = samples(track).await;
    assert_eq!(&data[..9], &ramp(0..9)[..]);
    assert_eq!(&data[9..20], &[-5; 11]);
    assert_eq!(&data[20..], &ramp(9..20)[..]);
}

#[tokio::test]
async fn test_clip_beyond_end_is_clamped() {
    let mut project = test_project(8);
    let id = import(&mut project, ramp(0..20)).await;

    project.clip(id, 12, 1_000).await.unwrap();

    let track = project.track(id).unwrap();
    assert_eq!(samples(track).await, ramp(0..12));
}

#[tokio::test]
async fn test_removed_segments_leave_no_keys() {
    let mut project = test_project(4);
    let id = import(&mut project, ramp(0..16)).await;

    project.clip(id, 0, 16).await.unwrap();

    let track = project.track(id).unwrap();
    assert_eq!(track.duration(), 0);
    assert_eq!(track.segment_count(), 0);

    let store = project.cache().store();
    for namespace in [Namespace::Segment, Namespace::SegmentData, Namespace::SegmentWaveform] {
        assert!(store.list(namespace).await.unwrap().is_empty());
    }
    assert!(store.contains(&StoreKey::track(id)).await.unwrap());
}

#[tokio::test]
async fn test_overwrite_preserves_duration() {
    let mut project = test_project(8);
    let id = import(&mut project, ramp(0..20)).await;
    let track = project.track(id).unwrap();

    track
        .overwrite(
            4,
            13,
            frames(vec![vec![0; 2], vec![0; 4], vec![0; 3]]),
            OverwriteOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(track.duration(), 20);
    let mut expected = ramp(0..20);
    expected[4..13].fill(0);
    assert_eq!(samples(track).await, expected);
    assert!(track.tree().iter().all(|s| s.entry().readers() == 0));
}

#[tokio::test]
async fn test_filter_range_scales_only_range() {
    let mut project = test_project(8);
    let id = import(&mut project, ramp(0..20)).await;
    let track = project.track(id).unwrap();

    track
        .apply_filter_range(6, 10, &FilterGraph::Gain(0.0))
        .await
        .unwrap();

    let mut expected = ramp(0..20);
    expected[6..10].fill(0);
    assert_eq!(samples(track).await, expected);
}

#[tokio::test]
async fn test_edits_compose() {
    let mut project = test_project(5);
    let id = import(&mut project, ramp(0..30)).await;

    project.clip(id, 10, 20).await.unwrap();
    let head = project.extract(id, 0, 5, "head").await.unwrap();
    project.insert(id, 20, head).await.unwrap();

    let track = project.track(id).unwrap();
    let mut expected = ramp(0..10);
    expected.extend(ramp(20..30));
    expected.extend(ramp(0..5));
    assert_eq!(track.duration(), 25);
    assert_eq!(samples(track).await, expected);
}
