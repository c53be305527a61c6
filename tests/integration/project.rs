//! Catalog operations on a project.

use crate::helpers::*;
use futures::stream::{self, StreamExt};
use longplay::prelude::*;
use longplay::Namespace;

#[tokio::test]
async fn test_create_track_is_persisted_and_empty() {
    let mut project = test_project(8);
    let id = project.create_track("Empty", mono()).await.unwrap();

    assert_eq!(project.track_ids(), vec![id]);
    assert_eq!(project.track(id).unwrap().duration(), 0);
    assert_eq!(project.stored_tracks().await.unwrap(), vec![id]);
}

#[tokio::test]
async fn test_extract_copies_range() {
    let mut project = test_project(8);
    let id = import(&mut project, ramp(0..20)).await;

    let copy = project.extract(id, 6, 15, "excerpt").await.unwrap();

    assert_eq!(project.len(), 2);
    assert_eq!(samples(project.track(copy).unwrap()).await, ramp(6..15));
    assert_eq!(samples(project.track(id).unwrap()).await, ramp(0..20));
    assert_eq!(project.track(copy).unwrap().name(), "excerpt");
}

#[tokio::test]
async fn test_remove_track_empties_store() {
    let mut project = test_project(8);
    let id = import(&mut project, ramp(0..20)).await;

    project.remove_track(id).await.unwrap();

    assert!(project.is_empty());
    let store = project.cache().store();
    for namespace in Namespace::ALL {
        assert!(store.list(namespace).await.unwrap().is_empty(), "{namespace:?}");
    }
}

#[tokio::test]
async fn test_self_splice_rejected() {
    let mut project = test_project(8);
    let id = import(&mut project, ramp(0..10)).await;

    let err = project.insert(id, 3, id).await.unwrap_err();

    assert!(matches!(
        err.core(),
        Some(longplay::core::Error::InvalidConfig(_))
    ));
    assert_eq!(samples(project.track(id).unwrap()).await, ramp(0..10));
}

#[tokio::test]
async fn test_mismatched_replacement_stays_in_catalog() {
    let mut project = test_project(8);
    let id = import(&mut project, ramp(0..10)).await;
    let stereo = AudioSpec::new(SampleFormat::S16, 1, 2);
    let other = project.create_track("stereo", stereo).await.unwrap();

    let err = project.insert(id, 0, other).await.unwrap_err();

    assert!(matches!(
        err.core(),
        Some(longplay::core::Error::FormatMismatch { .. })
    ));
    assert!(project.track(other).is_some());
    assert_eq!(project.track(id).unwrap().duration(), 10);
}

#[tokio::test]
async fn test_out_of_range_replacement_stays_in_catalog() {
    let mut project = test_project(8);
    let id = import(&mut project, ramp(0..10)).await;
    let other = import(&mut project, vec![7, 8, 9]).await;

    let err = project.replace(id, 50, 60, Some(other)).await.unwrap_err();

    assert!(matches!(
        err.core(),
        Some(longplay::core::Error::InvalidRange { .. })
    ));
    assert_eq!(project.len(), 2);
    assert_eq!(samples(project.track(other).unwrap()).await, vec![7, 8, 9]);
    assert_eq!(samples(project.track(id).unwrap()).await, ramp(0..10));
    assert_eq!(project.stored_tracks().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_unknown_track_id() {
    let mut project = test_project(8);
    let err = project.clip(TrackId::new(), 0, 1).await.unwrap_err();
    assert!(matches!(
        err.core(),
        Some(longplay::core::Error::TrackNotFound(_))
    ));
}

#[tokio::test]
async fn test_failed_import_leaves_nothing_behind() {
    let mut project = test_project(8);
    let input = stream::iter(vec![
        Ok(Frame::interleaved(mono(), SampleBuffer::S16(ramp(0..12)))),
        Err(longplay::core::Error::InvalidRange { start: 1, end: 0 }),
    ])
    .boxed();

    assert!(project.import("broken", mono(), input).await.is_err());

    assert!(project.is_empty());
    let store = project.cache().store();
    for namespace in Namespace::ALL {
        assert!(store.list(namespace).await.unwrap().is_empty(), "{namespace:?}");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_filter_tracks_in_parallel() {
    let mut project = Project::builder()
        .segment_capacity(8)
        .filter_workers(2)
        .build()
        .unwrap();
    let mut ids = Vec::new();
    for _ in 0..3 {
        ids.push(import(&mut project, ramp(0..20)).await);
    }
    let untouched = import(&mut project, ramp(0..20)).await;

    // A duplicate id must not double the gain
    let mut targets = ids.clone();
    targets.push(ids[0]);
    project
        .filter_tracks(&targets, &FilterGraph::Gain(2.0))
        .await
        .unwrap();

    let doubled: Vec<i16> = ramp(0..20).into_iter().map(|s| s * 2).collect();
    for id in ids {
        let track = project.track(id).unwrap();
        assert_eq!(samples(track).await, doubled);
        assert_eq!(track.duration(), 20);
    }
    assert_eq!(samples(project.track(untouched).unwrap()).await, ramp(0..20));
}

#[tokio::test]
async fn test_open_track_is_idempotent() {
    let mut project = test_project(8);
    let id = import(&mut project, ramp(0..4)).await;

    project.open_track(id).await.unwrap();

    assert_eq!(project.len(), 1);
}
