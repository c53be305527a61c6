//! Reopening tracks from a directory store.

use crate::helpers::*;
use longplay::prelude::*;
use longplay::{Namespace, StoreKey};
use tempfile::TempDir;

async fn dir_project(dir: &TempDir, capacity: usize) -> Project {
    init_tracing();
    let store = DirStore::open(dir.path()).await.unwrap();
    Project::builder()
        .store(Arc::new(store))
        .segment_capacity(capacity)
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_reopen_after_edits() {
    let dir = TempDir::new().unwrap();

    let (id, expected) = {
        let mut project = dir_project(&dir, 8).await;
        let id = import(&mut project, ramp(0..40)).await;
        let patch = import(&mut project, vec![9, 9, 9]).await;
        project.replace(id, 10, 20, Some(patch)).await.unwrap();
        project.clip(id, 0, 2).await.unwrap();

        let track = project.track(id).unwrap();
        (id, samples(track).await)
    };

    let mut reopened = dir_project(&dir, 8).await;
    assert_eq!(reopened.stored_tracks().await.unwrap(), vec![id]);

    reopened.open_track(id).await.unwrap();
    let track = reopened.track(id).unwrap();
    assert_eq!(track.duration(), 31);
    assert_eq!(samples(track).await, expected);
}

#[tokio::test]
async fn test_name_and_spec_survive() {
    let dir = TempDir::new().unwrap();
    let spec = AudioSpec::new(SampleFormat::S16, 8_000, 2);

    let id = {
        let mut project = dir_project(&dir, 64).await;
        let id = project
            .import("Interview", spec, frames_in(spec, vec![vec![1, 2, 3, 4]]))
            .await
            .unwrap();
        let track = project.track_mut(id).unwrap();
        track.set_name("Interview (edited)");
        track.persist().await.unwrap();
        id
    };

    let mut reopened = dir_project(&dir, 64).await;
    reopened.open_track(id).await.unwrap();
    let track = reopened.track(id).unwrap();
    assert_eq!(track.name(), "Interview (edited)");
    assert_eq!(track.spec(), &spec);
    assert_eq!(samples(track).await, vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn test_waveform_written_per_segment() {
    let dir = TempDir::new().unwrap();
    let mut project = dir_project(&dir, 8).await;
    let id = import(&mut project, ramp(0..20)).await;

    let store = project.cache().store();
    for segment in project.track(id).unwrap().tree().iter() {
        let png = store
            .get(&StoreKey::segment_waveform(segment.id))
            .await
            .unwrap()
            .expect("waveform missing");
        assert_eq!(&png[1..4], b"PNG");
    }
    assert_eq!(store.list(Namespace::SegmentWaveform).await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_open_unknown_track_fails() {
    let dir = TempDir::new().unwrap();
    let mut project = dir_project(&dir, 8).await;

    let err = project.open_track(TrackId::new()).await.unwrap_err();
    assert!(matches!(
        err.core(),
        Some(longplay::core::Error::TrackNotFound(_))
    ));
}

#[tokio::test]
async fn test_missing_segment_data_reported() {
    let dir = TempDir::new().unwrap();
    let mut project = dir_project(&dir, 8).await;
    let id = import(&mut project, ramp(0..20)).await;

    let victim = project.track(id).unwrap().tree().iter().nth(1).unwrap().id;
    project
        .cache()
        .store()
        .delete(&StoreKey::segment_data(victim))
        .await
        .unwrap();

    let track = project.track(id).unwrap();
    let err = track.read_all(0, 20).await.unwrap_err();
    assert!(matches!(err, longplay::core::Error::Load { .. }));
    assert!(track.tree().iter().all(|s| s.entry().readers() == 0));
}
