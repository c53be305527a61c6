//! Splice edits: clip, insert, replace.

use super::Track;
use crate::segment::Segment;
use longplay_core::{Error, Result, SegmentId};
use longplay_store::StoreKey;
use tracing::debug;

impl Track {
    /// Remove `[start, end)` and splice `replacement` in its place.
    ///
    /// `None` clips the range; an empty range inserts. The replacement's
    /// segments are moved into this track without copying sample data, and
    /// its track record is deleted. `end` is clamped to the track's duration.
    pub async fn replace(&mut self, start: u64, end: u64, replacement: Option<Track>) -> Result<()> {
        let duration = self.duration();
        let end = end.min(duration);
        if start > end {
            return Err(Error::InvalidRange { start, end });
        }
        if let Some(other) = &replacement {
            if other.spec != self.spec {
                return Err(Error::FormatMismatch {
                    expected: self.spec,
                    found: other.spec,
                });
            }
        }

        let split = self.tree.find(start).map(|(index, offset)| (self.tree[index].id, offset));
        let mut segments = self.tree.flatten();
        let spliced = self.splice_segments(&mut segments, split, end - start, replacement).await;

        let (kept, removed): (Vec<Segment>, Vec<Segment>) =
            segments.into_iter().partition(|segment| segment.len > 0);
        self.tree.rebalance(kept);
        spliced?;

        let store = self.cache.store();
        for segment in &removed {
            for key in StoreKey::all_for_segment(segment.id) {
                store.delete(&key).await?;
            }
        }
        self.persist().await?;

        debug!(
            track = %self.id,
            start,
            end,
            duration = self.duration(),
            segments = self.tree.segment_count(),
            removed = removed.len(),
            "replace finished"
        );
        Ok(())
    }

    /// Rewrite the flattened sequence in place. Removed segments are left
    /// behind with `len == 0` for the caller to filter out.
    async fn splice_segments(
        &self,
        segments: &mut Vec<Segment>,
        split: Option<(SegmentId, usize)>,
        count: u64,
        replacement: Option<Track>,
    ) -> Result<()> {
        // Index of the first segment at or after `start`
        let mut at = match split {
            Some((id, offset)) => {
                let index = segments
                    .iter()
                    .position(|segment| segment.id == id)
                    .ok_or(Error::SegmentNotFound(id))?;
                if offset > 0 {
                    let tail = self.split_segment(&mut segments[index], offset).await?;
                    segments.insert(index + 1, tail);
                    index + 1
                } else {
                    index
                }
            }
            None => segments.len(),
        };
        let insert_at = at;

        let mut remaining = count;
        while remaining > 0 && at < segments.len() {
            let len = segments[at].len as u64;
            if len <= remaining {
                remaining -= len;
                segments[at].len = 0;
            } else {
                self.drop_head(&mut segments[at], remaining as usize).await?;
                remaining = 0;
            }
            at += 1;
        }

        if let Some(mut other) = replacement {
            let adopted = other.tree.flatten();
            self.cache
                .store()
                .delete(&StoreKey::track(other.id))
                .await?;
            debug!(track = %self.id, from = %other.id, segments = adopted.len(), "adopting segments");
            let tail = segments.split_off(insert_at);
            segments.extend(adopted);
            segments.extend(tail);
        }
        Ok(())
    }

    /// Cut `segment` at `offset`, returning a new segment holding the tail.
    async fn split_segment(&self, segment: &mut Segment, offset: usize) -> Result<Segment> {
        let buffer = self.cache.open_raw(segment, &self.spec).await?;
        let tail_data = buffer.read().slice(offset..segment.len);
        let tail_data = match tail_data {
            Ok(data) => data,
            Err(e) => {
                self.cache.close_raw(segment, &self.spec, false).await?;
                return Err(e);
            }
        };

        let tail = Segment::with_len(SegmentId::new(), tail_data.len());
        let tail_buffer = self.cache.init_raw(&tail, &self.spec);
        let copied = tail_buffer
            .write()
            .copy_from(0, &tail_data, 0..tail_data.len());

        segment.len = offset;
        self.cache.close_raw(segment, &self.spec, true).await?;
        self.cache.close_raw(&tail, &self.spec, true).await?;
        copied?;

        Ok(tail)
    }

    /// Discard the first `count` samples of `segment`.
    async fn drop_head(&self, segment: &mut Segment, count: usize) -> Result<()> {
        let buffer = self.cache.open_raw(segment, &self.spec).await?;
        let shifted = buffer.write().copy_within(count..segment.len, 0);
        if shifted.is_ok() {
            segment.len -= count;
        }
        self.cache
            .close_raw(segment, &self.spec, shifted.is_ok())
            .await?;
        shifted
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use longplay_codec::DspFilter;
    use longplay_core::{AudioSpec, SampleFormat};
    use longplay_store::KvStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_replace_middle_with_shorter_track() {
        let (store, cache) = cache_with_capacity(8);
        let mut track = filled(&cache, &ramp(0..20)).await;
        let replacement = filled(&cache, &[100, 101, 102]).await;
        let replacement_id = replacement.id();

        track.replace(5, 10, Some(replacement)).await.unwrap();

        assert_eq!(track.duration(), 18);
        let mut expected = ramp(0..5);
        expected.extend([100, 101, 102]);
        expected.extend(ramp(10..20));
        assert_eq!(samples(&track).await, expected);
        assert!(all_closed(&track));
        assert!(!store.contains(&StoreKey::track(replacement_id)).await.unwrap());
    }

    #[tokio::test]
    async fn test_clip_reduces_duration() {
        let (_store, cache) = cache_with_capacity(8);
        let mut track = filled(&cache, &ramp(0..20)).await;

        track.clip(3, 17).await.unwrap();

        assert_eq!(track.duration(), 6);
        assert_eq!(samples(&track).await, vec![0, 1, 2, 17, 18, 19]);
    }

    #[tokio::test]
    async fn test_clip_whole_segments_deletes_their_entries() {
        let (store, cache) = cache_with_capacity(8);
        let mut track = filled(&cache, &ramp(0..20)).await;
        let middle = track.tree().iter().nth(1).unwrap().id;

        track.clip(8, 16).await.unwrap();

        assert_eq!(lens(&track), vec![8, 4]);
        for key in StoreKey::all_for_segment(middle) {
            assert!(!store.contains(&key).await.unwrap());
        }
    }

    #[tokio::test]
    async fn test_insert_at_start_middle_and_end() {
        let (_store, cache) = cache_with_capacity(8);
        let mut track = filled(&cache, &ramp(0..10)).await;

        track.insert(0, filled(&cache, &[-1]).await).await.unwrap();
        track.insert(6, filled(&cache, &[-2, -2]).await).await.unwrap();
        let end = track.duration();
        track.insert(end, filled(&cache, &[-3]).await).await.unwrap();

        assert_eq!(track.duration(), 14);
        assert_eq!(
            samples(&track).await,
            vec![-1, 0, 1, 2, 3, 4, -2, -2, 5, 6, 7, 8, 9, -3]
        );
        assert!(all_closed(&track));
    }

    #[tokio::test]
    async fn test_reload_after_replace() {
        let (_store, cache) = cache_with_capacity(8);
        let mut track = filled(&cache, &ramp(0..20)).await;
        track.replace(5, 10, Some(filled(&cache, &[7, 7, 7]).await)).await.unwrap();

        let loaded = Track::load(track.id(), cache.clone(), Arc::new(DspFilter::default()))
            .await
            .unwrap();
        assert_eq!(samples(&loaded).await, samples(&track).await);
    }

    #[tokio::test]
    async fn test_format_mismatch_rejected() {
        let (_store, cache) = cache_with_capacity(8);
        let mut track = filled(&cache, &ramp(0..10)).await;
        let stereo = Track::create(
            "stereo",
            AudioSpec::new(SampleFormat::S16, 1, 2),
            cache.clone(),
            Arc::new(DspFilter::default()),
        );

        let err = track.insert(0, stereo).await.unwrap_err();
        assert!(matches!(err, Error::FormatMismatch { .. }));
        assert_eq!(track.duration(), 10);
    }

    #[tokio::test]
    async fn test_start_beyond_end_rejected() {
        let (_store, cache) = cache_with_capacity(8);
        let mut track = filled(&cache, &ramp(0..10)).await;
        let err = track.clip(12, 15).await.unwrap_err();
        assert!(matches!(err, Error::InvalidRange { .. }));
        assert_eq!(samples(&track).await, ramp(0..10));
    }
}
