//! Lazy range reads.

use super::Track;
use crate::segment::NodeIndex;
use futures::stream::{self, StreamExt};
use longplay_core::{Error, Frame, FrameOrigin, FrameStream, Result, SampleBuffer};

/// Options for [`Track::stream`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadOptions {
    /// Leave each segment open after copying its frame out.
    ///
    /// The consumer must close every segment it received a frame from,
    /// including after cancelling the stream early.
    pub keep_open: bool,
}

struct ReadState<'a> {
    track: &'a Track,
    next: Option<(NodeIndex, usize)>,
    remaining: u64,
    keep_open: bool,
}

impl Track {
    /// Frames covering samples `[start, end)`, one per segment touched.
    ///
    /// Each frame is a copy tagged with its segment and offset. The range is
    /// clamped to the end of the data; a start beyond the end yields nothing.
    pub fn stream(&self, start: u64, end: u64, options: ReadOptions) -> FrameStream<'_> {
        if end < start {
            let invalid = Error::InvalidRange { start, end };
            return stream::once(async move { Err::<Frame, _>(invalid) }).boxed();
        }

        let state = ReadState {
            track: self,
            next: self.tree.find(start),
            remaining: end - start,
            keep_open: options.keep_open,
        };

        stream::try_unfold(state, |mut state| async move {
            next_frame(&mut state)
                .await
                .map(|frame| frame.map(|frame| (frame, state)))
        })
        .boxed()
    }

    /// [`stream`](Self::stream) with the range given in seconds.
    pub fn stream_seconds(&self, start: f64, end: f64, options: ReadOptions) -> FrameStream<'_> {
        self.stream(
            self.spec.seconds_to_samples(start),
            self.spec.seconds_to_samples(end),
            options,
        )
    }

    /// Collect `[start, end)` into one contiguous buffer.
    pub async fn read_all(&self, start: u64, end: u64) -> Result<SampleBuffer> {
        let mut frames = self.stream(start, end, ReadOptions::default());
        let mut out = SampleBuffer::new(self.spec.format);
        while let Some(frame) = frames.next().await {
            out.extend_from(&frame?.data)?;
        }
        Ok(out)
    }
}

async fn next_frame(state: &mut ReadState<'_>) -> Result<Option<Frame>> {
    let track = state.track;

    while state.remaining > 0 {
        let Some((index, offset)) = state.next else {
            break;
        };
        state.next = track.tree.successor(index).map(|next| (next, 0));

        let segment = &track.tree[index];
        let available = segment.len.saturating_sub(offset);
        if available == 0 {
            continue;
        }
        let take = (available as u64).min(state.remaining) as usize;

        let buffer = track.cache.open_raw(segment, &track.spec).await?;
        let data = buffer.read().slice(offset..offset + take);
        if !state.keep_open || data.is_err() {
            track.cache.close_raw(segment, &track.spec, false).await?;
        }
        let data = data?;

        state.remaining -= take as u64;
        return Ok(Some(
            Frame::interleaved(track.spec, data).with_origin(FrameOrigin {
                segment: segment.id,
                offset,
            }),
        ));
    }

    Ok(None)
}
