//! Streaming ingestion.

use super::Track;
use crate::cache::RawBuffer;
use crate::segment::{NodeIndex, Segment};
use longplay_codec::FilterGraph;
use longplay_core::{FrameStream, Result, SegmentId, StreamAdapter};
use tracing::debug;

/// The segment currently being filled.
#[derive(Clone)]
struct OpenSegment {
    index: NodeIndex,
    buffer: RawBuffer,
    capacity: usize,
}

impl Track {
    /// Append every frame of `input` to the end of the track.
    ///
    /// Input is converted to the track's spec first. The last segment is
    /// topped up before new segments are created; each segment is closed
    /// (and flushed) as soon as it is full. Once the input is exhausted the
    /// tree is rebalanced and the track persisted.
    ///
    /// On error the segment being filled is closed and the track record
    /// persisted, so everything copied so far stays durable and loadable,
    /// and the error is returned.
    pub async fn append(&mut self, input: FrameStream<'_>) -> Result<()> {
        let converted = self.filter.apply(input, &FilterGraph::Convert(self.spec))?;
        let mut input = StreamAdapter::new(converted);
        let before = self.duration();

        let mut open = None;
        let filled = self.fill(&mut input, &mut open).await;
        let closed = match open {
            Some(segment) => self.close_filled(segment).await,
            None => Ok(()),
        };

        // Record whatever was flushed, even when the input failed
        self.tree.rebuild();
        let persisted = self.persist().await;
        filled.and(closed).and(persisted)?;

        debug!(
            track = %self.id,
            appended = self.duration() - before,
            segments = self.tree.segment_count(),
            "append finished"
        );
        Ok(())
    }

    async fn fill(&mut self, input: &mut StreamAdapter<'_>, open: &mut Option<OpenSegment>) -> Result<()> {
        while let Some(mut frame) = input.next().await? {
            if frame.is_empty() {
                continue;
            }

            let segment = match open.clone() {
                Some(segment) => segment,
                None => {
                    let segment = self.open_tail().await?;
                    *open = Some(segment.clone());
                    segment
                }
            };

            let used = self.tree[segment.index].len;
            let take = segment.capacity.saturating_sub(used).min(frame.len());
            let rest = frame.split_off(take);
            segment.buffer.write().copy_from(used, &frame.data, 0..take)?;
            self.tree[segment.index].len += take;

            if !rest.is_empty() {
                input.push_back(rest);
                if let Some(full) = open.take() {
                    self.close_filled(full).await?;
                }
            }
        }
        Ok(())
    }

    /// Reopen the last segment if it has room, otherwise start a new one.
    async fn open_tail(&mut self) -> Result<OpenSegment> {
        let capacity = self.cache.config().segment_capacity(&self.spec);

        if let Some(last) = self.tree.last() {
            let segment = &self.tree[last];
            if segment.len < capacity {
                let buffer = self.cache.open_raw(segment, &self.spec).await?;
                {
                    let mut raw = buffer.write();
                    if raw.len() < capacity {
                        raw.resize(capacity);
                    }
                }
                return Ok(OpenSegment {
                    index: last,
                    buffer,
                    capacity,
                });
            }
        }

        let segment = Segment::new(SegmentId::new());
        let buffer = self.cache.init_raw(&segment, &self.spec);
        let index = self.tree.push_back(segment);
        Ok(OpenSegment {
            index,
            buffer,
            capacity,
        })
    }

    async fn close_filled(&self, segment: OpenSegment) -> Result<()> {
        self.cache
            .close_raw(&self.tree[segment.index], &self.spec, true)
            .await
    }
}
