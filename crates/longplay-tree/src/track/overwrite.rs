//! In-place ranged writes.

use super::{ReadOptions, Track};
use longplay_codec::FilterGraph;
use longplay_core::{Error, Frame, FrameStream, Result, SegmentId, StreamAdapter};
use tracing::{debug, warn};

/// Options for [`Track::overwrite`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverwriteOptions {
    /// Close every target segment a second time, unmodified.
    ///
    /// For callers whose new data comes from a keep-open read of the same
    /// range: that read must stay ahead of the write position.
    pub close_twice: bool,
}

/// The target segment yielded by the keep-open read and not yet released.
#[derive(Debug, Clone, Copy)]
struct Held {
    segment: SegmentId,
    /// Some of its samples were written
    written: bool,
    /// New data was pulled while it was held
    paired: bool,
}

impl Track {
    /// Write `new_data` over `[start, end)` without changing the duration.
    ///
    /// The target range is read with segments kept open and paired frame by
    /// frame with the new data, splitting whichever side is longer. A segment
    /// is closed as modified once its part of the range is written. When the
    /// new data runs out, remaining target segments are closed unmodified;
    /// surplus new data is drained and dropped.
    ///
    /// On error the held target segment is released, flushing whatever was
    /// written into it, and the rest of the target read is cancelled before
    /// it opens anything else.
    pub async fn overwrite(
        &self,
        start: u64,
        end: u64,
        new_data: FrameStream<'_>,
        options: OverwriteOptions,
    ) -> Result<()> {
        let converted = self.filter.apply(new_data, &FilterGraph::Convert(self.spec))?;
        let mut source = StreamAdapter::new(converted);
        let mut target = StreamAdapter::new(self.stream(start, end, ReadOptions { keep_open: true }));

        let mut held = None;
        match self.pair_frames(&mut target, &mut source, &mut held, options).await {
            Ok(written) => {
                debug!(track = %self.id, start, end, written, "overwrite finished");
                Ok(())
            }
            Err(e) => {
                target.cancel();
                if let Some(held) = held {
                    // Only a paired segment was opened by the caller's read as well
                    let options = OverwriteOptions {
                        close_twice: options.close_twice && held.paired,
                    };
                    if let Err(close) = self.release(held.segment, held.written, options).await {
                        warn!(
                            track = %self.id,
                            segment = %held.segment,
                            error = %close,
                            "release after failed overwrite"
                        );
                    }
                }
                Err(e)
            }
        }
    }

    async fn pair_frames(
        &self,
        target: &mut StreamAdapter<'_>,
        source: &mut StreamAdapter<'_>,
        held: &mut Option<Held>,
        options: OverwriteOptions,
    ) -> Result<u64> {
        let mut written = 0u64;

        loop {
            let Some(mut slot) = target.next().await? else {
                while source.next().await?.is_some() {}
                return Ok(written);
            };
            // A pushed-back remainder belongs to the segment already held
            if held.is_none() {
                *held = Some(Held {
                    segment: slot_segment(&slot)?,
                    written: false,
                    paired: false,
                });
            }

            let Some(mut data) = source.next().await? else {
                if let Some(current) = held.take() {
                    self.release(current.segment, current.written, options).await?;
                }
                while let Some(slot) = target.next().await? {
                    self.release(slot_segment(&slot)?, false, options).await?;
                }
                return Ok(written);
            };

            let n = slot.len().min(data.len());
            source.push_back(data.split_off(n));
            let rest = slot.split_off(n);
            if let Some(current) = held.as_mut() {
                current.paired = true;
            }

            self.write_slot(&slot, &data)?;
            written += n as u64;
            if let Some(current) = held.as_mut() {
                current.written |= n > 0;
            }

            if rest.is_empty() {
                if let Some(current) = held.take() {
                    self.release(current.segment, true, options).await?;
                }
            } else {
                target.push_back(rest);
            }
        }
    }

    fn write_slot(&self, slot: &Frame, data: &Frame) -> Result<()> {
        let id = slot_segment(slot)?;
        let offset = slot.origin.map_or(0, |origin| origin.offset);
        let segment = self
            .tree
            .index_of(id)
            .map(|index| &self.tree[index])
            .ok_or(Error::SegmentNotFound(id))?;
        let buffer = segment.entry().buffer().ok_or(Error::SegmentNotOpen(id))?;

        let mut raw = buffer.write();
        raw.copy_from(offset, &data.data, 0..data.len())
    }

    /// Close a target segment once, or twice with `close_twice`. Both closes
    /// are attempted; the first error wins.
    async fn release(&self, id: SegmentId, modified: bool, options: OverwriteOptions) -> Result<()> {
        let index = self.tree.index_of(id).ok_or(Error::SegmentNotFound(id))?;
        let segment = &self.tree[index];

        let first = self.cache.close_raw(segment, &self.spec, modified).await;
        let second = if options.close_twice {
            self.cache.close_raw(segment, &self.spec, false).await
        } else {
            Ok(())
        };
        first.and(second)
    }
}

/// Frames from a track read always carry their origin.
fn slot_segment(slot: &Frame) -> Result<SegmentId> {
    slot.origin
        .map(|origin| origin.segment)
        .ok_or(Error::InvalidRange {
            start: 0,
            end: slot.len() as u64,
        })
}
