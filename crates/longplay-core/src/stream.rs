//! Pull-based frame sequences with push back.
//!
//! [`StreamAdapter`] decouples producers (codec output, track reads) from
//! consumers (track append, overwrite). A consumer that takes only part of a
//! frame hands the remainder back with [`StreamAdapter::push_back`] so the
//! next pull resumes at the exact boundary.

use crate::error::Result;
use crate::frame::Frame;
use futures::stream::{self, BoxStream, Stream, StreamExt};

/// Boxed lazy sequence of frames.
pub type FrameStream<'a> = BoxStream<'a, Result<Frame>>;

/// A frame stream supporting push back and cancellation.
pub struct StreamAdapter<'a> {
    inner: Option<FrameStream<'a>>,
    pushed: Vec<Frame>,
}

impl<'a> StreamAdapter<'a> {
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<Frame>> + Send + 'a,
    {
        Self {
            inner: Some(stream.boxed()),
            pushed: Vec::new(),
        }
    }

    /// Adapter over an in-memory list of frames.
    pub fn from_frames(frames: Vec<Frame>) -> Self {
        Self::new(stream::iter(frames.into_iter().map(Ok)))
    }

    pub fn empty() -> Self {
        Self {
            inner: None,
            pushed: Vec::new(),
        }
    }

    /// Next frame: pushed-back frames first, then upstream.
    ///
    /// `Ok(None)` once the upstream is exhausted or cancelled.
    pub async fn next(&mut self) -> Result<Option<Frame>> {
        if let Some(frame) = self.pushed.pop() {
            return Ok(Some(frame));
        }
        let Some(inner) = self.inner.as_mut() else {
            return Ok(None);
        };
        match inner.next().await {
            Some(item) => item.map(Some),
            None => {
                self.inner = None;
                Ok(None)
            }
        }
    }

    /// Return an unconsumed or partially consumed frame; it is yielded next.
    pub fn push_back(&mut self, frame: Frame) {
        if !frame.is_empty() {
            self.pushed.push(frame);
        }
    }

    /// Drop the upstream and any pushed-back frames.
    ///
    /// Frames already handed out are the caller's responsibility; in
    /// particular, segments a keep-open read left open must still be closed.
    pub fn cancel(&mut self) {
        self.inner = None;
        self.pushed.clear();
    }

    /// True once nothing more can be yielded.
    pub fn is_finished(&self) -> bool {
        self.inner.is_none() && self.pushed.is_empty()
    }

    /// Drain every remaining frame.
    pub async fn collect(mut self) -> Result<Vec<Frame>> {
        let mut frames = Vec::new();
        while let Some(frame) = self.next().await? {
            frames.push(frame);
        }
        Ok(frames)
    }

    /// Convert back into a plain stream, pushed-back frames first.
    pub fn into_stream(self) -> FrameStream<'a> {
        let pushed = stream::iter(self.pushed.into_iter().rev().map(Ok));
        match self.inner {
            Some(inner) => pushed.chain(inner).boxed(),
            None => pushed.boxed(),
        }
    }
}

impl std::fmt::Debug for StreamAdapter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamAdapter")
            .field("upstream", &self.inner.is_some())
            .field("pushed", &self.pushed.len())
            .finish()
    }
}
