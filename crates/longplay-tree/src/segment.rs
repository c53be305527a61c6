//! Tree nodes.

use crate::cache::CacheEntry;
use longplay_core::SegmentId;
use std::sync::Arc;

/// Handle to a slot in a [`SampleTree`](crate::SampleTree) arena.
///
/// Handles are invalidated by [`SampleTree::flatten`](crate::SampleTree::flatten);
/// use the segment id to find a segment again after a topology change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeIndex(pub(crate) usize);

/// A run of a track's samples and its place in the tree.
#[derive(Debug)]
pub struct Segment {
    pub id: SegmentId,
    /// Total sample count of the left subtree.
    pub pos: u64,
    /// Valid samples held by this segment.
    pub len: usize,
    pub(crate) parent: Option<NodeIndex>,
    pub(crate) left: Option<NodeIndex>,
    pub(crate) right: Option<NodeIndex>,
    pub(crate) entry: Arc<CacheEntry>,
}

impl Segment {
    /// Fresh, detached, empty segment.
    pub fn new(id: SegmentId) -> Self {
        Self::with_len(id, 0)
    }

    /// Detached segment for persisted data of `len` samples.
    pub fn with_len(id: SegmentId, len: usize) -> Self {
        Self {
            id,
            pos: 0,
            len,
            parent: None,
            left: None,
            right: None,
            entry: Arc::new(CacheEntry::default()),
        }
    }

    pub fn parent(&self) -> Option<NodeIndex> {
        self.parent
    }

    pub fn left(&self) -> Option<NodeIndex> {
        self.left
    }

    pub fn right(&self) -> Option<NodeIndex> {
        self.right
    }

    /// Cache state of this segment's raw buffer.
    pub fn entry(&self) -> &CacheEntry {
        &self.entry
    }

    pub(crate) fn detach(&mut self) {
        self.pos = 0;
        self.parent = None;
        self.left = None;
        self.right = None;
    }
}
