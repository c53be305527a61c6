//! Order-statistics tree of segments keyed by cumulative sample offset.
//!
//! Segments live in an arena and link to each other by [`NodeIndex`]. Every
//! node stores `pos`, the sample count of its left subtree, so locating an
//! absolute offset is a single descent from the root:
//!
//! ```text
//!                 [pos=8 len=8]
//!                /             \
//!     [pos=0 len=8]           [pos=0 len=4]
//!      samples 0..8   8..16    samples 16..20
//! ```
//!
//! The tree is balanced by segment count, not by duration. Topology changes
//! go through [`SampleTree::flatten`] and [`SampleTree::rebalance`].

use crate::segment::{NodeIndex, Segment};
use longplay_core::SegmentId;
use std::collections::HashMap;
use std::ops::{Index, IndexMut};

/// Arena-backed segment tree.
#[derive(Debug, Default)]
pub struct SampleTree {
    nodes: Vec<Option<Segment>>,
    root: Option<NodeIndex>,
    by_id: HashMap<SegmentId, NodeIndex>,
}

impl SampleTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Balanced tree over `segments`, kept in the given order.
    pub fn from_segments(segments: Vec<Segment>) -> Self {
        let mut tree = Self::new();
        tree.rebalance(segments);
        tree
    }

    pub fn root(&self) -> Option<NodeIndex> {
        self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of segments.
    pub fn segment_count(&self) -> usize {
        self.by_id.len()
    }

    pub fn get(&self, index: NodeIndex) -> Option<&Segment> {
        self.nodes.get(index.0).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, index: NodeIndex) -> Option<&mut Segment> {
        self.nodes.get_mut(index.0).and_then(Option::as_mut)
    }

    pub fn index_of(&self, id: SegmentId) -> Option<NodeIndex> {
        self.by_id.get(&id).copied()
    }

    /// Locate absolute sample `target`.
    ///
    /// Returns the owning segment and the offset within it, or `None` when
    /// `target` lies at or beyond the end of the data.
    pub fn find(&self, target: u64) -> Option<(NodeIndex, usize)> {
        let mut running = 0u64;
        let mut current = self.root;

        while let Some(index) = current {
            let node = &self[index];
            let absolute = running + node.pos;
            if target < absolute {
                current = node.left;
            } else if target < absolute + node.len as u64 {
                return Some((index, (target - absolute) as usize));
            } else {
                running = absolute + node.len as u64;
                current = node.right;
            }
        }

        None
    }

    /// In-order successor, walking parent links. `None` at the end of the tree.
    pub fn successor(&self, index: NodeIndex) -> Option<NodeIndex> {
        if let Some(right) = self[index].right {
            return Some(self.leftmost(right));
        }

        let mut child = index;
        let mut parent = self[index].parent;
        while let Some(p) = parent {
            if self[p].left == Some(child) {
                return Some(p);
            }
            child = p;
            parent = self[p].parent;
        }
        None
    }

    /// First segment in sample order.
    pub fn first(&self) -> Option<NodeIndex> {
        self.root.map(|root| self.leftmost(root))
    }

    /// Last segment in sample order.
    pub fn last(&self) -> Option<NodeIndex> {
        let mut current = self.root?;
        while let Some(right) = self[current].right {
            current = right;
        }
        Some(current)
    }

    fn leftmost(&self, mut index: NodeIndex) -> NodeIndex {
        while let Some(left) = self[index].left {
            index = left;
        }
        index
    }

    /// Segments in sample order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            tree: self,
            next: self.first(),
        }
    }

    /// Samples held by the subtree rooted at `index`.
    pub fn subtree_duration(&self, index: NodeIndex) -> u64 {
        let mut total = 0;
        let mut current = Some(index);
        while let Some(i) = current {
            let node = &self[i];
            total += node.pos + node.len as u64;
            current = node.right;
        }
        total
    }

    /// Total samples in the tree.
    pub fn duration(&self) -> u64 {
        self.root.map_or(0, |root| self.subtree_duration(root))
    }

    /// Longest root-to-leaf path, counted in nodes.
    pub fn height(&self) -> usize {
        fn walk(tree: &SampleTree, index: Option<NodeIndex>) -> usize {
            match index {
                Some(i) => 1 + walk(tree, tree[i].left).max(walk(tree, tree[i].right)),
                None => 0,
            }
        }
        walk(self, self.root)
    }

    /// Attach `segment` as the new rightmost node.
    ///
    /// No `pos` changes: the rightmost path only has right edges.
    pub fn push_back(&mut self, mut segment: Segment) -> NodeIndex {
        let last = self.last();
        segment.detach();
        segment.parent = last;
        let index = self.alloc(segment);
        match last {
            Some(last) => self[last].right = Some(index),
            None => self.root = Some(index),
        }
        index
    }

    /// Move every segment out in sample order, leaving the tree empty.
    pub fn flatten(&mut self) -> Vec<Segment> {
        let order: Vec<NodeIndex> = {
            let mut order = Vec::with_capacity(self.segment_count());
            let mut next = self.first();
            while let Some(index) = next {
                order.push(index);
                next = self.successor(index);
            }
            order
        };

        let mut nodes = std::mem::take(&mut self.nodes);
        self.root = None;
        self.by_id.clear();

        order
            .into_iter()
            .filter_map(|index| nodes.get_mut(index.0).and_then(Option::take))
            .map(|mut segment| {
                segment.detach();
                segment
            })
            .collect()
    }

    /// Replace the tree with a balanced one over `segments`, kept in order.
    ///
    /// The middle segment becomes the root; each half is built the same way.
    pub fn rebalance(&mut self, segments: Vec<Segment>) -> Option<NodeIndex> {
        self.nodes.clear();
        self.by_id.clear();

        let slots: Vec<NodeIndex> = segments
            .into_iter()
            .map(|mut segment| {
                segment.detach();
                self.alloc(segment)
            })
            .collect();

        self.root = self.build(&slots, None);
        self.root
    }

    /// Flatten and rebalance in place.
    pub fn rebuild(&mut self) {
        let segments = self.flatten();
        self.rebalance(segments);
    }

    fn build(&mut self, slots: &[NodeIndex], parent: Option<NodeIndex>) -> Option<NodeIndex> {
        if slots.is_empty() {
            return None;
        }
        let mid = slots.len() / 2;
        let index = slots[mid];

        let left = self.build(&slots[..mid], Some(index));
        let pos = left.map_or(0, |l| self.subtree_duration(l));
        let right = self.build(&slots[mid + 1..], Some(index));

        let node = &mut self[index];
        node.parent = parent;
        node.left = left;
        node.right = right;
        node.pos = pos;
        Some(index)
    }

    fn alloc(&mut self, segment: Segment) -> NodeIndex {
        let id = segment.id;
        self.nodes.push(Some(segment));
        let index = NodeIndex(self.nodes.len() - 1);
        self.by_id.insert(id, index);
        index
    }
}

impl Index<NodeIndex> for SampleTree {
    type Output = Segment;

    fn index(&self, index: NodeIndex) -> &Segment {
        match self.get(index) {
            Some(segment) => segment,
            None => panic!("stale node index {}", index.0),
        }
    }
}

impl IndexMut<NodeIndex> for SampleTree {
    fn index_mut(&mut self, index: NodeIndex) -> &mut Segment {
        match self.get_mut(index) {
            Some(segment) => segment,
            None => panic!("stale node index {}", index.0),
        }
    }
}

/// In-order iterator over a [`SampleTree`].
pub struct Iter<'a> {
    tree: &'a SampleTree,
    next: Option<NodeIndex>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Segment;

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        let index = self.next?;
        self.next = tree.successor(index);
        Some(&tree[index])
    }
}

impl<'a> IntoIterator for &'a SampleTree {
    type Item = &'a Segment;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
