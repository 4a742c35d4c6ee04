// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use crate::types::aabb::Aabb;

/// Maximum number of children per node.
pub const MAX_ENTRIES: usize = 4;

/// Minimum number of children per non-root node once an insertion completes.
pub const MIN_ENTRIES: usize = 2;

/// A bounding box paired with an opaque payload (typically an entity handle).
///
/// The tree never interprets `payload`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LeafEntry {
    /// Bounds of the payload.
    pub aabb: Aabb,
    /// Opaque handle supplied by the caller.
    pub payload: u32,
}

impl LeafEntry {
    /// Sentinel stored in unused leaf slots.
    pub const EMPTY: Self = Self {
        aabb: Aabb::EMPTY,
        payload: u32::MAX,
    };

    /// Creates a leaf entry.
    pub const fn new(aabb: Aabb, payload: u32) -> Self {
        Self { aabb, payload }
    }
}

/// Interior node: bounds plus a block of `MAX_ENTRIES` child slots.
///
/// Children live at `entries_start..entries_start + MAX_ENTRIES` in the buffer
/// of the level below (the leaf buffer for height-0 nodes, the node buffer
/// otherwise); the first `entries_count` slots are populated and the rest hold
/// sentinels. Indices are local to the owning subtree's region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TreeNode {
    /// Union of all descendant boxes.
    pub aabb: Aabb,
    /// Start of the child block, or [`TreeNode::NO_ENTRIES`].
    pub entries_start: usize,
    /// Number of populated child slots.
    pub entries_count: usize,
}

impl TreeNode {
    /// Marker for a node that owns no child block.
    pub const NO_ENTRIES: usize = usize::MAX;

    /// Sentinel stored in unused node slots.
    pub const EMPTY: Self = Self {
        aabb: Aabb::EMPTY,
        entries_start: Self::NO_ENTRIES,
        entries_count: 0,
    };

    /// Child slot range of this node's block.
    pub(crate) fn block(&self) -> core::ops::Range<usize> {
        self.entries_start..self.entries_start + MAX_ENTRIES
    }

    /// Populated child range.
    pub(crate) fn populated(&self) -> core::ops::Range<usize> {
        self.entries_start..self.entries_start + self.entries_count
    }
}

/// Anything that can sit in a child slot of a block.
///
/// The split and fill routines are written once against this trait; the
/// sentinel for unused slots is passed in explicitly.
pub(crate) trait Slot: Copy {
    fn bounds(&self) -> Aabb;
}

impl Slot for LeafEntry {
    fn bounds(&self) -> Aabb {
        self.aabb
    }
}

impl Slot for TreeNode {
    fn bounds(&self) -> Aabb {
        self.aabb
    }
}
