// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Full structural check of a built tree.

use thiserror::Error;

use crate::types::aabb::Aabb;

use super::builder::Subtree;
use super::node::{LeafEntry, Slot, TreeNode, MAX_ENTRIES, MIN_ENTRIES};
use super::BoxTree;

/// First broken structural invariant found by [`BoxTree::check_invariants`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeViolation {
    /// A non-root node holds fewer than `MIN_ENTRIES` or more than
    /// `MAX_ENTRIES` children, or a root holds more than `MAX_ENTRIES`.
    #[error("subtree {subtree}: node at depth {depth} holds {count} entries")]
    EntryCount {
        /// Subtree index.
        subtree: usize,
        /// Depth of the offending node (0 = root).
        depth: u32,
        /// Populated child count.
        count: usize,
    },
    /// A populated node has no child block.
    #[error("subtree {subtree}: populated node at depth {depth} has no child block")]
    MissingBlock {
        /// Subtree index.
        subtree: usize,
        /// Depth of the offending node.
        depth: u32,
    },
    /// A child block extends past the subtree's region.
    #[error("subtree {subtree}: block at {start} exceeds region length {len}")]
    OutOfRegion {
        /// Subtree index.
        subtree: usize,
        /// Local block start.
        start: usize,
        /// Length of the region the block should live in.
        len: usize,
    },
    /// An unused slot does not hold the sentinel.
    #[error("subtree {subtree}: slot {slot} past the populated range is not a sentinel")]
    StaleSlot {
        /// Subtree index.
        subtree: usize,
        /// Local slot index.
        slot: usize,
    },
    /// A node box differs from the union of its children.
    #[error("subtree {subtree}: node at depth {depth} is not the tight union of its children")]
    LooseBounds {
        /// Subtree index.
        subtree: usize,
        /// Depth of the offending node.
        depth: u32,
    },
    /// The number of reachable leaf entries differs from the recorded count.
    #[error("subtree {subtree}: {found} reachable entries, {expected} recorded")]
    EntryTotal {
        /// Subtree index.
        subtree: usize,
        /// Recorded entry count.
        expected: usize,
        /// Entries reached by traversal.
        found: usize,
    },
}

struct Checker<'a> {
    index: usize,
    nodes: &'a [TreeNode],
    leaves: &'a [LeafEntry],
    reached: usize,
}

impl Checker<'_> {
    fn node(&mut self, node: &TreeNode, height: u32, depth: u32) -> Result<(), TreeViolation> {
        let subtree = self.index;
        let count = node.entries_count;
        let in_range = if depth == 0 {
            count <= MAX_ENTRIES
        } else {
            (MIN_ENTRIES..=MAX_ENTRIES).contains(&count)
        };
        if !in_range {
            return Err(TreeViolation::EntryCount {
                subtree,
                depth,
                count,
            });
        }
        if node.entries_start == TreeNode::NO_ENTRIES {
            return if count == 0 {
                Ok(())
            } else {
                Err(TreeViolation::MissingBlock { subtree, depth })
            };
        }

        let union = if height == 0 {
            let block = self.block(self.leaves, node, LeafEntry::EMPTY)?;
            self.reached += count;
            union_of(&block[..count])
        } else {
            let block = self.block(self.nodes, node, TreeNode::EMPTY)?;
            for child in &block[..count] {
                self.node(child, height - 1, depth + 1)?;
            }
            union_of(&block[..count])
        };
        if union != node.aabb {
            return Err(TreeViolation::LooseBounds { subtree, depth });
        }
        Ok(())
    }

    fn block<'b, T: Slot + PartialEq>(
        &self,
        buffer: &'b [T],
        node: &TreeNode,
        empty: T,
    ) -> Result<&'b [T], TreeViolation> {
        let Some(block) = buffer.get(node.block()) else {
            return Err(TreeViolation::OutOfRegion {
                subtree: self.index,
                start: node.entries_start,
                len: buffer.len(),
            });
        };
        if let Some(offset) = block[node.entries_count..].iter().position(|s| *s != empty) {
            return Err(TreeViolation::StaleSlot {
                subtree: self.index,
                slot: node.entries_start + node.entries_count + offset,
            });
        }
        Ok(block)
    }
}

fn union_of<T: Slot>(slots: &[T]) -> Aabb {
    slots
        .iter()
        .fold(Aabb::EMPTY, |acc, s| acc.conjugate(&s.bounds()))
}

impl BoxTree {
    /// Walks every subtree and reports the first broken invariant.
    ///
    /// Checks child counts, sentinel padding, block placement, tight node
    /// bounds and the reachable entry count.
    pub fn check_invariants(&self) -> Result<(), TreeViolation> {
        for (index, subtree) in self.subtrees.iter().enumerate() {
            self.check_subtree(index, subtree)?;
        }
        Ok(())
    }

    fn check_subtree(&self, index: usize, subtree: &Subtree) -> Result<(), TreeViolation> {
        let (nodes, leaves) = self.region(subtree);
        let mut checker = Checker {
            index,
            nodes,
            leaves,
            reached: 0,
        };
        checker.node(&subtree.root, subtree.height, 0)?;
        if checker.reached != subtree.entry_count {
            return Err(TreeViolation::EntryTotal {
                subtree: index,
                expected: subtree.entry_count,
                found: checker.reached,
            });
        }
        Ok(())
    }
}
