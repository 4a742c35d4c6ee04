// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Insertion into one subtree's pre-reserved buffer region.

use crate::types::aabb::Aabb;

use super::node::{LeafEntry, Slot, TreeNode, MAX_ENTRIES, MIN_ENTRIES};
use super::split::split_block;

/// Number of slots a region needs to hold `entries` leaf entries.
///
/// Every block except a lone root holds at least `MIN_ENTRIES` children, so
/// `entries / MIN_ENTRIES + 1` blocks bound both the leaf level and the sum of
/// all interior levels.
pub(crate) const fn region_slots(entries: usize) -> usize {
    MAX_ENTRIES * (entries / MIN_ENTRIES + 1)
}

/// Bookkeeping for one independently built subtree.
///
/// `root` is a virtual node: its child block holds the root entries, which
/// are leaf entries when `height == 0` and nodes otherwise. All
/// `entries_start` values are local to the subtree's regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subtree {
    pub(crate) root: TreeNode,
    pub(crate) height: u32,
    pub(crate) node_base: usize,
    pub(crate) node_len: usize,
    pub(crate) leaf_base: usize,
    pub(crate) leaf_len: usize,
    pub(crate) entry_count: usize,
}

impl Subtree {
    /// An empty subtree anchored at the given region bases.
    pub(crate) const fn empty(node_base: usize, leaf_base: usize) -> Self {
        Self {
            root: TreeNode::EMPTY,
            height: 0,
            node_base,
            node_len: 0,
            leaf_base,
            leaf_len: 0,
            entry_count: 0,
        }
    }

    /// Levels below the root block (0 when root entries are leaf entries).
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Number of populated root entries.
    pub const fn root_entry_count(&self) -> usize {
        self.root.entries_count
    }

    /// Bounds of everything in this subtree ([`Aabb::EMPTY`] when empty).
    pub const fn bounds(&self) -> Aabb {
        self.root.aabb
    }

    /// Number of leaf entries inserted.
    pub const fn entry_count(&self) -> usize {
        self.entry_count
    }
}

/// Builds one subtree inside borrowed, disjoint buffer regions.
pub(crate) struct SubtreeBuilder<'a> {
    nodes: &'a mut [TreeNode],
    leaves: &'a mut [LeafEntry],
    meta: Subtree,
}

impl<'a> SubtreeBuilder<'a> {
    pub(crate) fn new(
        nodes: &'a mut [TreeNode],
        leaves: &'a mut [LeafEntry],
        node_base: usize,
        leaf_base: usize,
    ) -> Self {
        nodes.fill(TreeNode::EMPTY);
        leaves.fill(LeafEntry::EMPTY);
        Self {
            nodes,
            leaves,
            meta: Subtree::empty(node_base, leaf_base),
        }
    }

    /// Inserts every entry in order and returns the finished bookkeeping.
    pub(crate) fn build(mut self, entries: &[LeafEntry]) -> Subtree {
        for entry in entries {
            self.insert(*entry);
        }
        self.meta
    }

    fn alloc_leaf_block(&mut self) -> usize {
        let start = self.meta.leaf_len;
        debug_assert!(
            start + MAX_ENTRIES <= self.leaves.len(),
            "leaf region exhausted"
        );
        self.meta.leaf_len += MAX_ENTRIES;
        start
    }

    fn alloc_node_block(&mut self) -> usize {
        let start = self.meta.node_len;
        debug_assert!(
            start + MAX_ENTRIES <= self.nodes.len(),
            "node region exhausted"
        );
        self.meta.node_len += MAX_ENTRIES;
        start
    }

    pub(crate) fn insert(&mut self, entry: LeafEntry) {
        if self.meta.root.entries_start == TreeNode::NO_ENTRIES {
            let start = self.alloc_leaf_block();
            self.meta.root = TreeNode {
                aabb: Aabb::EMPTY,
                entries_start: start,
                entries_count: 0,
            };
        }

        let (root, overflow) = self.insert_below(self.meta.root, self.meta.height, entry);
        self.meta.root = match overflow {
            None => root,
            Some(sibling) => self.grow(root, sibling),
        };
        self.meta.entry_count += 1;
    }

    /// Places the old root and its overflow sibling under a new root block.
    fn grow(&mut self, old: TreeNode, sibling: TreeNode) -> TreeNode {
        let start = self.alloc_node_block();
        self.nodes[start] = old;
        self.nodes[start + 1] = sibling;
        self.meta.height += 1;
        TreeNode {
            aabb: old.aabb.conjugate(&sibling.aabb),
            entries_start: start,
            entries_count: 2,
        }
    }

    /// Inserts `entry` somewhere below `node` (whose children sit at
    /// `height`) and returns the updated node plus an overflow sibling when
    /// the node had to split.
    fn insert_below(
        &mut self,
        node: TreeNode,
        height: u32,
        entry: LeafEntry,
    ) -> (TreeNode, Option<TreeNode>) {
        debug_assert!(node.entries_start != TreeNode::NO_ENTRIES);
        if height == 0 {
            return self.push_leaf(node, entry);
        }

        let slot = node.entries_start + choose_child(&self.nodes[node.populated()], &entry.aabb);
        let (child, overflow) = self.insert_below(self.nodes[slot], height - 1, entry);
        self.nodes[slot] = child;
        let mut node = node;
        node.aabb = node.aabb.conjugate(&entry.aabb);
        match overflow {
            None => (node, None),
            Some(sibling) => self.push_node(node, sibling),
        }
    }

    fn push_leaf(&mut self, node: TreeNode, entry: LeafEntry) -> (TreeNode, Option<TreeNode>) {
        if node.entries_count < MAX_ENTRIES {
            self.leaves[node.entries_start + node.entries_count] = entry;
            return (grown(node, &entry.aabb), None);
        }
        let spill = self.alloc_leaf_block();
        let (head, tail) = self.leaves.split_at_mut(spill);
        let (a, b) = split_block(
            &mut head[node.block()],
            &mut tail[..MAX_ENTRIES],
            entry,
            LeafEntry::EMPTY,
        );
        split_result(node, spill, a, b)
    }

    fn push_node(&mut self, node: TreeNode, child: TreeNode) -> (TreeNode, Option<TreeNode>) {
        if node.entries_count < MAX_ENTRIES {
            self.nodes[node.entries_start + node.entries_count] = child;
            return (grown(node, &child.aabb), None);
        }
        let spill = self.alloc_node_block();
        let (head, tail) = self.nodes.split_at_mut(spill);
        let (a, b) = split_block(
            &mut head[node.block()],
            &mut tail[..MAX_ENTRIES],
            child,
            TreeNode::EMPTY,
        );
        split_result(node, spill, a, b)
    }
}

fn grown(node: TreeNode, aabb: &Aabb) -> TreeNode {
    TreeNode {
        aabb: node.aabb.conjugate(aabb),
        entries_start: node.entries_start,
        entries_count: node.entries_count + 1,
    }
}

fn split_result(
    node: TreeNode,
    spill_start: usize,
    kept: super::split::SplitHalf,
    moved: super::split::SplitHalf,
) -> (TreeNode, Option<TreeNode>) {
    (
        TreeNode {
            aabb: kept.aabb,
            entries_start: node.entries_start,
            entries_count: kept.count,
        },
        Some(TreeNode {
            aabb: moved.aabb,
            entries_start: spill_start,
            entries_count: moved.count,
        }),
    )
}

/// Child needing the least area enlargement to absorb `aabb` (lowest index on
/// ties).
fn choose_child<T: Slot>(children: &[T], aabb: &Aabb) -> usize {
    let mut best = 0;
    let mut best_growth = None;
    for (i, child) in children.iter().enumerate() {
        let growth = child.bounds().enlargement(aabb);
        if best_growth.is_none_or(|g| growth < g) {
            best = i;
            best_growth = Some(growth);
        }
    }
    best
}
