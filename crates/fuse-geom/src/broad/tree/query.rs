// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Read-only range queries.

use fuse_fixed::{Fix, Fix2};

use crate::types::aabb::Aabb;
use crate::types::clip::{clip_line_to_box, segment_hits_box};

use super::node::{LeafEntry, TreeNode};
use super::BoxTree;

/// Node boxes are widened by this many raw units before the carried segment
/// is clipped against them, so rounding in the carried endpoints can never
/// prune a node that the original segment touches.
const LINE_PRUNE_MARGIN: Fix = Fix::from_raw(256);

/// One subtree's region, addressed with local indices.
struct View<'a> {
    nodes: &'a [TreeNode],
    leaves: &'a [LeafEntry],
}

impl View<'_> {
    fn by_aabb(&self, node: &TreeNode, height: u32, query: &Aabb, out: &mut Vec<LeafEntry>) {
        if height == 0 {
            out.extend(
                self.leaves[node.populated()]
                    .iter()
                    .filter(|e| e.aabb.overlaps(query)),
            );
            return;
        }
        for child in &self.nodes[node.populated()] {
            if child.aabb.overlaps(query) {
                self.by_aabb(child, height - 1, query, out);
            }
        }
    }

    fn by_line(
        &self,
        node: &TreeNode,
        height: u32,
        carried: (Fix2, Fix2),
        segment: (Fix2, Fix2),
        out: &mut Vec<LeafEntry>,
    ) {
        if height == 0 {
            out.extend(
                self.leaves[node.populated()]
                    .iter()
                    .filter(|e| segment_hits_box(&e.aabb, segment.0, segment.1)),
            );
            return;
        }
        for child in &self.nodes[node.populated()] {
            if let Some(clipped) = clip_carried(&child.aabb, carried) {
                self.by_line(child, height - 1, clipped, segment, out);
            }
        }
    }
}

fn clip_carried(aabb: &Aabb, (mut p0, mut p1): (Fix2, Fix2)) -> Option<(Fix2, Fix2)> {
    clip_line_to_box(&aabb.inflate(LINE_PRUNE_MARGIN), &mut p0, &mut p1).then_some((p0, p1))
}

impl BoxTree {
    /// Appends every entry whose box overlaps `query` (inclusive on faces).
    ///
    /// Results are appended in traversal order: subtrees in partition order,
    /// children in slot order.
    pub fn query_by_aabb(&self, query: &Aabb, out: &mut Vec<LeafEntry>) {
        for subtree in &self.subtrees {
            if subtree.root.entries_count == 0 || !subtree.root.aabb.overlaps(query) {
                continue;
            }
            let (nodes, leaves) = self.region(subtree);
            View { nodes, leaves }.by_aabb(&subtree.root, subtree.height, query, out);
        }
    }

    /// Appends every entry whose box the segment `p0 → p1` touches.
    ///
    /// Interior nodes are pruned by progressively clipping the segment; each
    /// leaf entry is tested against the original segment.
    pub fn query_by_line(&self, p0: Fix2, p1: Fix2, out: &mut Vec<LeafEntry>) {
        for subtree in &self.subtrees {
            if subtree.root.entries_count == 0 {
                continue;
            }
            let Some(carried) = clip_carried(&subtree.root.aabb, (p0, p1)) else {
                continue;
            };
            let (nodes, leaves) = self.region(subtree);
            View { nodes, leaves }.by_line(&subtree.root, subtree.height, carried, (p0, p1), out);
        }
    }
}
