// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Broad-phase interfaces and implementations.
//!
//! Determinism contract (applies to all implementations used here):
//! - The same ordered input produces the same results in the same order.
//! - Overlap is inclusive on faces (touching boxes are reported).
//! - Payloads are opaque; no implementation dereferences them.

use fuse_fixed::Fix2;

use crate::types::aabb::Aabb;
use tree::LeafEntry;

#[doc = "Uniform-grid spatial hash."]
pub mod tile_hash;
#[doc = "Bulk-built bounding-box tree."]
pub mod tree;

/// Spatial index that is rebuilt from a full entry list and then queried.
pub trait BroadPhase {
    /// Replaces the indexed set with `entries`, inserted in order.
    fn rebuild(&mut self, entries: &[LeafEntry]);
    /// Appends every entry whose box overlaps `query`.
    fn query_by_aabb(&self, query: &Aabb, out: &mut Vec<LeafEntry>);
    /// Appends every entry whose box the segment `p0 → p1` touches.
    fn query_by_line(&self, p0: Fix2, p1: Fix2, out: &mut Vec<LeafEntry>);
    /// Number of indexed entries.
    fn len(&self) -> usize;
    /// `true` when nothing is indexed.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BroadPhase for tree::BoxTree {
    fn rebuild(&mut self, entries: &[LeafEntry]) {
        self.build(entries);
    }

    fn query_by_aabb(&self, query: &Aabb, out: &mut Vec<LeafEntry>) {
        tree::BoxTree::query_by_aabb(self, query, out);
    }

    fn query_by_line(&self, p0: Fix2, p1: Fix2, out: &mut Vec<LeafEntry>) {
        tree::BoxTree::query_by_line(self, p0, p1, out);
    }

    fn len(&self) -> usize {
        tree::BoxTree::len(self)
    }
}
