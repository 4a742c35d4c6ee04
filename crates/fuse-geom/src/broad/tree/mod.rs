// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Bulk-built R-tree over fixed-point boxes.
//!
//! The tree is rebuilt from scratch on every [`BoxTree::build`]. Entries are
//! split into contiguous partitions, one per worker, and each partition grows
//! its own subtree inside a disjoint region of the two flat buffers:
//!
//! - `leaves` holds leaf entries in blocks of [`MAX_ENTRIES`];
//! - `nodes` holds every interior level in blocks of [`MAX_ENTRIES`].
//!
//! Unused slots hold [`LeafEntry::EMPTY`] / [`TreeNode::EMPTY`]. Indices stored
//! in nodes are local to the owning subtree's region, so a region can be
//! handed to a worker as a plain `&mut` slice.
//!
//! Determinism: for a fixed entry order and worker count the resulting
//! buffers and subtree roots are identical on every run and machine.

mod builder;
mod node;
mod query;
mod split;
mod validate;

pub use builder::Subtree;
pub use node::{LeafEntry, TreeNode, MAX_ENTRIES, MIN_ENTRIES};
pub use validate::TreeViolation;

use builder::{region_slots, SubtreeBuilder};

/// Knobs for [`BoxTree::build`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BuildOptions {
    /// Number of partitions (and threads) used by a build. Values below 1 are
    /// treated as 1.
    pub workers: usize,
    /// Entries past this cap are ignored by a build.
    pub max_entries: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            workers: 1,
            max_entries: usize::MAX,
        }
    }
}

impl BuildOptions {
    /// Options with the given worker count and no entry cap.
    #[must_use]
    pub fn with_workers(workers: usize) -> Self {
        Self {
            workers,
            ..Self::default()
        }
    }
}

/// Half-open range of entries owned by partition `w` of `workers`.
///
/// A pure function of the entry count and the worker count.
pub(crate) fn partition(n: usize, w: usize, workers: usize) -> core::ops::Range<usize> {
    (n * w / workers)..(n * (w + 1) / workers)
}

/// Buffer region reserved for one partition.
#[derive(Debug, Clone)]
struct Region {
    entries: core::ops::Range<usize>,
    node_base: usize,
    leaf_base: usize,
    slots: usize,
}

/// Dynamic bounding-box tree with partitioned, optionally parallel builds.
#[derive(Debug, Clone, Default)]
pub struct BoxTree {
    nodes: Vec<TreeNode>,
    leaves: Vec<LeafEntry>,
    subtrees: Vec<Subtree>,
    options: BuildOptions,
}

impl BoxTree {
    /// Creates an empty tree that builds with `options`.
    #[must_use]
    pub fn new(options: BuildOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Current build options.
    #[must_use]
    pub fn options(&self) -> BuildOptions {
        self.options
    }

    /// Replaces the build options; takes effect on the next build.
    pub fn set_options(&mut self, options: BuildOptions) {
        self.options = options;
    }

    /// Discards the previous contents and inserts `entries` in order.
    ///
    /// Buffers grow when needed and are never shrunk.
    ///
    /// # Panics
    ///
    /// Re-raises the panic of any worker thread.
    pub fn build(&mut self, entries: &[LeafEntry]) {
        let entries = &entries[..entries.len().min(self.options.max_entries)];
        let n = entries.len();
        let workers = self.options.workers.max(1).min(n.max(1));

        let mut regions = Vec::with_capacity(workers);
        let mut base = 0;
        for w in 0..workers {
            let range = partition(n, w, workers);
            let slots = region_slots(range.len());
            regions.push(Region {
                entries: range,
                node_base: base,
                leaf_base: base,
                slots,
            });
            base += slots;
        }
        if self.nodes.len() < base {
            self.nodes.resize(base, TreeNode::EMPTY);
        }
        if self.leaves.len() < base {
            self.leaves.resize(base, LeafEntry::EMPTY);
        }

        let mut jobs = Vec::with_capacity(workers);
        let mut nodes_rest = &mut self.nodes[..base];
        let mut leaves_rest = &mut self.leaves[..base];
        for region in &regions {
            let (nodes, n_tail) = core::mem::take(&mut nodes_rest).split_at_mut(region.slots);
            let (leaves, l_tail) = core::mem::take(&mut leaves_rest).split_at_mut(region.slots);
            nodes_rest = n_tail;
            leaves_rest = l_tail;
            jobs.push((
                SubtreeBuilder::new(nodes, leaves, region.node_base, region.leaf_base),
                &entries[region.entries.clone()],
            ));
        }

        self.subtrees.clear();
        if jobs.len() == 1 {
            self.subtrees
                .extend(jobs.into_iter().map(|(builder, part)| builder.build(part)));
            return;
        }

        let built: Vec<Subtree> = std::thread::scope(|s| {
            let handles: Vec<_> = jobs
                .into_iter()
                .map(|(builder, part)| s.spawn(move || builder.build(part)))
                .collect();
            handles
                .into_iter()
                .map(|h| match h.join() {
                    Ok(subtree) => subtree,
                    Err(e) => std::panic::resume_unwind(e),
                })
                .collect()
        });
        self.subtrees = built;
    }

    /// Subtrees produced by the last build, in partition order.
    #[must_use]
    pub fn subtrees(&self) -> &[Subtree] {
        &self.subtrees
    }

    /// Number of subtrees produced by the last build.
    #[must_use]
    pub fn subtree_count(&self) -> usize {
        self.subtrees.len()
    }

    /// Height of subtree `index` (levels below its root block), if present.
    #[must_use]
    pub fn height(&self, index: usize) -> Option<u32> {
        self.subtrees.get(index).map(Subtree::height)
    }

    /// Number of populated root entries of subtree `index`, if present.
    #[must_use]
    pub fn root_entry_count(&self, index: usize) -> Option<usize> {
        self.subtrees.get(index).map(Subtree::root_entry_count)
    }

    /// Total number of leaf entries in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subtrees.iter().map(Subtree::entry_count).sum()
    }

    /// `true` when the last build inserted nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Union of every entry's box ([`crate::Aabb::EMPTY`] when empty).
    #[must_use]
    pub fn bounds(&self) -> crate::Aabb {
        self.subtrees
            .iter()
            .fold(crate::Aabb::EMPTY, |acc, s| acc.conjugate(&s.bounds()))
    }

    /// Node and leaf slices of one subtree's region.
    fn region(&self, subtree: &Subtree) -> (&[TreeNode], &[LeafEntry]) {
        (
            &self.nodes[subtree.node_base..subtree.node_base + subtree.node_len],
            &self.leaves[subtree.leaf_base..subtree.leaf_base + subtree.leaf_len],
        )
    }
}

/// Structural equality: same subtrees with the same populated regions.
///
/// Slack capacity left over from larger earlier builds is not compared.
impl PartialEq for BoxTree {
    fn eq(&self, other: &Self) -> bool {
        self.subtrees == other.subtrees
            && self
                .subtrees
                .iter()
                .all(|s| self.region(s) == other.region(s))
    }
}

impl Eq for BoxTree {}
