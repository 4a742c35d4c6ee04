// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic
)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::unreadable_literal
)]
#![doc = r"Geometry and broad-phase indexing for Fuse.

This crate provides:
- Axis-aligned bounding boxes (`Aabb`) over Q32.32 coordinates.
- Cohen–Sutherland segment clipping (`clip_line_to_box`).
- A bulk-built R-tree (`BoxTree`) with partitioned, multi-threaded builds and
  box and line range queries.
- A uniform-grid spatial hash (`TileHash`) behind the same `BroadPhase` trait.

Design notes:
- Deterministic: no ambient RNG, no floats, no hash-order-dependent output.
- Nodes and entries live in flat buffers addressed by index; nothing is boxed.
- Rustdoc is treated as part of the contract; public items are documented.
"]

/// Broad-phase trait and its implementations.
pub mod broad;
/// Foundational geometric types.
pub mod types;

pub use broad::tile_hash::{TileHash, OVERSIZE_CELLS};
pub use broad::tree::{
    BoxTree, BuildOptions, LeafEntry, Subtree, TreeNode, TreeViolation, MAX_ENTRIES, MIN_ENTRIES,
};
pub use broad::BroadPhase;
pub use types::aabb::Aabb;
pub use types::clip::{clip_line_to_box, segment_hits_box, Outcode};
