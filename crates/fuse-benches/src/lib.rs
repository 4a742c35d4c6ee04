// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared fixtures for the Fuse benchmarks.

use fuse_fixed::Fix2;
use fuse_geom::{Aabb, LeafEntry};

/// Deterministic scatter of `n` small boxes over a `[-extent, extent]` square.
pub fn scatter(n: usize, extent: i32, seed: u64) -> Vec<LeafEntry> {
    let mut state = seed | 1;
    let span = u64::try_from(extent).unwrap_or(1).max(1) * 2;
    let mut next = |m: u64| {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        i32::try_from(state % m).unwrap_or(0)
    };
    (0..n)
        .map(|i| {
            let x = next(span) - extent;
            let y = next(span) - extent;
            let w = next(4) + 1;
            let h = next(4) + 1;
            LeafEntry::new(
                Aabb::from_ints(x, y, x + w, y + h),
                u32::try_from(i).unwrap_or(u32::MAX),
            )
        })
        .collect()
}

/// Evenly spaced probe segments crossing the scatter area.
pub fn probes(count: i32, extent: i32) -> Vec<(Fix2, Fix2)> {
    (0..count)
        .map(|i| {
            let t = -extent + (2 * extent * i) / count.max(1);
            (Fix2::from_ints(-extent, t), Fix2::from_ints(extent, -t))
        })
        .collect()
}
