// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Directional blast propagation over the broad-phase index.

use std::collections::BTreeSet;

use fuse_fixed::{Fix, Fix2};
use fuse_geom::{clip_line_to_box, BroadPhase, LeafEntry};
use serde::{Deserialize, Serialize};

use crate::body::{BlastResponse, Body};

/// Directions every blast travels, in processing order.
pub const BLAST_DIRECTIONS: [Fix2; 4] = [
    Fix2::UNIT_X,
    Fix2::new(Fix::NEG_ONE, Fix::ZERO),
    Fix2::UNIT_Y,
    Fix2::new(Fix::ZERO, Fix::NEG_ONE),
];

/// Identifier assigned to a blast when it is queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlastId(pub u64);

/// A queued detonation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Blast {
    /// Identifier reported in damage events.
    pub id: BlastId,
    /// Center of the detonation.
    pub origin: Fix2,
    /// Reach along each direction.
    pub radius: Fix,
    /// Body that caused the blast; never hit by it.
    pub source: Option<u32>,
}

/// One entity damaged by one blast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DamageEvent {
    /// Blast that caused the damage.
    pub blast: BlastId,
    /// Damaged body.
    pub target: u32,
    /// Distance from the origin to where the blast first touches the target.
    pub distance: Fix,
}

/// Hit along one ray, ordered by entry distance then handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct RayHit {
    distance: Fix,
    handle: u32,
}

/// Reusable buffers for blast processing.
#[derive(Debug, Clone, Default)]
pub struct BlastPass {
    found: Vec<LeafEntry>,
    hits: Vec<RayHit>,
}

impl BlastPass {
    /// Creates a pass with empty buffers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves `blast` against `index` and appends one event per damaged
    /// body.
    ///
    /// Per direction the ray stops at the first blocking hit (skipping the
    /// source); damageable hits touching the clamped ray are reported once
    /// per blast, in direction order then distance order.
    pub fn run(
        &mut self,
        blast: &Blast,
        bodies: &[Body],
        index: &dyn BroadPhase,
        events: &mut Vec<DamageEvent>,
    ) {
        let mut damaged = BTreeSet::new();
        for direction in BLAST_DIRECTIONS {
            let end = blast.origin + direction * blast.radius;
            self.found.clear();
            index.query_by_line(blast.origin, end, &mut self.found);

            self.hits.clear();
            for entry in &self.found {
                if Some(entry.payload) == blast.source {
                    continue;
                }
                let (mut entry_point, mut exit_point) = (blast.origin, end);
                if !clip_line_to_box(&entry.aabb, &mut entry_point, &mut exit_point) {
                    continue;
                }
                self.hits.push(RayHit {
                    distance: (entry_point - blast.origin).dot(direction),
                    handle: entry.payload,
                });
            }
            self.hits.sort_unstable();
            self.hits.dedup();

            let mut reach = blast.radius;
            for hit in &self.hits {
                if response(bodies, hit.handle).blocks() {
                    reach = hit.distance;
                    break;
                }
            }

            for hit in self.hits.iter().take_while(|h| h.distance <= reach) {
                if response(bodies, hit.handle).takes_damage() && damaged.insert(hit.handle) {
                    events.push(DamageEvent {
                        blast: blast.id,
                        target: hit.handle,
                        distance: hit.distance,
                    });
                }
            }
        }
    }
}

fn response(bodies: &[Body], handle: u32) -> BlastResponse {
    bodies
        .binary_search_by_key(&handle, |b| b.handle)
        .map_or(BlastResponse::Ignore, |i| bodies[i].blast)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::Shape;
    use fuse_geom::BoxTree;

    fn target(handle: u32, x: i32, y: i32, blast: BlastResponse) -> Body {
        Body::dynamic(
            handle,
            Fix2::from_ints(x, y),
            Shape::Box {
                half_extents: Fix2::new(Fix::HALF, Fix::HALF),
            },
        )
        .with_blast(blast)
    }

    fn run(bodies: &[Body], blast: &Blast) -> Vec<DamageEvent> {
        let entries: Vec<LeafEntry> = bodies
            .iter()
            .map(|b| LeafEntry::new(b.aabb(), b.handle))
            .collect();
        let mut tree = BoxTree::default();
        tree.build(&entries);
        let mut events = Vec::new();
        BlastPass::new().run(blast, bodies, &tree, &mut events);
        events
    }

    #[test]
    fn blocker_clamps_the_ray() {
        let bodies = [
            target(1, 2, 0, BlastResponse::Damage),
            target(2, 4, 0, BlastResponse::Block),
            target(3, 6, 0, BlastResponse::Damage),
        ];
        let blast = Blast {
            id: BlastId(0),
            origin: Fix2::ZERO,
            radius: Fix::from_int(10),
            source: None,
        };
        let hit: Vec<u32> = run(&bodies, &blast).iter().map(|e| e.target).collect();
        assert_eq!(hit, vec![1]);
    }

    #[test]
    fn source_is_skipped_and_damage_is_reported_once() {
        let bodies = [
            target(1, 0, 0, BlastResponse::BlockAndDamage),
            // Corner sits on the origin, so every ray touches it.
            Body {
                position: Fix2::new(Fix::HALF, Fix::HALF),
                ..target(2, 0, 0, BlastResponse::Damage)
            },
        ];
        let blast = Blast {
            id: BlastId(4),
            origin: Fix2::ZERO,
            radius: Fix::from_int(5),
            source: Some(1),
        };
        let events = run(&bodies, &blast);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].target, 2);
        assert_eq!(events[0].blast, BlastId(4));
        assert_eq!(events[0].distance, Fix::ZERO);
    }
}
