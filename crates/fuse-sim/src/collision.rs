// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Broad-phase collision pass with enter/stay/exit tracking.

use std::collections::BTreeSet;

use fuse_geom::{BroadPhase, LeafEntry};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::body::Body;
use crate::narrow;

/// Phase of a contact between two bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionKind {
    /// The pair started overlapping this tick.
    Enter,
    /// The pair overlapped last tick and still does.
    Stay,
    /// The pair overlapped last tick and no longer does.
    Exit,
}

/// Contact event for an unordered body pair, stored with `a < b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollisionEvent {
    /// Event phase.
    pub kind: CollisionKind,
    /// Lower handle of the pair.
    pub a: u32,
    /// Higher handle of the pair.
    pub b: u32,
}

impl CollisionEvent {
    /// Builds an event with the handles put in canonical order.
    pub fn new(kind: CollisionKind, x: u32, y: u32) -> Self {
        let (a, b) = canonical(x, y);
        Self { kind, a, b }
    }

    /// `true` if `handle` is one side of the pair.
    pub fn involves(&self, handle: u32) -> bool {
        self.a == handle || self.b == handle
    }
}

pub(crate) fn canonical(x: u32, y: u32) -> (u32, u32) {
    if x <= y {
        (x, y)
    } else {
        (y, x)
    }
}

/// Counters from one collision pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionStats {
    /// Distinct candidate pairs reported by the broad phase.
    pub candidate_pairs: usize,
    /// Pairs that passed the exact test.
    pub contacts: usize,
    /// Dynamic bodies moved out of static ones.
    pub resolved: usize,
}

/// Contact tracker that persists across ticks.
#[derive(Debug, Clone, Default)]
pub struct CollisionPass {
    contacts: BTreeSet<(u32, u32)>,
    candidates: Vec<(u32, u32)>,
    scratch: Vec<LeafEntry>,
}

impl CollisionPass {
    /// Creates a tracker with no live contacts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pairs that overlapped at the end of the last pass, ascending.
    pub fn contacts(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.contacts.iter().copied()
    }

    /// Drops every live contact involving `handle` and returns the matching
    /// `Exit` events, sorted by pair.
    pub fn forget(&mut self, handle: u32) -> Vec<CollisionEvent> {
        let gone: Vec<(u32, u32)> = self
            .contacts
            .iter()
            .copied()
            .filter(|&(a, b)| a == handle || b == handle)
            .collect();
        gone.iter()
            .map(|&(a, b)| {
                self.contacts.remove(&(a, b));
                CollisionEvent::new(CollisionKind::Exit, a, b)
            })
            .collect()
    }

    /// Runs one pass over `bodies` (sorted by handle) using `index`, which
    /// must hold the `entries` it was just rebuilt from.
    ///
    /// Candidate pairs come from querying each indexed entry's own box. Each
    /// unordered pair is tested once, in ascending order; static/dynamic
    /// non-sensor contacts are resolved in that same order. Events are
    /// appended to `events` sorted by `(a, b)`.
    pub fn run(
        &mut self,
        bodies: &mut [Body],
        index: &dyn BroadPhase,
        entries: &[LeafEntry],
        events: &mut Vec<CollisionEvent>,
    ) -> CollisionStats {
        self.candidates.clear();
        for entry in entries {
            self.scratch.clear();
            index.query_by_aabb(&entry.aabb, &mut self.scratch);
            self.candidates.extend(
                self.scratch
                    .iter()
                    .filter(|hit| hit.payload != entry.payload)
                    .map(|hit| canonical(entry.payload, hit.payload)),
            );
        }
        self.candidates.sort_unstable();
        self.candidates.dedup();

        let mut current = BTreeSet::new();
        let mut stats = CollisionStats {
            candidate_pairs: self.candidates.len(),
            ..CollisionStats::default()
        };
        for &(a, b) in &self.candidates {
            let (Some(ia), Some(ib)) = (find(bodies, a), find(bodies, b)) else {
                continue;
            };
            let (body_a, body_b) = (&bodies[ia], &bodies[ib]);
            if body_a.is_static() && body_b.is_static() {
                continue;
            }
            if !narrow::intersects(body_a, body_b) {
                continue;
            }
            current.insert((a, b));
            stats.contacts += 1;
            if resolve(bodies, ia, ib) {
                stats.resolved += 1;
                trace!(a, b, "resolved static contact");
            }
        }

        diff(&self.contacts, &current, events);
        self.contacts = current;
        stats
    }
}

fn find(bodies: &[Body], handle: u32) -> Option<usize> {
    bodies.binary_search_by_key(&handle, |b| b.handle).ok()
}

/// Pushes the dynamic side of a static/dynamic non-sensor pair out.
fn resolve(bodies: &mut [Body], ia: usize, ib: usize) -> bool {
    let (a, b) = (&bodies[ia], &bodies[ib]);
    if a.sensor || b.sensor || a.is_static() == b.is_static() {
        return false;
    }
    let (fixed, moving) = if a.is_static() { (ia, ib) } else { (ib, ia) };
    let fixed = bodies[fixed];
    narrow::push_out(&fixed, &mut bodies[moving]);
    true
}

/// Emits enter/stay/exit events for the transition `prev → current`.
fn diff(
    prev: &BTreeSet<(u32, u32)>,
    current: &BTreeSet<(u32, u32)>,
    events: &mut Vec<CollisionEvent>,
) {
    let mut merged: Vec<CollisionEvent> = current
        .iter()
        .map(|&(a, b)| {
            let kind = if prev.contains(&(a, b)) {
                CollisionKind::Stay
            } else {
                CollisionKind::Enter
            };
            CollisionEvent { kind, a, b }
        })
        .chain(
            prev.difference(current)
                .map(|&(a, b)| CollisionEvent::new(CollisionKind::Exit, a, b)),
        )
        .collect();
    merged.sort_by_key(|e| (e.a, e.b));
    events.extend(merged);
}
