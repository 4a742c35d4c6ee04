// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Fixed-tick loop: integrate, index, collide, blast, advance.

use fuse_fixed::{Fix, Fix2};
use fuse_geom::{BoxTree, BroadPhase, BuildOptions, LeafEntry, TileHash};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use crate::blast::{Blast, BlastId, BlastPass, DamageEvent};
use crate::body::{Body, Mobility};
use crate::collision::{CollisionEvent, CollisionPass, CollisionStats};
use crate::config::{BroadPhaseKind, SimConfig};
use crate::error::SimError;
use crate::prng::Prng;

/// Discrete simulation tick.
///
/// Counts completed steps; a fresh simulation sits at tick 0.
#[derive(
    Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Tick {
    index: u64,
}

impl Tick {
    /// Creates a new tick with the given index.
    #[must_use]
    pub const fn new(index: u64) -> Self {
        Self { index }
    }

    /// Returns the tick index.
    #[must_use]
    pub const fn index(&self) -> u64 {
        self.index
    }

    /// The following tick.
    #[must_use]
    pub const fn next(self) -> Self {
        Self {
            index: self.index.saturating_add(1),
        }
    }
}

/// Counters for one step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickStats {
    /// Bodies alive during the step.
    pub bodies: usize,
    /// Bodies placed in the index (after the entry cap).
    pub indexed: usize,
    /// Collision pass counters.
    pub collision: CollisionStats,
    /// Blasts processed.
    pub blasts: usize,
}

/// Everything one [`Simulation::step`] produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    /// Tick that was completed by this step.
    pub tick: Tick,
    /// Contact events sorted by `(a, b)`.
    pub collisions: Vec<CollisionEvent>,
    /// Damage events in blast order.
    pub damage: Vec<DamageEvent>,
    /// Step counters.
    pub stats: TickStats,
}

/// Deterministic fixed-step world of bodies.
///
/// Bodies are kept sorted by handle; identical calls on two simulations with
/// equal configs yield identical reports and body states regardless of the
/// worker count.
pub struct Simulation {
    config: SimConfig,
    tick: Tick,
    bodies: Vec<Body>,
    index: Box<dyn BroadPhase + Send>,
    collisions: CollisionPass,
    blast_pass: BlastPass,
    queued: Vec<Blast>,
    next_blast: u64,
    pending_exits: Vec<CollisionEvent>,
    entries: Vec<LeafEntry>,
}

impl core::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Simulation")
            .field("config", &self.config)
            .field("tick", &self.tick)
            .field("bodies", &self.bodies.len())
            .field("queued_blasts", &self.queued.len())
            .finish_non_exhaustive()
    }
}

fn make_index(config: &SimConfig) -> Result<Box<dyn BroadPhase + Send>, SimError> {
    Ok(match config.broad_phase {
        BroadPhaseKind::Tree => Box::new(BoxTree::new(BuildOptions {
            workers: config.workers,
            max_entries: config.max_entries_per_build,
        })),
        BroadPhaseKind::Tiles => Box::new(TileHash::new(config.tile_size)?),
    })
}

impl Simulation {
    /// Creates an empty simulation after validating `config`.
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        Ok(Self {
            index: make_index(&config)?,
            config,
            tick: Tick::default(),
            bodies: Vec::new(),
            collisions: CollisionPass::new(),
            blast_pass: BlastPass::new(),
            queued: Vec::new(),
            next_blast: 0,
            pending_exits: Vec::new(),
            entries: Vec::new(),
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Last completed tick.
    pub fn tick(&self) -> Tick {
        self.tick
    }

    /// Adds a body; fails if its handle is already present.
    pub fn insert_body(&mut self, body: Body) -> Result<(), SimError> {
        match self.bodies.binary_search_by_key(&body.handle, |b| b.handle) {
            Ok(_) => Err(SimError::DuplicateHandle(body.handle)),
            Err(at) => {
                self.bodies.insert(at, body);
                Ok(())
            }
        }
    }

    /// Removes a body and returns it. Its live contacts are reported as
    /// `Exit` events by the next step.
    pub fn remove_body(&mut self, handle: u32) -> Result<Body, SimError> {
        let at = self
            .bodies
            .binary_search_by_key(&handle, |b| b.handle)
            .map_err(|_| SimError::UnknownHandle(handle))?;
        self.pending_exits.extend(self.collisions.forget(handle));
        Ok(self.bodies.remove(at))
    }

    /// Body with `handle`, if present.
    pub fn body(&self, handle: u32) -> Option<&Body> {
        self.bodies
            .binary_search_by_key(&handle, |b| b.handle)
            .ok()
            .map(|i| &self.bodies[i])
    }

    /// Mutable body with `handle`, if present. The handle must not be
    /// changed.
    pub fn body_mut(&mut self, handle: u32) -> Option<&mut Body> {
        self.bodies
            .binary_search_by_key(&handle, |b| b.handle)
            .ok()
            .map(|i| &mut self.bodies[i])
    }

    /// All bodies, ascending by handle.
    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    /// Queues a blast for the next step and returns its id.
    pub fn detonate(&mut self, origin: Fix2, radius: Fix, source: Option<u32>) -> BlastId {
        let id = BlastId(self.next_blast);
        self.next_blast += 1;
        self.queued.push(Blast {
            id,
            origin,
            radius,
            source,
        });
        id
    }

    /// Advances the world by one fixed step.
    #[instrument(level = "debug", skip(self), fields(tick = self.tick.index() + 1))]
    pub fn step(&mut self) -> TickReport {
        self.integrate();
        self.rebuild_index();

        let mut collisions = core::mem::take(&mut self.pending_exits);
        let collision_stats = self.collisions.run(
            &mut self.bodies,
            &*self.index,
            &self.entries,
            &mut collisions,
        );
        collisions.sort_by_key(|e| (e.a, e.b));

        let mut damage = Vec::new();
        let blasts = core::mem::take(&mut self.queued);
        for blast in &blasts {
            self.blast_pass
                .run(blast, &self.bodies, &*self.index, &mut damage);
        }

        self.tick = self.tick.next();
        let stats = TickStats {
            bodies: self.bodies.len(),
            indexed: self.entries.len(),
            collision: collision_stats,
            blasts: blasts.len(),
        };
        debug!(
            bodies = stats.bodies,
            indexed = stats.indexed,
            contacts = stats.collision.contacts,
            events = collisions.len(),
            damage = damage.len(),
            "tick complete"
        );
        TickReport {
            tick: self.tick,
            collisions,
            damage,
            stats,
        }
    }

    fn integrate(&mut self) {
        let dt = self.config.dt;
        for body in &mut self.bodies {
            if body.mobility == Mobility::Dynamic {
                body.position += body.velocity * dt;
            }
        }
    }

    /// Collects `(aabb, handle)` in handle order, applies the seeded
    /// permutation and the entry cap, then rebuilds the index.
    fn rebuild_index(&mut self) {
        self.entries.clear();
        self.entries
            .extend(self.bodies.iter().map(|b| LeafEntry::new(b.aabb(), b.handle)));
        if let Some(seed) = self.config.enumeration_seed {
            Prng::from_seed_u64(seed ^ self.tick.index()).shuffle(&mut self.entries);
        }
        self.entries.truncate(self.config.max_entries_per_build);
        self.index.rebuild(&self.entries);
        trace!(entries = self.entries.len(), "index rebuilt");
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::body::Shape;

    fn ball(handle: u32, x: i32, y: i32) -> Body {
        Body::dynamic(
            handle,
            Fix2::from_ints(x, y),
            Shape::Circle { radius: Fix::ONE },
        )
    }

    #[test]
    fn duplicate_handles_are_rejected() {
        let mut sim = Simulation::new(SimConfig::default()).unwrap();
        sim.insert_body(ball(1, 0, 0)).unwrap();
        assert_eq!(
            sim.insert_body(ball(1, 5, 5)),
            Err(SimError::DuplicateHandle(1))
        );
        assert_eq!(sim.remove_body(9), Err(SimError::UnknownHandle(9)));
    }

    #[test]
    fn bodies_stay_sorted_by_handle() {
        let mut sim = Simulation::new(SimConfig::default()).unwrap();
        for h in [5, 1, 3] {
            sim.insert_body(ball(h, 0, i32::try_from(h).unwrap() * 10)).unwrap();
        }
        let handles: Vec<u32> = sim.bodies().iter().map(|b| b.handle).collect();
        assert_eq!(handles, vec![1, 3, 5]);
        assert!(sim.body(3).is_some());
        assert!(sim.body(4).is_none());
    }

    #[test]
    fn step_advances_tick_and_integrates() {
        let mut sim = Simulation::new(SimConfig {
            dt: Fix::ONE,
            ..SimConfig::default()
        })
        .unwrap();
        sim.insert_body(ball(1, 0, 0).with_velocity(Fix2::from_ints(2, 0)))
            .unwrap();
        let report = sim.step();
        assert_eq!(report.tick, Tick::new(1));
        assert_eq!(sim.tick(), Tick::new(1));
        assert_eq!(sim.body(1).unwrap().position, Fix2::from_ints(2, 0));
    }

    #[test]
    fn entry_cap_limits_the_index() {
        let mut sim = Simulation::new(SimConfig {
            max_entries_per_build: 2,
            ..SimConfig::default()
        })
        .unwrap();
        for h in 0..5 {
            sim.insert_body(ball(h, i32::try_from(h).unwrap() * 10, 0))
                .unwrap();
        }
        assert_eq!(sim.step().stats.indexed, 2);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = SimConfig {
            workers: 0,
            ..SimConfig::default()
        };
        assert!(matches!(
            Simulation::new(config),
            Err(SimError::InvalidConfig(_))
        ));
    }
}
