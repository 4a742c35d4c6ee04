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
#![doc = r"Deterministic fixed-step simulation over the Fuse broad phase.

Each [`Simulation::step`] runs, in order:
1. integrate dynamic bodies (`position += velocity * dt`);
2. rebuild the broad-phase index from every body's box;
3. run the collision pass (enter/stay/exit events, static push-out);
4. resolve queued blasts with four-direction line queries;
5. advance the tick counter.

All state is fixed-point and every output is ordered explicitly, so two
simulations fed identical inputs produce identical reports.
"]

/// Directional blast propagation.
pub mod blast;
/// Bodies, shapes, and blast responses.
pub mod body;
/// Collision pass and contact events.
pub mod collision;
/// Settings, config service, and storage port.
pub mod config;
mod error;
/// Exact shape tests and contact geometry.
pub mod narrow;
mod prng;
mod sim;

pub use blast::{Blast, BlastId, DamageEvent, BLAST_DIRECTIONS};
pub use body::{BlastResponse, Body, Mobility, Shape};
pub use collision::{CollisionEvent, CollisionKind, CollisionStats};
pub use config::{BroadPhaseKind, ConfigError, ConfigService, ConfigStore, SimConfig};
pub use error::SimError;
pub use prng::Prng;
pub use sim::{Simulation, Tick, TickReport, TickStats};
