// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Scripted arena: a wall ring with players bouncing around inside it.

use fuse_fixed::{Fix, Fix2};
use fuse_sim::{BlastResponse, Body, Prng, Shape, SimError, Simulation};

/// Half side of the square arena, in world units.
pub const ARENA_HALF: i32 = 32;

/// Reach of every scripted bomb.
pub const BOMB_RADIUS: i32 = 6;

/// Handle of the first player; walls use handles below it.
pub fn first_player(walls: u32) -> u32 {
    walls
}

/// Inserts `walls` wall blocks on the arena border and `players` moving
/// players inside it. Placement and velocities come from `seed`.
pub fn populate(sim: &mut Simulation, walls: u32, players: u32, seed: u64) -> Result<(), SimError> {
    let perimeter = i64::from(ARENA_HALF) * 8;
    for w in 0..walls {
        // Walk the border at evenly spaced offsets.
        let offset = perimeter * i64::from(w) / i64::from(walls.max(1));
        let side = i32::try_from(offset / (i64::from(ARENA_HALF) * 2)).unwrap_or(0);
        let along = i32::try_from(offset % (i64::from(ARENA_HALF) * 2)).unwrap_or(0) - ARENA_HALF;
        let (x, y) = match side {
            0 => (along, -ARENA_HALF),
            1 => (ARENA_HALF, along),
            2 => (-along, ARENA_HALF),
            _ => (-ARENA_HALF, -along),
        };
        sim.insert_body(Body::wall(w, Fix2::from_ints(x, y), Fix2::from_ints(2, 2)))?;
    }

    let mut prng = Prng::from_seed_u64(seed);
    let span = u64::try_from(ARENA_HALF - 4).unwrap_or(1) * 2;
    let coord = |prng: &mut Prng| {
        i32::try_from(prng.next_below(span)).unwrap_or(0) - (ARENA_HALF - 4)
    };
    let speed = |prng: &mut Prng| i32::try_from(prng.next_below(9)).unwrap_or(4) - 4;
    for p in 0..players {
        let position = Fix2::from_ints(coord(&mut prng), coord(&mut prng));
        let velocity = Fix2::from_ints(speed(&mut prng), speed(&mut prng));
        let body = Body::dynamic(
            first_player(walls) + p,
            position,
            Shape::Circle {
                radius: Fix::HALF + Fix::from_ratio(1, 4)?,
            },
        )
        .with_velocity(velocity)
        .with_blast(BlastResponse::Damage);
        sim.insert_body(body)?;
    }
    Ok(())
}

/// Player that drops the bomb on `tick` (round-robin), if any players exist.
pub fn bomber(tick: u64, walls: u32, players: u32) -> Option<u32> {
    if players == 0 {
        return None;
    }
    let slot = u32::try_from(tick % u64::from(players)).unwrap_or(0);
    Some(first_player(walls) + slot)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use fuse_sim::SimConfig;

    #[test]
    fn populate_inserts_every_body_once() {
        let mut sim = Simulation::new(SimConfig::default()).unwrap();
        populate(&mut sim, 12, 5, 1).unwrap();
        assert_eq!(sim.bodies().len(), 17);
        assert!(sim.body(first_player(12) + 4).is_some());
    }

    #[test]
    fn bombers_rotate() {
        assert_eq!(bomber(0, 4, 3), Some(4));
        assert_eq!(bomber(4, 4, 3), Some(5));
        assert_eq!(bomber(4, 4, 0), None);
    }
}
