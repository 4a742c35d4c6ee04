// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Fuse arena runner (`fuse`).
//!
//! Builds a scripted arena of walls and players, runs it for a fixed number
//! of ticks, and logs a summary of every tick through `tracing`.
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use fuse_fixed::Fix;
use fuse_sim::{BroadPhaseKind, CollisionKind, ConfigService, SimConfig, Simulation, TickReport};
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

mod arena;
mod fs_store;

use fs_store::FsConfigStore;

/// Broad phase selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum BroadPhaseArg {
    /// Bounding-box tree.
    Tree,
    /// Tile hash.
    Tiles,
}

impl From<BroadPhaseArg> for BroadPhaseKind {
    fn from(arg: BroadPhaseArg) -> Self {
        match arg {
            BroadPhaseArg::Tree => Self::Tree,
            BroadPhaseArg::Tiles => Self::Tiles,
        }
    }
}

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Number of ticks to simulate
    #[clap(long, default_value_t = 120)]
    ticks: u64,

    /// Wall blocks placed on the arena border
    #[clap(long, default_value_t = 64)]
    walls: u32,

    /// Moving players inside the arena
    #[clap(long, default_value_t = 16)]
    players: u32,

    /// Tree build workers (overrides the stored config)
    #[clap(long)]
    workers: Option<usize>,

    /// Broad phase (overrides the stored config)
    #[clap(long, value_enum)]
    broad_phase: Option<BroadPhaseArg>,

    /// Seed for arena layout and, when given, entity enumeration order
    #[clap(long)]
    seed: Option<u64>,

    /// Directory holding `fuse-sim.json` (defaults to the user config dir)
    #[clap(long)]
    config: Option<PathBuf>,

    /// Write the effective config back to the config store
    #[clap(long)]
    save_config: bool,

    /// Drop a bomb every N ticks (0 disables bombs)
    #[clap(long, default_value_t = 30)]
    bomb_every: u64,

    /// Maximum log level
    #[clap(long, default_value_t = Level::INFO)]
    log_level: Level,
}

fn config_store(args: &Args) -> Result<FsConfigStore> {
    match &args.config {
        Some(dir) => Ok(FsConfigStore::at(dir)),
        None => FsConfigStore::new().context("resolving config directory"),
    }
}

/// Stored config (or defaults) with command-line overrides applied.
fn effective_config(args: &Args, service: &ConfigService<FsConfigStore>) -> Result<SimConfig> {
    let mut config = service
        .load_sim_config()
        .context("loading config")?
        .unwrap_or_default();
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    if let Some(broad_phase) = args.broad_phase {
        config.broad_phase = broad_phase.into();
    }
    if args.seed.is_some() {
        config.enumeration_seed = args.seed;
    }
    config.validate()?;
    Ok(config)
}

fn log_tick(report: &TickReport) {
    let count = |kind| report.collisions.iter().filter(|e| e.kind == kind).count();
    info!(
        tick = report.tick.index(),
        bodies = report.stats.bodies,
        candidates = report.stats.collision.candidate_pairs,
        enter = count(CollisionKind::Enter),
        stay = count(CollisionKind::Stay),
        exit = count(CollisionKind::Exit),
        resolved = report.stats.collision.resolved,
        damage = report.damage.len(),
        "tick"
    );
    for hit in &report.damage {
        debug!(blast = hit.blast.0, target = hit.target, distance = %hit.distance, "damage");
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let store = config_store(&args)?;
    let dir = store.base().to_path_buf();
    let service = ConfigService::new(store);
    let config = effective_config(&args, &service)?;
    if args.save_config {
        service
            .save_sim_config(&config)
            .context("saving config")?;
        info!(dir = %dir.display(), "config saved");
    }
    info!(?config, ticks = args.ticks, "starting arena");

    let mut sim = Simulation::new(config)?;
    arena::populate(&mut sim, args.walls, args.players, args.seed.unwrap_or(0))?;

    let bomb_radius = Fix::from_int(i64::from(arena::BOMB_RADIUS));
    let mut totals = (0usize, 0usize);
    for t in 0..args.ticks {
        if args.bomb_every > 0 && t % args.bomb_every == args.bomb_every - 1 {
            if let Some(handle) = arena::bomber(t, args.walls, args.players) {
                if let Some(origin) = sim.body(handle).map(|b| b.position) {
                    let id = sim.detonate(origin, bomb_radius, Some(handle));
                    debug!(blast = id.0, bomber = handle, "bomb queued");
                }
            }
        }
        let report = sim.step();
        totals.0 += report.collisions.len();
        totals.1 += report.damage.len();
        log_tick(&report);
    }

    info!(
        ticks = sim.tick().index(),
        collision_events = totals.0,
        damage_events = totals.1,
        "arena finished"
    );
    Ok(())
}
