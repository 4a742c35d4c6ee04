// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
// criterion_group!/criterion_main! expand to undocumented functions that cannot
// carry #[allow] (attributes on macro invocations are ignored). Crate-level
// suppress is required for benchmark binaries using Criterion.
#![allow(missing_docs)]
//! Full simulation step cost for a crowded field of moving circles.
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use fuse_fixed::{Fix, Fix2};
use fuse_sim::{BlastResponse, Body, BroadPhaseKind, Shape, SimConfig, Simulation};
use std::hint::black_box;

fn crowded(n: u32, broad_phase: BroadPhaseKind) -> Simulation {
    let config = SimConfig {
        broad_phase,
        workers: 4,
        ..SimConfig::default()
    };
    let mut sim = match Simulation::new(config) {
        Ok(sim) => sim,
        Err(e) => panic!("config: {e}"),
    };
    let side = 48;
    for h in 0..n {
        let i = i32::try_from(h).unwrap_or(0);
        let body = Body::dynamic(
            h,
            Fix2::from_ints((i % side) * 3, (i / side) * 3),
            Shape::Circle { radius: Fix::ONE },
        )
        .with_velocity(Fix2::from_ints((i % 3) - 1, (i % 5) - 2))
        .with_blast(BlastResponse::Damage);
        if let Err(e) = sim.insert_body(body) {
            panic!("insert: {e}");
        }
    }
    sim
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("sim_tick");
    for &n in &[256u32, 2_048] {
        for (name, kind) in [("tree", BroadPhaseKind::Tree), ("tiles", BroadPhaseKind::Tiles)] {
            group.bench_function(BenchmarkId::new(name, n), |b| {
                b.iter_batched(
                    || crowded(n, kind),
                    |mut sim| {
                        for _ in 0..4 {
                            black_box(sim.step());
                        }
                    },
                    BatchSize::LargeInput,
                );
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_tick);
criterion_main!(benches);
