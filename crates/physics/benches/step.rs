//! Benchmark for world stepping
//!
//! Times world construction (terrain generation plus spawning) and the
//! per-frame cost of `advance` while bodies are falling and while most of
//! them rest on the terrain.

use coldet_physics::{PhysicsWorld, SpawnConfig, WorldConfig};
use coldet_physics::coldet_terrain::TerrainParams;
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

/// Benchmark configuration
struct BenchConfig {
    grid_size: usize,
    bodies_per_kind: usize,
    frame_dt: f32,
    settle_frames: usize,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            grid_size: 65,
            bodies_per_kind: 50,
            frame_dt: 1.0 / 60.0,
            settle_frames: 300,
        }
    }
}

impl BenchConfig {
    fn world_config(&self) -> WorldConfig {
        WorldConfig {
            // Resets would make frames uneven
            reset_interval: 0.0,
            terrain: TerrainParams {
                grid_size: self.grid_size,
                ..TerrainParams::default()
            },
            spawning: SpawnConfig {
                box_count: self.bodies_per_kind,
                sphere_count: self.bodies_per_kind,
                ..SpawnConfig::default()
            },
            ..WorldConfig::default()
        }
    }
}

fn bench_world_creation(c: &mut Criterion) {
    let config = BenchConfig::default();

    c.bench_function("world_new", |b| {
        b.iter(|| black_box(PhysicsWorld::new(config.world_config()).map(|w| w.body_count())))
    });
}

fn bench_falling_frame(c: &mut Criterion) {
    let config = BenchConfig::default();

    c.bench_function("advance_falling", |b| {
        b.iter_batched(
            || PhysicsWorld::new(config.world_config()).ok(),
            |world| {
                if let Some(mut world) = world {
                    for _ in 0..10 {
                        world.advance(config.frame_dt);
                    }
                    black_box(world.awake_count());
                }
            },
            criterion::BatchSize::LargeInput,
        )
    });
}

fn bench_settled_frame(c: &mut Criterion) {
    let config = BenchConfig::default();
    let Ok(mut world) = PhysicsWorld::new(config.world_config()) else {
        return;
    };
    for _ in 0..config.settle_frames {
        world.advance(config.frame_dt);
    }

    c.bench_function("advance_settled", |b| {
        b.iter(|| {
            world.advance(config.frame_dt);
            black_box(world.contacts().len())
        })
    });
}

criterion_group!(
    benches,
    bench_world_creation,
    bench_falling_frame,
    bench_settled_frame,
);

criterion_main!(benches);
