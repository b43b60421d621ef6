//! Headless testbed for the heightfield physics world
//!
//! Loads a TOML configuration, builds a [`PhysicsWorld`], steps it for a
//! fixed number of frames and logs body state along the way.

pub mod config;

pub use config::{load_config, RunConfig, TestbedConfig};

use anyhow::Result;
use coldet_physics::{PhysicsWorld, ShapeKind};
use tracing::{debug, info, warn};

/// Bodies this far below the terrain surface count as fallen through
const FELL_THROUGH_MARGIN: f32 = 1.0;

/// Outcome of a headless run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub steps: u32,
    pub simulated_time: f32,
    /// Resets seen during the run, automatic or otherwise
    pub resets: u32,
    pub body_count: usize,
    pub awake_count: usize,
    /// Dynamic bodies below the terrain surface at the end of the run
    pub fell_through: usize,
    /// Dynamic bodies outside the terrain footprint at the end of the run
    pub off_terrain: usize,
}

/// Run the simulation without graphics, logging body state at intervals
pub fn run_headless(config: &TestbedConfig) -> Result<RunSummary> {
    config.validate()?;
    let run = &config.run;
    let world_config = &config.world;

    info!(
        "[Testbed] gravity {}, fixed step {:.4}s, terrain {}x{} over {:.0} units",
        world_config.gravity,
        world_config.fixed_timestep,
        world_config.terrain.grid_size,
        world_config.terrain.grid_size,
        world_config.terrain.grid_scale
    );
    info!(
        "[Testbed] spawning {} boxes and {} spheres at y = {:.1}",
        world_config.spawning.box_count, world_config.spawning.sphere_count, world_config.spawning.drop_height
    );

    let mut world = PhysicsWorld::new(world_config.clone())?;
    let mut generation = world.generation();
    let mut resets = 0;

    info!("[Testbed] starting simulation: {} steps of {:.4}s", run.steps, run.frame_dt);
    for step in 0..run.steps {
        world.advance(run.frame_dt);

        if world.generation() != generation {
            generation = world.generation();
            resets += 1;
            info!(
                "[Testbed] world reset at step {} (terrain version {})",
                step,
                world.terrain_version()
            );
        }

        let last = step + 1 == run.steps;
        let report = run.log_interval > 0 && step % run.log_interval == 0;
        if report || last {
            log_bodies(&world, step, step as f32 * run.frame_dt);
        }
    }

    let summary = summarize(&world, run.steps, run.steps as f32 * run.frame_dt, resets);
    info!(
        "[Testbed] done: {} bodies, {} awake, {} resets",
        summary.body_count, summary.awake_count, summary.resets
    );
    if summary.fell_through > 0 {
        warn!("[Testbed] {} bodies fell through the terrain", summary.fell_through);
    }
    if summary.off_terrain > 0 {
        info!("[Testbed] {} bodies left the terrain footprint", summary.off_terrain);
    }
    Ok(summary)
}

fn log_bodies(world: &PhysicsWorld, step: u32, time: f32) {
    info!(
        "[Testbed] step {} (t = {:.3}s): {}/{} awake, {} contacts",
        step,
        time,
        world.awake_count(),
        world.body_count(),
        world.contacts().len()
    );
    for (i, snapshot) in world.bodies().iter().enumerate() {
        if snapshot.shape_kind == ShapeKind::Heightfield {
            continue;
        }
        let p = snapshot.pose.position;
        debug!(
            "  [{}] {:?} pos=({:.2}, {:.2}, {:.2}){}",
            i,
            snapshot.shape_kind,
            p.x,
            p.y,
            p.z,
            if snapshot.is_awake { "" } else { " [SLEEPING]" }
        );
    }
}

fn summarize(world: &PhysicsWorld, steps: u32, simulated_time: f32, resets: u32) -> RunSummary {
    let mut fell_through = 0;
    let mut off_terrain = 0;
    for snapshot in world.bodies() {
        if snapshot.shape_kind == ShapeKind::Heightfield {
            continue;
        }
        let p = snapshot.pose.position;
        match world.terrain_height_at(p.x, p.z) {
            Some(surface) if p.y < surface - FELL_THROUGH_MARGIN => fell_through += 1,
            Some(_) => {}
            None => off_terrain += 1,
        }
    }
    RunSummary {
        steps,
        simulated_time,
        resets,
        body_count: world.body_count(),
        awake_count: world.awake_count(),
        fell_through,
        off_terrain,
    }
}
