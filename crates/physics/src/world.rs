use crate::body::{BodyBuilder, BodyHandle, CollisionGroups, Pose, RigidBody};
use crate::broad_phase::BroadphaseIndex;
use crate::collider::{
    create_box_collider, create_heightfield_collider, create_sphere_collider, CollisionShape, ShapeKind,
};
use crate::collision::Contact;
use crate::config::WorldConfig;
use crate::error::Result;
use crate::narrow_phase;
use crate::solver::{self, ContactConstraint, SolverParams};
use coldet_terrain::{HeightSampleGrid, HeightfieldGenerator, Mesh, Terrain, TerrainParams};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Broad-phase margin so resting contacts stay candidates
const AABB_MARGIN: f32 = 0.1;

/// Where the world is in its update cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldState {
    Idle,
    Stepping,
    Resetting,
}

/// Committed state of one body, for rendering
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodySnapshot {
    pub handle: BodyHandle,
    pub pose: Pose,
    pub is_awake: bool,
    pub shape_kind: ShapeKind,
}

/// A contact found during the last step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactPair {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    /// Normal points from `body_b` to `body_a`
    pub contact: Contact,
}

/// Physics simulation world
///
/// Owns the terrain, every body (in creation order, terrain first), the
/// broad phase and the timers driving sub-stepping and periodic resets.
pub struct PhysicsWorld {
    config: WorldConfig,
    solver: SolverParams,
    bodies: Vec<RigidBody>,
    generation: u32,
    broad_phase: BroadphaseIndex,
    contacts: Vec<ContactPair>,
    generator: HeightfieldGenerator,
    terrain_params: TerrainParams,
    terrain: Terrain,
    terrain_version: u64,
    box_shape: Arc<CollisionShape>,
    sphere_shape: Arc<CollisionShape>,
    rng: StdRng,
    state: WorldState,
    elapsed: f32,
    accumulator: f32,
}

impl PhysicsWorld {
    /// Create a world: generate the terrain and drop the configured bodies.
    pub fn new(config: WorldConfig) -> Result<Self> {
        config.validate()?;

        let mut generator = HeightfieldGenerator::new(config.terrain.noise, config.terrain.seed);
        let terrain = generator.generate(&config.terrain)?;
        let box_shape = create_box_collider(Vec3::splat(config.spawning.box_size * 0.5))?;
        let sphere_shape = create_sphere_collider(config.spawning.sphere_diameter * 0.5)?;

        let mut world = Self {
            solver: config.solver_params(),
            bodies: Vec::new(),
            generation: 0,
            broad_phase: BroadphaseIndex::new(AABB_MARGIN),
            contacts: Vec::new(),
            generator,
            terrain_params: config.terrain.clone(),
            terrain,
            terrain_version: 1,
            box_shape,
            sphere_shape,
            rng: StdRng::seed_from_u64(config.seed),
            state: WorldState::Idle,
            elapsed: 0.0,
            accumulator: 0.0,
            config,
        };
        world.populate()?;

        info!(
            "[PhysicsWorld] created with {} bodies, gravity {}",
            world.bodies.len(),
            world.config.gravity
        );
        Ok(world)
    }

    /// Advance the simulation by a frame time of `dt` seconds.
    ///
    /// `dt` is capped at `max_substep`. With a fixed timestep the time is
    /// accumulated and consumed in at most `max_substeps` fixed steps; any
    /// backlog beyond that is dropped. Non-finite or non-positive `dt` is ignored.
    pub fn advance(&mut self, dt: f32) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        let dt = dt.min(self.config.max_substep);

        if self.config.reset_interval > 0.0 {
            self.elapsed += dt;
            if self.elapsed > self.config.reset_interval {
                self.reset();
            }
        }

        let fixed = self.config.fixed_timestep;
        if fixed <= 0.0 {
            self.step(dt);
            return;
        }

        self.accumulator += dt;
        let mut steps = 0;
        while self.accumulator >= fixed * (1.0 - 1e-4) && steps < self.config.max_substeps {
            self.step(fixed);
            self.accumulator -= fixed;
            steps += 1;
        }
        self.accumulator = self.accumulator.clamp(0.0, fixed);
    }

    /// One simulation step of length `dt`
    pub fn step(&mut self, dt: f32) {
        self.state = WorldState::Stepping;

        self.integrate_velocities(dt);

        self.broad_phase.rebuild(&self.bodies);
        let pairs = self.broad_phase.candidate_pairs();

        let mut constraints: Vec<ContactConstraint> = pairs
            .iter()
            .filter_map(|&(a, b)| {
                narrow_phase::contact(&self.bodies[a], &self.bodies[b])
                    .map(|contact| ContactConstraint::new(&self.bodies, a, b, contact, &self.solver))
            })
            .collect();

        solver::solve_velocities(&mut self.bodies, &mut constraints, self.solver.iterations);
        self.settle_sleepers();
        solver::correct_positions(&mut self.bodies, &constraints, &self.solver);

        self.integrate_positions(dt);
        self.update_sleep(dt);
        for body in &mut self.bodies {
            body.update_aabb();
        }

        let generation = self.generation;
        let handle = |index: usize| BodyHandle {
            index: index as u32,
            generation,
        };
        self.contacts = constraints
            .iter()
            .map(|c| ContactPair {
                body_a: handle(c.body_a),
                body_b: handle(c.body_b),
                contact: c.contact,
            })
            .collect();

        debug!(
            "[PhysicsWorld] step {:.4}s: {} pairs, {} contacts, {} awake",
            dt,
            pairs.len(),
            self.contacts.len(),
            self.awake_count()
        );
        self.state = WorldState::Idle;
    }

    /// Regenerate the terrain and respawn every body.
    ///
    /// The terrain seed advances first when `reseed_on_reset` is set. If the
    /// new terrain cannot be generated the previous one is kept. Handles from
    /// before the reset stop resolving.
    pub fn reset(&mut self) {
        self.state = WorldState::Resetting;

        let mut params = self.terrain_params.clone();
        if self.config.reseed_on_reset {
            params.seed = params.seed.wrapping_add(1);
        }
        match self.generator.generate(&params) {
            Ok(terrain) => {
                self.terrain = terrain;
                self.terrain_params = params;
                self.terrain_version += 1;
            }
            Err(err) => {
                warn!("[PhysicsWorld] terrain regeneration failed ({err}), keeping previous terrain");
            }
        }

        if let Err(err) = self.populate() {
            warn!("[PhysicsWorld] respawning bodies failed: {err}");
        }
        self.elapsed = 0.0;
        self.accumulator = 0.0;

        info!(
            "[PhysicsWorld] reset: terrain v{} (seed {}), {} bodies",
            self.terrain_version,
            self.terrain_params.seed,
            self.bodies.len()
        );
        self.state = WorldState::Idle;
    }

    /// Parameters for the next terrain regeneration
    pub fn set_terrain_params(&mut self, params: TerrainParams) {
        self.terrain_params = params;
    }

    /// Add a body and return its handle
    pub fn add_body(&mut self, mut body: RigidBody) -> BodyHandle {
        body.update_aabb();
        self.bodies.push(body);
        self.handle(self.bodies.len() - 1)
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&RigidBody> {
        self.resolve(handle).map(|i| &self.bodies[i])
    }

    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut RigidBody> {
        self.resolve(handle).map(|i| &mut self.bodies[i])
    }

    /// Snapshot of every body in creation order
    pub fn bodies(&self) -> Vec<BodySnapshot> {
        self.bodies
            .iter()
            .enumerate()
            .map(|(i, body)| BodySnapshot {
                handle: self.handle(i),
                pose: body.pose(),
                is_awake: body.is_awake(),
                shape_kind: body.shape_kind(),
            })
            .collect()
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn awake_count(&self) -> usize {
        self.bodies.iter().filter(|b| b.is_awake()).count()
    }

    /// Contacts found by the last step
    pub fn contacts(&self) -> &[ContactPair] {
        &self.contacts
    }

    pub fn state(&self) -> WorldState {
        self.state
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn gravity(&self) -> Vec3 {
        self.config.gravity
    }

    /// Simulated time since the last reset
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Bumped on every reset
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Render mesh of the current terrain
    pub fn terrain_mesh(&self) -> &Mesh {
        &self.terrain.mesh
    }

    pub fn terrain_grid(&self) -> &HeightSampleGrid {
        &self.terrain.grid
    }

    /// Incremented whenever the terrain is regenerated
    pub fn terrain_version(&self) -> u64 {
        self.terrain_version
    }

    /// Surface height below world `(x, z)`, or `None` off the terrain
    pub fn terrain_height_at(&self, x: f32, z: f32) -> Option<f32> {
        let terrain = self.bodies.iter().find(|b| b.shape_kind() == ShapeKind::Heightfield)?;
        let heightfield = terrain.shape().as_heightfield()?;
        let pose = terrain.pose();
        let frame = Pose::new(pose.position, pose.orientation * heightfield.up_axis().frame());
        let local = frame.inverse_transform_point(Vec3::new(x, pose.position.y, z));
        let height = heightfield.height_at(local.x, local.z)?;
        Some(frame.transform_point(Vec3::new(local.x, height, local.z)).y)
    }

    fn handle(&self, index: usize) -> BodyHandle {
        BodyHandle {
            index: index as u32,
            generation: self.generation,
        }
    }

    fn resolve(&self, handle: BodyHandle) -> Option<usize> {
        let index = handle.index();
        (handle.generation == self.generation && index < self.bodies.len()).then_some(index)
    }

    /// Replace every body with the terrain plus freshly dropped boxes and spheres
    fn populate(&mut self) -> Result<()> {
        self.bodies.clear();
        self.contacts.clear();
        self.generation = self.generation.wrapping_add(1);

        let ground = BodyBuilder::fixed(create_heightfield_collider(self.terrain.grid.clone()))
            .restitution(self.config.terrain_restitution)
            .friction(self.config.friction)
            .groups(CollisionGroups::GROUND, CollisionGroups::ALL)
            .build()?;
        self.add_body(ground);

        let spawn = self.config.spawning.clone();
        for _ in 0..spawn.box_count {
            let position = self.spawn_position(spawn.spawn_range, spawn.drop_height);
            let body = BodyBuilder::dynamic(self.box_shape.clone(), spawn.box_mass)
                .position(position)
                .restitution(spawn.box_restitution)
                .friction(self.config.friction)
                .groups(CollisionGroups::OBJECT, CollisionGroups::ALL)
                .build()?;
            self.add_body(body);
        }
        for _ in 0..spawn.sphere_count {
            let position = self.spawn_position(spawn.spawn_range, spawn.drop_height);
            let body = BodyBuilder::dynamic(self.sphere_shape.clone(), spawn.sphere_mass)
                .position(position)
                .restitution(spawn.sphere_restitution)
                .friction(self.config.friction)
                .groups(CollisionGroups::OBJECT, CollisionGroups::ALL)
                .build()?;
            self.add_body(body);
        }

        self.broad_phase.rebuild(&self.bodies);
        Ok(())
    }

    fn spawn_position(&mut self, range: f32, height: f32) -> Vec3 {
        if range <= 0.0 {
            return Vec3::new(0.0, height, 0.0);
        }
        let x = self.rng.random_range(-range..range);
        let z = self.rng.random_range(-range..range);
        Vec3::new(x, height, z)
    }

    fn integrate_velocities(&mut self, dt: f32) {
        let gravity = self.config.gravity * dt;
        let linear_damping = 1.0 / (1.0 + dt * self.config.linear_damping);
        let angular_damping = 1.0 / (1.0 + dt * self.config.angular_damping);
        for body in self.bodies.iter_mut().filter(|b| b.is_active()) {
            body.linear_velocity = (body.linear_velocity + gravity) * linear_damping;
            body.angular_velocity *= angular_damping;
        }
    }

    /// Sleeping bodies pushed hard enough by the solver wake up; the rest
    /// drop whatever velocity the solver gave them
    fn settle_sleepers(&mut self) {
        let sleep = &self.config.sleep;
        for (index, body) in self.bodies.iter_mut().enumerate() {
            if !body.is_dynamic() || body.is_awake() {
                continue;
            }
            if body.linear_velocity.length() > sleep.linear_threshold
                || body.angular_velocity.length() > sleep.angular_threshold
            {
                body.wake_up();
                debug!("[PhysicsWorld] body {} woken by contact", index);
            } else {
                body.linear_velocity = Vec3::ZERO;
                body.angular_velocity = Vec3::ZERO;
            }
        }
    }

    fn integrate_positions(&mut self, dt: f32) {
        for body in self.bodies.iter_mut().filter(|b| b.is_active()) {
            body.pose.position += body.linear_velocity * dt;
            body.pose.orientation =
                solver::integrate_rotation(body.pose.orientation, body.angular_velocity, dt);
        }
    }

    fn update_sleep(&mut self, dt: f32) {
        let sleep = &self.config.sleep;
        if !sleep.enabled {
            return;
        }
        for body in self.bodies.iter_mut().filter(|b| b.is_active()) {
            if body.linear_velocity.length() < sleep.linear_threshold
                && body.angular_velocity.length() < sleep.angular_threshold
            {
                body.sleep_timer += dt;
                if body.sleep_timer >= sleep.time_to_sleep {
                    body.sleep();
                }
            } else {
                body.sleep_timer = 0.0;
            }
        }
    }
}
