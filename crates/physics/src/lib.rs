//! Rigid-body simulation of boxes and spheres over a procedural heightfield.
//!
//! [`PhysicsWorld`] owns the terrain and every body. Each step runs
//! gravity integration, a sweep-and-prune broad phase, shape-pair narrow
//! phase, a sequential-impulse solver and sleep detection.

mod body;
mod broad_phase;
mod collider;
mod collision;
mod config;
mod error;
pub mod narrow_phase;
mod object;
pub mod solver;
pub mod terrain;
mod world;

pub use body::{BodyBuilder, BodyHandle, CollisionGroups, Pose, RigidBody};
pub use broad_phase::{BroadphaseEntry, BroadphaseIndex, CollisionPair};
pub use collider::{
    create_box_collider, create_heightfield_collider, create_sphere_collider, CollisionShape, ShapeKind,
};
pub use collision::{Aabb, Contact};
pub use config::{SleepConfig, SpawnConfig, WorldConfig};
pub use error::{PhysicsError, Result};
pub use object::{Object, Proxy};
pub use terrain::{HeightfieldShape, UpAxis};
pub use world::{BodySnapshot, ContactPair, PhysicsWorld, WorldState};

// Re-export for convenience
pub use coldet_terrain;
pub use glam;
