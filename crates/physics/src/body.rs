//! Rigid bodies and their builder
//!
//! Bodies are created through [`BodyBuilder`] and owned by
//! [`PhysicsWorld`](crate::PhysicsWorld), which hands out [`BodyHandle`]s.

use crate::collider::{CollisionShape, ShapeKind};
use crate::collision::Aabb;
use crate::error::{PhysicsError, Result};
use glam::{Mat3, Quat, Vec3};
use std::sync::Arc;

/// Position and orientation of a body
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        position: Vec3::ZERO,
        orientation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY)
    }

    /// Map a point from body space to world space
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.position + self.orientation * point
    }

    /// Map a world-space point into body space
    pub fn inverse_transform_point(&self, point: Vec3) -> Vec3 {
        self.orientation.inverse() * (point - self.position)
    }

    /// Compose: `self` applied after `local`
    pub fn mul_pose(&self, local: &Pose) -> Pose {
        Pose {
            position: self.transform_point(local.position),
            orientation: (self.orientation * local.orientation).normalize(),
        }
    }
}

/// Collision filtering bitmasks.
///
/// Two bodies interact only if each one's mask contains the other's group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollisionGroups {
    pub group: u16,
    pub mask: u16,
}

impl CollisionGroups {
    /// Static terrain
    pub const GROUND: u16 = 1 << 8;
    /// Dynamic objects
    pub const OBJECT: u16 = 1 << 9;
    pub const ALL: u16 = u16::MAX;

    pub const fn new(group: u16, mask: u16) -> Self {
        Self { group, mask }
    }

    pub fn interacts_with(&self, other: &CollisionGroups) -> bool {
        self.mask & other.group != 0 && other.mask & self.group != 0
    }
}

impl Default for CollisionGroups {
    fn default() -> Self {
        Self::new(Self::OBJECT, Self::ALL)
    }
}

/// Identifies a body inside one world generation.
///
/// A reset bumps the generation, so handles from before it no longer resolve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl BodyHandle {
    /// Position of the body in creation order
    pub fn index(&self) -> usize {
        self.index as usize
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

/// A simulated body: shared shape, mass properties, pose, velocities and
/// sleep state.
///
/// A mass of 0 makes the body static. Static bodies never move and are
/// never reported as awake.
#[derive(Debug, Clone)]
pub struct RigidBody {
    shape: Arc<CollisionShape>,
    mass: f32,
    inverse_mass: f32,
    inverse_inertia_local: Vec3,
    pub(crate) pose: Pose,
    pub(crate) linear_velocity: Vec3,
    pub(crate) angular_velocity: Vec3,
    restitution: f32,
    friction: f32,
    groups: CollisionGroups,
    awake: bool,
    pub(crate) sleep_timer: f32,
    aabb: Aabb,
}

impl RigidBody {
    pub fn shape(&self) -> &Arc<CollisionShape> {
        &self.shape
    }

    pub fn shape_kind(&self) -> ShapeKind {
        self.shape.kind()
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn inverse_mass(&self) -> f32 {
        self.inverse_mass
    }

    pub fn is_static(&self) -> bool {
        self.mass == 0.0
    }

    pub fn is_dynamic(&self) -> bool {
        !self.is_static()
    }

    /// Dynamic and awake: integrated each step
    pub fn is_active(&self) -> bool {
        self.is_dynamic() && self.awake
    }

    /// Always false for static bodies
    pub fn is_awake(&self) -> bool {
        self.is_active()
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn position(&self) -> Vec3 {
        self.pose.position
    }

    pub fn orientation(&self) -> Quat {
        self.pose.orientation
    }

    pub fn linear_velocity(&self) -> Vec3 {
        self.linear_velocity
    }

    pub fn angular_velocity(&self) -> Vec3 {
        self.angular_velocity
    }

    pub fn restitution(&self) -> f32 {
        self.restitution
    }

    pub fn friction(&self) -> f32 {
        self.friction
    }

    pub fn groups(&self) -> CollisionGroups {
        self.groups
    }

    /// Cached world-space bounding box, refreshed by the world every step
    pub fn world_aabb(&self) -> Aabb {
        self.aabb
    }

    /// Teleport the body and wake it up
    pub fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
        self.update_aabb();
        self.wake_up();
    }

    pub fn set_linear_velocity(&mut self, velocity: Vec3) {
        if self.is_dynamic() {
            self.linear_velocity = velocity;
            self.wake_up();
        }
    }

    pub fn set_angular_velocity(&mut self, velocity: Vec3) {
        if self.is_dynamic() {
            self.angular_velocity = velocity;
            self.wake_up();
        }
    }

    pub fn wake_up(&mut self) {
        if self.is_dynamic() {
            self.awake = true;
            self.sleep_timer = 0.0;
        }
    }

    /// Put the body to sleep, dropping its velocity
    pub fn sleep(&mut self) {
        self.awake = false;
        self.sleep_timer = 0.0;
        self.linear_velocity = Vec3::ZERO;
        self.angular_velocity = Vec3::ZERO;
    }

    /// World-space inverse inertia tensor `R · I⁻¹ · Rᵀ`
    pub fn inverse_inertia_world(&self) -> Mat3 {
        let rotation = Mat3::from_quat(self.pose.orientation);
        rotation * Mat3::from_diagonal(self.inverse_inertia_local) * rotation.transpose()
    }

    /// Velocity of the body material at world point `point`
    pub fn velocity_at(&self, point: Vec3) -> Vec3 {
        self.linear_velocity + self.angular_velocity.cross(point - self.pose.position)
    }

    /// Apply an impulse at world point `point`. No-op for static bodies.
    pub fn apply_impulse(&mut self, impulse: Vec3, point: Vec3) {
        if self.is_static() {
            return;
        }
        self.linear_velocity += impulse * self.inverse_mass;
        let arm = point - self.pose.position;
        self.angular_velocity += self.inverse_inertia_world() * arm.cross(impulse);
    }

    pub(crate) fn update_aabb(&mut self) {
        self.aabb = self
            .shape
            .local_aabb()
            .to_world(self.pose.position, self.pose.orientation);
    }
}

/// Builder for [`RigidBody`]
///
/// # Example
/// ```
/// use coldet_physics::{create_sphere_collider, BodyBuilder};
/// use glam::Vec3;
///
/// let ball = create_sphere_collider(4.0).unwrap();
/// let body = BodyBuilder::dynamic(ball, 50.0)
///     .position(Vec3::new(0.0, 30.0, 0.0))
///     .restitution(0.2)
///     .build()
///     .unwrap();
/// assert!(body.is_awake());
/// ```
#[derive(Debug, Clone)]
pub struct BodyBuilder {
    shape: Arc<CollisionShape>,
    mass: f32,
    pose: Pose,
    linear_velocity: Vec3,
    angular_velocity: Vec3,
    restitution: f32,
    friction: f32,
    groups: CollisionGroups,
    sleeping: bool,
    is_static: bool,
}

impl BodyBuilder {
    /// Movable body with the given mass
    pub fn dynamic(shape: Arc<CollisionShape>, mass: f32) -> Self {
        Self {
            shape,
            mass,
            pose: Pose::IDENTITY,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            restitution: 0.0,
            friction: 0.5,
            groups: CollisionGroups::default(),
            sleeping: false,
            is_static: false,
        }
    }

    /// Immovable body (mass 0) in the ground group
    pub fn fixed(shape: Arc<CollisionShape>) -> Self {
        Self {
            is_static: true,
            mass: 0.0,
            groups: CollisionGroups::new(CollisionGroups::GROUND, CollisionGroups::ALL),
            ..Self::dynamic(shape, 0.0)
        }
    }

    pub fn position(mut self, position: Vec3) -> Self {
        self.pose.position = position;
        self
    }

    pub fn orientation(mut self, orientation: Quat) -> Self {
        self.pose.orientation = orientation;
        self
    }

    pub fn linear_velocity(mut self, velocity: Vec3) -> Self {
        self.linear_velocity = velocity;
        self
    }

    pub fn angular_velocity(mut self, velocity: Vec3) -> Self {
        self.angular_velocity = velocity;
        self
    }

    pub fn restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    pub fn friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    pub fn groups(mut self, group: u16, mask: u16) -> Self {
        self.groups = CollisionGroups::new(group, mask);
        self
    }

    /// Start asleep
    pub fn sleeping(mut self) -> Self {
        self.sleeping = true;
        self
    }

    pub fn build(self) -> Result<RigidBody> {
        self.shape.validate()?;
        let is_static = self.is_static;
        if !is_static && !(self.mass.is_finite() && self.mass > 0.0) {
            return Err(PhysicsError::InvalidMass(self.mass));
        }
        if !is_static && !self.shape.is_convex() {
            return Err(PhysicsError::InvalidShape(
                "heightfield shapes can only be attached to static bodies".into(),
            ));
        }

        let (inverse_mass, inverse_inertia_local) = if is_static {
            (0.0, Vec3::ZERO)
        } else {
            let inertia = self.shape.local_inertia(self.mass);
            (1.0 / self.mass, inertia.recip())
        };

        let (linear_velocity, angular_velocity) = if is_static {
            (Vec3::ZERO, Vec3::ZERO)
        } else {
            (self.linear_velocity, self.angular_velocity)
        };

        let mut body = RigidBody {
            shape: self.shape,
            mass: self.mass,
            inverse_mass,
            inverse_inertia_local,
            pose: Pose::new(self.pose.position, self.pose.orientation.normalize()),
            linear_velocity,
            angular_velocity,
            restitution: self.restitution,
            friction: self.friction,
            groups: self.groups,
            awake: !is_static && !self.sleeping,
            sleep_timer: 0.0,
            aabb: Aabb::empty(),
        };
        body.update_aabb();
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collider::{create_box_collider, create_heightfield_collider, create_sphere_collider};
    use coldet_terrain::HeightSampleGrid;

    fn ball() -> Arc<CollisionShape> {
        create_sphere_collider(1.0).unwrap()
    }

    #[test]
    fn test_dynamic_body_creation() {
        let body = BodyBuilder::dynamic(ball(), 2.0)
            .position(Vec3::new(0.0, 5.0, 0.0))
            .build()
            .unwrap();
        assert_eq!(body.position(), Vec3::new(0.0, 5.0, 0.0));
        assert_eq!(body.inverse_mass(), 0.5);
        assert!(body.is_dynamic());
        assert!(body.is_awake());
        assert_eq!(body.shape_kind(), ShapeKind::Sphere);
    }

    #[test]
    fn test_static_body_is_never_awake() {
        let mut body = BodyBuilder::fixed(ball()).build().unwrap();
        assert!(body.is_static());
        assert!(!body.is_awake());
        body.wake_up();
        assert!(!body.is_awake());
        body.set_linear_velocity(Vec3::X);
        assert_eq!(body.linear_velocity(), Vec3::ZERO);
        assert_eq!(body.inverse_inertia_world(), Mat3::ZERO);
    }

    #[test]
    fn test_invalid_mass_rejected() {
        for mass in [0.0, -0.0, -1.0, f32::NAN, f32::INFINITY] {
            assert!(matches!(
                BodyBuilder::dynamic(ball(), mass).build(),
                Err(PhysicsError::InvalidMass(_))
            ));
        }
    }

    #[test]
    fn test_dynamic_heightfield_rejected() {
        let grid = HeightSampleGrid::flat(3, 10.0, 0.0).unwrap();
        let terrain = create_heightfield_collider(grid);
        assert!(matches!(
            BodyBuilder::dynamic(terrain.clone(), 1.0).build(),
            Err(PhysicsError::InvalidShape(_))
        ));
        assert!(BodyBuilder::fixed(terrain).build().is_ok());
    }

    #[test]
    fn test_apply_impulse_at_center() {
        let mut body = BodyBuilder::dynamic(ball(), 2.0).build().unwrap();
        body.apply_impulse(Vec3::new(0.0, 4.0, 0.0), Vec3::ZERO);
        assert_eq!(body.linear_velocity(), Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(body.angular_velocity(), Vec3::ZERO);
    }

    #[test]
    fn test_off_center_impulse_spins() {
        let shape = create_box_collider(Vec3::splat(1.0)).unwrap();
        let mut body = BodyBuilder::dynamic(shape, 1.0).build().unwrap();
        body.apply_impulse(Vec3::Y, Vec3::X);
        // Torque arm x, impulse y: spin about +z
        assert!(body.angular_velocity().z > 0.0);
        assert!(body.velocity_at(Vec3::X).y > body.velocity_at(-Vec3::X).y);
    }

    #[test]
    fn test_sleep_clears_velocity() {
        let mut body = BodyBuilder::dynamic(ball(), 1.0)
            .linear_velocity(Vec3::X)
            .build()
            .unwrap();
        body.sleep();
        assert!(!body.is_awake());
        assert_eq!(body.linear_velocity(), Vec3::ZERO);
        body.set_linear_velocity(Vec3::Y);
        assert!(body.is_awake());
    }

    #[test]
    fn test_aabb_follows_pose() {
        let mut body = BodyBuilder::dynamic(ball(), 1.0)
            .position(Vec3::new(3.0, 0.0, 0.0))
            .build()
            .unwrap();
        assert_eq!(body.world_aabb().min, Vec3::new(2.0, -1.0, -1.0));
        body.set_pose(Pose::from_position(Vec3::new(0.0, 10.0, 0.0)));
        assert_eq!(body.world_aabb().max, Vec3::new(1.0, 11.0, 1.0));
    }

    #[test]
    fn test_group_filtering() {
        let ground = CollisionGroups::new(CollisionGroups::GROUND, CollisionGroups::ALL);
        let object = CollisionGroups::default();
        let loner = CollisionGroups::new(CollisionGroups::OBJECT, CollisionGroups::GROUND);
        assert!(ground.interacts_with(&object));
        assert!(object.interacts_with(&ground));
        assert!(loner.interacts_with(&ground));
        assert!(!loner.interacts_with(&object));
        assert!(!object.interacts_with(&loner));
    }

    #[test]
    fn test_pose_round_trip_point() {
        let pose = Pose::new(Vec3::new(1.0, 2.0, 3.0), Quat::from_rotation_z(0.7));
        let p = Vec3::new(-4.0, 0.5, 2.0);
        let back = pose.inverse_transform_point(pose.transform_point(p));
        assert!((back - p).length() < 1e-5);
    }
}
