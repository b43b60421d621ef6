//! Read-only transform access and render proxies
//!
//! A [`Proxy`] follows a body for rendering (for example a simplified
//! collision model drawn over the real one). It only refers to the body by
//! handle and copies the committed pose after each step.

use crate::body::{BodyHandle, Pose, RigidBody};
use crate::world::{BodySnapshot, PhysicsWorld};
use glam::{Quat, Vec3};

/// Anything with a position and rotation in 3D space.
///
/// Implemented by:
/// - [`Pose`], [`RigidBody`] and [`BodySnapshot`]
/// - [`Proxy`]
pub trait Object {
    /// Get the current position
    fn position(&self) -> Vec3;

    /// Get the current rotation as a quaternion
    fn rotation(&self) -> Quat;
}

impl Object for Pose {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn rotation(&self) -> Quat {
        self.orientation
    }
}

impl Object for RigidBody {
    fn position(&self) -> Vec3 {
        self.pose.position
    }

    fn rotation(&self) -> Quat {
        self.pose.orientation
    }
}

impl Object for BodySnapshot {
    fn position(&self) -> Vec3 {
        self.pose.position
    }

    fn rotation(&self) -> Quat {
        self.pose.orientation
    }
}

/// Visual stand-in that mirrors a body's pose with a fixed local offset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Proxy {
    body: BodyHandle,
    offset: Pose,
    pose: Pose,
}

impl Proxy {
    pub fn new(body: BodyHandle) -> Self {
        Self::with_offset(body, Pose::IDENTITY)
    }

    /// Proxy placed at `offset` in the body's frame
    pub fn with_offset(body: BodyHandle, offset: Pose) -> Self {
        Self {
            body,
            offset,
            pose: offset,
        }
    }

    pub fn body(&self) -> BodyHandle {
        self.body
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// Copy the body's committed pose. Returns `false` once the body is
    /// gone (after a reset), leaving the last pose in place.
    pub fn sync(&mut self, world: &PhysicsWorld) -> bool {
        match world.body(self.body) {
            Some(body) => {
                self.pose = body.pose().mul_pose(&self.offset);
                true
            }
            None => false,
        }
    }
}

impl Object for Proxy {
    fn position(&self) -> Vec3 {
        self.pose.position
    }

    fn rotation(&self) -> Quat {
        self.pose.orientation
    }
}
