//! Sequential-impulse contact solver
//!
//! One contact per body pair, solved for a fixed number of iterations with
//! accumulated impulse clamping, then a positional correction pass.

use crate::body::RigidBody;
use crate::collision::Contact;
use glam::{Quat, Vec3};

/// Solver tuning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverParams {
    pub iterations: usize,
    /// Approach speed below which contacts do not bounce
    pub restitution_threshold: f32,
    /// Fraction of penetration removed per step
    pub position_correction: f32,
    /// Penetration allowed without correction
    pub slop: f32,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            iterations: 5,
            restitution_threshold: 1.0,
            position_correction: 0.8,
            slop: 0.01,
        }
    }
}

/// A contact prepared for solving.
///
/// `contact.normal` points from `body_b` to `body_a`.
#[derive(Debug, Clone, Copy)]
pub struct ContactConstraint {
    pub body_a: usize,
    pub body_b: usize,
    pub contact: Contact,
    /// Accumulated normal impulse
    pub normal_impulse: f32,
    /// Accumulated tangent impulses (two friction directions)
    pub tangent_impulse: [f32; 2],
    arm_a: Vec3,
    arm_b: Vec3,
    normal_mass: f32,
    tangents: [Vec3; 2],
    tangent_mass: [f32; 2],
    velocity_bias: f32,
    friction: f32,
}

impl ContactConstraint {
    pub fn new(
        bodies: &[RigidBody],
        body_a: usize,
        body_b: usize,
        contact: Contact,
        params: &SolverParams,
    ) -> Self {
        let a = &bodies[body_a];
        let b = &bodies[body_b];
        let normal = contact.normal;
        let arm_a = contact.point - a.position();
        let arm_b = contact.point - b.position();
        let (t1, t2) = normal.any_orthonormal_pair();

        let relative = a.velocity_at(contact.point) - b.velocity_at(contact.point);
        let approach = relative.dot(normal);
        let restitution = a.restitution() * b.restitution();
        let velocity_bias = if approach < -params.restitution_threshold {
            -restitution * approach
        } else {
            0.0
        };

        Self {
            body_a,
            body_b,
            contact,
            normal_impulse: 0.0,
            tangent_impulse: [0.0; 2],
            arm_a,
            arm_b,
            normal_mass: effective_mass(a, b, arm_a, arm_b, normal),
            tangents: [t1, t2],
            tangent_mass: [
                effective_mass(a, b, arm_a, arm_b, t1),
                effective_mass(a, b, arm_a, arm_b, t2),
            ],
            velocity_bias,
            friction: a.friction() * b.friction(),
        }
    }

    fn solve(&mut self, a: &mut RigidBody, b: &mut RigidBody) {
        let point = self.contact.point;
        let normal = self.contact.normal;

        let relative = a.velocity_at(point) - b.velocity_at(point);
        let lambda = self.normal_mass * (self.velocity_bias - relative.dot(normal));
        let accumulated = (self.normal_impulse + lambda).max(0.0);
        let delta = accumulated - self.normal_impulse;
        self.normal_impulse = accumulated;
        apply_pair(a, b, normal * delta, self.arm_a, self.arm_b);

        let max_friction = self.friction * self.normal_impulse;
        for i in 0..2 {
            let tangent = self.tangents[i];
            let relative = a.velocity_at(point) - b.velocity_at(point);
            let lambda = -self.tangent_mass[i] * relative.dot(tangent);
            let accumulated = (self.tangent_impulse[i] + lambda).clamp(-max_friction, max_friction);
            let delta = accumulated - self.tangent_impulse[i];
            self.tangent_impulse[i] = accumulated;
            apply_pair(a, b, tangent * delta, self.arm_a, self.arm_b);
        }
    }
}

fn effective_mass(a: &RigidBody, b: &RigidBody, arm_a: Vec3, arm_b: Vec3, dir: Vec3) -> f32 {
    let angular = |body: &RigidBody, arm: Vec3| {
        (body.inverse_inertia_world() * arm.cross(dir)).cross(arm).dot(dir)
    };
    let k = a.inverse_mass() + b.inverse_mass() + angular(a, arm_a) + angular(b, arm_b);
    if k > f32::EPSILON {
        1.0 / k
    } else {
        0.0
    }
}

fn apply_pair(a: &mut RigidBody, b: &mut RigidBody, impulse: Vec3, arm_a: Vec3, arm_b: Vec3) {
    a.apply_impulse(impulse, a.position() + arm_a);
    b.apply_impulse(-impulse, b.position() + arm_b);
}

/// Two distinct bodies borrowed mutably
fn pair_mut(bodies: &mut [RigidBody], a: usize, b: usize) -> (&mut RigidBody, &mut RigidBody) {
    debug_assert_ne!(a, b);
    if a < b {
        let (lo, hi) = bodies.split_at_mut(b);
        (&mut lo[a], &mut hi[0])
    } else {
        let (lo, hi) = bodies.split_at_mut(a);
        (&mut hi[0], &mut lo[b])
    }
}

/// Run the velocity iterations over all constraints in order
pub fn solve_velocities(bodies: &mut [RigidBody], constraints: &mut [ContactConstraint], iterations: usize) {
    for _ in 0..iterations {
        for constraint in constraints.iter_mut() {
            let (a, b) = pair_mut(bodies, constraint.body_a, constraint.body_b);
            constraint.solve(a, b);
        }
    }
}

/// Push penetrating bodies apart. Static and sleeping bodies do not move.
pub fn correct_positions(bodies: &mut [RigidBody], constraints: &[ContactConstraint], params: &SolverParams) {
    for constraint in constraints {
        let (a, b) = pair_mut(bodies, constraint.body_a, constraint.body_b);
        let weight_a = if a.is_active() { a.inverse_mass() } else { 0.0 };
        let weight_b = if b.is_active() { b.inverse_mass() } else { 0.0 };
        let total = weight_a + weight_b;
        let excess = constraint.contact.depth - params.slop;
        if total <= 0.0 || excess <= 0.0 {
            continue;
        }
        let correction = constraint.contact.normal * (excess * params.position_correction / total);
        a.pose.position += correction * weight_a;
        b.pose.position -= correction * weight_b;
    }
}

/// Advance an orientation by angular velocity `omega` over `dt`:
/// `q + dt/2 · (ω, 0) ⊗ q`, renormalised
pub fn integrate_rotation(rotation: Quat, omega: Vec3, dt: f32) -> Quat {
    let spin = Quat::from_xyzw(omega.x, omega.y, omega.z, 0.0) * rotation;
    let next = Quat::from_xyzw(
        rotation.x + spin.x * 0.5 * dt,
        rotation.y + spin.y * 0.5 * dt,
        rotation.z + spin.z * 0.5 * dt,
        rotation.w + spin.w * 0.5 * dt,
    );
    let length = next.length();
    if length > f32::EPSILON && length.is_finite() {
        next / length
    } else {
        rotation
    }
}
