//! The physics capability consumed by [`PhysicsWorld`](super::PhysicsWorld).
//!
//! A backend owns the actual simulation. The engine only creates shapes and
//! bodies, steps by a fixed delta, and reads back positions and rotations.

use crate::error::PhysicsError;
use crate::math::{Quat, Vec3};

use super::{ColliderShape, MotionType, Rigidbody};

/// Backend-side shape, valid until [`PhysicsBackend::release_shape`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeHandle(pub u32);

/// Backend-side rigid body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle(pub u32);

/// Everything a backend needs to create a body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDesc {
    pub position: Vec3,
    pub rotation: Quat,
    pub motion_type: MotionType,
    pub friction: f32,
    pub restitution: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub gravity_factor: f32,
}

impl BodyDesc {
    /// A body at `position` with identity rotation and the rigidbody's
    /// material and damping.
    pub fn from_rigidbody(rb: &Rigidbody, position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
            motion_type: rb.motion_type,
            friction: rb.friction,
            restitution: rb.restitution,
            linear_damping: rb.linear_damping,
            angular_damping: rb.angular_damping,
            gravity_factor: rb.gravity_factor,
        }
    }
}

/// Snapshot of a body after a step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    /// `false` once the backend has put the body to sleep.
    pub active: bool,
    pub position: Vec3,
    pub rotation: Quat,
}

/// A rigid-body simulation.
///
/// All calls are synchronous from the engine's point of view; a backend may
/// use worker threads internally during [`step`](PhysicsBackend::step).
pub trait PhysicsBackend {
    fn init(&mut self, gravity: Vec3) -> Result<(), PhysicsError>;

    /// Destroy every body and shape.
    fn shutdown(&mut self);

    fn create_shape(&mut self, shape: &ColliderShape) -> Result<ShapeHandle, PhysicsError>;

    /// Release a shape. Bodies already created from it keep working.
    fn release_shape(&mut self, shape: ShapeHandle);

    fn create_body(&mut self, shape: ShapeHandle, desc: &BodyDesc)
    -> Result<BodyHandle, PhysicsError>;

    /// Advance the simulation by exactly `dt` seconds.
    fn step(&mut self, dt: f32);

    fn is_active(&self, body: BodyHandle) -> bool;

    fn position(&self, body: BodyHandle) -> Option<Vec3>;

    fn rotation(&self, body: BodyHandle) -> Option<Quat>;

    fn remove_body(&mut self, body: BodyHandle);

    /// Hint after many bodies were added at once.
    fn optimize_broad_phase(&mut self);
}
