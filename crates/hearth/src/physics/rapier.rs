//! [`PhysicsBackend`] implemented on [Rapier](https://rapier.rs).
//!
//! Enabled with the `physics3d` feature.
//!
//! ```ignore
//! let world = World::builder()
//!     .physics_backend(RapierBackend::new())
//!     .build();
//! ```
//!
//! Planes are simulated as a thin box of `half_extent` whose top face lies on
//! the plane. Only planes facing straight up are supported; any other normal
//! is reported as an unsupported shape.

use std::collections::HashMap;

use rapier3d::prelude::*;

use super::{BodyDesc, BodyHandle, ColliderShape, MotionType, PhysicsBackend, ShapeHandle};
use crate::error::PhysicsError;
use crate::math::{Quat, Vec3};

/// Half thickness of the slab standing in for a plane.
const PLANE_HALF_THICKNESS: f32 = 0.05;

// ── Conversion helpers ──────────────────────────────────────────────────

fn motion_type_to_rapier(motion: MotionType) -> RigidBodyType {
    match motion {
        MotionType::Static => RigidBodyType::Fixed,
        MotionType::Kinematic => RigidBodyType::KinematicPositionBased,
        MotionType::Dynamic => RigidBodyType::Dynamic,
    }
}

/// Convert a glam Quat to a scaled-axis-angle Vec3 (for RigidBodyBuilder::rotation).
fn quat_to_scaled_axis(q: Quat) -> Vec3 {
    let (axis, angle) = q.to_axis_angle();
    axis * angle
}

/// A shape plus the local offset its collider is attached with.
struct ShapeEntry {
    shape: SharedShape,
    offset: Vec3,
}

fn build_shape(shape: &ColliderShape) -> Result<ShapeEntry, PhysicsError> {
    shape.validate()?;
    let entry = match *shape {
        ColliderShape::Box { half_extents } => ShapeEntry {
            shape: SharedShape::cuboid(half_extents.x, half_extents.y, half_extents.z),
            offset: Vec3::ZERO,
        },
        ColliderShape::Sphere { radius } => ShapeEntry {
            shape: SharedShape::ball(radius),
            offset: Vec3::ZERO,
        },
        ColliderShape::Capsule {
            half_height,
            radius,
        } => ShapeEntry {
            shape: SharedShape::capsule_y(half_height, radius),
            offset: Vec3::ZERO,
        },
        ColliderShape::Cylinder {
            half_height,
            radius,
        } => ShapeEntry {
            shape: SharedShape::cylinder(half_height, radius),
            offset: Vec3::ZERO,
        },
        ColliderShape::Plane {
            normal,
            distance,
            half_extent,
        } => {
            if normal.normalize().dot(Vec3::Y) < 0.999 {
                return Err(PhysicsError::UnsupportedShape(format!(
                    "plane with normal {normal} (only +Y planes are supported)"
                )));
            }
            ShapeEntry {
                shape: SharedShape::cuboid(half_extent, PLANE_HALF_THICKNESS, half_extent),
                offset: Vec3::new(0.0, distance - PLANE_HALF_THICKNESS, 0.0),
            }
        }
    };
    Ok(entry)
}

// ── Backend ─────────────────────────────────────────────────────────────

/// Rapier simulation state plus the handle tables the engine addresses it by.
pub struct RapierBackend {
    gravity: Vec3,
    pipeline: PhysicsPipeline,
    params: IntegrationParameters,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    shapes: HashMap<ShapeHandle, ShapeEntry>,
    handles: HashMap<BodyHandle, RigidBodyHandle>,
    next_id: u32,
}

impl std::fmt::Debug for RapierBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RapierBackend")
            .field("gravity", &self.gravity)
            .field("bodies", &self.bodies.len())
            .field("colliders", &self.colliders.len())
            .finish()
    }
}

impl RapierBackend {
    pub fn new() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.81, 0.0),
            pipeline: PhysicsPipeline::new(),
            params: IntegrationParameters::default(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            shapes: HashMap::new(),
            handles: HashMap::new(),
            next_id: 0,
        }
    }

    fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn body(&self, body: BodyHandle) -> Option<&RigidBody> {
        self.bodies.get(*self.handles.get(&body)?)
    }
}

impl Default for RapierBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsBackend for RapierBackend {
    fn init(&mut self, gravity: Vec3) -> Result<(), PhysicsError> {
        if !gravity.is_finite() {
            return Err(PhysicsError::InitFailed(format!("invalid gravity {gravity}")));
        }
        self.gravity = gravity;
        Ok(())
    }

    fn shutdown(&mut self) {
        let gravity = self.gravity;
        *self = Self::new();
        self.gravity = gravity;
    }

    fn create_shape(&mut self, shape: &ColliderShape) -> Result<ShapeHandle, PhysicsError> {
        let entry = build_shape(shape)?;
        let handle = ShapeHandle(self.next_id());
        self.shapes.insert(handle, entry);
        Ok(handle)
    }

    fn release_shape(&mut self, shape: ShapeHandle) {
        self.shapes.remove(&shape);
    }

    fn create_body(
        &mut self,
        shape: ShapeHandle,
        desc: &BodyDesc,
    ) -> Result<BodyHandle, PhysicsError> {
        let entry = self
            .shapes
            .get(&shape)
            .ok_or(PhysicsError::UnknownShape(shape.0))?;

        let rb = RigidBodyBuilder::new(motion_type_to_rapier(desc.motion_type))
            .translation(desc.position)
            .rotation(quat_to_scaled_axis(desc.rotation))
            .gravity_scale(desc.gravity_factor)
            .linear_damping(desc.linear_damping)
            .angular_damping(desc.angular_damping)
            .build();
        let collider = ColliderBuilder::new(entry.shape.clone())
            .position(Pose::from_parts(entry.offset, Quat::IDENTITY))
            .friction(desc.friction)
            .restitution(desc.restitution)
            .build();

        let rapier_handle = self.bodies.insert(rb);
        self.colliders
            .insert_with_parent(collider, rapier_handle, &mut self.bodies);

        let handle = BodyHandle(self.next_id());
        self.handles.insert(handle, rapier_handle);
        Ok(handle)
    }

    fn step(&mut self, dt: f32) {
        self.params.dt = dt;
        self.pipeline.step(
            self.gravity,
            &self.params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            &(),
            &(),
        );
    }

    fn is_active(&self, body: BodyHandle) -> bool {
        self.body(body).is_some_and(|b| !b.is_sleeping())
    }

    fn position(&self, body: BodyHandle) -> Option<Vec3> {
        self.body(body).map(|b| b.translation())
    }

    fn rotation(&self, body: BodyHandle) -> Option<Quat> {
        self.body(body).map(|b| *b.rotation())
    }

    fn remove_body(&mut self, body: BodyHandle) {
        let Some(handle) = self.handles.remove(&body) else {
            return;
        };
        self.bodies.remove(
            handle,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }

    fn optimize_broad_phase(&mut self) {
        // Rapier rebuilds its broad phase incrementally during `step`.
        log::trace!("Broad phase: {} colliders", self.colliders.len());
    }
}
