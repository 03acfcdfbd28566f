//! # Physics Synchronization
//!
//! Rigid-body and collider components that are mirrored into an external
//! [`PhysicsBackend`]. Attach [`Rigidbody`], [`Collider`] and
//! [`Transform`](crate::math::Transform) to an entity and
//! [`physics_system`] does the rest:
//!
//! ```text
//! physics_system (once per frame)
//!   1. Create: Rigidbody + Collider + Transform without a body
//!              → shape → body at Transform.position, identity rotation
//!   2. Step:   accumulator += dt
//!              while accumulator ≥ step and steps < max: step, subtract
//!              accumulator > max · step → discard
//!   3. Sync:   non-static, active bodies → Transform position + rotation
//! ```
//!
//! ## Failure Modes
//!
//! - Backend fails to initialize: logged once, the backend is dropped and
//!   every physics call becomes a no-op for the rest of the session.
//! - A shape or body the backend can't build: the entity is skipped (warned
//!   the first time) and retried on the next frame. The creation latch only
//!   flips on success.
//!
//! Sleeping bodies are not read back, so a body that falls asleep keeps the
//! transform from its last active step.

pub mod backend;
#[cfg(test)]
pub(crate) mod mock;
#[cfg(feature = "physics3d")]
pub mod rapier;

use std::collections::{HashMap, HashSet};

pub use backend::{BodyDesc, BodyHandle, BodyState, PhysicsBackend, ShapeHandle};

use crate::config::PhysicsConfig;
use crate::ecs::{Entity, World};
use crate::error::PhysicsError;
use crate::math::{Color, Transform, Vec3, quat_to_euler_degrees};

// ── Components ──────────────────────────────────────────────────────────

/// How the backend moves a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotionType {
    /// Never moves.
    Static,
    /// Moved by the game, not by forces.
    Kinematic,
    /// Driven by gravity, contacts and forces.
    #[default]
    Dynamic,
}

/// A rigid body mirrored into the physics backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Rigidbody {
    pub motion_type: MotionType,
    pub friction: f32,
    pub restitution: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub gravity_factor: f32,
    body: Option<BodyHandle>,
    body_created: bool,
}

impl Rigidbody {
    /// A dynamic body affected by gravity and contacts.
    pub fn dynamic() -> Self {
        Self {
            motion_type: MotionType::Dynamic,
            friction: 0.5,
            restitution: 0.3,
            linear_damping: 0.05,
            angular_damping: 0.05,
            gravity_factor: 1.0,
            body: None,
            body_created: false,
        }
    }

    /// A static body that never moves.
    pub fn fixed() -> Self {
        Self {
            motion_type: MotionType::Static,
            ..Self::dynamic()
        }
    }

    pub fn kinematic() -> Self {
        Self {
            motion_type: MotionType::Kinematic,
            ..Self::dynamic()
        }
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    pub fn with_damping(mut self, linear: f32, angular: f32) -> Self {
        self.linear_damping = linear;
        self.angular_damping = angular;
        self
    }

    pub fn with_gravity_factor(mut self, factor: f32) -> Self {
        self.gravity_factor = factor;
        self
    }

    /// The backend body, once created.
    pub fn body(&self) -> Option<BodyHandle> {
        self.body
    }

    /// One-way latch: `true` once a backend body exists for this component.
    pub fn is_body_created(&self) -> bool {
        self.body_created
    }
}

impl Default for Rigidbody {
    fn default() -> Self {
        Self::dynamic()
    }
}

/// Collision geometry. Dimensions are half sizes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColliderShape {
    Box { half_extents: Vec3 },
    Sphere { radius: f32 },
    /// Y-aligned capsule; `half_height` excludes the end caps.
    Capsule { half_height: f32, radius: f32 },
    /// Y-aligned cylinder.
    Cylinder { half_height: f32, radius: f32 },
    /// Infinite plane `normal · p = distance`, simulated as a slab of
    /// `half_extent` around the origin.
    Plane {
        normal: Vec3,
        distance: f32,
        half_extent: f32,
    },
}

impl ColliderShape {
    /// Reject dimensions no backend can build.
    pub fn validate(&self) -> Result<(), PhysicsError> {
        let positive = |name: &str, v: f32| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(PhysicsError::InvalidShape(format!("{name} must be positive, got {v}")))
            }
        };
        match *self {
            ColliderShape::Box { half_extents } => {
                positive("half_extents.x", half_extents.x)?;
                positive("half_extents.y", half_extents.y)?;
                positive("half_extents.z", half_extents.z)
            }
            ColliderShape::Sphere { radius } => positive("radius", radius),
            ColliderShape::Capsule { half_height, radius }
            | ColliderShape::Cylinder { half_height, radius } => {
                positive("half_height", half_height)?;
                positive("radius", radius)
            }
            ColliderShape::Plane {
                normal,
                half_extent,
                ..
            } => {
                if !normal.is_finite() || normal.length_squared() < 1e-6 {
                    return Err(PhysicsError::InvalidShape(format!(
                        "plane normal {normal} is degenerate"
                    )));
                }
                positive("half_extent", half_extent)
            }
        }
    }
}

/// Collision shape plus the color its debug wireframe is drawn in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    pub shape: ColliderShape,
    pub debug_color: Color,
}

impl Collider {
    /// A box collider (half-extents).
    pub fn cuboid(hx: f32, hy: f32, hz: f32) -> Self {
        Self::from_shape(ColliderShape::Box {
            half_extents: Vec3::new(hx, hy, hz),
        })
    }

    pub fn sphere(radius: f32) -> Self {
        Self::from_shape(ColliderShape::Sphere { radius })
    }

    pub fn capsule(half_height: f32, radius: f32) -> Self {
        Self::from_shape(ColliderShape::Capsule {
            half_height,
            radius,
        })
    }

    pub fn cylinder(half_height: f32, radius: f32) -> Self {
        Self::from_shape(ColliderShape::Cylinder {
            half_height,
            radius,
        })
    }

    /// A ground plane with a 100 unit half extent.
    pub fn plane(normal: Vec3, distance: f32) -> Self {
        Self::from_shape(ColliderShape::Plane {
            normal,
            distance,
            half_extent: 100.0,
        })
    }

    pub fn from_shape(shape: ColliderShape) -> Self {
        Self {
            shape,
            debug_color: Color::GREEN,
        }
    }

    pub fn with_debug_color(mut self, color: Color) -> Self {
        self.debug_color = color;
        self
    }
}

impl Default for Collider {
    fn default() -> Self {
        Self::cuboid(0.5, 0.5, 0.5)
    }
}

// ── Physics world ───────────────────────────────────────────────────────

/// Owns the backend, the fixed-timestep accumulator and the entity → body map.
pub struct PhysicsWorld {
    /// `None` when no backend was attached or it failed to initialize.
    backend: Option<Box<dyn PhysicsBackend>>,
    gravity: Vec3,
    fixed_timestep: f32,
    max_steps: u32,
    accumulator: f32,
    bodies: HashMap<Entity, BodyHandle>,
    /// Entities whose last creation attempt failed (warned once each).
    failed: HashSet<Entity>,
    steps_last_frame: u32,
}

impl std::fmt::Debug for PhysicsWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhysicsWorld")
            .field("available", &self.is_available())
            .field("gravity", &self.gravity)
            .field("bodies", &self.bodies.len())
            .field("accumulator", &self.accumulator)
            .finish()
    }
}

impl PhysicsWorld {
    /// A physics world with no backend. Attach one with [`PhysicsWorld::attach`].
    pub fn new(config: &PhysicsConfig) -> Self {
        Self {
            backend: None,
            gravity: config.gravity,
            fixed_timestep: config.fixed_timestep(),
            max_steps: config.max_steps_per_frame,
            accumulator: 0.0,
            bodies: HashMap::new(),
            failed: HashSet::new(),
            steps_last_frame: 0,
        }
    }

    /// Initialize and install a backend. On failure the error is logged and
    /// physics stays unavailable.
    pub fn attach(&mut self, mut backend: Box<dyn PhysicsBackend>) {
        if let Some(mut old) = self.backend.take() {
            old.shutdown();
            self.bodies.clear();
        }
        match backend.init(self.gravity) {
            Ok(()) => {
                log::info!(
                    "Physics initialized: {:.1} Hz, max {} steps/frame, gravity {}",
                    1.0 / self.fixed_timestep,
                    self.max_steps,
                    self.gravity
                );
                self.backend = Some(backend);
            }
            Err(e) => {
                log::error!("{e}. Continuing without physics.");
            }
        }
    }

    /// `true` if a backend is attached and initialized.
    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    /// Build a shape and a body for `entity`.
    pub fn create_body(
        &mut self,
        entity: Entity,
        shape: &ColliderShape,
        desc: &BodyDesc,
    ) -> Result<BodyHandle, PhysicsError> {
        let backend = self.backend.as_mut().ok_or(PhysicsError::Unavailable)?;
        let shape = backend.create_shape(shape)?;
        let body = backend.create_body(shape, desc);
        backend.release_shape(shape);
        let body = body?;

        if let Some(old) = self.bodies.insert(entity, body) {
            backend.remove_body(old);
        }
        self.failed.remove(&entity);
        Ok(body)
    }

    /// Log a creation failure: a warning the first time for each entity,
    /// debug output on retries.
    fn report_failure(&mut self, entity: Entity, error: &PhysicsError) {
        if self.failed.insert(entity) {
            log::warn!("Entity {entity}: physics body not created: {error}. Retrying every frame.");
        } else {
            log::debug!("Entity {entity}: physics body still failing: {error}");
        }
    }

    /// `true` while `entity` is in the retry loop after a failed creation.
    pub fn is_failing(&self, entity: Entity) -> bool {
        self.failed.contains(&entity)
    }

    /// Entities that own a body or have a failure on record.
    fn tracked_entities(&self) -> Vec<Entity> {
        self.bodies
            .keys()
            .chain(self.failed.iter())
            .copied()
            .collect()
    }

    /// The body bound to `entity`, if any.
    pub fn body_of(&self, entity: Entity) -> Option<BodyHandle> {
        self.bodies.get(&entity).copied()
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Current state of a body as reported by the backend.
    pub fn read_body(&self, body: BodyHandle) -> Option<BodyState> {
        let backend = self.backend.as_ref()?;
        Some(BodyState {
            active: backend.is_active(body),
            position: backend.position(body)?,
            rotation: backend.rotation(body)?,
        })
    }

    /// Release the body bound to `entity`. No-op if there is none.
    pub fn remove_body(&mut self, entity: Entity) {
        self.failed.remove(&entity);
        let Some(body) = self.bodies.remove(&entity) else {
            return;
        };
        if let Some(backend) = self.backend.as_mut() {
            backend.remove_body(body);
        }
    }

    /// Release every body.
    pub fn remove_all_bodies(&mut self) {
        self.failed.clear();
        let bodies: Vec<BodyHandle> = self.bodies.drain().map(|(_, body)| body).collect();
        if let Some(backend) = self.backend.as_mut() {
            for body in bodies {
                backend.remove_body(body);
            }
        }
    }

    pub fn optimize_broad_phase(&mut self) {
        if let Some(backend) = self.backend.as_mut() {
            backend.optimize_broad_phase();
        }
    }

    /// Feed one frame's delta into the accumulator and run the fixed steps it
    /// pays for, at most `max_steps`. Returns the number of steps run.
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        let Some(backend) = self.backend.as_mut() else {
            return 0;
        };

        self.accumulator += frame_dt.max(0.0);
        let mut steps = 0;
        while self.accumulator >= self.fixed_timestep && steps < self.max_steps {
            backend.step(self.fixed_timestep);
            self.accumulator -= self.fixed_timestep;
            steps += 1;
        }

        if self.accumulator > self.fixed_timestep * self.max_steps as f32 {
            log::debug!(
                "Physics fell behind by {:.3}s; dropping the backlog",
                self.accumulator
            );
            self.accumulator = 0.0;
        }

        self.steps_last_frame = steps;
        steps
    }

    /// Release every body and the backend itself.
    pub fn shutdown(&mut self) {
        self.remove_all_bodies();
        if let Some(mut backend) = self.backend.take() {
            backend.shutdown();
            log::info!("Physics shut down");
        }
    }

    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }

    pub fn fixed_timestep(&self) -> f32 {
        self.fixed_timestep
    }

    pub fn max_steps(&self) -> u32 {
        self.max_steps
    }

    pub fn steps_last_frame(&self) -> u32 {
        self.steps_last_frame
    }

    pub fn gravity(&self) -> Vec3 {
        self.gravity
    }
}

// ── System ──────────────────────────────────────────────────────────────

/// Create pending bodies, step the simulation, and copy active bodies back
/// into their transforms.
pub fn physics_system(world: &mut World) {
    if !world.physics().is_available() {
        return;
    }

    release_detached_bodies(world);
    create_pending_bodies(world);

    let dt = world.time().delta_secs();
    world.physics_mut().advance(dt);

    sync_transforms(world);
}

/// Drop bodies (and failure records) of entities that no longer carry both a
/// [`Rigidbody`] and a [`Collider`]. A surviving `Rigidbody` is marked
/// uncreated so restoring the collider builds a fresh body.
fn release_detached_bodies(world: &mut World) {
    let detached: Vec<Entity> = world
        .physics()
        .tracked_entities()
        .into_iter()
        .filter(|entity| !(world.has::<Rigidbody>(*entity) && world.has::<Collider>(*entity)))
        .collect();

    for entity in detached {
        world.physics_mut().remove_body(entity);
        if let Some(rb) = world.get_mut::<Rigidbody>(entity) {
            rb.body = None;
            rb.body_created = false;
        }
        log::debug!("Entity {entity}: physics components removed, body released");
    }
}

fn create_pending_bodies(world: &mut World) {
    let pending: Vec<(Entity, ColliderShape, BodyDesc)> = world
        .query::<(Rigidbody, Collider, Transform)>()
        .into_iter()
        .filter_map(|entity| {
            let rb = world.get::<Rigidbody>(entity)?;
            if rb.body_created {
                return None;
            }
            let collider = world.get::<Collider>(entity)?;
            let transform = world.get::<Transform>(entity)?;
            Some((
                entity,
                collider.shape,
                BodyDesc::from_rigidbody(rb, transform.position),
            ))
        })
        .collect();

    let mut created = 0;
    for (entity, shape, desc) in pending {
        match world.physics_mut().create_body(entity, &shape, &desc) {
            Ok(body) => {
                if let Some(rb) = world.get_mut::<Rigidbody>(entity) {
                    rb.body = Some(body);
                    rb.body_created = true;
                }
                created += 1;
            }
            Err(e) => world.physics_mut().report_failure(entity, &e),
        }
    }

    if created > 0 {
        log::debug!("Created {created} physics bodies");
        world.physics_mut().optimize_broad_phase();
    }
}

fn sync_transforms(world: &mut World) {
    let updates: Vec<(Entity, BodyState)> = world
        .query::<(Rigidbody, Transform)>()
        .into_iter()
        .filter_map(|entity| {
            let rb = world.get::<Rigidbody>(entity)?;
            if !rb.body_created || rb.motion_type == MotionType::Static {
                return None;
            }
            let state = world.physics().read_body(rb.body?)?;
            state.active.then_some((entity, state))
        })
        .collect();

    for (entity, state) in updates {
        if let Some(transform) = world.get_mut::<Transform>(entity) {
            transform.position = state.position;
            transform.rotation = quat_to_euler_degrees(state.rotation);
        }
    }
}
