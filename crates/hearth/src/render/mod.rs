//! # Rendering Capability
//!
//! The engine doesn't draw anything itself. It drives a [`Renderer`]: meshes
//! and renderable entities go in, world matrices, lights and the camera are
//! pushed every frame, and input plus frame timing come back out.
//!
//! ```text
//! World ──► Renderer
//!   spawn_mesh_entity  → create_entity(mesh)
//!   render_sync_system → set_entity_transform(id, world matrix)
//!   light_sync_system  → set_light(slot, params) / clear_light(slot)
//!   camera systems     → set_camera(eye, target, up, fov)
//!   debug systems      → debug overlay + collider wireframes
//!
//! Renderer ──► World
//!   update_time / delta_time / total_time
//!   is_key_pressed, cursor_position, scroll_offset
//! ```
//!
//! [`HeadlessRenderer`](headless::HeadlessRenderer) implements the trait
//! without a window and records every call.

pub mod headless;

use std::path::Path;

use crate::ecs::{World, WorldTransform};
use crate::error::RenderError;
use crate::input::Key;
use crate::light::LightType;
use crate::math::{Color, DVec2, Transform, Vec2, Vec3};

/// A mesh known to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshHandle(pub u32);

/// A drawable instance of a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderEntityId(pub u32);

/// A wireframe drawn only while the debug overlay is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DebugEntityId(pub u32);

/// Mesh generated by the renderer from dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProceduralMesh {
    Box {
        width: f32,
        height: f32,
        length: f32,
    },
    Sphere {
        radius: f32,
        segments: u32,
        rings: u32,
    },
    Plane {
        width: f32,
        depth: f32,
    },
    Cylinder {
        radius: f32,
        height: f32,
        segments: u32,
    },
    Capsule {
        radius: f32,
        height: f32,
        segments: u32,
        rings: u32,
    },
}

impl ProceduralMesh {
    pub fn cube(size: f32) -> Self {
        Self::Box {
            width: size,
            height: size,
            length: size,
        }
    }

    /// Check the dimensions describe a buildable mesh.
    pub fn validate(&self) -> Result<(), RenderError> {
        let dims: &[f32] = match self {
            Self::Box {
                width,
                height,
                length,
            } => &[*width, *height, *length],
            Self::Sphere { radius, .. } => &[*radius],
            Self::Plane { width, depth } => &[*width, *depth],
            Self::Cylinder { radius, height, .. } | Self::Capsule { radius, height, .. } => {
                &[*radius, *height]
            }
        };
        if dims.iter().any(|d| !d.is_finite() || *d <= 0.0) {
            return Err(RenderError::MeshCreation(format!(
                "non-positive dimension in {self:?}"
            )));
        }

        let too_coarse = match *self {
            Self::Sphere { segments, rings, .. } | Self::Capsule { segments, rings, .. } => {
                segments < 3 || rings < 2
            }
            Self::Cylinder { segments, .. } => segments < 3,
            Self::Box { .. } | Self::Plane { .. } => false,
        };
        if too_coarse {
            return Err(RenderError::MeshCreation(format!("too few segments in {self:?}")));
        }
        Ok(())
    }
}

/// Everything uploaded to one light slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightParams {
    pub light_type: LightType,
    pub position: Vec3,
    pub direction: Vec3,
    pub color: Vec3,
    pub intensity: f32,
    pub radius: f32,
    /// Cosine of the inner cone angle.
    pub inner_cos: f32,
    /// Cosine of the outer cone angle.
    pub outer_cos: f32,
}

impl Default for LightParams {
    fn default() -> Self {
        Self {
            light_type: LightType::Directional,
            position: Vec3::ZERO,
            direction: Vec3::NEG_Y,
            color: Vec3::ONE,
            intensity: 1.0,
            radius: 10.0,
            inner_cos: 1.0,
            outer_cos: 1.0,
        }
    }
}

/// Perspective camera as eye, target, up and vertical FOV in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraParams {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov: f32,
}

/// Binds an entity to a renderer-side drawable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshComponent {
    pub mesh: MeshHandle,
    /// `None` if the renderer refused to create the drawable.
    pub render_entity: Option<RenderEntityId>,
}

/// Operations the engine needs from a rendering backend.
pub trait Renderer {
    // ── Frame ────────────────────────────────────────────────────────
    fn poll_events(&mut self);
    fn should_close(&self) -> bool;
    fn render_frame(&mut self);
    fn update_time(&mut self);
    fn delta_time(&self) -> f32;
    fn total_time(&self) -> f32;

    // ── Meshes and entities ──────────────────────────────────────────
    fn load_mesh(&mut self, path: &Path) -> Result<MeshHandle, RenderError>;
    fn create_mesh(&mut self, mesh: &ProceduralMesh, color: Color) -> Result<MeshHandle, RenderError>;
    /// Free a mesh. Entities still drawing it are the caller's problem.
    fn remove_mesh(&mut self, mesh: MeshHandle);
    fn create_entity(&mut self, mesh: MeshHandle) -> Result<RenderEntityId, RenderError>;
    fn remove_entity(&mut self, entity: RenderEntityId);
    /// `matrix` is column-major.
    fn set_entity_transform(&mut self, entity: RenderEntityId, matrix: &[f32; 16]);

    // ── Lighting and camera ──────────────────────────────────────────
    fn set_light(&mut self, slot: usize, light: &LightParams);
    fn clear_light(&mut self, slot: usize);
    fn set_ambient(&mut self, intensity: f32);
    fn set_camera(&mut self, camera: &CameraParams);

    // ── Input ────────────────────────────────────────────────────────
    fn cursor_position(&self) -> DVec2;
    fn is_cursor_locked(&self) -> bool;
    fn set_cursor_locked(&mut self, locked: bool);
    fn is_key_pressed(&self, key: Key) -> bool;
    fn scroll_offset(&self) -> Vec2;
    fn reset_scroll_offset(&mut self);

    // ── Debug ────────────────────────────────────────────────────────
    fn set_debug_overlay(&mut self, enabled: bool);
    fn create_debug_entity(&mut self, mesh: MeshHandle) -> Result<DebugEntityId, RenderError>;
    fn remove_debug_entity(&mut self, entity: DebugEntityId);
    fn set_debug_entity_transform(&mut self, entity: DebugEntityId, matrix: &[f32; 16]);
    fn clear_debug_entities(&mut self);
}

/// Push each drawable entity's world matrix to the renderer.
///
/// Uses [`WorldTransform`] when the hierarchy resolver has produced one,
/// otherwise the local [`Transform`].
pub fn render_sync_system(world: &mut World) {
    let updates: Vec<(RenderEntityId, [f32; 16])> = world
        .query::<(Transform, MeshComponent)>()
        .into_iter()
        .filter_map(|entity| {
            let render_entity = world.get::<MeshComponent>(entity)?.render_entity?;
            let matrix = match world.get::<WorldTransform>(entity) {
                Some(world_transform) => world_transform.matrix,
                None => world.get::<Transform>(entity)?.matrix(),
            };
            Some((render_entity, matrix.to_cols_array()))
        })
        .collect();

    let renderer = world.renderer_mut();
    for (render_entity, matrix) in updates {
        renderer.set_entity_transform(render_entity, &matrix);
    }
}
