//! Debug overlay toggle and collider wireframes.
//!
//! F3 flips [`DebugSettings::enabled`]. While it is on, every collider gets a
//! wireframe mesh that follows its entity, and the free camera can be
//! activated.

use std::collections::BTreeMap;

use crate::ecs::{Entity, World, WorldTransform};
use crate::error::RenderError;
use crate::input::{EdgeLatch, Key};
use crate::math::Transform;
use crate::physics::{Collider, ColliderShape};
use crate::render::{DebugEntityId, MeshHandle, ProceduralMesh, Renderer};

/// Wireframe tessellation for round colliders.
const WIRE_SEGMENTS: u32 = 16;
const WIRE_RINGS: u32 = 8;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DebugSettings {
    pub enabled: bool,
    toggle: EdgeLatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Wireframe {
    id: DebugEntityId,
    mesh: MeshHandle,
}

impl Wireframe {
    fn release(self, renderer: &mut dyn Renderer) {
        renderer.remove_debug_entity(self.id);
        renderer.remove_mesh(self.mesh);
    }
}

/// Wireframes currently shown, keyed by the collider's entity.
#[derive(Debug, Default)]
pub struct DebugColliders {
    wireframes: BTreeMap<Entity, Wireframe>,
    was_enabled: bool,
}

impl DebugColliders {
    pub fn get(&self, entity: Entity) -> Option<DebugEntityId> {
        self.wireframes.get(&entity).map(|w| w.id)
    }

    /// Mesh backing the wireframe of `entity`.
    pub fn mesh(&self, entity: Entity) -> Option<MeshHandle> {
        self.wireframes.get(&entity).map(|w| w.mesh)
    }

    /// Free every wireframe and its mesh.
    pub fn release_all(&mut self, renderer: &mut dyn Renderer) {
        for (_, wireframe) in std::mem::take(&mut self.wireframes) {
            wireframe.release(renderer);
        }
    }

    pub fn len(&self) -> usize {
        self.wireframes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wireframes.is_empty()
    }
}

/// F3 toggles the overlay; the flag is pushed to the renderer every frame.
pub fn debug_overlay_system(world: &mut World) {
    let f3 = world.renderer().is_key_pressed(Key::F3);
    let settings = world.resource_or_default::<DebugSettings>();
    if settings.toggle.rising(f3) {
        settings.enabled = !settings.enabled;
        log::info!("Debug overlay {}", if settings.enabled { "on" } else { "off" });
    }
    let enabled = settings.enabled;
    world.renderer_mut().set_debug_overlay(enabled);
}

/// Procedural mesh outlining a collider, or `None` for planes.
pub fn collider_mesh(shape: &ColliderShape) -> Option<ProceduralMesh> {
    match *shape {
        ColliderShape::Box { half_extents } => Some(ProceduralMesh::Box {
            width: half_extents.x * 2.0,
            height: half_extents.y * 2.0,
            length: half_extents.z * 2.0,
        }),
        ColliderShape::Sphere { radius } => Some(ProceduralMesh::Sphere {
            radius,
            segments: WIRE_SEGMENTS,
            rings: WIRE_RINGS,
        }),
        ColliderShape::Capsule { half_height, radius } => Some(ProceduralMesh::Capsule {
            radius,
            height: half_height * 2.0,
            segments: WIRE_SEGMENTS,
            rings: WIRE_RINGS,
        }),
        ColliderShape::Cylinder { half_height, radius } => Some(ProceduralMesh::Cylinder {
            radius,
            height: half_height * 2.0,
            segments: WIRE_SEGMENTS,
        }),
        ColliderShape::Plane { .. } => None,
    }
}

/// Keep one wireframe per `Collider + Transform` entity while debug is on.
pub fn debug_collider_render_system(world: &mut World) {
    let enabled = world.get_resource::<DebugSettings>().is_some_and(|d| d.enabled);
    let mut tracked = world.resource_remove::<DebugColliders>().unwrap_or_default();

    if !enabled {
        if tracked.was_enabled {
            tracked.release_all(world.renderer_mut());
            world.renderer_mut().clear_debug_entities();
        }
        tracked.was_enabled = false;
        world.insert_resource(tracked);
        return;
    }
    tracked.was_enabled = true;

    let stale: Vec<Entity> = tracked
        .wireframes
        .keys()
        .copied()
        .filter(|&e| !world.is_alive(e) || !world.has::<Collider>(e))
        .collect();
    for entity in stale {
        if let Some(wireframe) = tracked.wireframes.remove(&entity) {
            wireframe.release(world.renderer_mut());
        }
    }

    for entity in world.query::<(Collider, Transform)>() {
        let Some(collider) = world.get::<Collider>(entity).copied() else {
            continue;
        };
        let Some(mesh) = collider_mesh(&collider.shape) else {
            continue;
        };

        let id = match tracked.wireframes.get(&entity) {
            Some(wireframe) => wireframe.id,
            None => {
                match create_wireframe(world.renderer_mut(), &mesh, collider) {
                    Ok(wireframe) => {
                        tracked.wireframes.insert(entity, wireframe);
                        wireframe.id
                    }
                    Err(e) => {
                        log::debug!("Entity {entity}: no collider wireframe: {e}");
                        continue;
                    }
                }
            }
        };

        let matrix = match world.get::<WorldTransform>(entity) {
            Some(world_transform) => world_transform.matrix,
            None => match world.get::<Transform>(entity) {
                Some(transform) => transform.matrix(),
                None => continue,
            },
        };
        world
            .renderer_mut()
            .set_debug_entity_transform(id, &matrix.to_cols_array());
    }

    world.insert_resource(tracked);
}

fn create_wireframe(
    renderer: &mut dyn Renderer,
    mesh: &ProceduralMesh,
    collider: Collider,
) -> Result<Wireframe, RenderError> {
    let handle = renderer.create_mesh(mesh, collider.debug_color)?;
    match renderer.create_debug_entity(handle) {
        Ok(id) => Ok(Wireframe { id, mesh: handle }),
        Err(e) => {
            renderer.remove_mesh(handle);
            Err(e)
        }
    }
}
