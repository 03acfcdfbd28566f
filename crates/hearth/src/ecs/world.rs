//! # World — The Central Container
//!
//! The [`World`] owns all entities, components, resources, and the system
//! schedule, plus the two external capabilities systems talk to: the
//! [`Renderer`] and the [`PhysicsWorld`].
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │ World                                               │
//! │                                                     │
//! │  EntityAllocator: monotonic ids + ordered alive set │
//! │                                                     │
//! │  ComponentStore: one typed Column per kind          │
//! │    keyed by entity id                               │
//! │                                                     │
//! │  resources: HashMap<TypeId, Box<dyn Any>>           │
//! │    singleton data not tied to an entity             │
//! │                                                     │
//! │  schedule: ordered, named systems                   │
//! │                                                     │
//! │  renderer: Box<dyn Renderer>                        │
//! │  physics:  PhysicsWorld (optional backend)          │
//! │  time:     delta / elapsed of the current frame     │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## Resources
//!
//! Resources are "global" data: free-camera state, the debug flag, the
//! collider wireframe map. They're stored as type-erased boxes in a HashMap
//! and are dropped by [`World::reset`], so a restarted scene starts from
//! defaults.
//!
//! ## Despawn Order
//!
//! Despawning releases external resources (physics body, renderer entity)
//! *before* removing the components that reference them, then cascades to
//! every entity whose [`Hierarchy`] points at the despawned one.

use std::any::{Any, TypeId};
use std::collections::HashMap;

use super::component::{Component, ComponentKind, ComponentStore};
use super::entity::{Entity, EntityAllocator};
use super::hierarchy::Hierarchy;
use super::query::{self, QueryKinds};
use super::system::{Schedule, System, SystemFn};
use crate::config::EngineConfig;
use crate::debug::DebugColliders;
use crate::error::ConfigError;
use crate::light::MAX_LIGHTS;
use crate::math::Transform;
use crate::physics::{PhysicsBackend, PhysicsWorld};
use crate::render::headless::HeadlessRenderer;
use crate::render::{MeshComponent, MeshHandle, Renderer};
use crate::time::Time;

/// The central container for all game state.
pub struct World {
    allocator: EntityAllocator,
    components: ComponentStore,
    /// Global resources (singletons), keyed by TypeId.
    resources: HashMap<TypeId, Box<dyn Any>>,
    schedule: Schedule,
    renderer: Box<dyn Renderer>,
    physics: PhysicsWorld,
    time: Time,
    /// Parent links the hierarchy resolver follows before giving up.
    max_hierarchy_depth: usize,
}

impl World {
    /// A world with a [`HeadlessRenderer`], no physics backend and the
    /// default configuration.
    pub fn new() -> Self {
        WorldBuilder::new().build()
    }

    pub fn builder() -> WorldBuilder {
        WorldBuilder::new()
    }

    // ── Resources ────────────────────────────────────────────────────

    /// Insert a resource (singleton value). Replaces any existing resource of
    /// the same type.
    pub fn insert_resource<T: 'static + Send + Sync>(&mut self, value: T) {
        self.resources.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Get a shared reference to a resource.
    ///
    /// # Panics
    ///
    /// Panics if the resource hasn't been inserted.
    pub fn resource<T: 'static + Send + Sync>(&self) -> &T {
        self.get_resource::<T>().unwrap_or_else(|| {
            panic!(
                "Resource `{}` not found. Did you forget to insert it?",
                std::any::type_name::<T>()
            )
        })
    }

    /// Get a mutable reference to a resource.
    ///
    /// # Panics
    ///
    /// Panics if the resource hasn't been inserted.
    pub fn resource_mut<T: 'static + Send + Sync>(&mut self) -> &mut T {
        self.get_resource_mut::<T>().unwrap_or_else(|| {
            panic!(
                "Resource `{}` not found. Did you forget to insert it?",
                std::any::type_name::<T>()
            )
        })
    }

    /// Try to get a shared reference to a resource. Returns `None` if not found.
    pub fn get_resource<T: 'static + Send + Sync>(&self) -> Option<&T> {
        self.resources
            .get(&TypeId::of::<T>())
            .and_then(|r| r.downcast_ref::<T>())
    }

    /// Try to get a mutable reference to a resource. Returns `None` if not found.
    pub fn get_resource_mut<T: 'static + Send + Sync>(&mut self) -> Option<&mut T> {
        self.resources
            .get_mut(&TypeId::of::<T>())
            .and_then(|r| r.downcast_mut::<T>())
    }

    /// Get a resource, inserting `T::default()` first if it is missing.
    pub fn resource_or_default<T: 'static + Send + Sync + Default>(&mut self) -> &mut T {
        if !self.has_resource::<T>() {
            self.insert_resource(T::default());
        }
        self.resource_mut::<T>()
    }

    /// Check if a resource exists.
    pub fn has_resource<T: 'static + Send + Sync>(&self) -> bool {
        self.resources.contains_key(&TypeId::of::<T>())
    }

    /// Remove a resource, taking ownership. Returns `None` if not present.
    ///
    /// Use this for the extract/reinsert pattern when you need to borrow a
    /// resource while also borrowing the world.
    pub fn resource_remove<T: 'static + Send + Sync>(&mut self) -> Option<T> {
        self.resources
            .remove(&TypeId::of::<T>())
            .and_then(|r| r.downcast::<T>().ok())
            .map(|b| *b)
    }

    // ── Entities ─────────────────────────────────────────────────────

    /// Allocate a new entity with no components. O(1).
    pub fn spawn(&mut self) -> Entity {
        self.allocator.allocate()
    }

    /// Spawn an entity with a bundle of components (tuple).
    ///
    /// ```ignore
    /// let e = world.spawn_with((Transform::default(), Movable::default()));
    /// ```
    pub fn spawn_with<B: Bundle>(&mut self, bundle: B) -> Entity {
        let entity = self.spawn();
        bundle.insert_into(self, entity);
        entity
    }

    /// Spawn an entity with a [`Transform`] and a [`MeshComponent`] bound to a
    /// new renderer-side entity for `mesh`.
    ///
    /// If the renderer refuses, the component is attached without a renderer
    /// handle and the entity simply isn't drawn.
    pub fn spawn_mesh_entity(&mut self, mesh: MeshHandle, transform: Transform) -> Entity {
        let entity = self.spawn();
        self.insert(entity, transform);
        let render_entity = match self.renderer.create_entity(mesh) {
            Ok(id) => Some(id),
            Err(e) => {
                log::warn!("Entity {entity}: no renderer entity for mesh {mesh:?}: {e}");
                None
            }
        };
        self.insert(entity, MeshComponent { mesh, render_entity });
        entity
    }

    /// Despawn an entity and, recursively, every entity parented to it.
    ///
    /// No-op if the entity is already dead.
    pub fn despawn(&mut self, entity: Entity) {
        if !self.allocator.is_alive(entity) {
            return;
        }

        self.physics.remove_body(entity);
        self.release_render_entity(entity);

        let children = self.children_of(entity);

        self.allocator.deallocate(entity);
        self.components.remove_all(entity);

        for child in children {
            self.despawn(child);
        }
    }

    fn release_render_entity(&mut self, entity: Entity) {
        if let Some(render_entity) = self
            .get::<MeshComponent>(entity)
            .and_then(|mesh| mesh.render_entity)
        {
            self.renderer.remove_entity(render_entity);
        }
    }

    /// Alive entities whose [`Hierarchy`] parent is `parent`.
    pub fn children_of(&self, parent: Entity) -> Vec<Entity> {
        self.query::<(Hierarchy,)>()
            .into_iter()
            .filter(|e| {
                self.get::<Hierarchy>(*e)
                    .is_some_and(|h| h.parent == Some(parent))
            })
            .collect()
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.allocator.is_alive(entity)
    }

    /// Returns the number of alive entities.
    pub fn entity_count(&self) -> usize {
        self.allocator.alive_count()
    }

    /// Alive entities in spawn order.
    pub fn alive_entities(&self) -> Vec<Entity> {
        self.allocator.iter_alive().collect()
    }

    /// Tear the scene down to an empty world.
    ///
    /// Releases every physics body, renderer entity, debug wireframe and
    /// light slot, drops all components, resources and systems, and restarts
    /// entity ids at zero. Call between frames, never from inside a system.
    pub fn reset(&mut self) {
        self.physics.remove_all_bodies();

        // Every entity goes, so skip the per-entity child scan of `despawn`.
        for entity in self.alive_entities() {
            self.release_render_entity(entity);
        }

        if let Some(mut wireframes) = self.resource_remove::<DebugColliders>() {
            wireframes.release_all(self.renderer.as_mut());
        }

        self.components.clear();
        self.resources.clear();
        self.schedule.clear();
        self.renderer.clear_debug_entities();
        for slot in 0..MAX_LIGHTS {
            self.renderer.clear_light(slot);
        }
        self.allocator.reset();

        log::info!("World reset");
    }

    // ── Per-Entity Component Access ──────────────────────────────────

    /// Get a shared reference to a component on a specific entity.
    ///
    /// Returns `None` if the entity is dead or doesn't have the component.
    pub fn get<T: Component>(&self, entity: Entity) -> Option<&T> {
        if !self.allocator.is_alive(entity) {
            return None;
        }
        T::column(&self.components).get(entity.index())
    }

    /// Get a mutable reference to a component on a specific entity.
    ///
    /// Returns `None` if the entity is dead or doesn't have the component.
    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        if !self.allocator.is_alive(entity) {
            return None;
        }
        T::column_mut(&mut self.components).get_mut(entity.index())
    }

    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        self.has_kind(T::KIND, entity)
    }

    pub fn has_kind(&self, kind: ComponentKind, entity: Entity) -> bool {
        self.allocator.is_alive(entity) && self.components.has(kind, entity)
    }

    /// Add a component to an existing entity. If the entity already has a
    /// component of this kind, it is replaced.
    ///
    /// # Panics
    ///
    /// Panics if the entity is not alive.
    pub fn insert<T: Component>(&mut self, entity: Entity, component: T) {
        assert!(
            self.allocator.is_alive(entity),
            "Cannot insert component `{:?}` on dead entity {:?}",
            T::KIND,
            entity
        );
        T::column_mut(&mut self.components).insert(entity.index(), component);
    }

    /// Remove a component from an entity, returning it.
    pub fn remove<T: Component>(&mut self, entity: Entity) -> Option<T> {
        if !self.allocator.is_alive(entity) {
            return None;
        }
        T::column_mut(&mut self.components).remove(entity.index())
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Alive entities holding every component in `Q`, in spawn order.
    ///
    /// ```ignore
    /// for entity in world.query::<(Transform, Movable)>() { /* ... */ }
    /// ```
    pub fn query<Q: QueryKinds>(&self) -> Vec<Entity> {
        self.query_kinds(&Q::kinds())
    }

    /// Untyped form of [`World::query`].
    pub fn query_kinds(&self, kinds: &[ComponentKind]) -> Vec<Entity> {
        query::matching(&self.allocator, &self.components, kinds)
    }

    // ── Systems ──────────────────────────────────────────────────────

    /// Append a system, named after its function.
    pub fn add_system<S: System + 'static>(&mut self, system: S) {
        self.schedule.add_system(system);
    }

    /// Append a system under an explicit name.
    pub fn add_named_system<S: System + 'static>(&mut self, name: impl Into<String>, system: S) {
        self.schedule.add_named_system(name, system);
    }

    /// Run every registered system once, in order.
    ///
    /// Systems added while the schedule runs are appended after the existing
    /// ones and first run on the next call.
    pub fn run_systems(&mut self) {
        let mut schedule = std::mem::take(&mut self.schedule);
        schedule.run(self);
        let added = std::mem::replace(&mut self.schedule, schedule);
        self.schedule.append(added);
    }

    /// Rebind systems by name. Returns the number of systems replaced.
    pub fn swap_systems(&mut self, table: &HashMap<String, SystemFn>) -> usize {
        self.schedule.swap_by_name(table)
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn system_names(&self) -> Vec<&str> {
        self.schedule.names()
    }

    // ── Capabilities ─────────────────────────────────────────────────

    pub fn renderer(&self) -> &dyn Renderer {
        self.renderer.as_ref()
    }

    pub fn renderer_mut(&mut self) -> &mut dyn Renderer {
        self.renderer.as_mut()
    }

    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    pub fn physics_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.physics
    }

    pub fn time(&self) -> &Time {
        &self.time
    }

    pub fn time_mut(&mut self) -> &mut Time {
        &mut self.time
    }

    /// Sample frame timing from the renderer.
    pub fn update_time(&mut self) {
        self.renderer.update_time();
        let delta = self.renderer.delta_time();
        let elapsed = self.renderer.total_time();
        self.time.advance(delta, elapsed);
    }

    pub fn max_hierarchy_depth(&self) -> usize {
        self.max_hierarchy_depth
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

// ── Builder ──────────────────────────────────────────────────────────

/// Configures the capabilities a [`World`] is created with.
pub struct WorldBuilder {
    renderer: Option<Box<dyn Renderer>>,
    physics_backend: Option<Box<dyn PhysicsBackend>>,
    config: EngineConfig,
}

impl WorldBuilder {
    pub fn new() -> Self {
        Self {
            renderer: None,
            physics_backend: None,
            config: EngineConfig::default(),
        }
    }

    pub fn renderer(mut self, renderer: impl Renderer + 'static) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    pub fn physics_backend(mut self, backend: impl PhysicsBackend + 'static) -> Self {
        self.physics_backend = Some(Box::new(backend));
        self
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the world, or return the validation error of an unusable config.
    pub fn try_build(self) -> Result<World, ConfigError> {
        self.config.validate()?;
        Ok(self.assemble())
    }

    /// Build the world. An invalid config is logged and replaced by the
    /// defaults; a physics backend that fails to initialize is logged and
    /// dropped, and the world runs without physics.
    pub fn build(mut self) -> World {
        if let Err(e) = self.config.validate() {
            log::error!("{e}. Falling back to the default configuration.");
            self.config = EngineConfig::default();
        }
        self.assemble()
    }

    fn assemble(self) -> World {
        let mut physics = PhysicsWorld::new(&self.config.physics);
        if let Some(backend) = self.physics_backend {
            physics.attach(backend);
        }

        World {
            allocator: EntityAllocator::new(),
            components: ComponentStore::new(),
            resources: HashMap::new(),
            schedule: Schedule::new(),
            renderer: self
                .renderer
                .unwrap_or_else(|| Box::new(HeadlessRenderer::new())),
            physics,
            time: Time::new(),
            max_hierarchy_depth: self.config.hierarchy.max_depth,
        }
    }
}

impl Default for WorldBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ── Bundles ──────────────────────────────────────────────────────────

/// A tuple of components inserted together by [`World::spawn_with`].
pub trait Bundle {
    fn insert_into(self, world: &mut World, entity: Entity);
}

macro_rules! impl_bundle {
    ($($T:ident),+) => {
        impl<$($T: Component),+> Bundle for ($($T,)+) {
            #[allow(non_snake_case)]
            fn insert_into(self, world: &mut World, entity: Entity) {
                let ($($T,)+) = self;
                $(world.insert(entity, $T);)+
            }
        }
    };
}

impl_bundle!(A);
impl_bundle!(A, B);
impl_bundle!(A, B, C);
impl_bundle!(A, B, C, D);
impl_bundle!(A, B, C, D, E);
impl_bundle!(A, B, C, D, E, F);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::Light;
    use crate::math::{Color, Vec3};
    use crate::movement::Movable;
    use crate::render::{LightParams, ProceduralMesh};
    use crate::timer::Timer;

    fn headless_world() -> (World, HeadlessRenderer) {
        let renderer = HeadlessRenderer::new();
        let world = World::builder().renderer(renderer.clone()).build();
        (world, renderer)
    }

    #[test]
    fn spawn_and_query() {
        let mut world = World::new();
        let a = world.spawn_with((Transform::from_xyz(1.0, 2.0, 3.0), Movable::default()));
        let b = world.spawn_with((Transform::default(), Movable::new(45.0)));
        let _c = world.spawn_with((Transform::default(),));

        assert_eq!(world.query::<(Transform, Movable)>(), vec![a, b]);
        assert_eq!(world.query::<(Transform,)>().len(), 3);
    }

    #[test]
    fn insert_overwrites_same_kind() {
        let mut world = World::new();
        let e = world.spawn();
        world.insert(e, Movable::new(1.0));
        world.insert(e, Movable::new(2.0));
        assert_eq!(world.get::<Movable>(e).unwrap().speed, 2.0);
        assert_eq!(world.query::<(Movable,)>(), vec![e]);
    }

    #[test]
    fn absent_component_is_none() {
        let mut world = World::new();
        let e = world.spawn();
        assert!(world.get::<Transform>(e).is_none());
        assert!(!world.has::<Transform>(e));
        assert!(world.remove::<Transform>(e).is_none());
    }

    #[test]
    #[should_panic(expected = "dead entity")]
    fn insert_on_dead_entity_panics() {
        let mut world = World::new();
        let e = world.spawn();
        world.despawn(e);
        world.insert(e, Transform::default());
    }

    #[test]
    fn despawn_cascades_through_hierarchy() {
        let mut world = World::new();
        let root = world.spawn_with((Transform::default(),));
        let child_a = world.spawn_with((Transform::default(), Hierarchy::child_of(root)));
        let child_b = world.spawn_with((Transform::default(), Hierarchy::child_of(root)));
        let grandchild = world.spawn_with((Transform::default(), Hierarchy::child_of(child_a)));
        let bystander = world.spawn_with((Transform::default(),));

        world.despawn(root);

        for e in [root, child_a, child_b, grandchild] {
            assert!(!world.is_alive(e));
            for kind in ComponentKind::ALL {
                assert!(!world.has_kind(*kind, e));
            }
            assert!(world.get::<Transform>(e).is_none());
            assert!(world.get::<Hierarchy>(e).is_none());
        }
        assert!(world.is_alive(bystander));
        assert_eq!(world.entity_count(), 1);
    }

    #[test]
    fn despawn_is_noop_for_dead_entity() {
        let mut world = World::new();
        let e = world.spawn();
        world.despawn(e);
        world.despawn(e);
        assert_eq!(world.entity_count(), 0);
    }

    #[test]
    fn despawn_even_keeps_odd_intact() {
        let mut world = World::new();
        let entities: Vec<Entity> = (0..10)
            .map(|i| {
                world.spawn_with((
                    Transform::from_xyz(i as f32, 0.0, 0.0),
                    Timer::new(i as f32 + 1.0),
                ))
            })
            .collect();

        for e in entities.iter().step_by(2) {
            world.despawn(*e);
        }

        let odd: Vec<Entity> = entities.iter().skip(1).step_by(2).copied().collect();
        assert_eq!(world.alive_entities(), odd);
        for (i, e) in entities.iter().enumerate().skip(1).step_by(2) {
            assert_eq!(world.get::<Transform>(*e).unwrap().position.x, i as f32);
            assert_eq!(world.get::<Timer>(*e).unwrap().duration, i as f32 + 1.0);
        }
    }

    #[test]
    fn cyclic_hierarchy_despawn_terminates() {
        let mut world = World::new();
        let a = world.spawn();
        let b = world.spawn();
        world.insert(a, Hierarchy::child_of(b));
        world.insert(b, Hierarchy::child_of(a));

        world.despawn(a);
        assert_eq!(world.entity_count(), 0);
    }

    #[test]
    fn spawn_mesh_entity_binds_renderer_entity() {
        let (mut world, renderer) = headless_world();
        let mesh = world
            .renderer_mut()
            .create_mesh(&ProceduralMesh::cube(1.0), Color::WHITE)
            .unwrap();

        let e = world.spawn_mesh_entity(mesh, Transform::from_xyz(0.0, 1.0, 0.0));
        let render_entity = world.get::<MeshComponent>(e).unwrap().render_entity.unwrap();
        assert!(renderer.state().entities.contains_key(&render_entity));

        world.despawn(e);
        assert!(renderer.state().entities.is_empty());
    }

    #[test]
    fn spawn_mesh_entity_survives_renderer_failure() {
        let (mut world, _renderer) = headless_world();
        let e = world.spawn_mesh_entity(MeshHandle(42), Transform::default());
        assert!(world.get::<MeshComponent>(e).unwrap().render_entity.is_none());
    }

    #[test]
    fn reset_clears_everything_and_restarts_ids() {
        let (mut world, renderer) = headless_world();
        let mesh = world
            .renderer_mut()
            .create_mesh(&ProceduralMesh::cube(1.0), Color::WHITE)
            .unwrap();
        world.spawn_mesh_entity(mesh, Transform::default());
        world.spawn_with((Transform::default(), Light::default()));
        world.renderer_mut().set_light(0, &LightParams::default());
        world.insert_resource(7u32);
        world.add_system(|_w: &mut World| {});

        world.reset();

        assert_eq!(world.entity_count(), 0);
        assert!(world.system_names().is_empty());
        assert!(!world.has_resource::<u32>());
        assert!(renderer.state().entities.is_empty());
        assert!(renderer.state().lights.iter().all(Option::is_none));
        assert_eq!(world.spawn().id(), 0);
        assert!(world.query::<(Transform,)>().is_empty());
    }

    #[test]
    fn systems_added_during_run_are_appended() {
        let mut world = World::new();
        world.add_named_system("registrar", |w: &mut World| {
            if w.system_names().is_empty() {
                w.add_named_system("late", |_w: &mut World| {});
            }
        });

        world.run_systems();
        assert_eq!(world.system_names(), vec!["registrar", "late"]);
    }

    #[test]
    fn resources() {
        let mut world = World::new();
        world.insert_resource(42u32);
        assert_eq!(*world.resource::<u32>(), 42);
        *world.resource_mut::<u32>() = 99;
        assert_eq!(world.resource_remove::<u32>(), Some(99));
        assert!(world.get_resource::<u32>().is_none());
        assert_eq!(*world.resource_or_default::<u64>(), 0);
    }

    #[test]
    fn update_time_samples_renderer() {
        let renderer = HeadlessRenderer::with_frame_time(0.02);
        let mut world = World::builder().renderer(renderer).build();
        world.update_time();
        world.update_time();
        assert_eq!(world.time().delta_secs(), 0.02);
        assert!((world.time().elapsed_secs() - 0.04).abs() < 1e-6);
        assert_eq!(world.time().frame_count(), 2);
    }

    #[test]
    fn query_skips_dead() {
        let mut world = World::new();
        let a = world.spawn_with((Transform::from_xyz(0.0, 0.0, 0.0),));
        let b = world.spawn_with((Transform::from_xyz(1.0, 0.0, 0.0),));
        world.despawn(a);
        assert_eq!(world.query::<(Transform,)>(), vec![b]);
        assert_eq!(world.get::<Transform>(b).unwrap().position, Vec3::X);
    }

    #[test]
    fn invalid_config_falls_back_to_defaults() {
        let mut config = EngineConfig::default();
        config.physics.fixed_hz = 0.0;
        config.hierarchy.max_depth = 0;

        let world = World::builder().config(config).build();

        let defaults = EngineConfig::default();
        assert_eq!(world.max_hierarchy_depth(), defaults.hierarchy.max_depth);
        assert_eq!(
            world.physics().fixed_timestep(),
            defaults.physics.fixed_timestep()
        );
    }

    #[test]
    fn try_build_rejects_invalid_config() {
        let mut config = EngineConfig::default();
        config.physics.max_steps_per_frame = 0;
        assert!(matches!(
            World::builder().config(config).try_build(),
            Err(ConfigError::Invalid(_))
        ));

        let mut config = EngineConfig::default();
        config.hierarchy.max_depth = 3;
        let world = World::builder().config(config).try_build().unwrap();
        assert_eq!(world.max_hierarchy_depth(), 3);
    }

    #[test]
    fn spawn_despawn_churn_keeps_queries_on_live_entities() {
        let mut world = World::new();
        for _ in 0..5_000 {
            let parent = world.spawn_with((Transform::default(),));
            world.spawn_with((Transform::default(), Hierarchy::child_of(parent)));
            world.despawn(parent);
        }
        let survivor = world.spawn_with((Transform::default(),));

        assert_eq!(world.entity_count(), 1);
        assert_eq!(world.alive_entities(), vec![survivor]);
        assert_eq!(world.query::<(Transform,)>(), vec![survivor]);
        assert_eq!(world.components.count(ComponentKind::Transform), 1);
        assert_eq!(world.components.count(ComponentKind::Hierarchy), 0);
    }
}
