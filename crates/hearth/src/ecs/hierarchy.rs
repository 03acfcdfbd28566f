//! # Entity Hierarchies — Parent Links and World Matrices
//!
//! A [`Hierarchy`] component points an entity at its parent. Every frame,
//! [`resolve_hierarchy_system`] computes each entity's world-space matrix and
//! caches it in [`WorldTransform`]:
//!
//! ```text
//! world(root)  = local(root)
//! world(child) = world(parent) · local(child)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let parent = world.spawn_with((Transform::from_xyz(2.0, 0.0, 0.0),));
//! let child = world.spawn_with((
//!     Transform::from_xyz(1.0, 0.0, 0.0),
//!     Hierarchy::child_of(parent),
//! ));
//!
//! resolve_hierarchy_system(&mut world);
//! // child's WorldTransform now translates to (3, 0, 0)
//! ```
//!
//! ## Stale and Cyclic Links
//!
//! A parent that is dead (or was never spawned) is ignored: the child resolves
//! as a root for that frame. Cycles are a caller error. The parent walk stops
//! after [`World::max_hierarchy_depth`] links and treats the entity reached
//! there as the root, logging a warning, so a cycle yields finite matrices
//! instead of unbounded recursion.
//!
//! Resolution is memoized per run: each ancestor's matrix is computed once no
//! matter how many descendants share it. Matrices from a walk that hit the
//! cap are never memoized, so an entity within reach of its real root always
//! resolves against that root. There is no dirty tracking; every
//! matrix is recomputed every frame.

use std::collections::HashMap;

use crate::ecs::{Entity, World};
use crate::math::{Mat4, Transform, Vec3};

/// Links an entity to its parent. `parent: None` marks a root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Hierarchy {
    pub parent: Option<Entity>,
}

impl Hierarchy {
    pub fn root() -> Self {
        Self { parent: None }
    }

    pub fn child_of(parent: Entity) -> Self {
        Self {
            parent: Some(parent),
        }
    }
}

/// The world-space matrix computed by [`resolve_hierarchy_system`].
///
/// Only meaningful after the resolver has run in the current frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldTransform {
    pub matrix: Mat4,
}

impl WorldTransform {
    pub fn translation(&self) -> Vec3 {
        self.matrix.w_axis.truncate()
    }
}

impl Default for WorldTransform {
    fn default() -> Self {
        Self {
            matrix: Mat4::IDENTITY,
        }
    }
}

/// Compute and store a [`WorldTransform`] for every entity with a [`Transform`].
pub fn resolve_hierarchy_system(world: &mut World) {
    let entities = world.query::<(Transform,)>();
    let mut resolver = Resolver {
        cache: HashMap::with_capacity(entities.len()),
        max_depth: world.max_hierarchy_depth(),
        truncated: 0,
    };

    let resolved: Vec<(Entity, Mat4)> = entities
        .into_iter()
        .map(|entity| (entity, resolver.world_matrix(world, entity, 0)))
        .collect();

    if resolver.truncated > 0 {
        log::warn!(
            "Hierarchy deeper than {} links (cycle?); {} chain(s) treated as rooted at the limit",
            resolver.max_depth,
            resolver.truncated
        );
    }

    for (entity, matrix) in resolved {
        world.insert(entity, WorldTransform { matrix });
    }
}

struct Resolver {
    cache: HashMap<Entity, Mat4>,
    max_depth: usize,
    truncated: usize,
}

impl Resolver {
    fn world_matrix(&mut self, world: &World, entity: Entity, depth: usize) -> Mat4 {
        self.resolve(world, entity, depth).0
    }

    /// Returns the matrix and whether the walk reached a real root. Only
    /// complete walks are memoized: a truncated result depends on where the
    /// walk started, not just on `entity`.
    fn resolve(&mut self, world: &World, entity: Entity, depth: usize) -> (Mat4, bool) {
        if let Some(matrix) = self.cache.get(&entity) {
            return (*matrix, true);
        }
        let Some(transform) = world.get::<Transform>(entity) else {
            return (Mat4::IDENTITY, true);
        };
        let local = transform.matrix();

        let parent = world
            .get::<Hierarchy>(entity)
            .and_then(|h| h.parent)
            .filter(|p| world.is_alive(*p));

        let (matrix, complete) = match parent {
            Some(parent) if depth < self.max_depth => {
                let (parent_matrix, complete) = self.resolve(world, parent, depth + 1);
                (parent_matrix * local, complete)
            }
            Some(_) => {
                self.truncated += 1;
                (local, false)
            }
            None => (local, true),
        };

        if complete {
            self.cache.insert(entity, matrix);
        }
        (matrix, complete)
    }
}
