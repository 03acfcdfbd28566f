//! # Component — Closed Set of Typed Columns
//!
//! Components are plain data: a `Transform`, a `Light`, a `Rigidbody`. The
//! engine knows every kind up front, so storage is one typed [`Column`] per
//! kind rather than type-erased boxes keyed by `TypeId`.
//!
//! ```text
//! ComponentStore
//!   transform:  {0: t0, 2: t2, ...}   ← keyed by Entity id
//!   hierarchy:  {2: h2, ...}
//!   rigidbody:  {0: r0, ...}
//!   ...
//! ```
//!
//! A column only holds entries for entities that currently carry the kind,
//! so identifiers retired by the allocator leave nothing behind. Re-inserting
//! a kind on an entity overwrites the entry, so there is at most one instance
//! per (kind, entity).
//!
//! ## Comparison
//!
//! - **hecs / bevy_ecs**: open component set, archetype tables, `unsafe`
//!   blob storage.
//! - **Here**: closed set declared in `component_kinds!`. Adding a kind means
//!   adding one line to the macro invocation.

use std::collections::HashMap;

use super::entity::Entity;

/// A component type stored in the [`ComponentStore`].
///
/// Implemented by the `component_kinds!` invocation below; there is no need
/// to implement it by hand.
pub trait Component: Sized + 'static {
    const KIND: ComponentKind;

    #[doc(hidden)]
    fn column(store: &ComponentStore) -> &Column<Self>;
    #[doc(hidden)]
    fn column_mut(store: &mut ComponentStore) -> &mut Column<Self>;
}

/// Storage for one component kind, keyed by entity identifier.
pub struct Column<T> {
    slots: HashMap<usize, T>,
}

impl<T> Column<T> {
    pub fn new() -> Self {
        Self {
            slots: HashMap::new(),
        }
    }

    /// Insert or overwrite. Returns the previous value, if any.
    pub fn insert(&mut self, index: usize, value: T) -> Option<T> {
        self.slots.insert(index, value)
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(&index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slots.get_mut(&index)
    }

    pub fn remove(&mut self, index: usize) -> Option<T> {
        self.slots.remove(&index)
    }

    pub fn contains(&self, index: usize) -> bool {
        self.slots.contains_key(&index)
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

impl<T> Default for Column<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Declares [`ComponentKind`], the [`ComponentStore`] with one column per
/// kind, and the [`Component`] impls that route each type to its column.
macro_rules! component_kinds {
    ($($kind:ident => $field:ident : $ty:ty),+ $(,)?) => {
        /// Every component kind the engine stores.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum ComponentKind {
            $($kind),+
        }

        impl ComponentKind {
            pub const ALL: &'static [ComponentKind] = &[$(ComponentKind::$kind),+];
        }

        /// All component columns of a [`World`](super::world::World).
        #[derive(Default)]
        pub struct ComponentStore {
            $($field: Column<$ty>),+
        }

        impl ComponentStore {
            pub fn new() -> Self {
                Self::default()
            }

            /// Does `entity` have a component of `kind`?
            pub fn has(&self, kind: ComponentKind, entity: Entity) -> bool {
                match kind {
                    $(ComponentKind::$kind => self.$field.contains(entity.index())),+
                }
            }

            /// Number of entities holding a component of `kind`.
            pub fn count(&self, kind: ComponentKind) -> usize {
                match kind {
                    $(ComponentKind::$kind => self.$field.len()),+
                }
            }

            /// Remove `entity` from every column.
            pub fn remove_all(&mut self, entity: Entity) {
                $(self.$field.remove(entity.index());)+
            }

            pub fn clear(&mut self) {
                $(self.$field.clear();)+
            }
        }

        $(
            impl Component for $ty {
                const KIND: ComponentKind = ComponentKind::$kind;

                fn column(store: &ComponentStore) -> &Column<Self> {
                    &store.$field
                }

                fn column_mut(store: &mut ComponentStore) -> &mut Column<Self> {
                    &mut store.$field
                }
            }
        )+
    };
}

component_kinds! {
    Transform => transform: crate::math::Transform,
    Hierarchy => hierarchy: crate::ecs::hierarchy::Hierarchy,
    WorldTransform => world_transform: crate::ecs::hierarchy::WorldTransform,
    Mesh => mesh: crate::render::MeshComponent,
    Movable => movable: crate::movement::Movable,
    Light => light: crate::light::Light,
    Timer => timer: crate::timer::Timer,
    Rigidbody => rigidbody: crate::physics::Rigidbody,
    Collider => collider: crate::physics::Collider,
    Camera => camera: crate::camera::Camera,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Transform, Vec3};
    use crate::movement::Movable;

    #[test]
    fn column_insert_overwrites() {
        let mut col = Column::new();
        assert_eq!(col.insert(3, 1), None);
        assert_eq!(col.insert(3, 2), Some(1));
        assert_eq!(col.len(), 1);
        assert_eq!(col.get(3), Some(&2));
        assert_eq!(col.get(0), None);
        assert_eq!(col.get(100), None);
    }

    #[test]
    fn column_remove() {
        let mut col = Column::new();
        col.insert(0, "a");
        assert_eq!(col.remove(0), Some("a"));
        assert_eq!(col.remove(0), None);
        assert_eq!(col.remove(7), None);
        assert!(col.is_empty());
    }

    #[test]
    fn store_routes_types_to_columns() {
        let mut store = ComponentStore::new();
        let e = Entity::from_raw(2);
        Transform::column_mut(&mut store).insert(e.index(), Transform::from_xyz(1.0, 0.0, 0.0));

        assert!(store.has(ComponentKind::Transform, e));
        assert!(!store.has(ComponentKind::Movable, e));
        assert_eq!(store.count(ComponentKind::Transform), 1);
        assert_eq!(
            Transform::column(&store).get(e.index()).map(|t| t.position),
            Some(Vec3::X)
        );
    }

    #[test]
    fn remove_all_clears_every_kind() {
        let mut store = ComponentStore::new();
        let e = Entity::from_raw(0);
        Transform::column_mut(&mut store).insert(e.index(), Transform::default());
        Movable::column_mut(&mut store).insert(e.index(), Movable::default());

        store.remove_all(e);

        for kind in ComponentKind::ALL {
            assert!(!store.has(*kind, e));
        }
    }
}
