//! # Query — Entities With All Requested Kinds
//!
//! A query is a tuple of component types. It resolves to the alive entities
//! that hold every kind in the tuple, in ascending identifier order, which is
//! also spawn order:
//!
//! ```ignore
//! for entity in world.query::<(Transform, MeshComponent)>() {
//!     let transform = world.get::<Transform>(entity).unwrap();
//!     // ...
//! }
//! ```
//!
//! Queries return owned `Vec<Entity>` snapshots, so a system can mutate the
//! world (including despawning) while walking the result. Nothing is cached;
//! every call rescans the alive set.

use super::component::{Component, ComponentKind, ComponentStore};
use super::entity::{Entity, EntityAllocator};

/// A set of component kinds that can be queried together.
pub trait QueryKinds {
    fn kinds() -> Vec<ComponentKind>;
}

macro_rules! impl_query_kinds_tuple {
    ($($C:ident),+) => {
        impl<$($C: Component),+> QueryKinds for ($($C,)+) {
            fn kinds() -> Vec<ComponentKind> {
                vec![$($C::KIND),+]
            }
        }
    };
}

impl_query_kinds_tuple!(A);
impl_query_kinds_tuple!(A, B);
impl_query_kinds_tuple!(A, B, C);
impl_query_kinds_tuple!(A, B, C, D);
impl_query_kinds_tuple!(A, B, C, D, E);

/// Alive entities present in every column named by `kinds`.
pub(crate) fn matching(
    allocator: &EntityAllocator,
    store: &ComponentStore,
    kinds: &[ComponentKind],
) -> Vec<Entity> {
    allocator
        .iter_alive()
        .filter(|entity| kinds.iter().all(|kind| store.has(*kind, *entity)))
        .collect()
}
