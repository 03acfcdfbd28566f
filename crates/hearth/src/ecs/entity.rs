//! # Entity — Monotonic Identifiers
//!
//! An [`Entity`] is just a number. The [`World`](super::world::World) maps
//! entities to their components; the allocator only tracks which numbers are
//! currently alive.
//!
//! ## Design: No Recycling
//!
//! Identifiers are handed out from a counter and never reused within a
//! session, so a stale handle (a `Hierarchy` parent that died, a debug
//! wireframe keyed by a despawned entity) can never alias a newer entity.
//!
//! ```text
//! alive: {0, 2, 3}   ← ordered set of live identifiers
//! next:  4           ← next fresh identifier
//! ```
//!
//! Liveness is an ordered set rather than a flag per identifier ever issued,
//! so iteration and memory track the alive population, not spawn/despawn
//! churn. Running out of the `u32` identifier space panics instead of
//! wrapping around onto old handles.
//!
//! The only way back to zero is [`EntityAllocator::reset`], used by
//! `World::reset` after every component table has been cleared.
//!
//! ## Comparison
//!
//! - **hecs / bevy_ecs**: generational indices, slots are recycled.
//! - **Here**: a monotonic counter. Component columns are keyed by the
//!   identifier directly, with no generation check.

use std::collections::BTreeSet;
use std::fmt;

/// A lightweight handle to an entity in the [`World`](super::world::World).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity(pub(crate) u32);

impl Entity {
    /// Build a handle from a raw identifier. The entity is not necessarily alive.
    pub const fn from_raw(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw identifier.
    pub fn id(self) -> u32 {
        self.0
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Issues entity identifiers and tracks liveness.
pub(crate) struct EntityAllocator {
    /// Live identifiers, ascending.
    alive: BTreeSet<u32>,
    /// Next identifier to hand out. Wider than `u32` so exhaustion is detectable.
    next: u64,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self {
            alive: BTreeSet::new(),
            next: 0,
        }
    }

    /// Allocate the next identifier and mark it alive.
    ///
    /// # Panics
    ///
    /// Panics once every `u32` identifier has been issued since the last reset.
    pub fn allocate(&mut self) -> Entity {
        let id = u32::try_from(self.next).unwrap_or_else(|_| {
            panic!("Entity identifiers exhausted ({} issued); reset the world", self.next)
        });
        self.next += 1;
        self.alive.insert(id);
        Entity(id)
    }

    /// Mark an entity dead.
    ///
    /// Returns `true` if the entity was alive, `false` if it was already dead
    /// or never issued.
    pub fn deallocate(&mut self, entity: Entity) -> bool {
        self.alive.remove(&entity.0)
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.alive.contains(&entity.0)
    }

    /// Returns the number of currently alive entities.
    pub fn alive_count(&self) -> usize {
        self.alive.len()
    }

    /// Total identifiers issued since the last reset.
    pub fn issued(&self) -> u64 {
        self.next
    }

    /// Alive entities in ascending identifier (spawn) order.
    pub fn iter_alive(&self) -> impl Iterator<Item = Entity> + '_ {
        self.alive.iter().map(|id| Entity(*id))
    }

    /// Forget every identifier and restart allocation at zero.
    pub fn reset(&mut self) {
        self.alive.clear();
        self.next = 0;
    }

    #[cfg(test)]
    fn with_next(next: u64) -> Self {
        Self {
            alive: BTreeSet::new(),
            next,
        }
    }
}
