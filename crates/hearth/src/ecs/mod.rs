//! # Entity Component System
//!
//! A small ECS with a closed set of component kinds.
//!
//! ## Module Overview
//!
//! - [`entity`] — Monotonic entity ids
//! - [`component`] — One typed column per component kind
//! - [`world`] — Central container (entities + components + resources +
//!   schedule + renderer/physics capabilities)
//! - [`query`] — "Which alive entities have all of these kinds?"
//! - [`system`] — System trait and the named, ordered schedule
//! - [`hierarchy`] — Parent links and world-matrix resolution

pub mod component;
pub mod entity;
pub mod hierarchy;
pub mod query;
pub mod system;
pub mod world;

pub use component::{Component, ComponentKind};
pub use entity::Entity;
pub use hierarchy::{Hierarchy, WorldTransform, resolve_hierarchy_system};
pub use query::QueryKinds;
pub use system::{Schedule, System, SystemFn};
pub use world::{Bundle, World, WorldBuilder};
