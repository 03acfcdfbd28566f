//! # Hearth — Headless ECS Game Runtime
//!
//! A small entity-component-system runtime that drives an external renderer
//! and physics engine through traits, with fixed-timestep physics sync,
//! parent/child transforms and hot-swappable gameplay systems.
//!
//! Start with `use hearth::prelude::*` and build an [`App`](app::App).

pub mod app;
pub mod camera;
pub mod config;
pub mod debug;
pub mod ecs;
pub mod error;
pub mod input;
pub mod light;
pub mod math;
pub mod movement;
pub mod physics;
pub mod prelude;
pub mod reload;
pub mod render;
pub mod time;
pub mod timer;
