//! Convenience re-exports — `use hearth::prelude::*` for the common items.

pub use crate::app::{App, add_default_systems};
pub use crate::camera::{Camera, CameraMode, FreeCamera};
pub use crate::config::EngineConfig;
pub use crate::debug::{DebugColliders, DebugSettings};
pub use crate::ecs::{Entity, Hierarchy, Schedule, System, SystemFn, World, WorldTransform};
pub use crate::error::{ConfigError, PhysicsError, ReloadError, RenderError};
pub use crate::input::Key;
pub use crate::light::{Light, LightType};
pub use crate::math::{Color, Mat4, Quat, Transform, Vec2, Vec3, Vec4};
pub use crate::movement::Movable;
pub use crate::physics::{Collider, ColliderShape, MotionType, PhysicsBackend, Rigidbody};
#[cfg(feature = "physics3d")]
pub use crate::physics::rapier::RapierBackend;
pub use crate::reload::{BuildCommand, HotReload, ReloadOutcome, SystemSource, SystemUnit};
pub use crate::render::headless::HeadlessRenderer;
pub use crate::render::{MeshComponent, MeshHandle, ProceduralMesh, Renderer};
pub use crate::time::Time;
pub use crate::timer::Timer;
