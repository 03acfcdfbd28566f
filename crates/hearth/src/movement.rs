//! Keyboard-driven rotation for [`Movable`] entities.

use crate::camera::FreeCamera;
use crate::ecs::World;
use crate::input::Key;
use crate::math::Transform;

/// Rotates with the arrow keys or WASD.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Movable {
    /// Degrees per second.
    pub speed: f32,
}

impl Movable {
    pub fn new(speed: f32) -> Self {
        Self { speed }
    }
}

impl Default for Movable {
    fn default() -> Self {
        Self { speed: 90.0 }
    }
}

/// Left/A and Right/D turn about Y, Up/W and Down/S tilt about X.
///
/// Does nothing while the free camera is flying, since it owns WASD then.
pub fn input_movement_system(world: &mut World) {
    if world.get_resource::<FreeCamera>().is_some_and(|cam| cam.active) {
        return;
    }

    let dt = world.time().delta_secs();
    let renderer = world.renderer();
    let held = |a: Key, b: Key| renderer.is_key_pressed(a) || renderer.is_key_pressed(b);
    let yaw = held(Key::Right, Key::D) as i8 - held(Key::Left, Key::A) as i8;
    let pitch = held(Key::Down, Key::S) as i8 - held(Key::Up, Key::W) as i8;
    if yaw == 0 && pitch == 0 {
        return;
    }

    for entity in world.query::<(Movable, Transform)>() {
        let Some(step) = world.get::<Movable>(entity).map(|m| m.speed * dt) else {
            continue;
        };
        if let Some(transform) = world.get_mut::<Transform>(entity) {
            transform.rotation.y += yaw as f32 * step;
            transform.rotation.x += pitch as f32 * step;
        }
    }
}
