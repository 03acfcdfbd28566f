//! Entity-attached follow cameras and the debug free-fly camera.
//!
//! A [`Camera`] component orbits (third person) or looks out from (first
//! person) the entity it is attached to. The [`FreeCamera`] resource is a
//! detached fly camera for inspecting the scene; while it is active the
//! follow cameras and keyboard movement stand down.
//!
//! ```text
//!  key  | follow camera            | free camera
//! ------+--------------------------+--------------------------
//!  Esc  | toggle cursor lock       | toggle cursor lock
//!  Tab  | third ↔ first person     |
//!  Q/E  | yaw left/right           | down/up
//!  R/F  | pitch up/down            |
//!  WASD |                          | fly along forward/right
//!  0    |                          | activate (debug only)
//!  1    |                          | deactivate
//! ```
//!
//! Yaw and pitch are degrees. Pitch is clamped to ±[`MAX_PITCH`].

use crate::debug::DebugSettings;
use crate::ecs::World;
use crate::input::{EdgeLatch, Key};
use crate::math::{DVec2, Transform, Vec3};
use crate::render::CameraParams;

/// Pitch limit in degrees, short of straight up/down.
pub const MAX_PITCH: f32 = 89.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CameraMode {
    #[default]
    ThirdPerson,
    FirstPerson,
}

impl CameraMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::ThirdPerson => Self::FirstPerson,
            Self::FirstPerson => Self::ThirdPerson,
        }
    }
}

/// Turns absolute cursor positions into per-frame deltas.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MouseTracker {
    last: DVec2,
    initialized: bool,
}

impl MouseTracker {
    /// Forget the last position so the next sample yields no movement.
    pub fn reset(&mut self) {
        self.initialized = false;
    }

    pub fn sample(&mut self, position: DVec2) -> DVec2 {
        let delta = if self.initialized {
            position - self.last
        } else {
            DVec2::ZERO
        };
        self.last = position;
        self.initialized = true;
        delta
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub mode: CameraMode,
    /// Orbit offset; only its length (the orbit distance) is used.
    pub offset: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub fov: f32,
    /// Degrees per second for keyboard look.
    pub look_speed: f32,
    /// Degrees per pixel of mouse movement.
    pub mouse_sensitivity: f32,
    /// First-person eye height above the entity origin.
    pub eye_height: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Orbit distance change per scroll unit.
    pub zoom_speed: f32,
    pub(crate) mouse: MouseTracker,
    escape: EdgeLatch,
    mode_toggle: EdgeLatch,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            mode: CameraMode::ThirdPerson,
            offset: Vec3::new(0.0, 0.0, 3.0),
            yaw: 0.0,
            pitch: 0.0,
            fov: 45.0,
            look_speed: 90.0,
            mouse_sensitivity: 0.15,
            eye_height: 0.8,
            min_distance: 1.0,
            max_distance: 20.0,
            zoom_speed: 2.0,
            mouse: MouseTracker::default(),
            escape: EdgeLatch::new(),
            mode_toggle: EdgeLatch::new(),
        }
    }
}

impl Camera {
    pub fn first_person() -> Self {
        Self {
            mode: CameraMode::FirstPerson,
            ..Self::default()
        }
    }

    pub fn distance(&self) -> f32 {
        self.offset.length()
    }

    fn follow(&mut self, input: &mut FrameInput, target: Vec3, dt: f32) -> CameraParams {
        if self.escape.rising(input.escape) {
            input.toggle_cursor_lock();
            self.mouse.reset();
        }
        if self.mode_toggle.rising(input.tab) {
            self.mode = self.mode.toggled();
        }

        if input.cursor_locked {
            let delta = self.mouse.sample(input.cursor);
            self.yaw -= delta.x as f32 * self.mouse_sensitivity;
            self.pitch += delta.y as f32 * self.mouse_sensitivity;
        }

        let step = self.look_speed * dt;
        self.yaw += axis(input.e, input.q) * step;
        self.pitch += axis(input.r, input.f) * step;
        self.pitch = clamp_pitch(self.pitch);

        let direction = look_direction(self.yaw, self.pitch);
        match self.mode {
            CameraMode::FirstPerson => {
                let eye = target + Vec3::Y * self.eye_height;
                CameraParams {
                    eye,
                    target: eye + direction,
                    up: Vec3::Y,
                    fov: self.fov,
                }
            }
            CameraMode::ThirdPerson => {
                let distance = (self.distance() - input.take_scroll() * self.zoom_speed)
                    .max(self.min_distance)
                    .min(self.max_distance);
                self.offset = Vec3::new(0.0, 0.0, distance);
                CameraParams {
                    eye: target + direction * distance,
                    target,
                    up: Vec3::Y,
                    fov: self.fov,
                }
            }
        }
    }
}

/// Detached fly camera, toggled with 0/1 while the debug overlay is on.
#[derive(Debug, Clone, PartialEq)]
pub struct FreeCamera {
    pub active: bool,
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub fov: f32,
    /// Units per second.
    pub speed: f32,
    /// Degrees per pixel of mouse movement.
    pub sensitivity: f32,
    mouse: MouseTracker,
    activate: EdgeLatch,
    deactivate: EdgeLatch,
    escape: EdgeLatch,
}

impl Default for FreeCamera {
    fn default() -> Self {
        Self {
            active: false,
            position: Vec3::new(0.0, 2.0, 5.0),
            yaw: 0.0,
            pitch: 0.0,
            fov: 45.0,
            speed: 5.0,
            sensitivity: 0.1,
            mouse: MouseTracker::default(),
            activate: EdgeLatch::new(),
            deactivate: EdgeLatch::new(),
            escape: EdgeLatch::new(),
        }
    }
}

impl FreeCamera {
    /// Forward at yaw 0 is -Z.
    pub fn forward(&self) -> Vec3 {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        Vec3::new(pitch.cos() * yaw.sin(), pitch.sin(), -pitch.cos() * yaw.cos())
    }

    /// Horizontal right vector.
    pub fn right(&self) -> Vec3 {
        let yaw = self.yaw.to_radians();
        Vec3::new(yaw.cos(), 0.0, yaw.sin())
    }

    fn fly(&mut self, input: &mut FrameInput, dt: f32) -> CameraParams {
        if self.escape.rising(input.escape) {
            input.toggle_cursor_lock();
            self.mouse.reset();
        }

        if input.cursor_locked {
            let delta = self.mouse.sample(input.cursor);
            self.yaw += delta.x as f32 * self.sensitivity;
            self.pitch -= delta.y as f32 * self.sensitivity;
        }
        self.pitch = clamp_pitch(self.pitch);

        let forward = self.forward();
        let right = self.right();
        let step = self.speed * dt;
        self.position += forward * axis(input.w, input.s) * step;
        self.position += right * axis(input.d, input.a) * step;
        self.position.y += axis(input.e, input.q) * step;

        CameraParams {
            eye: self.position,
            target: self.position + forward,
            up: Vec3::Y,
            fov: self.fov,
        }
    }
}

/// Key and cursor state sampled once per frame.
#[derive(Debug, Default)]
struct FrameInput {
    escape: bool,
    tab: bool,
    w: bool,
    a: bool,
    s: bool,
    d: bool,
    q: bool,
    e: bool,
    r: bool,
    f: bool,
    cursor: DVec2,
    cursor_locked: bool,
    lock_changed: bool,
    scroll: f32,
    scroll_consumed: bool,
}

impl FrameInput {
    fn sample(world: &World) -> Self {
        let renderer = world.renderer();
        let key = |k| renderer.is_key_pressed(k);
        Self {
            escape: key(Key::Escape),
            tab: key(Key::Tab),
            w: key(Key::W),
            a: key(Key::A),
            s: key(Key::S),
            d: key(Key::D),
            q: key(Key::Q),
            e: key(Key::E),
            r: key(Key::R),
            f: key(Key::F),
            cursor: renderer.cursor_position(),
            cursor_locked: renderer.is_cursor_locked(),
            lock_changed: false,
            scroll: renderer.scroll_offset().y,
            scroll_consumed: false,
        }
    }

    fn toggle_cursor_lock(&mut self) {
        self.cursor_locked = !self.cursor_locked;
        self.lock_changed = !self.lock_changed;
    }

    fn take_scroll(&mut self) -> f32 {
        self.scroll_consumed = true;
        std::mem::take(&mut self.scroll)
    }

    /// Hand cursor and scroll changes back to the renderer.
    fn apply(&self, world: &mut World) {
        let renderer = world.renderer_mut();
        if self.lock_changed {
            renderer.set_cursor_locked(self.cursor_locked);
        }
        if self.scroll_consumed {
            renderer.reset_scroll_offset();
        }
    }
}

fn axis(positive: bool, negative: bool) -> f32 {
    positive as i8 as f32 - negative as i8 as f32
}

fn clamp_pitch(pitch: f32) -> f32 {
    pitch.clamp(-MAX_PITCH, MAX_PITCH)
}

/// Unit vector for yaw/pitch in degrees; yaw 0 looks along +Z.
fn look_direction(yaw: f32, pitch: f32) -> Vec3 {
    let (yaw, pitch) = (yaw.to_radians(), pitch.to_radians());
    Vec3::new(pitch.cos() * yaw.sin(), pitch.sin(), pitch.cos() * yaw.cos())
}

fn free_camera_active(world: &World) -> bool {
    world.get_resource::<FreeCamera>().is_some_and(|cam| cam.active)
}

/// Handle free camera activation and, while active, fly it.
///
/// Deactivating resets every follow camera's mouse tracking so they don't
/// jump on the first frame back.
pub fn free_camera_system(world: &mut World) {
    let debug = world.get_resource::<DebugSettings>().is_some_and(|d| d.enabled);
    let key0 = world.renderer().is_key_pressed(Key::Num0);
    let key1 = world.renderer().is_key_pressed(Key::Num1);

    let free = world.resource_or_default::<FreeCamera>();
    if free.activate.rising(key0) && debug {
        free.active = true;
        free.mouse.reset();
        log::debug!("Free camera on");
    }
    let deactivated = free.deactivate.rising(key1) && free.active;
    if deactivated {
        free.active = false;
        log::debug!("Free camera off");
        for entity in world.query::<(Camera,)>() {
            if let Some(camera) = world.get_mut::<Camera>(entity) {
                camera.mouse.reset();
            }
        }
        world.renderer_mut().reset_scroll_offset();
    }

    if !free_camera_active(world) {
        return;
    }

    let dt = world.time().delta_secs();
    let mut input = FrameInput::sample(world);
    let params = world.resource_mut::<FreeCamera>().fly(&mut input, dt);
    input.apply(world);
    world.renderer_mut().set_camera(&params);
}

/// Drive every `Camera + Transform` entity and upload the resulting view.
pub fn camera_follow_system(world: &mut World) {
    if free_camera_active(world) {
        return;
    }

    let dt = world.time().delta_secs();
    let mut input = FrameInput::sample(world);
    let mut views = Vec::new();
    for entity in world.query::<(Camera, Transform)>() {
        let Some(target) = world.get::<Transform>(entity).map(|t| t.position) else {
            continue;
        };
        if let Some(camera) = world.get_mut::<Camera>(entity) {
            views.push(camera.follow(&mut input, target, dt));
        }
    }

    input.apply(world);
    let renderer = world.renderer_mut();
    for view in &views {
        renderer.set_camera(view);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::headless::HeadlessRenderer;

    fn setup(frame_time: f32) -> (World, HeadlessRenderer) {
        let renderer = HeadlessRenderer::with_frame_time(frame_time);
        let mut world = World::builder().renderer(renderer.clone()).build();
        world.update_time();
        (world, renderer)
    }

    fn camera_of(renderer: &HeadlessRenderer) -> CameraParams {
        renderer.state().camera.unwrap()
    }

    #[test]
    fn third_person_orbits_at_offset_distance() {
        let (mut world, renderer) = setup(0.1);
        world.spawn_with((Transform::from_xyz(1.0, 0.0, 0.0), Camera::default()));

        camera_follow_system(&mut world);

        let view = camera_of(&renderer);
        assert!(view.eye.abs_diff_eq(Vec3::new(1.0, 0.0, 3.0), 1e-5));
        assert_eq!(view.target, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(view.fov, 45.0);
    }

    #[test]
    fn scroll_zooms_and_clamps() {
        let (mut world, renderer) = setup(0.1);
        let e = world.spawn_with((Transform::default(), Camera::default()));

        renderer.scroll(0.0, 0.5);
        camera_follow_system(&mut world);
        assert!((world.get::<Camera>(e).unwrap().distance() - 2.0).abs() < 1e-5);
        assert_eq!(renderer.state().scroll, crate::math::Vec2::ZERO);

        renderer.scroll(0.0, 10.0);
        camera_follow_system(&mut world);
        assert_eq!(world.get::<Camera>(e).unwrap().distance(), 1.0);

        renderer.scroll(0.0, -100.0);
        camera_follow_system(&mut world);
        assert_eq!(world.get::<Camera>(e).unwrap().distance(), 20.0);
    }

    #[test]
    fn tab_switches_to_first_person_once_per_press() {
        let (mut world, renderer) = setup(0.1);
        let e = world.spawn_with((Transform::default(), Camera::default()));

        renderer.press(Key::Tab);
        camera_follow_system(&mut world);
        camera_follow_system(&mut world);
        assert_eq!(world.get::<Camera>(e).unwrap().mode, CameraMode::FirstPerson);

        let view = camera_of(&renderer);
        assert!(view.eye.abs_diff_eq(Vec3::new(0.0, 0.8, 0.0), 1e-5));
        assert!(view.target.abs_diff_eq(Vec3::new(0.0, 0.8, 1.0), 1e-5));
    }

    #[test]
    fn escape_toggles_cursor_lock() {
        let (mut world, renderer) = setup(0.1);
        world.spawn_with((Transform::default(), Camera::default()));

        renderer.press(Key::Escape);
        camera_follow_system(&mut world);
        camera_follow_system(&mut world);
        assert!(renderer.state().cursor_locked);

        renderer.release(Key::Escape);
        camera_follow_system(&mut world);
        renderer.press(Key::Escape);
        camera_follow_system(&mut world);
        assert!(!renderer.state().cursor_locked);
    }

    #[test]
    fn mouse_look_starts_after_first_sample() {
        let (mut world, renderer) = setup(0.1);
        let e = world.spawn_with((Transform::default(), Camera::default()));
        world.renderer_mut().set_cursor_locked(true);

        renderer.move_cursor(100.0, 100.0);
        camera_follow_system(&mut world);
        assert_eq!(world.get::<Camera>(e).unwrap().yaw, 0.0);

        renderer.move_cursor(110.0, 90.0);
        camera_follow_system(&mut world);
        let camera = world.get::<Camera>(e).unwrap();
        assert!((camera.yaw + 1.5).abs() < 1e-5);
        assert!((camera.pitch + 1.5).abs() < 1e-5);
    }

    #[test]
    fn keyboard_pitch_is_clamped() {
        let (mut world, renderer) = setup(10.0);
        let e = world.spawn_with((Transform::default(), Camera::default()));

        renderer.press(Key::R);
        camera_follow_system(&mut world);
        assert_eq!(world.get::<Camera>(e).unwrap().pitch, MAX_PITCH);
    }

    #[test]
    fn free_camera_needs_debug_to_activate() {
        let (mut world, renderer) = setup(0.1);
        renderer.press(Key::Num0);
        free_camera_system(&mut world);
        assert!(!world.resource::<FreeCamera>().active);

        renderer.release(Key::Num0);
        free_camera_system(&mut world);
        world.resource_or_default::<DebugSettings>().enabled = true;
        renderer.press(Key::Num0);
        free_camera_system(&mut world);
        assert!(world.resource::<FreeCamera>().active);
    }

    #[test]
    fn free_camera_flies_forward_and_suspends_follow() {
        let (mut world, renderer) = setup(0.1);
        world.spawn_with((Transform::default(), Camera::default()));
        world.resource_or_default::<FreeCamera>().active = true;

        renderer.press(Key::W);
        free_camera_system(&mut world);
        camera_follow_system(&mut world);

        let free = world.resource::<FreeCamera>();
        assert!(free.position.abs_diff_eq(Vec3::new(0.0, 2.0, 4.5), 1e-5));
        let view = camera_of(&renderer);
        assert!(view.eye.abs_diff_eq(free.position, 1e-5));
        assert!(view.target.abs_diff_eq(free.position + Vec3::NEG_Z, 1e-5));
    }

    #[test]
    fn deactivating_free_camera_resets_follow_tracking() {
        let (mut world, renderer) = setup(0.1);
        let e = world.spawn_with((Transform::default(), Camera::default()));
        world.renderer_mut().set_cursor_locked(true);
        camera_follow_system(&mut world);
        assert!(world.get::<Camera>(e).unwrap().mouse.initialized);

        world.resource_or_default::<FreeCamera>().active = true;
        renderer.scroll(0.0, 3.0);
        renderer.press(Key::Num1);
        free_camera_system(&mut world);

        assert!(!world.resource::<FreeCamera>().active);
        assert!(!world.get::<Camera>(e).unwrap().mouse.initialized);
        assert_eq!(renderer.state().scroll.y, 0.0);
    }
}
