//! Frame loop.
//!
//! The [`App`] owns the [`World`] and the optional [`HotReload`]
//! coordinator. Each frame:
//!
//! ```text
//! poll_events → update_time → hot reload (if pending) → run_systems → render_frame
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use hearth::prelude::*;
//!
//! fn main() {
//!     env_logger::init();
//!     App::new(World::new())
//!         .setup(|world| {
//!             hearth::app::add_default_systems(world);
//!         })
//!         .run();
//! }
//! ```

use crate::camera::{camera_follow_system, free_camera_system};
use crate::debug::{debug_collider_render_system, debug_overlay_system};
use crate::ecs::{System, World, resolve_hierarchy_system};
use crate::light::light_sync_system;
use crate::movement::input_movement_system;
use crate::physics::physics_system;
use crate::reload::{HotReload, ReloadOutcome};
use crate::render::render_sync_system;
use crate::timer::timer_system;

/// Register the built-in systems in frame order. Render sync is always last.
pub fn add_default_systems(world: &mut World) {
    world.add_system(input_movement_system);
    world.add_system(timer_system);
    world.add_system(physics_system);
    world.add_system(free_camera_system);
    world.add_system(camera_follow_system);
    world.add_system(light_sync_system);
    world.add_system(resolve_hierarchy_system);
    world.add_system(debug_overlay_system);
    world.add_system(debug_collider_render_system);
    world.add_system(render_sync_system);
}

pub struct App {
    pub world: World,
    reload: Option<HotReload>,
}

impl App {
    pub fn new(world: World) -> Self {
        Self {
            world,
            reload: None,
        }
    }

    pub fn with_hot_reload(mut self, reload: HotReload) -> Self {
        self.reload = Some(reload);
        self
    }

    /// Run `setup` against the world once, before the first frame.
    pub fn setup(mut self, setup: impl FnOnce(&mut World)) -> Self {
        setup(&mut self.world);
        self
    }

    pub fn add_system<S: System + 'static>(mut self, system: S) -> Self {
        self.world.add_system(system);
        self
    }

    pub fn add_named_system<S: System + 'static>(
        mut self,
        name: impl Into<String>,
        system: S,
    ) -> Self {
        self.world.add_named_system(name, system);
        self
    }

    pub fn hot_reload(&self) -> Option<&HotReload> {
        self.reload.as_ref()
    }

    pub fn hot_reload_mut(&mut self) -> Option<&mut HotReload> {
        self.reload.as_mut()
    }

    /// Run one frame. Returns what a hot reload did, if one happened.
    pub fn frame(&mut self) -> Option<ReloadOutcome> {
        self.world.renderer_mut().poll_events();
        self.world.update_time();

        let outcome = match &mut self.reload {
            Some(reload) => {
                reload.poll();
                // Failures are already logged; the old systems keep running.
                reload.apply(&mut self.world).ok().flatten()
            }
            None => None,
        };

        self.world.run_systems();
        self.world.renderer_mut().render_frame();
        outcome
    }

    /// Run `frames` frames, or fewer if the renderer asks to close.
    pub fn run_frames(&mut self, frames: u64) {
        for _ in 0..frames {
            if self.world.renderer().should_close() {
                break;
            }
            self.frame();
        }
    }

    /// Run until the renderer asks to close, then shut physics down.
    pub fn run(mut self) {
        log::info!("Starting frame loop with {} systems", self.world.schedule().len());
        while !self.world.renderer().should_close() {
            self.frame();
        }
        log::info!(
            "Frame loop ended after {} frames",
            self.world.time().frame_count()
        );
        self.world.physics_mut().shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReloadConfig;
    use crate::error::ReloadError;
    use crate::reload::SystemUnit;
    use crate::render::headless::HeadlessRenderer;

    #[derive(Default)]
    struct Frames(Vec<&'static str>);

    fn count_frame(world: &mut World) {
        world.resource_or_default::<Frames>().0.push("v1");
    }

    fn count_frame_v2(world: &mut World) {
        world.resource_or_default::<Frames>().0.push("v2");
    }

    fn headless_app() -> (App, HeadlessRenderer) {
        let renderer = HeadlessRenderer::new();
        let world = World::builder().renderer(renderer.clone()).build();
        (App::new(world), renderer)
    }

    #[test]
    fn default_systems_in_frame_order() {
        let mut world = World::new();
        add_default_systems(&mut world);
        assert_eq!(
            world.system_names(),
            [
                "input_movement_system",
                "timer_system",
                "physics_system",
                "free_camera_system",
                "camera_follow_system",
                "light_sync_system",
                "resolve_hierarchy_system",
                "debug_overlay_system",
                "debug_collider_render_system",
                "render_sync_system",
            ]
        );
    }

    #[test]
    fn frame_polls_advances_and_renders() {
        let (mut app, renderer) = headless_app();
        app.frame();
        app.frame();

        let state = renderer.state();
        assert_eq!(state.events_polled, 2);
        assert_eq!(state.frames_rendered, 2);
        assert_eq!(app.world.time().frame_count(), 2);
    }

    #[test]
    fn run_stops_when_renderer_closes() {
        let (app, renderer) = headless_app();
        renderer.close_after(3);
        app.setup(add_default_systems).run();
        assert_eq!(renderer.state().frames_rendered, 3);
    }

    #[test]
    fn run_frames_respects_close_request() {
        let (mut app, renderer) = headless_app();
        renderer.close_after(2);
        app.run_frames(10);
        assert_eq!(renderer.state().frames_rendered, 2);
    }

    #[test]
    fn reload_applies_before_systems_run() {
        let source = |_: u32| -> Result<SystemUnit, ReloadError> {
            Ok(SystemUnit::new().with_system("count_frame", count_frame_v2))
        };
        let config = ReloadConfig {
            debounce_ms: 0,
            ..ReloadConfig::default()
        };
        let (app, _renderer) = headless_app();
        let mut app = app
            .add_system(count_frame)
            .with_hot_reload(HotReload::new(source, &config));

        app.frame();
        app.hot_reload_mut().unwrap().notify_changed();
        let outcome = app.frame();

        assert_eq!(
            outcome,
            Some(ReloadOutcome::SystemsSwapped { version: 1, count: 1 })
        );
        assert_eq!(app.world.resource::<Frames>().0, ["v1", "v2"]);
    }

    #[test]
    fn failed_reload_keeps_frame_running() {
        let source = |_: u32| -> Result<SystemUnit, ReloadError> {
            Err(ReloadError::Load("no unit".into()))
        };
        let config = ReloadConfig {
            debounce_ms: 0,
            ..ReloadConfig::default()
        };
        let (app, renderer) = headless_app();
        let mut app = app
            .add_system(count_frame)
            .with_hot_reload(HotReload::new(source, &config));

        app.hot_reload_mut().unwrap().notify_changed();
        assert_eq!(app.frame(), None);
        assert_eq!(app.world.resource::<Frames>().0, ["v1"]);
        assert_eq!(renderer.state().frames_rendered, 1);
        assert_eq!(app.hot_reload().unwrap().version(), 1);
    }
}
