//! Countdown timers ticked by frame delta.

use crate::ecs::World;

#[derive(Debug, Clone, PartialEq)]
pub struct Timer {
    /// Seconds until the timer finishes.
    pub duration: f32,
    pub elapsed: f32,
    /// Repeating timers wrap around instead of stopping.
    pub repeat: bool,
    /// Set once `elapsed` first reaches `duration`. Never cleared by the
    /// system; gameplay code resets it when it consumes the event.
    pub finished: bool,
    /// Free-form label for gameplay code.
    pub tag: String,
}

impl Timer {
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            ..Self::default()
        }
    }

    pub fn repeating(duration: f32) -> Self {
        Self {
            duration,
            repeat: true,
            ..Self::default()
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Advance by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        if self.finished && !self.repeat {
            return;
        }
        self.elapsed += dt;
        if self.elapsed >= self.duration {
            self.finished = true;
            if self.repeat {
                self.elapsed -= self.duration;
            }
        }
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.finished = false;
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self {
            duration: 1.0,
            elapsed: 0.0,
            repeat: false,
            finished: false,
            tag: String::new(),
        }
    }
}

pub fn timer_system(world: &mut World) {
    let dt = world.time().delta_secs();
    for entity in world.query::<(Timer,)>() {
        if let Some(timer) = world.get_mut::<Timer>(entity) {
            timer.tick(dt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::headless::HeadlessRenderer;

    #[test]
    fn one_shot_stops_at_duration() {
        let mut timer = Timer::new(1.0);
        timer.tick(0.6);
        assert!(!timer.finished);
        timer.tick(0.6);
        assert!(timer.finished);
        let elapsed = timer.elapsed;
        timer.tick(5.0);
        assert_eq!(timer.elapsed, elapsed);
    }

    #[test]
    fn repeating_wraps_elapsed() {
        let mut timer = Timer::repeating(1.0);
        timer.tick(1.25);
        assert!(timer.finished);
        assert!((timer.elapsed - 0.25).abs() < 1e-6);
        timer.tick(0.5);
        assert!((timer.elapsed - 0.75).abs() < 1e-6);
    }

    #[test]
    fn reset_rearms() {
        let mut timer = Timer::new(0.5).with_tag("spawn");
        timer.tick(1.0);
        timer.reset();
        assert!(!timer.finished);
        assert_eq!(timer.elapsed, 0.0);
        assert_eq!(timer.tag, "spawn");
    }

    #[test]
    fn system_uses_frame_delta() {
        let renderer = HeadlessRenderer::with_frame_time(0.25);
        let mut world = World::builder().renderer(renderer).build();
        let e = world.spawn_with((Timer::new(0.5),));

        world.update_time();
        timer_system(&mut world);
        assert!(!world.get::<Timer>(e).unwrap().finished);

        world.update_time();
        timer_system(&mut world);
        assert!(world.get::<Timer>(e).unwrap().finished);
    }
}
