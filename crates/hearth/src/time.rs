//! Frame timing and delta time.
//!
//! [`Time`] is sampled from the renderer once per frame, before any system
//! runs. Systems read it through [`World::time`](crate::ecs::World::time).

/// Frame timing state owned by the [`World`](crate::ecs::World).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Time {
    /// Duration of the previous frame in seconds.
    delta: f32,
    /// Total time since the renderer started.
    elapsed: f32,
    /// Frame counter.
    frame_count: u64,
}

impl Time {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the timing of a new frame.
    pub fn advance(&mut self, delta: f32, elapsed: f32) {
        self.delta = delta.max(0.0);
        self.elapsed = elapsed;
        self.frame_count += 1;
    }

    /// Delta time in seconds, the most common way to use it.
    pub fn delta_secs(&self) -> f32 {
        self.delta
    }

    /// Total elapsed time in seconds.
    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed
    }

    /// Number of frames advanced so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Estimated FPS based on the last frame's delta.
    pub fn fps(&self) -> f32 {
        if self.delta > 0.0 { 1.0 / self.delta } else { 0.0 }
    }
}
