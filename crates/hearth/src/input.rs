//! Keyboard keys and edge detection.
//!
//! Key state comes straight from the renderer (`Renderer::is_key_pressed`),
//! which only reports whether a key is held. Toggles such as cursor lock or
//! the debug overlay need "pressed this frame" semantics, which [`EdgeLatch`]
//! derives from the held state.

/// Keys the engine's built-in systems react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    W,
    A,
    S,
    D,
    Q,
    E,
    R,
    F,
    Up,
    Down,
    Left,
    Right,
    Escape,
    Tab,
    Space,
    Num0,
    Num1,
    F3,
}

/// Remembers whether a key was held last frame so a press fires once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeLatch {
    was_pressed: bool,
}

impl EdgeLatch {
    pub const fn new() -> Self {
        Self { was_pressed: false }
    }

    /// Feed the current held state. Returns `true` only on the frame the key
    /// goes down.
    pub fn rising(&mut self, pressed: bool) -> bool {
        let fired = pressed && !self.was_pressed;
        self.was_pressed = pressed;
        fired
    }

    pub fn is_held(&self) -> bool {
        self.was_pressed
    }
}
