//! Input Data - Pure DOP
//!
//! NO METHODS beyond trivial queries. Just data.
//! All transformations happen in input_operations.rs

use crate::world::core::BlockId;

/// Keys the client reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    W,
    A,
    S,
    D,
    E,
    Q,
    T,
    Space,
    Tab,
    Enter,
    Escape,
    Backspace,
    /// Number row key 0..=9
    Digit(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
}

/// Raw event from the windowing layer, queued until the next tick
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    KeyPressed(KeyCode),
    KeyReleased(KeyCode),
    /// Text input, delivered after the matching key press
    Char(char),
    /// Cursor travel in pixels since the previous event
    MouseMoved { dx: f32, dy: f32 },
    MousePressed(MouseButton),
}

/// Input folded from one tick's worth of events
#[derive(Debug, Clone)]
pub struct InputState {
    // Held keys
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub jump: bool,

    /// Cursor is captured and clicks act on the world
    pub exclusive: bool,

    // Per-tick requests, cleared when the next batch is drained
    pub look_dx: f32,
    pub look_dy: f32,
    pub break_block: bool,
    pub place_block: bool,
    pub toggle_flying: bool,
    pub quit: bool,
    pub submitted_chat: Vec<String>,

    /// Block placed by the next place request
    pub block_type: BlockId,

    // Chat line editor
    pub typing: bool,
    pub typing_buffer: String,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            forward: false,
            back: false,
            left: false,
            right: false,
            jump: false,
            exclusive: true,
            look_dx: 0.0,
            look_dy: 0.0,
            break_block: false,
            place_block: false,
            toggle_flying: false,
            quit: false,
            submitted_chat: Vec::new(),
            block_type: BlockId::GRASS,
            typing: false,
            typing_buffer: String::new(),
        }
    }
}

impl InputState {
    /// Movement axes as (forward/back, strafe). Forward is negative, like the
    /// view space z axis. Zero while typing.
    pub fn movement(&self) -> (i32, i32) {
        if self.typing {
            return (0, 0);
        }
        let sz = self.back as i32 - self.forward as i32;
        let sx = self.right as i32 - self.left as i32;
        (sz, sx)
    }

    pub fn wants_jump(&self) -> bool {
        self.jump && !self.typing
    }
}
