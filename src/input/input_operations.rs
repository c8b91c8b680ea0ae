//! Input Operations - Pure functions over InputState
//!
//! The windowing layer pushes `InputEvent`s into a queue; the game loop
//! drains the queue once per tick with `drain_input_events`.

use super::input_data::{InputEvent, InputState, KeyCode, MouseButton};
use crate::constants::protocol::MAX_CHAT_LENGTH;
use crate::world::core::BlockId;
use std::collections::VecDeque;

/// Fold every queued event into `state`, oldest first.
///
/// Per-tick requests (look deltas, clicks, flying toggle, submitted chat)
/// are cleared before folding; held keys, the selected block and the chat
/// editor carry over between ticks. A quit request is sticky.
pub fn drain_input_events(queue: &mut VecDeque<InputEvent>, state: &mut InputState) {
    begin_tick(state);
    while let Some(event) = queue.pop_front() {
        apply_event(state, event);
    }
}

fn begin_tick(state: &mut InputState) {
    state.look_dx = 0.0;
    state.look_dy = 0.0;
    state.break_block = false;
    state.place_block = false;
    state.toggle_flying = false;
    state.submitted_chat.clear();
}

/// Apply a single event
pub fn apply_event(state: &mut InputState, event: InputEvent) {
    match event {
        InputEvent::KeyPressed(key) => key_pressed(state, key),
        InputEvent::KeyReleased(key) => set_held(state, key, false),
        InputEvent::Char(c) => char_typed(state, c),
        InputEvent::MouseMoved { dx, dy } => {
            if state.exclusive {
                state.look_dx += dx;
                state.look_dy += dy;
            }
        }
        InputEvent::MousePressed(button) => mouse_pressed(state, button),
    }
}

fn key_pressed(state: &mut InputState, key: KeyCode) {
    match key {
        KeyCode::Escape => {
            if state.typing {
                state.typing = false;
                state.typing_buffer.clear();
            }
            state.exclusive = false;
        }
        KeyCode::Enter => {
            if state.typing {
                state.typing = false;
                let line = std::mem::take(&mut state.typing_buffer);
                state.submitted_chat.push(line);
            }
        }
        KeyCode::Backspace => {
            if state.typing {
                state.typing_buffer.pop();
            }
        }
        _ if state.typing => {}
        KeyCode::Tab => state.toggle_flying = !state.toggle_flying,
        KeyCode::E => state.block_type = state.block_type.next_building_block(),
        KeyCode::Digit(n) if (1..=BlockId::BUILDING_BLOCK_COUNT as u8).contains(&n) => {
            state.block_type = BlockId(n as u16);
        }
        KeyCode::Q => state.quit = true,
        other => set_held(state, other, true),
    }
}

fn set_held(state: &mut InputState, key: KeyCode, held: bool) {
    match key {
        KeyCode::W => state.forward = held,
        KeyCode::S => state.back = held,
        KeyCode::A => state.left = held,
        KeyCode::D => state.right = held,
        KeyCode::Space => state.jump = held,
        _ => {}
    }
}

fn char_typed(state: &mut InputState, c: char) {
    if state.typing {
        let printable = c.is_ascii() && !c.is_ascii_control();
        if printable && state.typing_buffer.len() < MAX_CHAT_LENGTH {
            state.typing_buffer.push(c);
        }
    } else if c == 't' {
        state.typing = true;
        state.typing_buffer.clear();
    }
}

fn mouse_pressed(state: &mut InputState, button: MouseButton) {
    match button {
        MouseButton::Left if state.exclusive => state.break_block = true,
        MouseButton::Left => state.exclusive = true,
        MouseButton::Right if state.exclusive => state.place_block = true,
        MouseButton::Right => {}
    }
}
