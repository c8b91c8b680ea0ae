//! Input Module
//!
//! Window callbacks never touch game state directly. They queue
//! `InputEvent`s, and the game loop folds them into an `InputState` once per
//! tick.

pub mod input_data;
pub mod input_operations;

pub use input_data::{InputEvent, InputState, KeyCode, MouseButton};
pub use input_operations::{apply_event, drain_input_events};
