//! Physics Module
//!
//! Grid-specific player movement. Not a general rigid-body solver: the player
//! is a stack of unit cells resolved against obstacle blocks one axis at a
//! time.

pub mod collision;
pub mod player;

pub use collision::{collide, player_intersects_block};
pub use player::{apply_look, motion_vector, step_player, PlayerData};
