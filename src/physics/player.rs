//! Player movement - look, walking, flying and gravity

use super::collision::collide;
use crate::constants::physics::{
    FLY_SPEED, GRAVITY, JUMP_VELOCITY, MAX_FRAME_DELTA, MOUSE_SENSITIVITY, SUBSTEPS,
    TERMINAL_VELOCITY, WALK_SPEED,
};
use crate::input::InputState;
use crate::world::storage::Chunk;
use cgmath::{Point3, Vector3, Zero};
use std::f32::consts::{FRAC_PI_2, TAU};

/// Player pose and vertical velocity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerData {
    /// Eye position
    pub position: Point3<f32>,
    /// Heading in radians, [0, 2π)
    pub yaw: f32,
    /// Elevation in radians, [-π/2, π/2]
    pub pitch: f32,
    /// Vertical velocity in units per second
    pub dy: f32,
    pub flying: bool,
}

impl PlayerData {
    pub fn new(position: Point3<f32>, yaw: f32, pitch: f32) -> Self {
        Self {
            position,
            yaw,
            pitch,
            dy: 0.0,
            flying: false,
        }
    }
}

/// Unit movement direction for the held movement axes.
///
/// `sz` is -1 for forward and +1 for back, `sx` is -1 for left and +1 for
/// right. Walking stays horizontal. Flying forward or back follows the pitch;
/// any strafe component keeps flight level.
pub fn motion_vector(flying: bool, sz: i32, sx: i32, yaw: f32, pitch: f32) -> Vector3<f32> {
    if sz == 0 && sx == 0 {
        return Vector3::zero();
    }
    let strafe = (sz as f32).atan2(sx as f32);
    let heading = yaw + strafe;

    if flying {
        let (mut m, mut y) = (pitch.cos(), pitch.sin());
        if sx != 0 {
            y = 0.0;
            m = 1.0;
        }
        if sz > 0 {
            y = -y;
        }
        Vector3::new(heading.cos() * m, y, heading.sin() * m)
    } else {
        Vector3::new(heading.cos(), 0.0, heading.sin())
    }
}

/// Turn by a mouse delta in pixels. Moving the cursor up looks up.
pub fn apply_look(player: &mut PlayerData, dx: f32, dy: f32) {
    player.yaw = (player.yaw + dx * MOUSE_SENSITIVITY).rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if player.yaw >= TAU {
        player.yaw = 0.0;
    }
    player.pitch = (player.pitch - dy * MOUSE_SENSITIVITY).clamp(-FRAC_PI_2, FRAC_PI_2);
}

/// Advance the player by one frame.
///
/// `dt` is capped at `MAX_FRAME_DELTA` and split into `SUBSTEPS` sub-steps.
/// Every sub-step applies gravity (unless flying), moves, then resolves
/// collisions; a vertical collision zeroes the vertical velocity.
pub fn step_player(
    player: &mut PlayerData,
    input: &InputState,
    chunks: &[Chunk],
    dt: f32,
    height: i32,
    chunk_size: i32,
) {
    let dt = dt.clamp(0.0, MAX_FRAME_DELTA);
    let (sz, sx) = input.movement();

    if player.dy == 0.0 && input.wants_jump() {
        player.dy = JUMP_VELOCITY;
    }

    let speed = if player.flying { FLY_SPEED } else { WALK_SPEED };
    let ut = dt / SUBSTEPS as f32;
    let v = motion_vector(player.flying, sz, sx, player.yaw, player.pitch) * (ut * speed);

    for _ in 0..SUBSTEPS {
        if player.flying {
            player.dy = 0.0;
        } else {
            player.dy = (player.dy - ut * GRAVITY).max(-TERMINAL_VELOCITY);
        }
        player.position.x += v.x;
        player.position.y += v.y + player.dy * ut;
        player.position.z += v.z;

        let (corrected, vertical) = collide(chunks, height, player.position, chunk_size);
        player.position = corrected;
        if vertical {
            player.dy = 0.0;
        }
    }
}
