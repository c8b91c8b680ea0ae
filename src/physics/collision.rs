//! Voxel collision - per-axis penetration resolution against the block grid
//!
//! The player is a column of `height` unit cells whose top cell holds the
//! eye. Each axis is resolved on its own with a soft `COLLISION_PAD` margin,
//! so a single pass may correct x, y and z independently.

use crate::constants::query::COLLISION_PAD;
use crate::world::core::VoxelPos;
use crate::world::storage::Chunk;
use crate::world::world_operations::global_get;
use cgmath::Point3;

/// Push `pos` out of any obstacle it penetrates.
///
/// Returns the corrected position and whether a vertical correction happened
/// (standing on a floor or hitting a ceiling). When several stacked cells ask
/// for a correction on the same axis the last one wins.
pub fn collide(
    chunks: &[Chunk],
    height: i32,
    pos: Point3<f32>,
    chunk_size: i32,
) -> (Point3<f32>, bool) {
    let n = VoxelPos::round_from(pos.x, pos.y, pos.z);
    let px = pos.x - n.x as f32;
    let py = pos.y - n.y as f32;
    let pz = pos.z - n.z as f32;
    let pad = COLLISION_PAD;
    let solid = |x: i32, y: i32, z: i32| global_get(chunks, VoxelPos::new(x, y, z), chunk_size).is_obstacle();

    let mut out = pos;
    let mut vertical = false;
    for dy in 0..height {
        let y = n.y.saturating_sub(dy);
        if px < -pad && solid(n.x.saturating_sub(1), y, n.z) {
            out.x = n.x as f32 - pad;
        }
        if px > pad && solid(n.x.saturating_add(1), y, n.z) {
            out.x = n.x as f32 + pad;
        }
        if py < -pad && solid(n.x, y.saturating_sub(1), n.z) {
            out.y = n.y as f32 - pad;
            vertical = true;
        }
        if py > pad && solid(n.x, y.saturating_add(1), n.z) {
            out.y = n.y as f32 + pad;
            vertical = true;
        }
        if pz < -pad && solid(n.x, y, n.z.saturating_sub(1)) {
            out.z = n.z as f32 - pad;
        }
        if pz > pad && solid(n.x, y, n.z.saturating_add(1)) {
            out.z = n.z as f32 + pad;
        }
    }
    (out, vertical)
}

/// True if `block` would overlap one of the player's `height` cells
pub fn player_intersects_block(height: i32, pos: Point3<f32>, block: VoxelPos) -> bool {
    let n = VoxelPos::round_from(pos.x, pos.y, pos.z);
    (0..height).any(|i| n.x == block.x && n.y.saturating_sub(i) == block.y && n.z == block.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::core::{BlockId, ChunkPos};

    const SIZE: i32 = 32;

    fn floor_chunk() -> Vec<Chunk> {
        let mut chunk = Chunk::new(ChunkPos::new(0, 0));
        for x in 0..SIZE {
            for z in 0..SIZE {
                chunk.map.set(VoxelPos::new(x, 0, z), BlockId::STONE);
            }
        }
        vec![chunk]
    }

    #[test]
    fn test_floor_stops_descent() {
        let chunks = floor_chunk();
        let (pos, grounded) = collide(&chunks, 2, Point3::new(5.0, 1.6, 5.0), SIZE);
        assert!(grounded);
        assert_eq!(pos, Point3::new(5.0, 1.75, 5.0));
        // resting height sits a pad below the lattice point
        assert_eq!(pos.y - pos.y.round(), -0.25);
    }

    #[test]
    fn test_free_fall_is_untouched() {
        let chunks = floor_chunk();
        let start = Point3::new(5.0, 2.0, 5.0);
        let (pos, grounded) = collide(&chunks, 2, start, SIZE);
        assert!(!grounded);
        assert_eq!(pos, start);
    }

    #[test]
    fn test_wall_pushes_back_on_one_axis() {
        let mut chunks = floor_chunk();
        chunks[0].map.set(VoxelPos::new(6, 2, 5), BlockId::STONE);

        let (pos, grounded) = collide(&chunks, 2, Point3::new(5.4, 2.0, 5.1), SIZE);
        assert!(!grounded);
        assert_eq!(pos.x, 5.25);
        assert_eq!(pos.z, 5.1);
    }

    #[test]
    fn test_ceiling_is_vertical_collision() {
        let mut chunks = floor_chunk();
        chunks[0].map.set(VoxelPos::new(5, 4, 5), BlockId::STONE);
        let (pos, grounded) = collide(&chunks, 2, Point3::new(5.0, 3.3, 5.0), SIZE);
        assert!(grounded);
        assert_eq!(pos.y, 3.25);
    }

    #[test]
    fn test_plants_do_not_collide() {
        let mut chunks = floor_chunk();
        chunks[0].map.set(VoxelPos::new(6, 2, 5), BlockId::TALL_GRASS);
        let start = Point3::new(5.4, 2.0, 5.0);
        assert_eq!(collide(&chunks, 2, start, SIZE).0, start);
    }

    #[test]
    fn test_unloaded_area_never_collides() {
        let (pos, grounded) = collide(&[], 2, Point3::new(0.0, -3.4, 0.0), SIZE);
        assert!(!grounded);
        assert_eq!(pos.y, -3.4);
    }

    #[test]
    fn test_far_out_position_does_not_overflow() {
        let chunks = floor_chunk();
        let start = Point3::new(1.0e30, 5.0, -1.0e30);
        assert_eq!(collide(&chunks, 2, start, SIZE), (start, false));
        assert!(!player_intersects_block(2, start, VoxelPos::new(0, 5, 0)));
    }

    #[test]
    fn test_player_intersects_block() {
        let pos = Point3::new(2.4, 10.2, -3.6);
        assert!(player_intersects_block(2, pos, VoxelPos::new(2, 10, -4)));
        assert!(player_intersects_block(2, pos, VoxelPos::new(2, 9, -4)));
        assert!(!player_intersects_block(2, pos, VoxelPos::new(2, 8, -4)));
        assert!(!player_intersects_block(2, pos, VoxelPos::new(2, 11, -4)));
        assert!(!player_intersects_block(2, pos, VoxelPos::new(3, 10, -4)));
    }
}
