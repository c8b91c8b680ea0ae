use serde::{Deserialize, Serialize};

/// Integer lattice position in world space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct VoxelPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl VoxelPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Snap a world-space point to the nearest lattice point.
    /// Halves round away from zero.
    pub fn round_from(x: f32, y: f32, z: f32) -> Self {
        Self {
            x: x.round() as i32,
            y: y.round() as i32,
            z: z.round() as i32,
        }
    }

    /// Neighbouring lattice point. Saturates at the i32 range.
    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
            z: self.z.saturating_add(dz),
        }
    }

    /// Owning chunk column
    pub fn chunk(self, chunk_size: i32) -> ChunkPos {
        ChunkPos {
            p: self.x.div_euclid(chunk_size),
            q: self.z.div_euclid(chunk_size),
        }
    }
}

/// Chunk column coordinates. One unit spans `chunk_size` world units on x/z;
/// chunks are unbounded vertically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ChunkPos {
    pub p: i32,
    pub q: i32,
}

impl ChunkPos {
    pub const fn new(p: i32, q: i32) -> Self {
        Self { p, q }
    }

    /// Chebyshev distance in chunk units
    pub fn distance(self, other: ChunkPos) -> i32 {
        let d = self.p.abs_diff(other.p).max(self.q.abs_diff(other.q));
        i32::try_from(d).unwrap_or(i32::MAX)
    }

    /// Chunk owning a floating point world position
    pub fn from_world(x: f32, z: f32, chunk_size: i32) -> Self {
        VoxelPos::round_from(x, 0.0, z).chunk(chunk_size)
    }

    pub fn offset(self, dp: i32, dq: i32) -> Self {
        Self {
            p: self.p.saturating_add(dp),
            q: self.q.saturating_add(dq),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_of_negative_coordinates() {
        assert_eq!(VoxelPos::new(-1, 0, -32).chunk(32), ChunkPos::new(-1, -1));
        assert_eq!(VoxelPos::new(-33, 0, 31).chunk(32), ChunkPos::new(-2, 0));
        assert_eq!(VoxelPos::new(32, 0, 0).chunk(32), ChunkPos::new(1, 0));
    }

    #[test]
    fn test_round_half_away_from_zero() {
        assert_eq!(VoxelPos::round_from(0.5, -0.5, 1.49), VoxelPos::new(1, -1, 1));
    }

    #[test]
    fn test_chunk_from_world_rounds_first() {
        assert_eq!(ChunkPos::from_world(31.6, 0.0, 32), ChunkPos::new(1, 0));
        assert_eq!(ChunkPos::from_world(-0.4, -0.6, 32), ChunkPos::new(0, -1));
    }

    #[test]
    fn test_chebyshev_distance() {
        let a = ChunkPos::new(0, 0);
        assert_eq!(a.distance(ChunkPos::new(3, -7)), 7);
        assert_eq!(a.distance(a), 0);
        assert_eq!(
            ChunkPos::new(i32::MIN, 0).distance(ChunkPos::new(i32::MAX, 0)),
            i32::MAX
        );
    }

    #[test]
    fn test_offset_saturates_at_lattice_edge() {
        let edge = VoxelPos::round_from(1.0e30, f32::NEG_INFINITY, f32::NAN);
        assert_eq!(edge, VoxelPos::new(i32::MAX, i32::MIN, 0));
        assert_eq!(edge.offset(1, -1, 1), VoxelPos::new(i32::MAX, i32::MIN, 1));
        assert_eq!(
            ChunkPos::new(i32::MAX, i32::MIN).offset(1, -1),
            ChunkPos::new(i32::MAX, i32::MIN)
        );
    }
}
