//! World generation
//!
//! A generator fills a freshly created chunk column. It must be a pure
//! function of the chunk position and its own seed so that regenerating a
//! chunk after eviction yields identical content.

mod octave_noise;
mod terrain;

pub use octave_noise::OctaveNoise;
pub use terrain::{TerrainGenerator, WATER_LINE};

use crate::world::core::{BlockId, ChunkPos, VoxelPos};
use crate::world::storage::SparseVoxelMap;

/// Universal world generation interface
pub trait WorldGenerator: Send + Sync {
    /// Fill `map` with the blocks of chunk column `pos`
    fn generate(&self, map: &mut SparseVoxelMap, pos: ChunkPos, chunk_size: i32);

    /// Height of the first empty cell above the ground at a world column
    fn surface_height(&self, x: i32, z: i32) -> i32;
}

/// Solid floor of `layers` cells starting at y = 0
#[derive(Debug, Clone, Copy)]
pub struct FlatGenerator {
    pub layers: i32,
    pub block: BlockId,
}

impl Default for FlatGenerator {
    fn default() -> Self {
        Self {
            layers: 1,
            block: BlockId::STONE,
        }
    }
}

impl WorldGenerator for FlatGenerator {
    fn generate(&self, map: &mut SparseVoxelMap, pos: ChunkPos, chunk_size: i32) {
        for dx in 0..chunk_size {
            for dz in 0..chunk_size {
                for y in 0..self.layers {
                    let cell = VoxelPos::new(pos.p * chunk_size + dx, y, pos.q * chunk_size + dz);
                    map.set(cell, self.block);
                }
            }
        }
    }

    fn surface_height(&self, _x: i32, _z: i32) -> i32 {
        self.layers
    }
}
