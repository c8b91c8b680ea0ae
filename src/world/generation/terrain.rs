//! Terrain Generator - seeded noise heightmap with plants and trees

use super::octave_noise::OctaveNoise;
use super::WorldGenerator;
use crate::world::core::{BlockId, ChunkPos, VoxelPos};
use crate::world::storage::SparseVoxelMap;

/// Columns at or below this height are sand up to it
pub const WATER_LINE: i32 = 12;

/// Trees keep this many columns clear of the chunk edge
const TREE_MARGIN: i32 = 4;

/// Default terrain: rolling grass hills, sand flats, flowers and trees
#[derive(Debug, Clone)]
pub struct TerrainGenerator {
    noise: OctaveNoise,
    seed: u32,
}

impl TerrainGenerator {
    pub fn new(seed: u32) -> Self {
        Self {
            noise: OctaveNoise::new(seed),
            seed,
        }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Height of the first empty cell in a column, and the column's surface block
    pub fn surface(&self, x: i32, z: i32) -> (i32, BlockId) {
        let (fx, fz) = (x as f64, z as f64);
        let f = self.noise.sample2(fx * 0.01, fz * 0.01, 4, 0.5, 2.0);
        let g = self.noise.sample2(-fx * 0.01, -fz * 0.01, 2, 0.9, 2.0);
        let mh = g * 32.0 + 16.0;
        let h = (f * mh) as i32;
        if h <= WATER_LINE {
            (WATER_LINE, BlockId::SAND)
        } else {
            (h, BlockId::GRASS)
        }
    }

    fn decoration(&self, x: i32, z: i32) -> Option<BlockId> {
        let (fx, fz) = (x as f64, z as f64);
        let mut plant = None;
        if self.noise.sample2(-fx * 0.1, fz * 0.1, 4, 0.8, 2.0) > 0.6 {
            plant = Some(BlockId::TALL_GRASS);
        }
        if self.noise.sample2(fx * 0.05, -fz * 0.05, 4, 0.8, 2.0) > 0.7 {
            let pick = self.noise.sample2(fx * 0.1, fz * 0.1, 4, 0.8, 2.0) * 7.0;
            let code = BlockId::FLOWER_FIRST.0 + pick as u16;
            plant = Some(BlockId(code.min(BlockId::FLOWER_LAST.0)));
        }
        plant
    }

    fn has_tree(&self, x: i32, z: i32) -> bool {
        self.noise.sample2(x as f64, z as f64, 6, 0.5, 2.0) > 0.84
    }

    fn plant_tree(map: &mut SparseVoxelMap, x: i32, h: i32, z: i32) {
        for y in (h + 3)..(h + 8) {
            for ox in -3..=3 {
                for oz in -3..=3 {
                    let dy = y - (h + 4);
                    if ox * ox + oz * oz + dy * dy < 11 {
                        map.set(VoxelPos::new(x + ox, y, z + oz), BlockId::LEAVES);
                    }
                }
            }
        }
        for y in h..(h + 7) {
            map.set(VoxelPos::new(x, y, z), BlockId::WOOD);
        }
    }
}

impl WorldGenerator for TerrainGenerator {
    fn generate(&self, map: &mut SparseVoxelMap, pos: ChunkPos, chunk_size: i32) {
        for dx in 0..chunk_size {
            for dz in 0..chunk_size {
                let x = pos.p * chunk_size + dx;
                let z = pos.q * chunk_size + dz;
                let (h, surface) = self.surface(x, z);

                for y in 0..h {
                    map.set(VoxelPos::new(x, y, z), surface);
                }

                if surface != BlockId::GRASS {
                    continue;
                }
                if let Some(plant) = self.decoration(x, z) {
                    map.set(VoxelPos::new(x, h, z), plant);
                }

                let inside = dx >= TREE_MARGIN
                    && dz >= TREE_MARGIN
                    && dx + TREE_MARGIN < chunk_size
                    && dz + TREE_MARGIN < chunk_size;
                if inside && self.has_tree(x, z) {
                    Self::plant_tree(map, x, h, z);
                }
            }
        }
    }

    fn surface_height(&self, x: i32, z: i32) -> i32 {
        self.surface(x, z).0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate(gen: &TerrainGenerator, pos: ChunkPos) -> SparseVoxelMap {
        let mut map = SparseVoxelMap::new();
        gen.generate(&mut map, pos, 32);
        map
    }

    #[test]
    fn test_deterministic_per_chunk() {
        let gen = TerrainGenerator::new(42);
        let a = generate(&gen, ChunkPos::new(3, -2));
        let b = generate(&gen, ChunkPos::new(3, -2));
        let mut a: Vec<_> = a.iter().collect();
        let mut b: Vec<_> = b.iter().collect();
        a.sort_by_key(|(p, _)| (p.x, p.y, p.z));
        b.sort_by_key(|(p, _)| (p.x, p.y, p.z));
        assert_eq!(a, b);
    }

    #[test]
    fn test_every_column_has_ground() {
        let gen = TerrainGenerator::new(1);
        let map = generate(&gen, ChunkPos::new(0, 0));
        for x in 0..32 {
            for z in 0..32 {
                let ground = map.get(VoxelPos::new(x, 0, z));
                assert!(ground.is_obstacle(), "column {},{}", x, z);
                let (h, _) = gen.surface(x, z);
                assert!(h >= WATER_LINE);
            }
        }
    }

    #[test]
    fn test_columns_stay_inside_chunk_footprint() {
        let gen = TerrainGenerator::new(9);
        let pos = ChunkPos::new(-1, 2);
        let map = generate(&gen, pos);
        for (p, _) in map.iter() {
            assert_eq!(p.chunk(32), pos);
        }
    }

    #[test]
    fn test_sand_below_water_line() {
        let gen = TerrainGenerator::new(5);
        for x in 0..64 {
            let (h, block) = gen.surface(x * 13, x * 7);
            if block == BlockId::SAND {
                assert_eq!(h, WATER_LINE);
            } else {
                assert_eq!(block, BlockId::GRASS);
                assert!(h > WATER_LINE);
            }
        }
    }
}
