//! World Module
//!
//! Streams an unbounded voxel world around a moving observer.
//!
//! # Architecture Overview
//!
//! - **Core**: Fundamental data types (Block, Position, Ray)
//! - **Storage**: Sparse per-chunk voxel maps and derived meshes
//! - **Generation**: Seeded terrain that fills new chunks
//! - **Management**: Chunk lifecycle and the mutation path
//! - **Meshing**: Face exposure and renderer geometry
//! - **world_operations**: Pure read-only queries (lookup, hit test, surface)

pub mod core;
pub mod generation;
pub mod management;
pub mod meshing;
pub mod storage;
pub mod world_operations;

// Re-export core types for convenience
pub use core::{BlockFace, BlockId, ChunkPos, Ray, RaycastHit, VoxelPos};

pub use generation::{FlatGenerator, TerrainGenerator, WorldGenerator};
pub use management::{ChunkManager, ChunkManagerConfig, ChunkStats, WorldEvent, WorldMode};
pub use storage::{Chunk, ChunkMesh, ChunkState, SparseVoxelMap};
pub use world_operations::{global_get, highest_block, hit_test};
