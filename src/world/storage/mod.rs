//! Chunk storage
//!
//! Each chunk column owns a sparse voxel map plus the geometry derived from it.

mod chunk_data;
mod sparse_map;

pub use chunk_data::{Chunk, ChunkMesh, ChunkState};
pub use sparse_map::SparseVoxelMap;
