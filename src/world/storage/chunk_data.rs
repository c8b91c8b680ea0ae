//! Chunk Data - Pure DOP
//!
//! NO METHODS beyond trivial accessors. Geometry is derived by
//! `world::meshing` and written back by the chunk manager.

use super::SparseVoxelMap;
use crate::world::core::ChunkPos;

/// Lifecycle of a live chunk. Eviction removes it from the arena entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkState {
    /// Created, waiting for the authority to send its blocks
    PendingFill,
    /// Holds generated or authority-supplied blocks
    Populated,
}

/// Renderable geometry for one chunk.
///
/// `positions` and `normals` hold `faces * 18` floats (two triangles of xyz),
/// `uvs` holds `faces * 12` floats.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChunkMesh {
    pub faces: usize,
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub uvs: Vec<f32>,
}

impl ChunkMesh {
    pub fn with_capacity(faces: usize) -> Self {
        Self {
            faces: 0,
            positions: Vec::with_capacity(faces * 18),
            normals: Vec::with_capacity(faces * 18),
            uvs: Vec::with_capacity(faces * 12),
        }
    }
}

/// One column of the world
#[derive(Debug, Clone)]
pub struct Chunk {
    pub pos: ChunkPos,
    pub map: SparseVoxelMap,
    pub state: ChunkState,
    pub mesh: ChunkMesh,
    /// Bumped on every geometry rebuild so renderers know to re-upload
    pub revision: u64,
}

impl Chunk {
    pub fn new(pos: ChunkPos) -> Self {
        Self {
            pos,
            map: SparseVoxelMap::new(),
            state: ChunkState::PendingFill,
            mesh: ChunkMesh::default(),
            revision: 0,
        }
    }

    /// Visible face count of the current mesh
    pub fn face_count(&self) -> usize {
        self.mesh.faces
    }
}
