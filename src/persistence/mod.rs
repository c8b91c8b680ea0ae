//! Persistence Module
//!
//! Durable player pose and an append-only log of local block mutations.
//! Only used offline; when an authority owns the world nothing is written.

pub mod file_store;
pub mod memory_store;

pub use file_store::FileStore;
pub use memory_store::MemoryStore;

use crate::world::core::{BlockId, ChunkPos, VoxelPos};
use serde::{Deserialize, Serialize};

pub type PersistenceResult<T> = Result<T, PersistenceError>;

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("Save failed for {path}: {error}")]
    SaveFailed { path: String, error: String },
    #[error("Load failed for {path}: {error}")]
    LoadFailed { path: String, error: String },
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Deserialization error: {0}")]
    DeserializationError(String),
    #[error("Corrupted data: {0}")]
    CorruptedData(String),
}

/// Saved player pose
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub yaw: f32,
    pub pitch: f32,
}

/// Storage for the player pose and the block mutation log
pub trait PersistenceBackend: Send {
    fn load_player_state(&mut self) -> PersistenceResult<Option<PlayerState>>;

    fn save_player_state(&mut self, state: &PlayerState) -> PersistenceResult<()>;

    /// Record one mutation. Air is recorded too, it removes generated blocks
    /// on replay.
    fn insert_block(
        &mut self,
        chunk: ChunkPos,
        pos: VoxelPos,
        block: BlockId,
    ) -> PersistenceResult<()>;

    /// Latest logged block of every cell in a chunk, in no particular order
    fn load_chunk_blocks(&self, chunk: ChunkPos) -> PersistenceResult<Vec<(VoxelPos, BlockId)>>;
}
