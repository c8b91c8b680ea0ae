//! World management
//!
//! Chunk streaming around the observer and the single mutation path.

mod chunk_manager;

pub use chunk_manager::{
    ChunkManager, ChunkManagerConfig, ChunkStats, WorldEvent, WorldMode,
};
