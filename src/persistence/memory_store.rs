//! In-memory persistence backend. Nothing survives the process.

use super::{PersistenceBackend, PersistenceResult, PlayerState};
use crate::world::core::{BlockId, ChunkPos, VoxelPos};
use rustc_hash::FxHashMap;

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    pub player: Option<PlayerState>,
    pub blocks: FxHashMap<ChunkPos, FxHashMap<VoxelPos, BlockId>>,
    /// Number of `insert_block` calls, including overwrites
    pub inserts: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistenceBackend for MemoryStore {
    fn load_player_state(&mut self) -> PersistenceResult<Option<PlayerState>> {
        Ok(self.player)
    }

    fn save_player_state(&mut self, state: &PlayerState) -> PersistenceResult<()> {
        self.player = Some(*state);
        Ok(())
    }

    fn insert_block(
        &mut self,
        chunk: ChunkPos,
        pos: VoxelPos,
        block: BlockId,
    ) -> PersistenceResult<()> {
        self.blocks.entry(chunk).or_default().insert(pos, block);
        self.inserts += 1;
        Ok(())
    }

    fn load_chunk_blocks(&self, chunk: ChunkPos) -> PersistenceResult<Vec<(VoxelPos, BlockId)>> {
        Ok(self
            .blocks
            .get(&chunk)
            .map(|cells| cells.iter().map(|(pos, block)| (*pos, *block)).collect())
            .unwrap_or_default())
    }
}
