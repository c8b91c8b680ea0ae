//! Sparse Voxel Map - hash-keyed block storage for one chunk column
//!
//! Absent coordinates read as air. Writing air keeps a tombstone entry, so
//! traversal surfaces it and callers filter on `is_air()` themselves.

use crate::world::core::{BlockId, VoxelPos};
use rustc_hash::FxHashMap;

/// Sparse 3-D grid of block codes
#[derive(Debug, Clone, Default)]
pub struct SparseVoxelMap {
    entries: FxHashMap<VoxelPos, BlockId>,
}

impl SparseVoxelMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block at `pos`, air if nothing was ever written there
    pub fn get(&self, pos: VoxelPos) -> BlockId {
        self.entries.get(&pos).copied().unwrap_or(BlockId::AIR)
    }

    /// Upsert. Writing air tombstones the entry.
    pub fn set(&mut self, pos: VoxelPos, block: BlockId) {
        self.entries.insert(pos, block);
    }

    /// All stored entries including tombstones. Order is unspecified but stable
    /// for one traversal; the map can be walked again at any time.
    pub fn iter(&self) -> impl Iterator<Item = (VoxelPos, BlockId)> + '_ {
        self.entries.iter().map(|(pos, block)| (*pos, *block))
    }

    /// Stored entries that are not tombstones
    pub fn blocks(&self) -> impl Iterator<Item = (VoxelPos, BlockId)> + '_ {
        self.iter().filter(|(_, block)| !block.is_air())
    }

    /// Number of stored entries, tombstones included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
