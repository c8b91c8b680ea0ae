//! Chunk Manager - owns the live chunk set
//!
//! Single entry point for every world mutation. Chunks live in a plain
//! vector; eviction swaps the last chunk into the freed slot, so chunk order
//! is never meaningful.
//!
//! Local mutations and chunk creations are queued as [`WorldEvent`]s for the
//! sync and persistence layers to drain. Blocks applied on behalf of the
//! authority are not queued, which keeps echoes from bouncing back.

use crate::constants::core::{
    CHUNK_SIZE, CREATE_CHUNK_RADIUS, DELETE_CHUNK_RADIUS, MAX_CHUNKS,
};
use crate::error::{EngineError, EngineResult};
use crate::world::core::{BlockId, ChunkPos, VoxelPos};
use crate::world::generation::{OctaveNoise, WorldGenerator};
use crate::world::meshing::build_chunk_mesh;
use crate::world::storage::{Chunk, ChunkState};
use crate::world::world_operations::{self, boundary_neighbours, global_get};
use std::collections::VecDeque;

/// Seed of the noise that rotates plant billboards
const PLANT_ROTATION_SEED: u32 = 0;

/// Where new chunks get their blocks from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldMode {
    /// The generator fills every new chunk
    Offline,
    /// New chunks wait for the authority
    Networked,
}

/// Something the outside world should hear about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldEvent {
    /// A chunk column was created locally
    ChunkRequested(ChunkPos),
    /// A block was changed by the local player
    BlockChanged {
        chunk: ChunkPos,
        pos: VoxelPos,
        block: BlockId,
    },
}

/// Chunk manager configuration
#[derive(Clone, Debug)]
pub struct ChunkManagerConfig {
    pub chunk_size: i32,
    pub max_chunks: usize,
    pub create_radius: i32,
    pub delete_radius: i32,
}

impl Default for ChunkManagerConfig {
    fn default() -> Self {
        Self {
            chunk_size: CHUNK_SIZE,
            max_chunks: MAX_CHUNKS,
            create_radius: CREATE_CHUNK_RADIUS,
            delete_radius: DELETE_CHUNK_RADIUS,
        }
    }
}

impl From<&crate::EngineConfig> for ChunkManagerConfig {
    fn from(config: &crate::EngineConfig) -> Self {
        Self {
            chunk_size: config.chunk_size,
            max_chunks: config.max_chunks,
            create_radius: config.create_chunk_radius,
            delete_radius: config.delete_chunk_radius,
        }
    }
}

/// Chunk statistics
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChunkStats {
    pub loaded_chunks: usize,
    pub pending_chunks: usize,
    pub chunks_created: u64,
    pub chunks_evicted: u64,
}

pub struct ChunkManager {
    config: ChunkManagerConfig,
    chunks: Vec<Chunk>,
    generator: Box<dyn WorldGenerator>,
    mode: WorldMode,
    events: VecDeque<WorldEvent>,
    plant_noise: OctaveNoise,
    chunks_created: u64,
    chunks_evicted: u64,
}

impl std::fmt::Debug for ChunkManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkManager")
            .field("config", &self.config)
            .field("chunks", &self.chunks.len())
            .field("mode", &self.mode)
            .field("events", &self.events.len())
            .finish()
    }
}

impl ChunkManager {
    pub fn new(
        config: ChunkManagerConfig,
        generator: Box<dyn WorldGenerator>,
        mode: WorldMode,
    ) -> Self {
        Self {
            chunks: Vec::with_capacity(config.max_chunks),
            config,
            generator,
            mode,
            events: VecDeque::new(),
            plant_noise: OctaveNoise::new(PLANT_ROTATION_SEED),
            chunks_created: 0,
            chunks_evicted: 0,
        }
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn chunk_size(&self) -> i32 {
        self.config.chunk_size
    }

    pub fn config(&self) -> &ChunkManagerConfig {
        &self.config
    }

    pub fn mode(&self) -> WorldMode {
        self.mode
    }

    pub fn generator(&self) -> &dyn WorldGenerator {
        self.generator.as_ref()
    }

    pub fn find(&self, pos: ChunkPos) -> Option<&Chunk> {
        world_operations::find_chunk(&self.chunks, pos)
    }

    /// Block at any world position; unloaded chunks read as air
    pub fn get_block(&self, pos: VoxelPos) -> BlockId {
        global_get(&self.chunks, pos, self.config.chunk_size)
    }

    pub fn stats(&self) -> ChunkStats {
        ChunkStats {
            loaded_chunks: self.chunks.len(),
            pending_chunks: self
                .chunks
                .iter()
                .filter(|c| c.state == ChunkState::PendingFill)
                .count(),
            chunks_created: self.chunks_created,
            chunks_evicted: self.chunks_evicted,
        }
    }

    /// Take every queued event, oldest first
    pub fn drain_events(&mut self) -> Vec<WorldEvent> {
        self.events.drain(..).collect()
    }

    /// Switch population source. Going offline fills every chunk still
    /// waiting on the authority from the generator.
    pub fn set_mode(&mut self, mode: WorldMode) {
        if self.mode == mode {
            return;
        }
        log::info!("[ChunkManager] Mode {:?} -> {:?}", self.mode, mode);
        self.mode = mode;

        if mode == WorldMode::Offline {
            let pending: Vec<ChunkPos> = self
                .chunks
                .iter()
                .filter(|c| c.state == ChunkState::PendingFill)
                .map(|c| c.pos)
                .collect();
            for pos in pending {
                self.fill_from_generator(pos);
                self.recompute_geometry(pos);
                self.refresh_neighbours(pos);
            }
        }
    }

    // ========================================================================
    // LIFECYCLE
    // ========================================================================

    /// Evict far chunks, then create missing ones around `center`.
    ///
    /// All evictions happen before any creation. In incremental mode at most
    /// one chunk is created per call. Returns the number of chunks created.
    pub fn ensure_chunks(&mut self, center: ChunkPos, incremental: bool) -> EngineResult<usize> {
        self.evict_distant(center);

        let radius = self.config.create_radius;
        let mut created = 0;
        for dp in -radius..=radius {
            for dq in -radius..=radius {
                let pos = center.offset(dp, dq);
                if self.find(pos).is_some() {
                    continue;
                }
                self.create_chunk(pos)?;
                created += 1;
                if incremental {
                    return Ok(created);
                }
            }
        }
        Ok(created)
    }

    fn evict_distant(&mut self, center: ChunkPos) {
        let mut i = 0;
        while i < self.chunks.len() {
            if self.chunks[i].pos.distance(center) >= self.config.delete_radius {
                let chunk = self.chunks.swap_remove(i);
                self.chunks_evicted += 1;
                log::debug!("[ChunkManager] Evicted chunk {:?}", chunk.pos);
            } else {
                i += 1;
            }
        }
    }

    /// Create the chunk at `pos` if it does not exist yet.
    ///
    /// The creation is always queued as a chunk request. Offline the generator
    /// fills the chunk right away; networked it stays pending until the
    /// authority answers.
    pub fn create_chunk(&mut self, pos: ChunkPos) -> EngineResult<()> {
        if self.find(pos).is_some() {
            return Ok(());
        }
        if self.chunks.len() >= self.config.max_chunks {
            return Err(EngineError::ResourceExhausted(format!(
                "chunk arena full ({} chunks) while creating {:?}",
                self.config.max_chunks, pos
            )));
        }

        self.chunks.push(Chunk::new(pos));
        self.chunks_created += 1;
        self.events.push_back(WorldEvent::ChunkRequested(pos));
        log::debug!("[ChunkManager] Created chunk {:?} ({:?})", pos, self.mode);

        if self.mode == WorldMode::Offline {
            self.fill_from_generator(pos);
        }
        self.recompute_geometry(pos);
        self.refresh_neighbours(pos);
        Ok(())
    }

    fn fill_from_generator(&mut self, pos: ChunkPos) {
        let chunk_size = self.config.chunk_size;
        let Some(chunk) = world_operations::find_chunk_mut(&mut self.chunks, pos) else {
            return;
        };
        self.generator.generate(&mut chunk.map, pos, chunk_size);
        chunk.state = ChunkState::Populated;
    }

    fn refresh_neighbours(&mut self, pos: ChunkPos) {
        for (dp, dq) in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
            self.recompute_geometry(pos.offset(dp, dq));
        }
    }

    /// Rebuild the mesh of one chunk from its map. No-op if not loaded.
    pub fn recompute_geometry(&mut self, pos: ChunkPos) {
        let chunk_size = self.config.chunk_size;
        let Some(index) = self.chunks.iter().position(|c| c.pos == pos) else {
            return;
        };

        let chunks = &self.chunks;
        let map = &chunks[index].map;
        let mesh = build_chunk_mesh(
            map,
            |cell| {
                if cell.chunk(chunk_size) == pos {
                    map.get(cell)
                } else {
                    global_get(chunks, cell, chunk_size)
                }
            },
            &self.plant_noise,
        );

        let chunk = &mut self.chunks[index];
        chunk.mesh = mesh;
        chunk.revision += 1;
    }

    // ========================================================================
    // MUTATION
    // ========================================================================

    /// Local player mutation.
    ///
    /// Applies the block to its owning chunk if loaded, queues it for the
    /// authority and the block log either way, then refreshes the geometry of
    /// every neighbour chunk whose edge or corner touches the cell. Returns
    /// whether the owning chunk was loaded.
    pub fn set_block(&mut self, pos: VoxelPos, block: BlockId) -> bool {
        let chunk = pos.chunk(self.config.chunk_size);
        self.events.push_back(WorldEvent::BlockChanged { chunk, pos, block });
        self.apply_block(chunk, pos, block)
    }

    /// Mutation received from the authority. Never queued. Discarded if the
    /// owning chunk is not loaded.
    pub fn apply_authority_block(&mut self, pos: VoxelPos, block: BlockId) -> bool {
        let chunk = pos.chunk(self.config.chunk_size);
        let applied = self.apply_block(chunk, pos, block);
        if !applied {
            log::debug!("[ChunkManager] Dropped authority block for unloaded chunk {:?}", chunk);
        }
        applied
    }

    /// Replay logged blocks into a chunk without queueing anything
    pub fn replay_blocks(&mut self, pos: ChunkPos, blocks: &[(VoxelPos, BlockId)]) {
        if blocks.is_empty() {
            return;
        }
        let Some(chunk) = world_operations::find_chunk_mut(&mut self.chunks, pos) else {
            return;
        };
        for (cell, block) in blocks {
            chunk.map.set(*cell, *block);
        }
        chunk.state = ChunkState::Populated;
        log::debug!("[ChunkManager] Replayed {} blocks into {:?}", blocks.len(), pos);

        self.recompute_geometry(pos);
        self.refresh_neighbours(pos);
    }

    fn apply_block(&mut self, chunk_pos: ChunkPos, pos: VoxelPos, block: BlockId) -> bool {
        let applied = match world_operations::find_chunk_mut(&mut self.chunks, chunk_pos) {
            Some(chunk) => {
                chunk.map.set(pos, block);
                chunk.state = ChunkState::Populated;
                true
            }
            None => false,
        };
        if applied {
            self.recompute_geometry(chunk_pos);
        }

        // Boundary echo: geometry only, nothing is stored in the neighbour
        for neighbour in boundary_neighbours(pos, self.config.chunk_size) {
            self.recompute_geometry(neighbour);
        }
        applied
    }
}
