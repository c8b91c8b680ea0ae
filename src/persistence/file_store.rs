//! File Store - directory backed persistence
//!
//! Layout of the data directory:
//!
//! ```text
//! player.json   last saved player pose
//! blocks.log    append-only block mutations, fixed-size bincode records
//! ```
//!
//! The whole block log is indexed by chunk on open. Later records for the
//! same cell replace earlier ones. A torn final record is cut off before the
//! log is reopened for appending.

use super::{PersistenceBackend, PersistenceError, PersistenceResult, PlayerState};
use crate::world::core::{BlockId, ChunkPos, VoxelPos};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

const PLAYER_FILE: &str = "player.json";
const BLOCK_LOG_FILE: &str = "blocks.log";

/// Six little-endian i32 values
const RECORD_SIZE: usize = 24;

type BlockIndex = FxHashMap<ChunkPos, FxHashMap<VoxelPos, BlockId>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct BlockRecord {
    p: i32,
    q: i32,
    x: i32,
    y: i32,
    z: i32,
    w: i32,
}

#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    log: File,
    index: BlockIndex,
}

impl FileStore {
    /// Open or create a store in `dir` and index its block log
    pub fn open(dir: impl AsRef<Path>) -> PersistenceResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        let log_path = dir.join(BLOCK_LOG_FILE);
        let (index, whole_len, torn) = if log_path.exists() {
            read_block_log(&log_path)?
        } else {
            (FxHashMap::default(), 0, false)
        };
        let log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .and_then(|log| {
                if torn {
                    log.set_len(whole_len)?;
                }
                Ok(log)
            })
            .map_err(|e| PersistenceError::LoadFailed {
                path: log_path.display().to_string(),
                error: e.to_string(),
            })?;

        log::info!(
            "[Persistence] Opened {} ({} chunks with logged blocks)",
            dir.display(),
            index.len()
        );
        Ok(Self { dir, log, index })
    }

    fn player_path(&self) -> PathBuf {
        self.dir.join(PLAYER_FILE)
    }
}

/// Index the log. Also returns the byte length of its whole records and
/// whether a partial record trails them.
fn read_block_log(path: &Path) -> PersistenceResult<(BlockIndex, u64, bool)> {
    let bytes = fs::read(path).map_err(|e| PersistenceError::LoadFailed {
        path: path.display().to_string(),
        error: e.to_string(),
    })?;

    let records = bytes.chunks_exact(RECORD_SIZE);
    let torn = !records.remainder().is_empty();
    if torn {
        // Torn final append from an interrupted session
        log::warn!(
            "[Persistence] Discarding {} trailing bytes in {}",
            records.remainder().len(),
            path.display()
        );
    }
    let whole_len = (bytes.len() - records.remainder().len()) as u64;

    let mut index = BlockIndex::default();
    for raw in records {
        let record: BlockRecord = bincode::deserialize(raw)
            .map_err(|e| PersistenceError::DeserializationError(e.to_string()))?;
        let block = BlockId::from_code(record.w).ok_or_else(|| {
            PersistenceError::CorruptedData(format!(
                "block code {} at {},{},{}",
                record.w, record.x, record.y, record.z
            ))
        })?;
        index
            .entry(ChunkPos::new(record.p, record.q))
            .or_default()
            .insert(VoxelPos::new(record.x, record.y, record.z), block);
    }
    Ok((index, whole_len, torn))
}

impl PersistenceBackend for FileStore {
    fn load_player_state(&mut self) -> PersistenceResult<Option<PlayerState>> {
        let path = self.player_path();
        if !path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&path).map_err(|e| PersistenceError::LoadFailed {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        let state = serde_json::from_str(&text)
            .map_err(|e| PersistenceError::DeserializationError(e.to_string()))?;
        Ok(Some(state))
    }

    /// Written to a temporary file first, then renamed over the old state
    fn save_player_state(&mut self, state: &PlayerState) -> PersistenceResult<()> {
        let path = self.player_path();
        let json = serde_json::to_string_pretty(state)
            .map_err(|e| PersistenceError::SerializationError(e.to_string()))?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .and_then(|_| fs::rename(&tmp, &path))
            .map_err(|e| PersistenceError::SaveFailed {
                path: path.display().to_string(),
                error: e.to_string(),
            })?;
        log::debug!("[Persistence] Saved player state to {}", path.display());
        Ok(())
    }

    fn insert_block(
        &mut self,
        chunk: ChunkPos,
        pos: VoxelPos,
        block: BlockId,
    ) -> PersistenceResult<()> {
        let record = BlockRecord {
            p: chunk.p,
            q: chunk.q,
            x: pos.x,
            y: pos.y,
            z: pos.z,
            w: block.code(),
        };
        let bytes = bincode::serialize(&record)
            .map_err(|e| PersistenceError::SerializationError(e.to_string()))?;
        self.log.write_all(&bytes)?;

        self.index.entry(chunk).or_default().insert(pos, block);
        Ok(())
    }

    fn load_chunk_blocks(&self, chunk: ChunkPos) -> PersistenceResult<Vec<(VoxelPos, BlockId)>> {
        Ok(self
            .index
            .get(&chunk)
            .map(|cells| cells.iter().map(|(pos, block)| (*pos, *block)).collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sorted(mut blocks: Vec<(VoxelPos, BlockId)>) -> Vec<(VoxelPos, BlockId)> {
        blocks.sort_by_key(|(p, _)| (p.x, p.y, p.z));
        blocks
    }

    #[test]
    fn test_player_state_round_trip() {
        let dir = tempdir().unwrap();
        let state = PlayerState {
            x: 12.5,
            y: 30.0,
            z: -4.25,
            yaw: 1.0,
            pitch: -0.5,
        };

        let mut store = FileStore::open(dir.path()).unwrap();
        assert_eq!(store.load_player_state().unwrap(), None);
        store.save_player_state(&state).unwrap();
        drop(store);

        let mut store = FileStore::open(dir.path()).unwrap();
        assert_eq!(store.load_player_state().unwrap(), Some(state));
    }

    #[test]
    fn test_block_log_survives_reopen() {
        let dir = tempdir().unwrap();
        let chunk = ChunkPos::new(-1, 2);
        let a = VoxelPos::new(-5, 10, 70);
        let b = VoxelPos::new(-6, 11, 71);

        let mut store = FileStore::open(dir.path()).unwrap();
        store.insert_block(chunk, a, BlockId::STONE).unwrap();
        store.insert_block(chunk, b, BlockId::GLASS).unwrap();
        store.insert_block(chunk, a, BlockId::AIR).unwrap();
        store
            .insert_block(ChunkPos::new(0, 0), VoxelPos::new(1, 1, 1), BlockId::PLANK)
            .unwrap();
        assert_eq!(
            sorted(store.load_chunk_blocks(chunk).unwrap()),
            vec![(b, BlockId::GLASS), (a, BlockId::AIR)]
        );
        drop(store);

        let len = fs::metadata(dir.path().join(BLOCK_LOG_FILE)).unwrap().len();
        assert_eq!(len, 4 * RECORD_SIZE as u64);

        let store = FileStore::open(dir.path()).unwrap();
        assert_eq!(
            sorted(store.load_chunk_blocks(chunk).unwrap()),
            vec![(b, BlockId::GLASS), (a, BlockId::AIR)]
        );
        assert!(store.load_chunk_blocks(ChunkPos::new(9, 9)).unwrap().is_empty());
    }

    #[test]
    fn test_torn_tail_cut_before_next_append() {
        let dir = tempdir().unwrap();
        let chunk = ChunkPos::new(0, 0);
        let mut store = FileStore::open(dir.path()).unwrap();
        store
            .insert_block(chunk, VoxelPos::new(1, 2, 3), BlockId::WOOD)
            .unwrap();
        drop(store);

        let mut log = OpenOptions::new()
            .append(true)
            .open(dir.path().join(BLOCK_LOG_FILE))
            .unwrap();
        log.write_all(&[1, 2, 3]).unwrap();
        drop(log);

        let mut store = FileStore::open(dir.path()).unwrap();
        assert_eq!(
            store.load_chunk_blocks(chunk).unwrap(),
            vec![(VoxelPos::new(1, 2, 3), BlockId::WOOD)]
        );
        store
            .insert_block(chunk, VoxelPos::new(4, 5, 6), BlockId::GLASS)
            .unwrap();
        drop(store);

        let len = fs::metadata(dir.path().join(BLOCK_LOG_FILE)).unwrap().len();
        assert_eq!(len, 2 * RECORD_SIZE as u64);

        let store = FileStore::open(dir.path()).unwrap();
        assert_eq!(
            sorted(store.load_chunk_blocks(chunk).unwrap()),
            vec![
                (VoxelPos::new(1, 2, 3), BlockId::WOOD),
                (VoxelPos::new(4, 5, 6), BlockId::GLASS)
            ]
        );
    }

    #[test]
    fn test_invalid_code_is_corruption() {
        let dir = tempdir().unwrap();
        let record = BlockRecord {
            p: 0,
            q: 0,
            x: 0,
            y: 0,
            z: 0,
            w: -7,
        };
        fs::write(
            dir.path().join(BLOCK_LOG_FILE),
            bincode::serialize(&record).unwrap(),
        )
        .unwrap();

        assert!(matches!(
            FileStore::open(dir.path()),
            Err(PersistenceError::CorruptedData(_))
        ));
    }

    #[test]
    fn test_unreadable_player_state() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(PLAYER_FILE), "{ not json").unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();
        assert!(matches!(
            store.load_player_state(),
            Err(PersistenceError::DeserializationError(_))
        ));
    }
}
