// Cubious - voxel world streaming core
//
// Streams an unbounded block world around a moving observer, keeps the
// sparse per-chunk block store consistent with a remote authority, and
// answers ray and collision queries against it.
//
// Entry points:
// - game::GameSession drives one client tick by tick
// - world::ChunkManager is the single mutation path for blocks
// - network::* encodes and applies the line protocol
// - persistence::* keeps the player pose and a block log when offline

pub mod constants;
pub mod error;
pub mod game;
pub mod input;
pub mod network;
pub mod persistence;
pub mod physics;
pub mod world;

pub use error::{EngineError, EngineResult, ErrorContext};
pub use game::GameSession;
pub use input::{InputEvent, InputState, KeyCode, MouseButton};
pub use network::{LoopbackTransport, Message, TcpTransport, Transport};
pub use persistence::{FileStore, MemoryStore, PersistenceBackend, PlayerState};
pub use physics::PlayerData;
pub use world::{
    BlockId, Chunk, ChunkManager, ChunkPos, FlatGenerator, RaycastHit, TerrainGenerator, VoxelPos,
    WorldGenerator, WorldMode,
};

use anyhow::Result;
use constants::core::{
    CHUNK_SIZE, CREATE_CHUNK_RADIUS, DELETE_CHUNK_RADIUS, MAX_CHUNKS, RENDER_CHUNK_RADIUS,
};
use constants::query::PLAYER_HEIGHT;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Engine configuration, loadable from TOML. Missing keys take defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub chunk_size: i32,
    pub max_chunks: usize,
    pub create_chunk_radius: i32,
    pub render_chunk_radius: i32,
    pub delete_chunk_radius: i32,
    /// Terrain seed
    pub seed: u32,
    /// `host:port` of the world authority. `None` plays offline.
    pub authority: Option<String>,
    /// Directory for the offline player state and block log
    pub data_dir: Option<PathBuf>,
    /// Player body height in cells
    pub player_height: i32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chunk_size: CHUNK_SIZE,
            max_chunks: MAX_CHUNKS,
            create_chunk_radius: CREATE_CHUNK_RADIUS,
            render_chunk_radius: RENDER_CHUNK_RADIUS,
            delete_chunk_radius: DELETE_CHUNK_RADIUS,
            seed: 0,
            authority: None,
            data_dir: None,
            player_height: PLAYER_HEIGHT,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)
            .map_err(|e| anyhow::anyhow!("EngineConfig: invalid TOML: {}", e))?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("EngineConfig: cannot read {}: {}", path.display(), e))?;
        let config = Self::from_toml_str(&text)?;
        log::info!("[EngineConfig] Loaded {}", path.display());
        Ok(config)
    }

    /// Most chunks that can be alive at once under these radii
    pub fn peak_live_chunks(&self) -> usize {
        let side = (2 * self.delete_chunk_radius - 1).max(0) as usize;
        side * side
    }

    /// Validate configuration. Chunk capacity is a startup invariant: the
    /// radii must make running out of chunk slots impossible.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size <= 0 {
            return Err(anyhow::anyhow!(
                "EngineConfig: chunk_size must be positive, got {}",
                self.chunk_size
            ));
        }

        if self.create_chunk_radius < 0 || self.render_chunk_radius < 0 {
            return Err(anyhow::anyhow!("EngineConfig: radii cannot be negative"));
        }

        if self.create_chunk_radius >= self.delete_chunk_radius {
            return Err(anyhow::anyhow!(
                "EngineConfig: create_chunk_radius {} must be below delete_chunk_radius {}",
                self.create_chunk_radius,
                self.delete_chunk_radius
            ));
        }

        if self.player_height <= 0 {
            return Err(anyhow::anyhow!(
                "EngineConfig: player_height must be positive, got {}",
                self.player_height
            ));
        }

        let peak = self.peak_live_chunks();
        log::info!(
            "[EngineConfig] Validation: chunk_size={}, create={}, delete={}, peak_chunks={}, max_chunks={}",
            self.chunk_size,
            self.create_chunk_radius,
            self.delete_chunk_radius,
            peak,
            self.max_chunks
        );

        if peak > self.max_chunks {
            return Err(anyhow::anyhow!(
                "EngineConfig: delete_chunk_radius {} allows {} live chunks but max_chunks is {}. {}",
                self.delete_chunk_radius,
                peak,
                self.max_chunks,
                self.suggest_safe_config()
            ));
        }

        log::info!("[EngineConfig] Configuration validated successfully");
        Ok(())
    }

    /// Largest delete radius that fits `max_chunks`
    pub fn suggest_safe_config(&self) -> String {
        let side = (self.max_chunks as f64).sqrt().floor() as i32;
        let radius = (side + 1) / 2;
        format!(
            "Suggested: delete_chunk_radius <= {} for max_chunks {}",
            radius, self.max_chunks
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert_eq!(config.chunk_size, 32);
        assert_eq!(config.peak_live_chunks(), 225);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            seed = 99
            authority = "127.0.0.1:4080"
            delete_chunk_radius = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.seed, 99);
        assert_eq!(config.authority.as_deref(), Some("127.0.0.1:4080"));
        assert_eq!(config.delete_chunk_radius, 10);
        assert_eq!(config.create_chunk_radius, CREATE_CHUNK_RADIUS);
        assert_eq!(config.data_dir, None);
    }

    #[test]
    fn test_bad_toml_rejected() {
        assert!(EngineConfig::from_toml_str("chunk_size = \"big\"").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cubious.toml");
        std::fs::write(&path, "data_dir = \"saves\"\nplayer_height = 3\n").unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.data_dir, Some(PathBuf::from("saves")));
        assert_eq!(config.player_height, 3);
        assert!(EngineConfig::load(dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_validate_rejects_unsafe_capacity() {
        let config = EngineConfig {
            delete_chunk_radius: 17,
            ..Default::default()
        };
        // (2 * 17 - 1)^2 = 1089 > 1024
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("max_chunks"));
        assert!(err.contains("delete_chunk_radius <= 16"));

        let config = EngineConfig {
            delete_chunk_radius: 16,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_radii() {
        let config = EngineConfig {
            create_chunk_radius: 8,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = EngineConfig {
            chunk_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
