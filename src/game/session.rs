//! Game Session - one client, driven tick by tick
//!
//! Owns the chunk manager, the player, the folded input state, the authority
//! link and the optional persistence backend, and runs them in a fixed order
//! every tick.

use crate::error::{EngineError, EngineResult, ErrorContext};
use crate::input::{drain_input_events, InputEvent, InputState};
use crate::network::{
    create_sync, flush_world_events, is_connected, poll_inbound, send_chat, SyncData, SyncStats,
    Transport,
};
use crate::persistence::{PersistenceBackend, PlayerState};
use crate::physics::{apply_look, player_intersects_block, step_player, PlayerData};
use crate::world::core::{BlockId, ChunkPos, RaycastHit, VoxelPos};
use crate::world::generation::WorldGenerator;
use crate::world::management::{ChunkManager, ChunkManagerConfig, WorldEvent, WorldMode};
use crate::world::storage::Chunk;
use crate::world::world_operations::{chunks_in_radius, highest_block, hit_test};
use crate::EngineConfig;
use cgmath::Point3;
use rand::Rng;
use std::collections::VecDeque;

/// Fresh players spawn this far from the origin at most, on x and z
const SPAWN_RANGE: f32 = 5000.0;

pub struct GameSession {
    config: EngineConfig,
    world: ChunkManager,
    player: PlayerData,
    input: InputState,
    sync: SyncData,
    persistence: Option<Box<dyn PersistenceBackend>>,
    ticks: u64,
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("world", &self.world)
            .field("player", &self.player)
            .field("sync", &self.sync)
            .field("persistence", &self.persistence.is_some())
            .field("ticks", &self.ticks)
            .finish()
    }
}

impl GameSession {
    /// Bring up a session.
    ///
    /// With a transport the world is networked: chunks wait for the authority
    /// and persistence is disabled. Offline, the area around the player is
    /// generated before returning and a player without saved state is dropped
    /// onto the surface.
    pub fn start(
        config: EngineConfig,
        generator: Box<dyn WorldGenerator>,
        persistence: Option<Box<dyn PersistenceBackend>>,
        transport: Option<Box<dyn Transport>>,
    ) -> EngineResult<Self> {
        config
            .validate()
            .map_err(|e| EngineError::InvalidConfig {
                reason: e.to_string(),
            })?;

        let mode = if transport.is_some() {
            WorldMode::Networked
        } else {
            WorldMode::Offline
        };
        let mut persistence = match (mode, persistence) {
            (WorldMode::Networked, Some(_)) => {
                log::info!("[Session] Authority configured, persistence disabled");
                None
            }
            (_, persistence) => persistence,
        };

        let saved = match persistence.as_mut() {
            Some(store) => store
                .load_player_state()
                .context("Failed to load player state")?,
            None => None,
        };
        let player = match saved {
            Some(state) => {
                log::info!(
                    "[Session] Restored player at ({:.1}, {:.1}, {:.1})",
                    state.x,
                    state.y,
                    state.z
                );
                PlayerData::new(Point3::new(state.x, state.y, state.z), state.yaw, state.pitch)
            }
            None => random_spawn(),
        };

        let world = ChunkManager::new(ChunkManagerConfig::from(&config), generator, mode);
        let mut session = Self {
            config,
            world,
            player,
            input: InputState::default(),
            sync: create_sync(transport),
            persistence,
            ticks: 0,
        };

        // Generator estimate until real chunks arrive
        if saved.is_none() {
            let p = session.player.position;
            let cell = VoxelPos::round_from(p.x, 0.0, p.z);
            let surface = session.world.generator().surface_height(cell.x, cell.z);
            session.player.position.y = (surface + 2) as f32;
        }

        if mode == WorldMode::Offline {
            let center = session.player_chunk();
            let created = session.world.ensure_chunks(center, false)?;
            session.process_world_events();
            log::info!("[Session] Warm-up generated {} chunks", created);

            if saved.is_none() {
                let p = session.player.position;
                let ground = highest_block(session.world.chunks(), p.x, p.z, session.chunk_size());
                session.player.position.y = (ground + 2) as f32;
            }
        }

        log::info!("[Session] Started in {:?} mode", mode);
        Ok(session)
    }

    // ========================================================================
    // TICK
    // ========================================================================

    /// Run one frame: input, block edits, chat, physics, inbound protocol,
    /// chunk streaming, then outbound sync and the block log.
    pub fn tick(&mut self, dt: f32, events: &mut VecDeque<InputEvent>) -> EngineResult<()> {
        self.ticks += 1;
        drain_input_events(events, &mut self.input);

        apply_look(&mut self.player, self.input.look_dx, self.input.look_dy);
        if self.input.toggle_flying {
            self.player.flying = !self.player.flying;
            log::debug!("[Session] Flying {}", self.player.flying);
        }

        if self.input.break_block {
            self.break_block();
        }
        if self.input.place_block {
            self.place_block();
        }
        for line in std::mem::take(&mut self.input.submitted_chat) {
            send_chat(&mut self.sync, &line);
        }

        let chunk_size = self.chunk_size();
        step_player(
            &mut self.player,
            &self.input,
            self.world.chunks(),
            dt,
            self.config.player_height,
            chunk_size,
        );

        poll_inbound(&mut self.sync, &mut self.world, &mut self.player)?;
        let center = self.player_chunk();
        self.world.ensure_chunks(center, true)?;
        self.process_world_events();
        Ok(())
    }

    fn break_block(&mut self) {
        let Some(hit) = self.look_hit(false) else {
            return;
        };
        // Bottom layer is indestructible
        if hit.position.y > 0 {
            self.world.set_block(hit.position, BlockId::AIR);
        }
    }

    fn place_block(&mut self) {
        let Some(hit) = self.look_hit(true) else {
            return;
        };
        if !hit.block.is_obstacle() {
            return;
        }
        if player_intersects_block(self.config.player_height, self.player.position, hit.position) {
            return;
        }
        self.world.set_block(hit.position, self.input.block_type);
    }

    fn look_hit(&self, previous: bool) -> Option<RaycastHit> {
        hit_test(
            self.world.chunks(),
            previous,
            self.player.position,
            self.player.yaw,
            self.player.pitch,
            self.chunk_size(),
        )
    }

    /// Send queued world events to the authority, and offline record block
    /// edits and replay the log into freshly created chunks
    fn process_world_events(&mut self) {
        let events = self.world.drain_events();
        if events.is_empty() {
            return;
        }
        flush_world_events(&mut self.sync, &events);

        let Some(store) = self.persistence.as_mut() else {
            return;
        };
        for event in events {
            match event {
                WorldEvent::BlockChanged { chunk, pos, block } => {
                    if let Err(e) = store.insert_block(chunk, pos, block) {
                        log::warn!("[Session] Failed to log block at {:?}: {}", pos, e);
                    }
                }
                WorldEvent::ChunkRequested(chunk) => match store.load_chunk_blocks(chunk) {
                    Ok(blocks) => self.world.replay_blocks(chunk, &blocks),
                    Err(e) => log::warn!("[Session] Failed to replay chunk {:?}: {}", chunk, e),
                },
            }
        }
    }

    /// Save the player pose if a persistence backend is active
    pub fn shutdown(&mut self) -> EngineResult<()> {
        let state = PlayerState {
            x: self.player.position.x,
            y: self.player.position.y,
            z: self.player.position.z,
            yaw: self.player.yaw,
            pitch: self.player.pitch,
        };
        if let Some(store) = self.persistence.as_mut() {
            store.save_player_state(&state)?;
            log::info!("[Session] Saved player state after {} ticks", self.ticks);
        }
        Ok(())
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn world(&self) -> &ChunkManager {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut ChunkManager {
        &mut self.world
    }

    pub fn player(&self) -> &PlayerData {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut PlayerData {
        &mut self.player
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn persistence(&self) -> Option<&dyn PersistenceBackend> {
        self.persistence.as_deref()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn is_running(&self) -> bool {
        !self.input.quit
    }

    pub fn is_connected(&self) -> bool {
        is_connected(&self.sync)
    }

    pub fn player_id(&self) -> Option<i32> {
        self.sync.player_id
    }

    pub fn sync_stats(&self) -> SyncStats {
        self.sync.stats
    }

    /// Positions of the other players the authority has reported
    pub fn peers(&self) -> impl Iterator<Item = (i32, Point3<f32>)> + '_ {
        self.sync.peers.iter().map(|(id, pos)| (*id, *pos))
    }

    /// Server chat and notices received since the last call
    pub fn take_notices(&mut self) -> Vec<String> {
        self.sync.notices.drain(..).collect()
    }

    /// Block under the crosshair, for the highlight wireframe
    pub fn focused_block(&self) -> Option<RaycastHit> {
        self.look_hit(false)
    }

    /// Chunks close enough to draw
    pub fn render_chunks(&self) -> Vec<&Chunk> {
        chunks_in_radius(
            self.world.chunks(),
            self.player_chunk(),
            self.config.render_chunk_radius,
        )
        .collect()
    }

    fn chunk_size(&self) -> i32 {
        self.world.chunk_size()
    }

    fn player_chunk(&self) -> ChunkPos {
        ChunkPos::from_world(self.player.position.x, self.player.position.z, self.chunk_size())
    }
}

fn random_spawn() -> PlayerData {
    let mut rng = rand::thread_rng();
    let x = rng.gen_range(-SPAWN_RANGE..SPAWN_RANGE);
    let z = rng.gen_range(-SPAWN_RANGE..SPAWN_RANGE);
    log::info!("[Session] New player at ({:.1}, {:.1})", x, z);
    PlayerData::new(Point3::new(x, 0.0, z), 0.0, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{KeyCode, MouseButton};
    use crate::network::LoopbackTransport;
    use crate::persistence::{FileStore, MemoryStore};
    use crate::world::generation::FlatGenerator;
    use std::f32::consts::{FRAC_PI_2, PI};

    const DT: f32 = 1.0 / 60.0;

    fn small_config() -> EngineConfig {
        EngineConfig {
            chunk_size: 4,
            max_chunks: 64,
            create_chunk_radius: 2,
            render_chunk_radius: 1,
            delete_chunk_radius: 4,
            ..Default::default()
        }
    }

    fn saved_at(x: f32, y: f32, z: f32, yaw: f32, pitch: f32) -> Box<dyn PersistenceBackend> {
        Box::new(MemoryStore {
            player: Some(PlayerState {
                x,
                y,
                z,
                yaw,
                pitch,
            }),
            ..Default::default()
        })
    }

    /// Offline session on a one-layer stone floor, eye at (0, 2, 0) facing +z
    fn offline_session() -> GameSession {
        GameSession::start(
            small_config(),
            Box::new(FlatGenerator::default()),
            Some(saved_at(0.0, 2.0, 0.0, PI, 0.0)),
            None,
        )
        .unwrap()
    }

    fn tick_with(session: &mut GameSession, events: Vec<InputEvent>) {
        let mut queue: VecDeque<InputEvent> = events.into();
        session.tick(DT, &mut queue).unwrap();
        assert!(queue.is_empty());
    }

    #[test]
    fn test_offline_start_generates_and_drops_player() {
        let session = GameSession::start(
            small_config(),
            Box::new(FlatGenerator::default()),
            None,
            None,
        )
        .unwrap();

        let stats = session.world().stats();
        assert_eq!(stats.loaded_chunks, 25);
        assert_eq!(stats.pending_chunks, 0);
        assert_eq!(session.player().position.y, 2.0);
        assert!(session.player().position.x.abs() <= SPAWN_RANGE);
        assert!(session.is_running());
    }

    #[test]
    fn test_saved_state_is_restored() {
        let session = offline_session();
        let player = session.player();
        assert_eq!(player.position, Point3::new(0.0, 2.0, 0.0));
        assert_eq!(player.yaw, PI);
    }

    #[test]
    fn test_invalid_config_fails_startup() {
        let config = EngineConfig {
            max_chunks: 10,
            ..small_config()
        };
        let result = GameSession::start(config, Box::new(FlatGenerator::default()), None, None);
        match result {
            Err(EngineError::InvalidConfig { reason }) => {
                assert!(reason.contains("max_chunks"), "{}", reason)
            }
            other => panic!("expected invalid config, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_break_block_logs_and_removes() {
        let mut session = offline_session();
        let target = VoxelPos::new(0, 2, 3);
        session.world_mut().set_block(target, BlockId::STONE);
        session.world_mut().drain_events();

        assert_eq!(session.focused_block().map(|h| h.position), Some(target));
        tick_with(&mut session, vec![InputEvent::MousePressed(MouseButton::Left)]);

        assert_eq!(session.world().get_block(target), BlockId::AIR);
        let logged = session
            .persistence()
            .unwrap()
            .load_chunk_blocks(ChunkPos::new(0, 0))
            .unwrap();
        assert_eq!(logged, vec![(target, BlockId::AIR)]);
    }

    #[test]
    fn test_floor_cannot_be_broken() {
        let mut session = offline_session();
        session.player_mut().pitch = -FRAC_PI_2;
        tick_with(&mut session, vec![InputEvent::MousePressed(MouseButton::Left)]);
        assert_eq!(session.world().get_block(VoxelPos::new(0, 0, 0)), BlockId::STONE);
    }

    #[test]
    fn test_place_block_in_front_of_hit() {
        let mut session = offline_session();
        session.world_mut().set_block(VoxelPos::new(0, 2, 3), BlockId::STONE);

        tick_with(
            &mut session,
            vec![
                InputEvent::KeyPressed(KeyCode::Digit(4)),
                InputEvent::MousePressed(MouseButton::Right),
            ],
        );
        assert_eq!(session.world().get_block(VoxelPos::new(0, 2, 2)), BlockId::GLASS);
    }

    #[test]
    fn test_place_vetoed_inside_player() {
        let mut session = offline_session();
        session.player_mut().pitch = -FRAC_PI_2;
        tick_with(&mut session, vec![InputEvent::MousePressed(MouseButton::Right)]);
        assert_eq!(session.world().get_block(VoxelPos::new(0, 1, 0)), BlockId::AIR);
    }

    #[test]
    fn test_player_settles_on_floor() {
        let mut session = offline_session();
        for _ in 0..120 {
            tick_with(&mut session, Vec::new());
        }
        let y = session.player().position.y;
        assert!((y - 1.75).abs() < 1e-3, "y = {}", y);
        assert_eq!(session.ticks(), 120);
    }

    #[test]
    fn test_logged_blocks_replayed_on_start() {
        let mut store = MemoryStore {
            player: Some(PlayerState {
                x: 1.0,
                y: 3.0,
                z: 1.0,
                yaw: 0.0,
                pitch: 0.0,
            }),
            ..Default::default()
        };
        let chunk = ChunkPos::new(0, 0);
        store
            .insert_block(chunk, VoxelPos::new(1, 0, 1), BlockId::AIR)
            .unwrap();
        store
            .insert_block(chunk, VoxelPos::new(2, 5, 2), BlockId::GLASS)
            .unwrap();

        let session = GameSession::start(
            small_config(),
            Box::new(FlatGenerator::default()),
            Some(Box::new(store)),
            None,
        )
        .unwrap();

        assert_eq!(session.world().get_block(VoxelPos::new(1, 0, 1)), BlockId::AIR);
        assert_eq!(session.world().get_block(VoxelPos::new(2, 5, 2)), BlockId::GLASS);
        assert_eq!(session.world().get_block(VoxelPos::new(2, 0, 2)), BlockId::STONE);
    }

    #[test]
    fn test_shutdown_saves_player() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        let mut session = GameSession::start(
            small_config(),
            Box::new(FlatGenerator::default()),
            Some(Box::new(store)),
            None,
        )
        .unwrap();
        let position = session.player().position;
        session.shutdown().unwrap();
        drop(session);

        let mut store = FileStore::open(dir.path()).unwrap();
        let state = store.load_player_state().unwrap().unwrap();
        assert_eq!(Point3::new(state.x, state.y, state.z), position);
    }

    #[test]
    fn test_networked_session_requests_chunks() {
        let (client, mut server) = LoopbackTransport::pair();
        let mut session = GameSession::start(
            small_config(),
            Box::new(FlatGenerator::default()),
            Some(Box::new(MemoryStore::new())),
            Some(Box::new(client)),
        )
        .unwrap();

        assert!(session.persistence().is_none());
        assert!(session.world().chunks().is_empty());
        assert!(session.is_connected());

        tick_with(&mut session, Vec::new());
        let line = server.try_receive().unwrap();
        assert!(line.starts_with("C,"), "{}", line);
        assert_eq!(server.try_receive(), None);
        assert_eq!(session.world().stats().pending_chunks, 1);
    }

    #[test]
    fn test_networked_position_sync_and_chat() {
        let (client, mut server) = LoopbackTransport::pair();
        let mut session = GameSession::start(
            small_config(),
            Box::new(FlatGenerator::default()),
            None,
            Some(Box::new(client)),
        )
        .unwrap();

        server.send("U,3,10,20,10").unwrap();
        server.send("T,welcome").unwrap();
        tick_with(
            &mut session,
            vec![
                InputEvent::Char('t'),
                InputEvent::Char('h'),
                InputEvent::Char('i'),
                InputEvent::KeyPressed(KeyCode::Enter),
            ],
        );

        assert_eq!(session.player_id(), Some(3));
        assert_eq!(session.take_notices(), vec!["welcome".to_string()]);
        assert_eq!(session.world().stats().loaded_chunks, 25);
        assert_eq!(server.try_receive().as_deref(), Some("T,hi"));
    }

    #[test]
    fn test_networked_spawn_uses_generator_surface() {
        let (client, _server) = LoopbackTransport::pair();
        let session = GameSession::start(
            small_config(),
            Box::new(FlatGenerator {
                layers: 3,
                block: BlockId::STONE,
            }),
            None,
            Some(Box::new(client)),
        )
        .unwrap();

        assert!(session.world().chunks().is_empty());
        assert_eq!(session.player().position.y, 5.0);
    }

    #[test]
    fn test_out_of_range_position_sync_is_dropped() {
        let (client, mut server) = LoopbackTransport::pair();
        let mut session = GameSession::start(
            small_config(),
            Box::new(FlatGenerator::default()),
            None,
            Some(Box::new(client)),
        )
        .unwrap();

        server.send("U,1,1e30,5,0").unwrap();
        server.send("P,2,inf,0,0").unwrap();
        tick_with(&mut session, Vec::new());
        tick_with(&mut session, Vec::new());

        assert!(session.is_connected());
        assert_eq!(session.player_id(), None);
        assert_eq!(session.peers().count(), 0);
        assert_eq!(session.sync_stats().malformed_lines, 2);
        assert!(session.player().position.x.abs() <= 5000.0);
    }

    #[test]
    fn test_lost_authority_falls_back_to_generator() {
        let (client, server) = LoopbackTransport::pair();
        let mut session = GameSession::start(
            small_config(),
            Box::new(FlatGenerator::default()),
            None,
            Some(Box::new(client)),
        )
        .unwrap();
        tick_with(&mut session, Vec::new());

        server.disconnect();
        tick_with(&mut session, Vec::new());

        assert!(!session.is_connected());
        assert_eq!(session.world().mode(), WorldMode::Offline);
        assert_eq!(session.world().stats().pending_chunks, 0);
    }

    #[test]
    fn test_render_chunks_within_radius() {
        let session = offline_session();
        let chunks = session.render_chunks();
        assert_eq!(chunks.len(), 9);
        assert!(chunks
            .iter()
            .all(|c| c.pos.distance(ChunkPos::new(0, 0)) <= 1));
    }

    #[test]
    fn test_quit_and_flying_toggle() {
        let mut session = offline_session();
        tick_with(&mut session, vec![InputEvent::KeyPressed(KeyCode::Tab)]);
        assert!(session.player().flying);
        tick_with(&mut session, vec![InputEvent::KeyPressed(KeyCode::Q)]);
        assert!(!session.is_running());
    }
}
