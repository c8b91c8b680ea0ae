//! Sync Operations - Pure functions for the authority link
//!
//! All functions operate on SyncData passed as parameter.
//! Outbound traffic is derived from the chunk manager's world events, inbound
//! lines are decoded and applied back into the chunk manager and the player.

use super::protocol::{decode, encode, Message};
use super::sync_data::{SyncData, SyncStats};
use super::Transport;
use crate::constants::protocol::MAX_NOTICES;
use crate::error::EngineResult;
use crate::physics::PlayerData;
use crate::world::core::{BlockId, ChunkPos};
use crate::world::management::{ChunkManager, WorldEvent, WorldMode};
use crate::world::world_operations::highest_block;
use rustc_hash::FxHashMap;
use std::collections::VecDeque;

/// Create sync state. `None` means offline: every outbound line is dropped.
pub fn create_sync(transport: Option<Box<dyn Transport>>) -> SyncData {
    SyncData {
        transport,
        player_id: None,
        notices: VecDeque::new(),
        peers: FxHashMap::default(),
        stats: SyncStats::default(),
    }
}

pub fn is_connected(sync: &SyncData) -> bool {
    sync.transport.as_ref().is_some_and(|t| t.connected())
}

fn send_message(sync: &mut SyncData, message: &Message) {
    let Some(transport) = sync.transport.as_mut() else {
        sync.stats.lines_dropped += 1;
        return;
    };
    let line = encode(message);
    match transport.send(&line) {
        Ok(()) => {
            sync.stats.lines_sent += 1;
            log::debug!("[Sync] -> {}", line);
        }
        Err(e) => {
            sync.stats.lines_dropped += 1;
            log::debug!("[Sync] Dropped outbound line {:?}: {}", line, e);
        }
    }
}

// ============================================================================
// OUTBOUND
// ============================================================================

/// Encode every world event for the authority, oldest first
pub fn flush_world_events(sync: &mut SyncData, events: &[WorldEvent]) {
    for event in events {
        let message = match *event {
            WorldEvent::ChunkRequested(chunk) => Message::ChunkRequest { chunk },
            WorldEvent::BlockChanged { chunk, pos, block } => Message::BlockSet {
                chunk,
                pos,
                block: block.code(),
            },
        };
        send_message(sync, &message);
    }
}

pub fn send_chat(sync: &mut SyncData, text: &str) {
    send_message(
        sync,
        &Message::Chat {
            text: text.to_string(),
        },
    );
}

// ============================================================================
// INBOUND
// ============================================================================

/// Apply every complete line the transport has buffered.
///
/// Lines already received are applied even if the link has since dropped.
/// Afterwards a dead link is released and the world falls back to the
/// generator. Returns the number of lines processed.
pub fn poll_inbound(
    sync: &mut SyncData,
    world: &mut ChunkManager,
    player: &mut PlayerData,
) -> EngineResult<usize> {
    let mut processed = 0;
    loop {
        let Some(line) = sync.transport.as_mut().and_then(|t| t.try_receive()) else {
            break;
        };
        sync.stats.lines_received += 1;
        processed += 1;
        log::debug!("[Sync] <- {}", line);
        apply_message(sync, world, player, decode(&line))?;
    }

    if sync.transport.as_ref().is_some_and(|t| !t.connected()) {
        degrade_to_offline(sync, world);
    }
    Ok(processed)
}

fn degrade_to_offline(sync: &mut SyncData, world: &mut ChunkManager) {
    log::warn!("[Sync] Lost connection to authority, continuing offline");
    sync.transport = None;
    sync.peers.clear();
    world.set_mode(WorldMode::Offline);
}

/// Apply one decoded message from the authority
pub fn apply_message(
    sync: &mut SyncData,
    world: &mut ChunkManager,
    player: &mut PlayerData,
    message: Message,
) -> EngineResult<()> {
    match message {
        Message::PositionSync { player_id, x, y, z } => {
            if sync.player_id != Some(player_id) {
                log::info!("[Sync] Assigned player id {}", player_id);
            }
            sync.player_id = Some(player_id);

            let chunk_size = world.chunk_size();
            player.position.x = x;
            player.position.y = y;
            player.position.z = z;
            player.dy = 0.0;
            world.ensure_chunks(ChunkPos::from_world(x, z, chunk_size), false)?;
            player.position.y = (highest_block(world.chunks(), x, z, chunk_size) + 2) as f32;
        }
        Message::BlockSet { pos, block, .. } => match BlockId::from_code(block) {
            Some(block) => {
                world.apply_authority_block(pos, block);
            }
            None => {
                log::debug!("[Sync] Ignoring block code {} at {:?}", block, pos);
            }
        },
        Message::PeerPosition { player_id, x, y, z } => {
            if sync.player_id != Some(player_id) {
                sync.peers.insert(player_id, cgmath::Point3::new(x, y, z));
            }
        }
        Message::Chat { text } => {
            log::info!("[Sync] Notice: {}", text);
            if sync.notices.len() == MAX_NOTICES {
                sync.notices.pop_front();
            }
            sync.notices.push_back(text);
        }
        Message::ChunkRequest { chunk } => {
            log::debug!("[Sync] Ignoring chunk request {:?} from authority", chunk);
        }
        Message::Malformed { line } => {
            sync.stats.malformed_lines += 1;
            log::debug!("[Sync] Dropped malformed line {:?}", line);
        }
    }
    Ok(())
}
