//! Sync Data - Pure DOP
//!
//! NO METHODS. Just data.
//! All transformations happen in sync_operations.rs

use super::Transport;
use cgmath::Point3;
use rustc_hash::FxHashMap;
use std::collections::VecDeque;

/// Protocol traffic counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub lines_sent: u64,
    pub lines_received: u64,
    pub malformed_lines: u64,
    /// Outbound lines discarded because no authority was reachable
    pub lines_dropped: u64,
}

/// Client side of the authority link
pub struct SyncData {
    /// `None` when offline, or after the link degraded
    pub transport: Option<Box<dyn Transport>>,
    /// Assigned by the first position sync from the authority
    pub player_id: Option<i32>,
    /// Server chat and notices, oldest first, waiting for the UI.
    /// Holds at most `MAX_NOTICES`.
    pub notices: VecDeque<String>,
    /// Last reported position of every other player
    pub peers: FxHashMap<i32, Point3<f32>>,
    pub stats: SyncStats,
}

impl std::fmt::Debug for SyncData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncData")
            .field("connected", &self.transport.as_ref().map(|t| t.connected()))
            .field("player_id", &self.player_id)
            .field("notices", &self.notices.len())
            .field("peers", &self.peers.len())
            .field("stats", &self.stats)
            .finish()
    }
}
