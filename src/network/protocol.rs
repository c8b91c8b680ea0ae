//! Wire protocol - newline framed, comma separated ASCII lines
//!
//! ```text
//! C,<p>,<q>                      client -> authority: request chunk
//! B,<p>,<q>,<x>,<y>,<z>,<w>      either direction: block set
//! U,<id>,<x>,<y>,<z>             authority -> client: own position
//! P,<id>,<x>,<y>,<z>             authority -> client: another player's position
//! T,<text>                       either direction: chat / notice
//! ```
//!
//! Decoding never fails. Anything that does not match the grammar becomes
//! `Message::Malformed` carrying the offending line.

use crate::constants::protocol::{
    BLOCK_SET, CHAT, CHUNK_REQUEST, MAX_COORDINATE, PEER_POSITION, POSITION_SYNC,
};
use crate::world::core::{ChunkPos, VoxelPos};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    ChunkRequest {
        chunk: ChunkPos,
    },
    BlockSet {
        chunk: ChunkPos,
        pos: VoxelPos,
        /// Raw block code; validated when applied
        block: i32,
    },
    PositionSync {
        player_id: i32,
        x: f32,
        y: f32,
        z: f32,
    },
    PeerPosition {
        player_id: i32,
        x: f32,
        y: f32,
        z: f32,
    },
    Chat {
        text: String,
    },
    Malformed {
        line: String,
    },
}

/// Render a message as one line, without the trailing newline
pub fn encode(message: &Message) -> String {
    match message {
        Message::ChunkRequest { chunk } => format!("{},{},{}", CHUNK_REQUEST, chunk.p, chunk.q),
        Message::BlockSet { chunk, pos, block } => format!(
            "{},{},{},{},{},{},{}",
            BLOCK_SET, chunk.p, chunk.q, pos.x, pos.y, pos.z, block
        ),
        Message::PositionSync { player_id, x, y, z } => {
            format!("{},{},{},{},{}", POSITION_SYNC, player_id, x, y, z)
        }
        Message::PeerPosition { player_id, x, y, z } => {
            format!("{},{},{},{},{}", PEER_POSITION, player_id, x, y, z)
        }
        // Line breaks would split the frame
        Message::Chat { text } => format!("{},{}", CHAT, text.replace(['\r', '\n'], " ")),
        Message::Malformed { line } => line.clone(),
    }
}

/// Parse one line. A trailing CR/LF is ignored.
pub fn decode(line: &str) -> Message {
    let line = line.trim_end_matches(['\r', '\n']);
    parse(line).unwrap_or_else(|| Message::Malformed {
        line: line.to_string(),
    })
}

fn parse(line: &str) -> Option<Message> {
    let (tag, rest) = line.split_once(',')?;

    // Chat text may itself contain commas
    if tag == CHAT {
        return Some(Message::Chat {
            text: rest.to_string(),
        });
    }

    let fields: Vec<&str> = rest.split(',').collect();
    match tag {
        CHUNK_REQUEST => {
            let [p, q] = fields.as_slice() else {
                return None;
            };
            Some(Message::ChunkRequest {
                chunk: ChunkPos::new(field(p)?, field(q)?),
            })
        }
        BLOCK_SET => {
            let [p, q, x, y, z, w] = fields.as_slice() else {
                return None;
            };
            Some(Message::BlockSet {
                chunk: ChunkPos::new(field(p)?, field(q)?),
                pos: VoxelPos::new(field(x)?, field(y)?, field(z)?),
                block: field(w)?,
            })
        }
        POSITION_SYNC | PEER_POSITION => {
            let [id, x, y, z] = fields.as_slice() else {
                return None;
            };
            let (player_id, x, y, z) = (field(id)?, coordinate(x)?, coordinate(y)?, coordinate(z)?);
            if tag == POSITION_SYNC {
                Some(Message::PositionSync { player_id, x, y, z })
            } else {
                Some(Message::PeerPosition { player_id, x, y, z })
            }
        }
        _ => None,
    }
}

fn field<T: FromStr>(raw: &str) -> Option<T> {
    raw.trim().parse().ok()
}

/// A finite world coordinate within `MAX_COORDINATE`
fn coordinate(raw: &str) -> Option<f32> {
    let value: f32 = field(raw)?;
    (value.is_finite() && value.abs() <= MAX_COORDINATE).then_some(value)
}
