//! Network Module
//!
//! Line protocol codec, transports, and the sync layer that keeps the local
//! chunk set consistent with a remote authority.

pub mod protocol;
pub mod sync_data;
pub mod sync_operations;
pub mod transport;

pub use protocol::{decode, encode, Message};
pub use sync_data::{SyncData, SyncStats};
pub use sync_operations::{
    apply_message, create_sync, flush_world_events, is_connected, poll_inbound, send_chat,
};
pub use transport::{LoopbackTransport, TcpTransport, Transport};

pub type NetworkResult<T> = Result<T, NetworkError>;

#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    #[error("Connection to {addr} failed: {error}")]
    ConnectionFailed { addr: String, error: String },
    #[error("Transport disconnected")]
    Disconnected,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
