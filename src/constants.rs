//! Engine-wide constants
//!
//! Grouped by the subsystem that owns them. Runtime-tunable values are
//! mirrored in `EngineConfig`; these are the defaults.

/// World layout and streaming
pub mod core {
    /// Horizontal extent of a chunk along x and z, in world units
    pub const CHUNK_SIZE: i32 = 32;

    /// Capacity of the live chunk arena
    pub const MAX_CHUNKS: usize = 1024;

    /// Chebyshev radius (in chunks) within which missing chunks are created
    pub const CREATE_CHUNK_RADIUS: i32 = 6;

    /// Chebyshev radius (in chunks) handed to the renderer
    pub const RENDER_CHUNK_RADIUS: i32 = 6;

    /// Chunks at or beyond this Chebyshev distance are evicted
    pub const DELETE_CHUNK_RADIUS: i32 = 8;
}

/// Ray marching and collision
pub mod query {
    /// Sub-steps per world unit when marching a sight ray
    pub const RAY_STEPS_PER_UNIT: i32 = 8;

    /// Maximum reach of a sight ray, in world units
    pub const RAY_MAX_DISTANCE: i32 = 8;

    /// Soft margin kept between the player and an obstacle face
    pub const COLLISION_PAD: f32 = 0.25;

    /// Player height in stacked unit cells
    pub const PLAYER_HEIGHT: i32 = 2;
}

/// Player movement
pub mod physics {
    pub const WALK_SPEED: f32 = 5.0;
    pub const FLY_SPEED: f32 = 20.0;
    pub const GRAVITY: f32 = 25.0;
    pub const TERMINAL_VELOCITY: f32 = 250.0;
    pub const JUMP_VELOCITY: f32 = 8.0;

    /// Integration sub-steps per tick
    pub const SUBSTEPS: i32 = 8;

    /// Largest frame delta fed to the integrator, in seconds
    pub const MAX_FRAME_DELTA: f32 = 0.2;

    /// Radians of look rotation per pixel of mouse travel
    pub const MOUSE_SENSITIVITY: f32 = 0.0025;
}

/// Wire protocol
pub mod protocol {
    pub const CHUNK_REQUEST: &str = "C";
    pub const BLOCK_SET: &str = "B";
    pub const POSITION_SYNC: &str = "U";
    pub const PEER_POSITION: &str = "P";
    pub const CHAT: &str = "T";

    /// Longest chat line accepted from the local player
    pub const MAX_CHAT_LENGTH: usize = 255;

    /// Largest coordinate magnitude accepted in `U` and `P` lines. Past this
    /// an f32 no longer resolves whole world units.
    pub const MAX_COORDINATE: f32 = 8_000_000.0;

    /// Unread notices kept for the UI; older ones are dropped first
    pub const MAX_NOTICES: usize = 64;
}
