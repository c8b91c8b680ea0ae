//! Game Module
//!
//! The per-client tick driver that ties input, physics, the chunk manager,
//! the authority link and persistence together.

pub mod session;

pub use session::GameSession;
