//! Core world data types and fundamental structures
//!
//! Block codes, lattice and chunk coordinates, and sight rays. Everything
//! else in the world module is built from these.

mod block;
mod position;
mod ray;

pub use block::{face_tiles, BlockId};
pub use position::{ChunkPos, VoxelPos};
pub use ray::{sight_vector, BlockFace, Ray, RaycastHit};
