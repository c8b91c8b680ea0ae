//! World Operations - Pure DOP Functions
//!
//! Read-only queries over a slice of live chunks. The chunk manager owns the
//! chunks and is the only writer; everything here takes `&[Chunk]`.

use super::core::{BlockId, ChunkPos, Ray, RaycastHit, VoxelPos};
use super::storage::Chunk;
use crate::constants::query::{RAY_MAX_DISTANCE, RAY_STEPS_PER_UNIT};
use cgmath::{MetricSpace, Point3};

// ============================================================================
// CHUNK LOOKUP
// ============================================================================

/// Find the live chunk at `pos`. Chunk order carries no meaning.
pub fn find_chunk(chunks: &[Chunk], pos: ChunkPos) -> Option<&Chunk> {
    chunks.iter().find(|c| c.pos == pos)
}

/// Mutable variant of [`find_chunk`]
pub fn find_chunk_mut(chunks: &mut [Chunk], pos: ChunkPos) -> Option<&mut Chunk> {
    chunks.iter_mut().find(|c| c.pos == pos)
}

/// Live chunks within Chebyshev `radius` of `center`
pub fn chunks_in_radius(
    chunks: &[Chunk],
    center: ChunkPos,
    radius: i32,
) -> impl Iterator<Item = &Chunk> {
    chunks
        .iter()
        .filter(move |c| c.pos.distance(center) <= radius)
}

// ============================================================================
// BLOCK QUERIES
// ============================================================================

/// Block at a world position, resolved through its owning chunk.
/// Unloaded chunks read as air.
pub fn global_get(chunks: &[Chunk], pos: VoxelPos, chunk_size: i32) -> BlockId {
    find_chunk(chunks, pos.chunk(chunk_size))
        .map(|chunk| chunk.map.get(pos))
        .unwrap_or(BlockId::AIR)
}

/// Highest obstacle in the column under `(x, z)`, or -1 for an empty column
pub fn highest_block(chunks: &[Chunk], x: f32, z: f32, chunk_size: i32) -> i32 {
    let column = VoxelPos::round_from(x, 0.0, z);
    let Some(chunk) = find_chunk(chunks, column.chunk(chunk_size)) else {
        return -1;
    };

    chunk
        .map
        .blocks()
        .filter(|(pos, block)| block.is_obstacle() && pos.x == column.x && pos.z == column.z)
        .map(|(pos, _)| pos.y)
        .max()
        .unwrap_or(-1)
}

// ============================================================================
// RAYCASTING
// ============================================================================

/// March a sight ray through one chunk's map.
///
/// Samples `RAY_STEPS_PER_UNIT` points per world unit up to
/// `RAY_MAX_DISTANCE`, snapping each to the nearest lattice point. A lattice
/// point is tested only when it differs from the previous one. With
/// `previous` set the empty lattice point crossed just before the hit is
/// returned; a ray that starts inside a block then yields nothing.
fn march_chunk(chunk: &Chunk, previous: bool, ray: &Ray) -> Option<(VoxelPos, BlockId)> {
    let steps = RAY_MAX_DISTANCE * RAY_STEPS_PER_UNIT;
    let mut last: Option<VoxelPos> = None;

    for i in 0..steps {
        let t = i as f32 / RAY_STEPS_PER_UNIT as f32;
        let point = ray.at(t);
        let cell = VoxelPos::round_from(point.x, point.y, point.z);
        if last == Some(cell) {
            continue;
        }

        let block = chunk.map.get(cell);
        if !block.is_air() {
            return if previous {
                last.map(|prev| (prev, block))
            } else {
                Some((cell, block))
            };
        }
        last = Some(cell);
    }

    None
}

/// Find the block the observer is looking at.
///
/// Every live chunk within one chunk of the eye is marched; the hit closest to
/// the eye wins. `previous = false` returns the hit block itself (break and
/// highlight), `previous = true` returns the empty cell in front of it
/// (placement). The block code is always the one that stopped the ray.
pub fn hit_test(
    chunks: &[Chunk],
    previous: bool,
    eye: Point3<f32>,
    yaw: f32,
    pitch: f32,
    chunk_size: i32,
) -> Option<RaycastHit> {
    let center = ChunkPos::from_world(eye.x, eye.z, chunk_size);
    let ray = Ray::from_look(eye, yaw, pitch);
    let mut best: Option<RaycastHit> = None;

    for chunk in chunks_in_radius(chunks, center, 1) {
        let Some((position, block)) = march_chunk(chunk, previous, &ray) else {
            continue;
        };
        let target = Point3::new(position.x as f32, position.y as f32, position.z as f32);
        let distance = eye.distance(target);
        if best.map_or(true, |b| distance < b.distance) {
            best = Some(RaycastHit {
                position,
                block,
                distance,
            });
        }
    }

    best
}

// ============================================================================
// UTILITIES
// ============================================================================

/// World-space corner of a chunk column (y = 0)
pub fn chunk_to_world(pos: ChunkPos, chunk_size: i32) -> VoxelPos {
    VoxelPos::new(pos.p * chunk_size, 0, pos.q * chunk_size)
}

/// Chunks sharing an edge or corner with the cell at `pos`.
///
/// A block on the first or last column of its chunk borders the neighbour on
/// that side; corner cells border the diagonal neighbour as well.
pub fn boundary_neighbours(pos: VoxelPos, chunk_size: i32) -> Vec<ChunkPos> {
    let owner = pos.chunk(chunk_size);
    let origin = chunk_to_world(owner, chunk_size);
    let p0 = pos.x == origin.x;
    let p1 = pos.x == origin.x + chunk_size - 1;
    let q0 = pos.z == origin.z;
    let q1 = pos.z == origin.z + chunk_size - 1;

    let mut out = Vec::new();
    for dp in -1..=1 {
        for dq in -1..=1 {
            if dp == 0 && dq == 0 {
                continue;
            }
            if (dp < 0 && !p0) || (dp > 0 && !p1) || (dq < 0 && !q0) || (dq > 0 && !q1) {
                continue;
            }
            out.push(owner.offset(dp, dq));
        }
    }
    out
}
