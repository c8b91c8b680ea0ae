//! Chunk meshing - pure functions that turn a sparse map into triangle soup
//!
//! Every visible face becomes two triangles (6 vertices). Per face the mesh
//! carries 18 position floats, 18 normal floats and 12 uv floats. Textures
//! come from a 16x16 tile atlas.

use super::core::{face_tiles, BlockFace, BlockId, VoxelPos};
use super::generation::OctaveNoise;
use super::storage::{ChunkMesh, SparseVoxelMap};
use cgmath::{Deg, Matrix3, Vector3};

/// Half the edge length of a cube
const HALF: f32 = 0.5;

/// Atlas tiles per row and column
const ATLAS_TILES: u16 = 16;

/// Faces emitted for a plant that is not fully enclosed
pub const PLANT_FACES: usize = 4;

// Corner tables are indexed by face in `BlockFace::ALL` order.
const CUBE_CORNERS: [[[f32; 3]; 4]; 6] = [
    [[-1.0, -1.0, -1.0], [-1.0, -1.0, 1.0], [-1.0, 1.0, -1.0], [-1.0, 1.0, 1.0]],
    [[1.0, -1.0, -1.0], [1.0, -1.0, 1.0], [1.0, 1.0, -1.0], [1.0, 1.0, 1.0]],
    [[-1.0, 1.0, -1.0], [-1.0, 1.0, 1.0], [1.0, 1.0, -1.0], [1.0, 1.0, 1.0]],
    [[-1.0, -1.0, -1.0], [-1.0, -1.0, 1.0], [1.0, -1.0, -1.0], [1.0, -1.0, 1.0]],
    [[-1.0, -1.0, -1.0], [-1.0, 1.0, -1.0], [1.0, -1.0, -1.0], [1.0, 1.0, -1.0]],
    [[-1.0, -1.0, 1.0], [-1.0, 1.0, 1.0], [1.0, -1.0, 1.0], [1.0, 1.0, 1.0]],
];

const CUBE_UVS: [[[f32; 2]; 4]; 6] = [
    [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]],
    [[1.0, 0.0], [0.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
    [[0.0, 1.0], [0.0, 0.0], [1.0, 1.0], [1.0, 0.0]],
    [[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]],
    [[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]],
    [[1.0, 0.0], [1.0, 1.0], [0.0, 0.0], [0.0, 1.0]],
];

// Winding alternates so both triangles of every face point outward
const QUAD_INDICES: [[usize; 6]; 2] = [[0, 3, 2, 0, 1, 3], [0, 3, 1, 0, 2, 3]];

const PLANT_CORNERS: [[[f32; 3]; 4]; 4] = [
    [[0.0, -1.0, -1.0], [0.0, -1.0, 1.0], [0.0, 1.0, -1.0], [0.0, 1.0, 1.0]],
    [[0.0, -1.0, -1.0], [0.0, -1.0, 1.0], [0.0, 1.0, -1.0], [0.0, 1.0, 1.0]],
    [[-1.0, -1.0, 0.0], [-1.0, 1.0, 0.0], [1.0, -1.0, 0.0], [1.0, 1.0, 0.0]],
    [[-1.0, -1.0, 0.0], [-1.0, 1.0, 0.0], [1.0, -1.0, 0.0], [1.0, 1.0, 0.0]],
];

const PLANT_NORMALS: [[f32; 3]; 4] = [
    [-1.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [0.0, 0.0, -1.0],
    [0.0, 0.0, 1.0],
];

const PLANT_UVS: [[[f32; 2]; 4]; 4] = [
    [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]],
    [[1.0, 0.0], [0.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
    [[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]],
    [[1.0, 0.0], [1.0, 1.0], [0.0, 0.0], [0.0, 1.0]],
];

// ============================================================================
// EXPOSURE
// ============================================================================

/// Which faces of the cell at `pos` can be seen, in `BlockFace::ALL` order.
/// Nothing is exposed below the world floor.
pub fn exposed_faces<F>(lookup: &F, pos: VoxelPos) -> [bool; 6]
where
    F: Fn(VoxelPos) -> BlockId,
{
    let mut out = [false; 6];
    for face in BlockFace::ALL {
        let o = face.offset();
        let open = lookup(pos.offset(o.x, o.y, o.z)).is_transparent();
        out[face.index()] = if face == BlockFace::Bottom {
            open && pos.y > 0
        } else {
            open
        };
    }
    out
}

/// Faces a block contributes to its chunk mesh
pub fn face_count(block: BlockId, exposed: &[bool; 6]) -> usize {
    let total = exposed.iter().filter(|e| **e).count();
    if block.is_plant() {
        if total > 0 {
            PLANT_FACES
        } else {
            0
        }
    } else {
        total
    }
}

// ============================================================================
// MESH BUILDING
// ============================================================================

/// Build the mesh for one chunk.
///
/// `lookup` resolves any world cell, including cells owned by neighbouring
/// chunks, so faces on the chunk boundary are exact.
pub fn build_chunk_mesh<F>(map: &SparseVoxelMap, lookup: F, noise: &OctaveNoise) -> ChunkMesh
where
    F: Fn(VoxelPos) -> BlockId,
{
    let visible: Vec<(VoxelPos, BlockId, [bool; 6])> = map
        .blocks()
        .filter_map(|(pos, block)| {
            let exposed = exposed_faces(&lookup, pos);
            (face_count(block, &exposed) > 0).then_some((pos, block, exposed))
        })
        .collect();

    let total: usize = visible
        .iter()
        .map(|(_, block, exposed)| face_count(*block, exposed))
        .sum();
    let mut mesh = ChunkMesh::with_capacity(total);

    for (pos, block, exposed) in visible {
        if block.is_plant() {
            let rotation = noise.sample3(pos.x as f64, pos.y as f64, pos.z as f64, 4, 0.5, 2.0);
            emit_plant(&mut mesh, pos, block, rotation as f32 * 360.0);
        } else {
            emit_cube(&mut mesh, pos, block, &exposed);
        }
    }

    debug_assert_eq!(mesh.faces, total);
    mesh
}

fn tile_origin(tile: u16) -> (f32, f32) {
    let s = 1.0 / ATLAS_TILES as f32;
    ((tile % ATLAS_TILES) as f32 * s, (tile / ATLAS_TILES) as f32 * s)
}

fn push_quad(
    mesh: &mut ChunkMesh,
    corners: [Vector3<f32>; 4],
    normal: Vector3<f32>,
    uvs: &[[f32; 2]; 4],
    tile: u16,
    winding: usize,
) {
    let s = 1.0 / ATLAS_TILES as f32;
    let (du, dv) = tile_origin(tile);
    for &i in &QUAD_INDICES[winding % 2] {
        let c = corners[i];
        mesh.positions.extend_from_slice(&[c.x, c.y, c.z]);
        mesh.normals.extend_from_slice(&[normal.x, normal.y, normal.z]);
        mesh.uvs.extend_from_slice(&[du + uvs[i][0] * s, dv + uvs[i][1] * s]);
    }
    mesh.faces += 1;
}

fn emit_cube(mesh: &mut ChunkMesh, pos: VoxelPos, block: BlockId, exposed: &[bool; 6]) {
    let center = Vector3::new(pos.x as f32, pos.y as f32, pos.z as f32);
    let tiles = face_tiles(block);
    for face in BlockFace::ALL {
        let i = face.index();
        if !exposed[i] {
            continue;
        }
        let corners = CUBE_CORNERS[i].map(|c| center + Vector3::from(c) * HALF);
        push_quad(mesh, corners, face.normal(), &CUBE_UVS[i], tiles[i], i);
    }
}

fn emit_plant(mesh: &mut ChunkMesh, pos: VoxelPos, block: BlockId, degrees: f32) {
    let center = Vector3::new(pos.x as f32, pos.y as f32, pos.z as f32);
    let rotation = Matrix3::from_angle_y(Deg(degrees));
    let tile = face_tiles(block)[0];
    for i in 0..PLANT_FACES {
        let corners = PLANT_CORNERS[i].map(|c| center + rotation * (Vector3::from(c) * HALF));
        let normal = rotation * Vector3::from(PLANT_NORMALS[i]);
        push_quad(mesh, corners, normal, &PLANT_UVS[i], tile, i);
    }
}
