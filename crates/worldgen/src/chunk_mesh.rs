//! Chunk mesh generation.
//!
//! One chunk is produced by an explicit pipeline whose stages hand immutable
//! records to each other:
//!
//! ```text
//! NoiseMap -> ChunkSurface -> ShadedChunk -> (ChunkMeshData, Vec<Plant>)
//! ```
//!
//! Normals can only be computed on a [`ChunkSurface`], and vegetation can only
//! be placed on a [`ShadedChunk`], so the ordering between stages is carried
//! by the types instead of by call order.

use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::{BiomeRules, ChunkCoord, WorldConfig};
use crate::heightmap::HeightSampler;
use crate::vegetation::{Plant, Species};

/// Accumulated normals shorter than this fall back to straight up.
const DEGENERATE_NORMAL_EPSILON: f32 = 1e-8;

/// Map a raw normalized sample onto the stylized height curve.
///
/// Values at or below the flatten threshold become exactly 0; above it the
/// excess is squared and scaled by the mesh amplitude.
#[inline]
pub fn terrain_height(raw: f32, config: &WorldConfig) -> f32 {
    let lifted = (raw - config.flatten_threshold).max(0.0);
    lifted * lifted * config.mesh_height
}

/// Raw elevation samples for one chunk, `chunk_width x (chunk_height + 1)`.
#[derive(Debug, Clone)]
pub struct NoiseMap {
    pub coord: ChunkCoord,
    pub values: Vec<f32>,
}

/// Sample the heightmap for a chunk.
///
/// World coordinate = local + chunk index * (dim - 1), so the last column of
/// one chunk and the first column of its neighbour read the same cell.
pub fn noise_map(sampler: &HeightSampler, config: &WorldConfig, coord: ChunkCoord) -> NoiseMap {
    let width = config.chunk_width;
    let rows = config.vertex_rows();
    let mut values = Vec::with_capacity(width * rows);
    if sampler.is_flat() {
        values.resize(width * rows, 0.0);
        return NoiseMap { coord, values };
    }
    let step_x = config.chunk_width as i64 - 1;
    let step_y = config.chunk_height as i64 - 1;
    for y in 0..rows {
        for x in 0..width {
            let wx = x as i64 + coord.x as i64 * step_x;
            let wy = y as i64 + coord.y as i64 * step_y;
            values.push(sampler.sample(wx, wy));
        }
    }
    NoiseMap { coord, values }
}

/// Chunk-local vertex positions and UVs.
#[derive(Debug, Clone)]
pub struct ChunkSurface {
    pub coord: ChunkCoord,
    pub positions: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
}

impl NoiseMap {
    /// Emit one `(x, height, z)` vertex per sample, with `(x / w, y / h)` UVs.
    pub fn into_surface(self, config: &WorldConfig) -> ChunkSurface {
        let width = config.chunk_width;
        let rows = config.vertex_rows();
        let mut positions = Vec::with_capacity(width * rows);
        let mut uvs = Vec::with_capacity(width * rows);
        for y in 0..rows {
            for x in 0..width {
                let h = terrain_height(self.values[x + y * width], config);
                positions.push([x as f32, h, y as f32]);
                uvs.push([
                    x as f32 / config.chunk_width as f32,
                    y as f32 / config.chunk_height as f32,
                ]);
            }
        }
        ChunkSurface {
            coord: self.coord,
            positions,
            uvs,
        }
    }
}

/// Triangle list for the chunk grid, two triangles per quad.
///
/// Winding is `(p, p+w, p+w+1)` and `(p, p+w+1, p+1)`, which makes the
/// right-hand-rule normal of a flat quad point along +Y.
pub fn grid_indices(config: &WorldConfig) -> Vec<u32> {
    let w = config.chunk_width;
    let mut indices = Vec::with_capacity(config.triangles_per_chunk() * 3);
    for y in 0..config.chunk_height.saturating_sub(1) {
        for x in 0..w.saturating_sub(1) {
            let p = (x + y * w) as u32;
            let w = w as u32;
            indices.extend_from_slice(&[p, p + w, p + w + 1]);
            indices.extend_from_slice(&[p, p + w + 1, p + 1]);
        }
    }
    indices
}

/// Unnormalized face normal of a triangle in emitted order.
#[inline]
pub fn face_normal(a: [f32; 3], b: [f32; 3], c: [f32; 3]) -> Vec3 {
    let a = Vec3::from(a);
    (Vec3::from(b) - a).cross(Vec3::from(c) - a)
}

/// Surface with smooth per-vertex normals and its triangle list.
#[derive(Debug, Clone)]
pub struct ShadedChunk {
    pub coord: ChunkCoord,
    pub positions: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl ChunkSurface {
    /// Sum each face normal into its three vertices, then normalize once.
    ///
    /// Faces contribute in proportion to their area. A vertex with no
    /// usable contribution gets `+Y`.
    pub fn shade(self, indices: Vec<u32>) -> ShadedChunk {
        let mut sums = vec![Vec3::ZERO; self.positions.len()];
        for tri in indices.chunks_exact(3) {
            let (i1, i2, i3) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            let n = face_normal(self.positions[i1], self.positions[i2], self.positions[i3]);
            sums[i1] += n;
            sums[i2] += n;
            sums[i3] += n;
        }
        let normals = sums
            .into_iter()
            .map(|n| {
                if n.length() < DEGENERATE_NORMAL_EPSILON {
                    [0.0, 1.0, 0.0]
                } else {
                    n.normalize().to_array()
                }
            })
            .collect();
        ShadedChunk {
            coord: self.coord,
            positions: self.positions,
            uvs: self.uvs,
            normals,
            indices,
        }
    }
}

/// Whether a vertex lies in the band where vegetation may grow.
///
/// All three comparisons are strict.
#[inline]
pub fn is_placement_eligible(height: f32, normal_y: f32, rules: &BiomeRules) -> bool {
    height > rules.water_level && height < rules.tree_line && normal_y > rules.min_normal_y
}

/// Independent random stream for one chunk, derived from the world seed.
pub fn chunk_rng(seed: u64, coord: ChunkCoord) -> ChaCha8Rng {
    let mixed = seed
        ^ (coord.x as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (coord.y as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
    ChaCha8Rng::seed_from_u64(mixed)
}

impl ShadedChunk {
    /// Walk vertices in row order and run one Bernoulli trial per eligible vertex.
    ///
    /// Plant positions are chunk-local.
    pub fn place_vegetation(&self, rules: &BiomeRules, rng: &mut impl Rng) -> Vec<Plant> {
        let mut plants = Vec::new();
        for (pos, normal) in self.positions.iter().zip(&self.normals) {
            if !is_placement_eligible(pos[1], normal[1], rules) {
                continue;
            }
            if !rng.gen_bool(rules.placement_chance) {
                continue;
            }
            let species = if rng.gen_bool(rules.tree_share) {
                Species::Tree
            } else {
                Species::Flower
            };
            plants.push(Plant {
                species,
                position: Vec3::from(*pos),
                chunk: self.coord,
            });
        }
        plants
    }

    /// Final buffers, with every vertex color set to white.
    pub fn into_mesh_data(self) -> ChunkMeshData {
        let colors = vec![[1.0, 1.0, 1.0, 1.0]; self.positions.len()];
        ChunkMeshData {
            positions: self.positions,
            normals: self.normals,
            colors,
            uvs: self.uvs,
            indices: self.indices,
        }
    }
}

/// GPU-ready buffers for one chunk.
#[derive(Debug, Clone, Default)]
pub struct ChunkMeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub colors: Vec<[f32; 4]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl ChunkMeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Output of [`generate_chunk`].
#[derive(Debug, Clone)]
pub struct GeneratedChunk {
    pub coord: ChunkCoord,
    pub mesh: ChunkMeshData,
    pub plants: Vec<Plant>,
}

/// Build one chunk: noise map, vertices, indices, normals, then vegetation.
pub fn generate_chunk(
    sampler: &HeightSampler,
    config: &WorldConfig,
    coord: ChunkCoord,
) -> GeneratedChunk {
    let shaded = noise_map(sampler, config, coord)
        .into_surface(config)
        .shade(grid_indices(config));
    let mut rng = chunk_rng(config.seed, coord);
    let plants = shaded.place_vegetation(&config.biome, &mut rng);
    GeneratedChunk {
        coord,
        mesh: shaded.into_mesh_data(),
        plants,
    }
}
