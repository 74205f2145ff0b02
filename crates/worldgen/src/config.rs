//! Compiled-in world configuration.
//!
//! Every tunable constant of the terrain lives in [`WorldConfig`], which is
//! inserted once as a resource and never resized afterwards.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

pub const CHUNK_WIDTH: usize = 127;
pub const CHUNK_HEIGHT: usize = 127;
pub const CHUNKS_X: usize = 20;
pub const CHUNKS_Y: usize = 20;

/// Vertical amplitude applied after the height curve.
pub const MESH_HEIGHT: f32 = 160.0;

/// Raw samples at or below this value flatten to zero height.
pub const FLATTEN_THRESHOLD: f32 = 0.08;

/// World-space Y of the shared water plane. Sits just under the beach line.
pub const WATER_SURFACE_HEIGHT: f32 = 11.2;

/// Chebyshev radius (in chunks) around the camera chunk that is considered for drawing.
pub const RENDER_DISTANCE: usize = 8;

/// Uniform scale applied to every vegetation instance.
pub const PLANT_SCALE: f32 = 3.0;

/// Rules deciding where vegetation candidates may appear.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BiomeRules {
    /// Placement requires height strictly above this.
    pub water_level: f32,
    /// Placement requires height strictly below this.
    pub tree_line: f32,
    /// Placement requires the vertex normal's up component strictly above this.
    pub min_normal_y: f32,
    /// Per-vertex Bernoulli probability for an eligible vertex.
    pub placement_chance: f64,
    /// Fraction of placements that become trees; the rest are flowers.
    pub tree_share: f64,
}

impl Default for BiomeRules {
    fn default() -> Self {
        Self {
            water_level: 11.4,
            tree_line: 70.0,
            min_normal_y: 0.6,
            placement_chance: 15.0 / 100_000.0,
            tree_share: 0.4,
        }
    }
}

/// Integer grid coordinates of one chunk, `0 <= x < chunks_x`, `0 <= y < chunks_y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub x: usize,
    pub y: usize,
}

impl ChunkCoord {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// Immutable world layout and generation parameters.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    pub chunk_width: usize,
    pub chunk_height: usize,
    pub chunks_x: usize,
    pub chunks_y: usize,
    pub mesh_height: f32,
    pub flatten_threshold: f32,
    pub water_surface_height: f32,
    pub render_distance: usize,
    pub plant_scale: f32,
    pub biome: BiomeRules,
    /// Seed for vegetation placement. Each chunk derives its own stream from it.
    pub seed: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            chunk_width: CHUNK_WIDTH,
            chunk_height: CHUNK_HEIGHT,
            chunks_x: CHUNKS_X,
            chunks_y: CHUNKS_Y,
            mesh_height: MESH_HEIGHT,
            flatten_threshold: FLATTEN_THRESHOLD,
            water_surface_height: WATER_SURFACE_HEIGHT,
            render_distance: RENDER_DISTANCE,
            plant_scale: PLANT_SCALE,
            biome: BiomeRules::default(),
            seed: 42,
        }
    }
}

impl WorldConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks_x * self.chunks_y
    }

    /// Row-major index of a chunk in flat per-chunk tables.
    #[inline]
    pub fn chunk_index(&self, coord: ChunkCoord) -> usize {
        coord.x + coord.y * self.chunks_x
    }

    pub fn contains(&self, coord: ChunkCoord) -> bool {
        coord.x < self.chunks_x && coord.y < self.chunks_y
    }

    /// All chunk coordinates in generation order (rows of x, then y).
    pub fn chunk_coords(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        (0..self.chunks_y).flat_map(move |y| (0..self.chunks_x).map(move |x| ChunkCoord::new(x, y)))
    }

    /// Vertex rows per chunk. One extra row beyond `chunk_height` is sampled.
    pub fn vertex_rows(&self) -> usize {
        self.chunk_height + 1
    }

    pub fn vertices_per_chunk(&self) -> usize {
        self.chunk_width * self.vertex_rows()
    }

    pub fn triangles_per_chunk(&self) -> usize {
        self.chunk_width.saturating_sub(1) * self.chunk_height.saturating_sub(1) * 2
    }

    /// World-space point the grid is centered around; the camera spawns here.
    pub fn origin(&self) -> Vec2 {
        let cw = self.chunk_width as f32;
        let ch = self.chunk_height as f32;
        Vec2::new(
            (cw * self.chunks_x as f32) / 2.0 - cw / 2.0,
            (ch * self.chunks_y as f32) / 2.0 - ch / 2.0,
        )
    }

    /// World-space XZ translation of a chunk's local vertex (0, 0).
    ///
    /// Chunks advance by `dim - 1` so neighbours share their boundary vertices.
    pub fn chunk_origin(&self, coord: ChunkCoord) -> Vec2 {
        let cw = self.chunk_width as f32;
        let ch = self.chunk_height as f32;
        Vec2::new(
            -cw / 2.0 + (cw - 1.0) * coord.x as f32,
            -ch / 2.0 + (ch - 1.0) * coord.y as f32,
        )
    }

    /// World-space XZ center of a chunk, used by the visibility heuristic.
    pub fn chunk_center(&self, coord: ChunkCoord) -> Vec2 {
        self.chunk_origin(coord)
            + Vec2::new(self.chunk_width as f32 / 2.0, self.chunk_height as f32 / 2.0)
    }

    /// XZ extent covered by the whole grid, as (min, max).
    pub fn world_bounds(&self) -> (Vec2, Vec2) {
        let min = Vec2::new(
            -(self.chunk_width as f32) / 2.0,
            -(self.chunk_height as f32) / 2.0,
        );
        let max = min
            + Vec2::new(
                (self.chunk_width as f32 - 1.0) * self.chunks_x as f32,
                (self.chunk_height as f32 - 1.0) * self.chunks_y as f32,
            );
        (min, max)
    }
}
