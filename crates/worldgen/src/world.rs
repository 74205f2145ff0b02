//! Eager generation of the whole chunk grid.

use bevy::prelude::*;

use crate::chunk_mesh::{generate_chunk, ChunkMeshData};
use crate::config::{ChunkCoord, WorldConfig};
use crate::heightmap::HeightSampler;
use crate::vegetation::{Plant, Species};

/// Mesh data for every chunk plus all vegetation candidates.
#[derive(Debug, Clone, Default)]
pub struct GeneratedWorld {
    /// Row-major, indexed by [`WorldConfig::chunk_index`].
    pub chunks: Vec<(ChunkCoord, ChunkMeshData)>,
    pub plants: Vec<Plant>,
}

impl GeneratedWorld {
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn plants_of(&self, species: Species) -> usize {
        self.plants.iter().filter(|p| p.species == species).count()
    }
}

/// Generate every chunk sequentially in row-major order.
pub fn generate_world(sampler: &HeightSampler, config: &WorldConfig) -> GeneratedWorld {
    info!(
        "Generating terrain: {} chunks ({}x{}) of {}x{}",
        config.chunk_count(),
        config.chunks_x,
        config.chunks_y,
        config.chunk_width,
        config.chunk_height
    );
    let mut world = GeneratedWorld {
        chunks: Vec::with_capacity(config.chunk_count()),
        plants: Vec::new(),
    };
    for coord in config.chunk_coords() {
        let chunk = generate_chunk(sampler, config, coord);
        world.plants.extend(chunk.plants);
        world.chunks.push((coord, chunk.mesh));
    }
    for species in Species::ALL {
        info!("Placed {} {} candidates", world.plants_of(species), species.name());
    }
    world
}
