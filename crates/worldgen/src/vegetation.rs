//! Vegetation candidates and their per-chunk instance groups.
//!
//! Chunk generation emits [`Plant`] candidates. [`build_instance_groups`]
//! partitions them by chunk for one species. Each non-empty chunk becomes an
//! [`InstanceGroup`] of local offsets that all share one base mesh for that
//! species. A chunk with no plants of a species has no group at all.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{ChunkCoord, WorldConfig};

/// Fixed set of vegetation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Species {
    Tree,
    Flower,
}

impl Species {
    pub const ALL: [Species; 2] = [Species::Tree, Species::Flower];

    /// Slot of this species in per-species arrays.
    pub fn index(self) -> usize {
        match self {
            Species::Tree => 0,
            Species::Flower => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Species::Tree => "tree",
            Species::Flower => "flower",
        }
    }

    /// Flat shading color used when drawing this species.
    pub fn base_color(self) -> Vec3 {
        match self {
            Species::Tree => Vec3::new(0.1, 0.35, 0.1),
            Species::Flower => Vec3::new(0.9, 0.2, 0.2),
        }
    }

    /// Asset path of the base mesh, relative to the asset root.
    pub fn model_path(self) -> &'static str {
        match self {
            Species::Tree => "models/vegetation/common_tree.glb",
            Species::Flower => "models/vegetation/flowers.glb",
        }
    }
}

/// A vegetation candidate produced during chunk generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plant {
    pub species: Species,
    /// Position relative to the owning chunk's origin; `y` is the terrain height.
    pub position: Vec3,
    pub chunk: ChunkCoord,
}

/// Instances of one species within one chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceGroup {
    pub chunk: ChunkCoord,
    pub species: Species,
    pub offsets: Vec<Vec3>,
}

impl InstanceGroup {
    pub fn instance_count(&self) -> usize {
        self.offsets.len()
    }
}

/// Per-chunk groups for one species, indexed by [`WorldConfig::chunk_index`].
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceTable {
    pub species: Species,
    groups: Vec<Option<InstanceGroup>>,
}

impl InstanceTable {
    /// Table with no groups, used when the species cannot be drawn.
    pub fn empty(species: Species, config: &WorldConfig) -> Self {
        Self {
            species,
            groups: vec![None; config.chunk_count()],
        }
    }

    pub fn get(&self, config: &WorldConfig, coord: ChunkCoord) -> Option<&InstanceGroup> {
        self.groups.get(config.chunk_index(coord)).and_then(Option::as_ref)
    }

    pub fn groups(&self) -> impl Iterator<Item = &InstanceGroup> {
        self.groups.iter().flatten()
    }

    pub fn group_count(&self) -> usize {
        self.groups().count()
    }

    pub fn total_instances(&self) -> usize {
        self.groups().map(InstanceGroup::instance_count).sum()
    }
}

/// Partition the candidates of one species into per-chunk groups.
///
/// `base_vertex_count` is the vertex count of the species' base mesh. Zero
/// means the mesh failed to load, and then no group is built for any chunk.
pub fn build_instance_groups(
    species: Species,
    plants: &[Plant],
    base_vertex_count: usize,
    config: &WorldConfig,
) -> InstanceTable {
    let mut table = InstanceTable::empty(species, config);
    if base_vertex_count == 0 {
        warn!(
            "Vegetation: base mesh for {} has no vertices, skipping all {} chunks",
            species.name(),
            config.chunk_count()
        );
        return table;
    }

    let mut total = 0usize;
    for plant in plants.iter().filter(|p| p.species == species) {
        if !config.contains(plant.chunk) {
            warn!(
                "Vegetation: {} at {:?} references chunk {:?} outside the grid",
                species.name(),
                plant.position,
                plant.chunk
            );
            continue;
        }
        let idx = config.chunk_index(plant.chunk);
        table.groups[idx]
            .get_or_insert_with(|| InstanceGroup {
                chunk: plant.chunk,
                species,
                offsets: Vec::new(),
            })
            .offsets
            .push(plant.position);
        total += 1;
    }
    info!(
        "Vegetation: {} total generated {} in {} chunks",
        species.name(),
        total,
        table.group_count()
    );
    table
}
