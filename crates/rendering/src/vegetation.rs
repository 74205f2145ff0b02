//! Vegetation mesh arena and per-chunk instance group entities.
//!
//! The arena owns exactly one base mesh per species. Instance group entities
//! only carry the species index and their chunk. Their children are the
//! individual instances at chunk-local offsets, all pointing at the arena's
//! mesh and the species material, so Bevy batches each group into a single
//! instanced draw.

use bevy::gltf::{Gltf, GltfMesh};
use bevy::prelude::*;

use worldgen::vegetation::{build_instance_groups, InstanceTable, Species};
use worldgen::{ChunkCoord, RuntimeState, WorldConfig};

use crate::terrain_assets::{vegetation_mesh, TerrainAssets};
use crate::terrain_chunks::PendingPlants;
use crate::terrain_material::{TerrainMaterial, TerrainUniform};

/// Base meshes indexed by [`Species::index`].
#[derive(Resource, Debug, Clone, Default)]
pub struct VegetationArena {
    pub meshes: [Handle<Mesh>; 2],
    /// Zero marks a species whose mesh failed to load.
    pub vertex_counts: [usize; 2],
}

impl VegetationArena {
    pub fn mesh(&self, species: Species) -> &Handle<Mesh> {
        &self.meshes[species.index()]
    }

    pub fn vertex_count(&self, species: Species) -> usize {
        self.vertex_counts[species.index()]
    }
}

/// One material per species, shared by all of its instances.
#[derive(Resource, Debug, Clone, Default)]
pub struct VegetationMaterials(pub [Handle<TerrainMaterial>; 2]);

/// Instance tables kept for culling and the frame plan.
#[derive(Resource, Debug, Clone, Default)]
pub struct VegetationInstances {
    pub tables: Vec<InstanceTable>,
}

#[derive(Component, Debug, Clone, Copy)]
pub struct InstanceGroupEntity {
    /// Index into the arena.
    pub species: usize,
    pub chunk: ChunkCoord,
}

#[derive(Component, Debug, Clone, Copy)]
pub struct PlantInstance;

/// Resolve base meshes, group the pending candidates and spawn the groups.
#[allow(clippy::too_many_arguments)]
pub fn spawn_vegetation(
    mut commands: Commands,
    config: Res<WorldConfig>,
    runtime: Res<RuntimeState>,
    assets: Res<TerrainAssets>,
    pending: Option<ResMut<PendingPlants>>,
    gltfs: Res<Assets<Gltf>>,
    gltf_meshes: Res<Assets<GltfMesh>>,
    meshes: Res<Assets<Mesh>>,
    mut materials: ResMut<Assets<TerrainMaterial>>,
) {
    let plants = pending.map(|mut p| std::mem::take(&mut p.0)).unwrap_or_default();
    commands.remove_resource::<PendingPlants>();

    let mut arena = VegetationArena::default();
    let mut species_materials = VegetationMaterials::default();
    let mut tables = Vec::with_capacity(Species::ALL.len());
    let params = runtime.environment.params();

    for species in Species::ALL {
        let slot = species.index();
        match vegetation_mesh(&assets, species, &gltfs, &gltf_meshes) {
            Some(handle) => {
                arena.vertex_counts[slot] = meshes.get(&handle).map_or(0, Mesh::count_vertices);
                arena.meshes[slot] = handle;
            }
            None => warn!(
                "Vegetation mesh {} failed to load, no {} will be drawn",
                species.model_path(),
                species.name()
            ),
        }

        let mut uniform = TerrainUniform::vegetation(&config, &params, species.base_color());
        uniform.apply_display(runtime.display);
        let material = materials.add(TerrainMaterial::new(uniform, Default::default()));
        species_materials.0[slot] = material.clone();

        let table = build_instance_groups(species, &plants, arena.vertex_counts[slot], &config);
        for group in table.groups() {
            let origin = config.chunk_origin(group.chunk);
            commands
                .spawn((
                    Transform::from_xyz(origin.x, 0.0, origin.y),
                    Visibility::default(),
                    InstanceGroupEntity {
                        species: slot,
                        chunk: group.chunk,
                    },
                ))
                .with_children(|parent| {
                    for offset in &group.offsets {
                        parent.spawn((
                            Mesh3d(arena.meshes[slot].clone()),
                            MeshMaterial3d(material.clone()),
                            Transform::from_translation(*offset)
                                .with_scale(Vec3::splat(config.plant_scale)),
                            PlantInstance,
                        ));
                    }
                });
        }
        tables.push(table);
    }

    commands.insert_resource(arena);
    commands.insert_resource(species_materials);
    commands.insert_resource(VegetationInstances { tables });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_arena_is_empty() {
        let arena = VegetationArena::default();
        for species in Species::ALL {
            assert_eq!(arena.vertex_count(species), 0);
            assert_eq!(*arena.mesh(species), Handle::default());
        }
    }
}
