//! Turns generated chunk data into mesh entities.

use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use bevy::render::render_asset::RenderAssetUsages;

use worldgen::chunk_mesh::ChunkMeshData;
use worldgen::heightmap::HeightSampler;
use worldgen::vegetation::Plant;
use worldgen::world::generate_world;
use worldgen::{ChunkCoord, RuntimeState, WorldConfig};

use crate::terrain_assets::{texture_or_default, TerrainAssets};
use crate::terrain_material::{TerrainMaterial, TerrainUniform};

#[derive(Component, Debug, Clone, Copy)]
pub struct TerrainChunk {
    pub coord: ChunkCoord,
}

/// The one material shared by every terrain chunk.
#[derive(Resource, Debug, Clone)]
pub struct TerrainMaterialHandle(pub Handle<TerrainMaterial>);

/// Vegetation candidates waiting for the instancer. Removed once consumed.
#[derive(Resource, Debug, Default)]
pub struct PendingPlants(pub Vec<Plant>);

pub fn build_chunk_mesh(data: ChunkMeshData) -> Mesh {
    Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::RENDER_WORLD | RenderAssetUsages::MAIN_WORLD,
    )
    .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, data.positions)
    .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, data.normals)
    .with_inserted_attribute(Mesh::ATTRIBUTE_COLOR, data.colors)
    .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, data.uvs)
    .with_inserted_indices(Indices::U32(data.indices))
}

/// Generate the whole grid and spawn one entity per chunk.
#[allow(clippy::too_many_arguments)]
pub fn spawn_terrain_chunks(
    mut commands: Commands,
    config: Res<WorldConfig>,
    sampler: Res<HeightSampler>,
    runtime: Res<RuntimeState>,
    assets: Res<TerrainAssets>,
    images: Res<Assets<Image>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<TerrainMaterial>>,
) {
    let world = generate_world(&sampler, &config);

    let textures = std::array::from_fn(|slot| texture_or_default(&assets, &images, slot));
    let mut uniform = TerrainUniform::new(&config, &runtime.environment.params());
    uniform.apply_display(runtime.display);
    let material = materials.add(TerrainMaterial::new(uniform, textures));
    commands.insert_resource(TerrainMaterialHandle(material.clone()));

    let count = world.chunk_count();
    for (coord, data) in world.chunks {
        let origin = config.chunk_origin(coord);
        commands.spawn((
            Mesh3d(meshes.add(build_chunk_mesh(data))),
            MeshMaterial3d(material.clone()),
            Transform::from_xyz(origin.x, 0.0, origin.y),
            TerrainChunk { coord },
        ));
    }
    commands.insert_resource(PendingPlants(world.plants));
    info!("Spawned {count} terrain chunks");
}
