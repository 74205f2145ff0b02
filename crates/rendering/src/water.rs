use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use bevy::render::render_asset::RenderAssetUsages;

use worldgen::WorldConfig;

const WATER_COLOR: Color = Color::srgba(0.1, 0.3, 0.5, 0.7);
/// Pulls the water toward the camera so it wins against coplanar terrain.
const WATER_DEPTH_BIAS: f32 = 1.0;

#[derive(Component, Debug)]
pub struct WaterSurface;

/// One upward-facing quad over the whole grid at the water height.
pub fn water_quad(config: &WorldConfig) -> Mesh {
    let (min, max) = config.world_bounds();
    let h = config.water_surface_height;
    let positions = vec![
        [min.x, h, min.y],
        [max.x, h, min.y],
        [max.x, h, max.y],
        [min.x, h, max.y],
    ];
    let normals = vec![[0.0, 1.0, 0.0]; 4];
    let uvs = vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
    Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::RENDER_WORLD | RenderAssetUsages::MAIN_WORLD,
    )
    .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
    .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, normals)
    .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, uvs)
    .with_inserted_indices(Indices::U32(vec![0, 3, 2, 0, 2, 1]))
}

pub fn spawn_water(
    mut commands: Commands,
    config: Res<WorldConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.spawn((
        Mesh3d(meshes.add(water_quad(&config))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: WATER_COLOR,
            alpha_mode: AlphaMode::Blend,
            perceptual_roughness: 0.3,
            depth_bias: WATER_DEPTH_BIAS,
            ..default()
        })),
        Transform::IDENTITY,
        WaterSurface,
    ));
}
