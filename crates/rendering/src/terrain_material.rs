//! Shared terrain/vegetation material and its per-frame uniform.

use bevy::prelude::*;
use bevy::render::render_resource::{AsBindGroup, ShaderRef, ShaderType};

use worldgen::environment::EnvironmentParams;
use worldgen::runtime::DisplayMode;
use worldgen::WorldConfig;

use crate::camera::FlyCamera;

pub const TERRAIN_SHADER_PATH: &str = "shaders/terrain.wgsl";

/// Values read by the terrain shader. Field order mirrors the WGSL struct.
#[derive(Debug, Clone, Copy, PartialEq, ShaderType)]
pub struct TerrainUniform {
    pub fog_color: Vec3,
    pub fog_density: f32,
    pub ambient: Vec3,
    pub sun_intensity: f32,
    pub diffuse: Vec3,
    pub elapsed: f32,
    pub specular: Vec3,
    /// 1 for terrain (texture blend), 0 for vegetation (flat base color).
    pub is_terrain: u32,
    /// Direction the light travels, world space.
    pub light_direction: Vec3,
    /// 1 to shade with per-face normals.
    pub flat_shading: u32,
    pub base_color: Vec3,
    pub water_level: f32,
    pub view_position: Vec3,
    pub mesh_height: f32,
}

impl TerrainUniform {
    pub fn new(config: &WorldConfig, params: &EnvironmentParams) -> Self {
        let mut uniform = Self {
            fog_color: Vec3::ZERO,
            fog_density: 0.0,
            ambient: Vec3::ZERO,
            sun_intensity: 0.0,
            diffuse: Vec3::ZERO,
            elapsed: 0.0,
            specular: Vec3::ZERO,
            is_terrain: 1,
            light_direction: Vec3::NEG_Y,
            flat_shading: 0,
            base_color: Vec3::ONE,
            water_level: config.biome.water_level,
            view_position: Vec3::ZERO,
            mesh_height: config.mesh_height,
        };
        uniform.apply_environment(params);
        uniform
    }

    /// Uniform for one vegetation species: untextured, tinted by `base_color`.
    pub fn vegetation(config: &WorldConfig, params: &EnvironmentParams, base_color: Vec3) -> Self {
        Self {
            is_terrain: 0,
            base_color,
            ..Self::new(config, params)
        }
    }

    pub fn apply_environment(&mut self, params: &EnvironmentParams) {
        self.fog_color = params.fog_color;
        self.fog_density = params.fog_density;
        self.ambient = params.ambient;
        self.diffuse = params.diffuse;
        self.specular = params.specular;
        self.sun_intensity = params.sun_intensity;
        self.light_direction = params.light_direction.normalize_or(Vec3::NEG_Y);
    }

    pub fn apply_display(&mut self, mode: DisplayMode) {
        self.flat_shading = u32::from(mode == DisplayMode::Flat);
    }
}

/// Terrain material with the six biome textures at fixed slots.
#[derive(Asset, TypePath, AsBindGroup, Debug, Clone)]
pub struct TerrainMaterial {
    #[uniform(0)]
    pub uniform: TerrainUniform,

    #[texture(1)]
    #[sampler(2)]
    pub sand: Handle<Image>,

    #[texture(3)]
    #[sampler(4)]
    pub grass: Handle<Image>,

    #[texture(5)]
    #[sampler(6)]
    pub gravel: Handle<Image>,

    #[texture(7)]
    #[sampler(8)]
    pub moss: Handle<Image>,

    #[texture(9)]
    #[sampler(10)]
    pub rock: Handle<Image>,

    #[texture(11)]
    #[sampler(12)]
    pub snow: Handle<Image>,
}

impl TerrainMaterial {
    /// Build from textures in binding order: sand, grass, gravel, moss, rock, snow.
    pub fn new(uniform: TerrainUniform, textures: [Handle<Image>; 6]) -> Self {
        let [sand, grass, gravel, moss, rock, snow] = textures;
        Self {
            uniform,
            sand,
            grass,
            gravel,
            moss,
            rock,
            snow,
        }
    }
}

impl Material for TerrainMaterial {
    fn fragment_shader() -> ShaderRef {
        TERRAIN_SHADER_PATH.into()
    }
}

// =============================================================================
// Systems
// =============================================================================

/// Write camera position and elapsed time into every material, every frame.
pub fn sync_frame_uniforms(
    time: Res<Time>,
    camera: Query<&Transform, With<FlyCamera>>,
    mut materials: ResMut<Assets<TerrainMaterial>>,
) {
    let Ok(transform) = camera.get_single() else {
        return;
    };
    let elapsed = time.elapsed_secs();
    for (_, material) in materials.iter_mut() {
        material.uniform.view_position = transform.translation;
        material.uniform.elapsed = elapsed;
    }
}
