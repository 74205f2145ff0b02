use bevy::pbr::wireframe::{WireframeConfig, WireframePlugin};
use bevy::prelude::*;

use worldgen::AppState;

pub mod camera;
pub mod chunk_visibility;
pub mod day_night;
pub mod input;
pub mod terrain_assets;
pub mod terrain_chunks;
// `#[derive(ShaderType)]` emits per-field `check` fns that rustc reports as dead code.
#[allow(dead_code)]
pub mod terrain_material;
pub mod vegetation;
pub mod water;

use camera::CameraState;
use chunk_visibility::FramePlan;
use terrain_material::TerrainMaterial;
use vegetation::VegetationInstances;

pub struct RenderingPlugin;

impl Plugin for RenderingPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((MaterialPlugin::<TerrainMaterial>::default(), WireframePlugin))
            .insert_resource(WireframeConfig {
                global: false,
                default_color: Color::WHITE,
            })
            .init_resource::<CameraState>()
            .init_resource::<FramePlan>()
            .init_resource::<VegetationInstances>()
            .add_systems(
                Startup,
                (
                    terrain_assets::request_terrain_assets,
                    camera::setup_camera,
                    day_night::setup_lighting,
                ),
            )
            .add_systems(
                Update,
                terrain_assets::poll_terrain_assets.run_if(in_state(AppState::Loading)),
            )
            .add_systems(
                OnEnter(AppState::Running),
                (
                    terrain_assets::resolve_heightmap,
                    terrain_chunks::spawn_terrain_chunks,
                    vegetation::spawn_vegetation,
                    water::spawn_water,
                    log_initialization_complete,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (
                    input::handle_quit,
                    input::handle_environment_keys,
                    input::handle_map_toggle,
                    camera::camera_look,
                    camera::camera_move,
                    camera::apply_fly_camera,
                    day_night::apply_environment,
                    terrain_material::sync_frame_uniforms,
                    chunk_visibility::update_chunk_visibility,
                )
                    .chain()
                    .run_if(in_state(AppState::Running)),
            );
    }
}

fn log_initialization_complete(
    chunks: Query<(), With<terrain_chunks::TerrainChunk>>,
    groups: Query<(), With<vegetation::InstanceGroupEntity>>,
) {
    info!(
        "Initialization complete: {} chunks, {} instance groups",
        chunks.iter().count(),
        groups.iter().count()
    );
}
