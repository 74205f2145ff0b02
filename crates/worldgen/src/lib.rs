use bevy::prelude::*;

pub mod app_state;
pub mod chunk_mesh;
pub mod config;
pub mod environment;
pub mod heightmap;
pub mod runtime;
pub mod vegetation;
pub mod world;

pub use app_state::AppState;
pub use config::{ChunkCoord, WorldConfig};
pub use runtime::RuntimeState;

/// Registers world configuration, runtime state and the app state machine.
///
/// A [`WorldConfig`] inserted before this plugin is kept; otherwise the
/// compiled-in defaults are used.
pub struct WorldGenPlugin;

impl Plugin for WorldGenPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WorldConfig>()
            .init_resource::<RuntimeState>()
            .init_resource::<heightmap::HeightSampler>()
            .init_state::<AppState>();
    }
}
