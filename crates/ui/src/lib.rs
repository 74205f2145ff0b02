use bevy::prelude::*;
use bevy_egui::EguiPlugin;

use worldgen::AppState;

pub mod full_map;
pub mod map_projection;
pub mod map_texture;
pub mod minimap;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(EguiPlugin)
            .init_resource::<map_texture::MapTexture>()
            .add_systems(
                Update,
                (minimap::minimap_ui, full_map::full_map_ui)
                    .chain()
                    .run_if(in_state(AppState::Running)),
            );
    }
}
