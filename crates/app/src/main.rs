use bevy::prelude::*;
use bevy::render::settings::{RenderCreation, WgpuFeatures, WgpuSettings};
use bevy::render::RenderPlugin;
use bevy::window::PresentMode;

use worldgen::WorldConfig;

const SEED_VAR: &str = "MIRRORSCAPE_SEED";

/// Parse a seed override, ignoring surrounding whitespace.
fn parse_seed(value: Option<&str>) -> Option<u64> {
    value.and_then(|v| v.trim().parse().ok())
}

fn world_seed() -> u64 {
    let value = std::env::var(SEED_VAR).ok();
    match parse_seed(value.as_deref()) {
        Some(seed) => seed,
        None => {
            if value.is_some() {
                warn!("{SEED_VAR} is not a valid u64, using a random seed");
            }
            rand::random()
        }
    }
}

fn main() {
    let mut app = App::new();

    app.add_plugins(
        DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: "Mirrorscape".to_string(),
                    resolution: (1280.0, 720.0).into(),
                    present_mode: PresentMode::AutoVsync,
                    ..default()
                }),
                ..default()
            })
            .set(RenderPlugin {
                // Line polygon mode backs the wireframe display.
                render_creation: RenderCreation::Automatic(WgpuSettings {
                    features: WgpuFeatures::POLYGON_MODE_LINE,
                    ..default()
                }),
                ..default()
            }),
    );

    let seed = world_seed();
    info!("world seed {seed}");

    app.insert_resource(WorldConfig::default().with_seed(seed))
        .add_plugins((
            worldgen::WorldGenPlugin,
            rendering::RenderingPlugin,
            ui::UiPlugin,
        ));

    app.run();
}
