use bevy::pbr::{DistanceFog, FogFalloff};
use bevy::prelude::*;

use worldgen::environment::EnvironmentParams;
use worldgen::RuntimeState;

use crate::camera::FlyCamera;
use crate::terrain_material::TerrainMaterial;

/// Directional light illuminance at `sun_intensity == 1`.
const SUN_ILLUMINANCE: f32 = 10_000.0;
/// Ambient brightness at an ambient color of 1.
const AMBIENT_BRIGHTNESS: f32 = 1_000.0;

/// Bevy light values derived from one environment phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneLighting {
    pub clear_color: Color,
    pub ambient_color: Color,
    pub ambient_brightness: f32,
    pub sun_color: Color,
    pub sun_illuminance: f32,
    pub sun_direction: Vec3,
    pub fog: Color,
    pub fog_density: f32,
}

fn to_color(v: Vec3) -> Color {
    Color::srgb(v.x, v.y, v.z)
}

pub fn scene_lighting(params: &EnvironmentParams) -> SceneLighting {
    SceneLighting {
        clear_color: to_color(params.fog_color),
        ambient_color: to_color(params.ambient),
        ambient_brightness: AMBIENT_BRIGHTNESS,
        sun_color: to_color(params.diffuse),
        sun_illuminance: SUN_ILLUMINANCE * params.sun_intensity,
        sun_direction: params.light_direction.normalize_or(Vec3::NEG_Y),
        fog: to_color(params.fog_color),
        fog_density: params.fog_density,
    }
}

pub fn setup_lighting(mut commands: Commands, runtime: Res<RuntimeState>) {
    let lighting = scene_lighting(&runtime.environment.params());
    commands.spawn((
        DirectionalLight {
            illuminance: lighting.sun_illuminance,
            color: lighting.sun_color,
            ..default()
        },
        Transform::default().looking_to(lighting.sun_direction, Vec3::Y),
    ));
    commands.insert_resource(ClearColor(lighting.clear_color));
    commands.insert_resource(AmbientLight {
        color: lighting.ambient_color,
        brightness: lighting.ambient_brightness,
    });
}

/// Push the current phase and display mode into lights, fog and materials.
///
/// Only runs when [`RuntimeState`] changed, so switches are instant and
/// cost nothing on other frames.
#[allow(clippy::too_many_arguments)]
pub fn apply_environment(
    mut commands: Commands,
    runtime: Res<RuntimeState>,
    mut clear: ResMut<ClearColor>,
    mut ambient: ResMut<AmbientLight>,
    mut suns: Query<(&mut DirectionalLight, &mut Transform)>,
    cameras: Query<Entity, With<FlyCamera>>,
    mut materials: ResMut<Assets<TerrainMaterial>>,
) {
    if !runtime.is_changed() {
        return;
    }
    let params = runtime.environment.params();
    let lighting = scene_lighting(&params);

    clear.0 = lighting.clear_color;
    ambient.color = lighting.ambient_color;
    ambient.brightness = lighting.ambient_brightness;
    for (mut sun, mut transform) in suns.iter_mut() {
        sun.illuminance = lighting.sun_illuminance;
        sun.color = lighting.sun_color;
        transform.look_to(lighting.sun_direction, Vec3::Y);
    }
    for entity in &cameras {
        commands.entity(entity).insert(DistanceFog {
            color: lighting.fog,
            falloff: FogFalloff::Exponential {
                density: lighting.fog_density,
            },
            ..default()
        });
    }
    for (_, material) in materials.iter_mut() {
        material.uniform.apply_environment(&params);
        material.uniform.apply_display(runtime.display);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use worldgen::environment::TimeOfDay;

    #[test]
    fn test_clear_color_matches_fog() {
        for phase in TimeOfDay::ALL {
            let lighting = scene_lighting(&phase.params());
            assert_eq!(lighting.clear_color, lighting.fog);
        }
    }

    #[test]
    fn test_sun_scales_with_intensity() {
        let day = scene_lighting(&TimeOfDay::Day.params());
        let night = scene_lighting(&TimeOfDay::Night.params());
        assert_eq!(day.sun_illuminance, SUN_ILLUMINANCE);
        assert!((night.sun_illuminance - SUN_ILLUMINANCE * 0.2).abs() < 1e-2);
    }

    #[test]
    fn test_sun_direction_is_normalized() {
        for phase in TimeOfDay::ALL {
            let lighting = scene_lighting(&phase.params());
            assert!((lighting.sun_direction.length() - 1.0).abs() < 1e-5);
        }
    }
}
