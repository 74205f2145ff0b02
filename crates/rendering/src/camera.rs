use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy::window::{CursorGrabMode, PrimaryWindow};

use worldgen::WorldConfig;

const SPAWN_HEIGHT: f32 = 60.0;
const START_YAW: f32 = -90.0;
const MOVE_SPEED: f32 = 2.5;
/// Frame delta multiplier applied to WASD movement.
const MOVE_DELTA_SCALE: f32 = 5.0;
const SPRINT_MULTIPLIER: f32 = 4.0;
const MOUSE_SENSITIVITY: f32 = 0.1;
const MAX_PITCH: f32 = 89.0;
const MIN_FOV: f32 = 1.0;
const MAX_FOV: f32 = 45.0;
const FAR_PLANE: f32 = 6000.0;

/// First-person fly camera. Angles are in degrees.
#[derive(Component, Debug, Clone, Copy)]
pub struct FlyCamera {
    pub yaw: f32,
    pub pitch: f32,
    pub fov: f32,
}

impl Default for FlyCamera {
    fn default() -> Self {
        Self {
            yaw: START_YAW,
            pitch: 0.0,
            fov: MAX_FOV,
        }
    }
}

impl FlyCamera {
    pub fn front(&self) -> Vec3 {
        front_from_angles(self.yaw, self.pitch)
    }
}

/// Read-only camera snapshot consumed by culling and the map overlays.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub position: Vec3,
    pub front: Vec3,
    /// Degrees; -90 looks down -Z.
    pub yaw: f32,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            front: front_from_angles(START_YAW, 0.0),
            yaw: START_YAW,
        }
    }
}

// =============================================================================
// Pure helpers
// =============================================================================

pub fn front_from_angles(yaw: f32, pitch: f32) -> Vec3 {
    let (yaw, pitch) = (yaw.to_radians(), pitch.to_radians());
    Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos()).normalize()
}

pub fn look(camera: &mut FlyCamera, delta: Vec2) {
    camera.yaw += delta.x * MOUSE_SENSITIVITY;
    camera.pitch = (camera.pitch - delta.y * MOUSE_SENSITIVITY).clamp(-MAX_PITCH, MAX_PITCH);
}

pub fn zoom(camera: &mut FlyCamera, scroll: f32) {
    camera.fov = (camera.fov - scroll).clamp(MIN_FOV, MAX_FOV);
}

// =============================================================================
// Systems
// =============================================================================

pub fn setup_camera(
    mut commands: Commands,
    config: Res<WorldConfig>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
) {
    let origin = config.origin();
    let position = Vec3::new(origin.x, SPAWN_HEIGHT, origin.y);
    let fly = FlyCamera::default();
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: fly.fov.to_radians(),
            far: FAR_PLANE,
            ..default()
        }),
        Transform::from_translation(position).looking_to(fly.front(), Vec3::Y),
        fly,
    ));
    commands.insert_resource(CameraState {
        position,
        front: fly.front(),
        yaw: fly.yaw,
    });

    if let Ok(mut window) = windows.get_single_mut() {
        window.cursor_options.grab_mode = CursorGrabMode::Locked;
        window.cursor_options.visible = false;
    }
}

/// Mouse motion rotates, scroll wheel zooms.
pub fn camera_look(
    mut motion: EventReader<MouseMotion>,
    mut scroll: EventReader<MouseWheel>,
    mut query: Query<&mut FlyCamera>,
) {
    let Ok(mut fly) = query.get_single_mut() else {
        return;
    };
    let delta: Vec2 = motion.read().map(|ev| ev.delta).sum();
    if delta != Vec2::ZERO {
        look(&mut fly, delta);
    }
    for ev in scroll.read() {
        let lines = match ev.unit {
            MouseScrollUnit::Line => ev.y,
            MouseScrollUnit::Pixel => ev.y / 40.0,
        };
        zoom(&mut fly, lines);
    }
}

/// WASD fly movement along the view direction.
pub fn camera_move(
    keys: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    mut query: Query<(&FlyCamera, &mut Transform)>,
) {
    let Ok((fly, mut transform)) = query.get_single_mut() else {
        return;
    };
    let front = fly.front();
    let right = front.cross(Vec3::Y).normalize_or_zero();
    let mut dir = Vec3::ZERO;
    if keys.pressed(KeyCode::KeyW) {
        dir += front;
    }
    if keys.pressed(KeyCode::KeyS) {
        dir -= front;
    }
    if keys.pressed(KeyCode::KeyA) {
        dir -= right;
    }
    if keys.pressed(KeyCode::KeyD) {
        dir += right;
    }
    if dir == Vec3::ZERO {
        return;
    }
    let mut speed = MOVE_SPEED * MOVE_DELTA_SCALE;
    if keys.pressed(KeyCode::ShiftLeft) {
        speed *= SPRINT_MULTIPLIER;
    }
    transform.translation += dir * speed * time.delta_secs();
}

/// Push yaw/pitch/fov into the transform and projection, then refresh [`CameraState`].
pub fn apply_fly_camera(
    mut query: Query<(&FlyCamera, &mut Transform, &mut Projection)>,
    mut state: ResMut<CameraState>,
) {
    let Ok((fly, mut transform, mut projection)) = query.get_single_mut() else {
        return;
    };
    let front = fly.front();
    transform.look_to(front, Vec3::Y);
    if let Projection::Perspective(ref mut persp) = *projection {
        let fov = fly.fov.to_radians();
        if persp.fov != fov {
            persp.fov = fov;
        }
    }
    *state = CameraState {
        position: transform.translation,
        front,
        yaw: fly.yaw,
    };
}
