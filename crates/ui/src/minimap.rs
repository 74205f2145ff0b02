//! Corner minimap.
//!
//! Shows the heightmap around the player, recentered every frame, with a
//! fixed arrow in the middle rotated to the camera's heading.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use rendering::camera::CameraState;
use worldgen::heightmap::HeightSampler;

use crate::map_projection::{arrow_direction, minimap_uv_rect, player_uv};
use crate::map_texture::MapTexture;

// =============================================================================
// Layout
// =============================================================================

/// Minimap edge length as a fraction of the smaller screen dimension.
const SIZE_FRACTION: f32 = 0.175;
/// Minimap center as a fraction of screen width and height, from the top left.
const CENTER_FRACTION: egui::Vec2 = egui::vec2(0.9, 0.125);
/// Arrow half-width and length as fractions of the minimap size.
const ARROW_HALF_WIDTH: f32 = 0.057;
const ARROW_LENGTH: f32 = 0.086;

const COLOR_ARROW: egui::Color32 = egui::Color32::from_rgb(255, 60, 40);
const COLOR_BORDER: egui::Color32 = egui::Color32::from_rgb(230, 230, 230);

pub fn to_egui(v: Vec2) -> egui::Vec2 {
    egui::vec2(v.x, v.y)
}

/// Triangle pointing along `dir` (screen space, Y down), centered on `center`.
/// `size` scales both the length and the width.
pub fn arrow_points(center: egui::Pos2, dir: egui::Vec2, size: f32) -> Vec<egui::Pos2> {
    let side = egui::vec2(-dir.y, dir.x);
    let tip = center + dir * size * ARROW_LENGTH;
    let back = center - dir * size * ARROW_LENGTH * 0.5;
    vec![
        tip,
        back + side * size * ARROW_HALF_WIDTH,
        back - side * size * ARROW_HALF_WIDTH,
    ]
}

// =============================================================================
// Systems
// =============================================================================

pub fn minimap_ui(
    mut contexts: EguiContexts,
    camera: Res<CameraState>,
    sampler: Res<HeightSampler>,
    mut map: ResMut<MapTexture>,
) {
    let ctx = contexts.ctx_mut();
    let texture_id = map.get_or_upload(ctx, &sampler);
    let screen = ctx.screen_rect();
    let size = screen.width().min(screen.height()) * SIZE_FRACTION;
    let center = screen.min + screen.size() * CENTER_FRACTION;
    let rect = egui::Rect::from_center_size(center, egui::vec2(size, size));

    let uv = player_uv(camera.position, map.size());
    let (uv_min, uv_max) = minimap_uv_rect(uv);
    let uv_rect = egui::Rect::from_min_max(
        egui::pos2(uv_min.x, uv_min.y),
        egui::pos2(uv_max.x, uv_max.y),
    );

    egui::Area::new(egui::Id::new("minimap"))
        .fixed_pos(rect.min)
        .order(egui::Order::Background)
        .interactable(false)
        .show(ctx, |ui| {
            let (response, painter) =
                ui.allocate_painter(egui::vec2(size, size), egui::Sense::hover());
            let rect = response.rect;
            painter.image(texture_id, rect, uv_rect, egui::Color32::WHITE);
            painter.rect_stroke(
                rect,
                0.0,
                egui::Stroke::new(1.5, COLOR_BORDER),
                egui::StrokeKind::Outside,
            );
            let dir = to_egui(arrow_direction(camera.yaw));
            painter.add(egui::Shape::convex_polygon(
                arrow_points(rect.center(), dir, size),
                COLOR_ARROW,
                egui::Stroke::NONE,
            ));
        });
}
