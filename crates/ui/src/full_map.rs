//! Full-screen map overlay, toggled with `M`.
//!
//! Shows the whole heightmap once. The player marker is placed at the
//! folded UV, so it lands on the right pixel however many mirror periods
//! away from the origin the camera has flown. Like the minimap arrow, it is
//! rotated to the camera's heading.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use rendering::camera::CameraState;
use worldgen::heightmap::HeightSampler;
use worldgen::RuntimeState;

use crate::map_projection::{arrow_direction, full_map_marker_offset, player_uv};
use crate::map_texture::MapTexture;
use crate::minimap::{arrow_points, to_egui};

/// Map edge length as a fraction of the smaller screen dimension.
const SIZE_FRACTION: f32 = 0.75;
/// Marker arrow scale as a fraction of the smaller screen dimension.
const MARKER_SIZE_FRACTION: f32 = 0.25;

const COLOR_MARKER: egui::Color32 = egui::Color32::from_rgb(255, 60, 40);
const COLOR_BACKDROP: egui::Color32 = egui::Color32::from_rgba_premultiplied(0, 0, 0, 160);

/// Player arrow on a map of edge `size` centered at `center`, pointing along `yaw`.
fn marker_points(center: egui::Pos2, uv: Vec2, yaw: f32, size: f32, min_dim: f32) -> Vec<egui::Pos2> {
    arrow_points(
        center + to_egui(full_map_marker_offset(uv, size)),
        to_egui(arrow_direction(yaw)),
        min_dim * MARKER_SIZE_FRACTION,
    )
}

pub fn full_map_ui(
    mut contexts: EguiContexts,
    runtime: Res<RuntimeState>,
    camera: Res<CameraState>,
    sampler: Res<HeightSampler>,
    mut map: ResMut<MapTexture>,
) {
    if !runtime.full_map.visible {
        return;
    }
    let ctx = contexts.ctx_mut();
    let texture_id = map.get_or_upload(ctx, &sampler);
    let screen = ctx.screen_rect();
    let min_dim = screen.width().min(screen.height());
    let size = min_dim * SIZE_FRACTION;
    let rect = egui::Rect::from_center_size(screen.center(), egui::vec2(size, size));

    let uv = player_uv(camera.position, map.size());
    let marker = marker_points(rect.center(), uv, camera.yaw, size, min_dim);

    egui::Area::new(egui::Id::new("full_map"))
        .fixed_pos(screen.min)
        .order(egui::Order::Foreground)
        .interactable(false)
        .show(ctx, |ui| {
            let painter = ui.painter();
            painter.rect_filled(screen, 0.0, COLOR_BACKDROP);
            painter.image(
                texture_id,
                rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );
            painter.add(egui::Shape::convex_polygon(
                marker,
                COLOR_MARKER,
                egui::Stroke::NONE,
            ));
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn centroid(points: &[egui::Pos2]) -> egui::Pos2 {
        let sum = points.iter().fold(egui::Vec2::ZERO, |acc, p| acc + p.to_vec2());
        (sum / points.len() as f32).to_pos2()
    }

    #[test]
    fn test_marker_sits_on_folded_position() {
        let center = egui::pos2(500.0, 400.0);
        // 2.3 and 1.7 both fold to 0.3, i.e. 0.2 of the map left/up of center.
        let a = marker_points(center, Vec2::new(2.3, 1.7), -90.0, 600.0, 800.0);
        let b = marker_points(center, Vec2::new(0.3, 0.3), -90.0, 600.0, 800.0);
        for (p, q) in a.iter().zip(&b) {
            assert!((*p - *q).length() < 1e-2);
        }
        let c = centroid(&a);
        assert!(c.x < center.x - 100.0);
        assert!(c.y < center.y - 100.0);
    }

    #[test]
    fn test_marker_turns_with_yaw() {
        let center = egui::pos2(0.0, 0.0);
        let uv = Vec2::splat(0.5);
        let north = marker_points(center, uv, -90.0, 600.0, 800.0);
        let east = marker_points(center, uv, 0.0, 600.0, 800.0);
        assert!(north[0].y < 0.0 && north[0].x.abs() < 1e-3);
        assert!(east[0].x > 0.0 && east[0].y.abs() < 1e-3);
    }
}
