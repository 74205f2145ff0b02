//! Camera-to-map projection shared by the minimap and the full map.
//!
//! The terrain tiles the heightmap by mirrored repetition, so a player far
//! from the origin may be many mirror periods away from the canonical image.
//! The full map folds the player's UV back into `[0, 1]` with the same rule
//! the sampler uses. The minimap does not fold: it recenters on the raw UV
//! and relies on the map texture's mirrored-repeat sampler instead.

use bevy::prelude::*;

use worldgen::heightmap::mirrored_unit;

/// Half-width of the minimap's UV window around the player.
pub const MINIMAP_UV_SPAN: f32 = 0.25;

/// Unfolded heightmap UV under a world position: world x/z over image size.
pub fn player_uv(position: Vec3, map_size: UVec2) -> Vec2 {
    Vec2::new(
        position.x / map_size.x.max(1) as f32,
        position.z / map_size.y.max(1) as f32,
    )
}

/// Fold both components into `[0, 1]` by mirrored doubling.
pub fn fold_uv(uv: Vec2) -> Vec2 {
    Vec2::new(mirrored_unit(uv.x), mirrored_unit(uv.y))
}

/// Offset of the player marker from the full map's center, in screen units.
pub fn full_map_marker_offset(uv: Vec2, map_extent: f32) -> Vec2 {
    (fold_uv(uv) - Vec2::splat(0.5)) * map_extent
}

/// UV rectangle sampled by the minimap, centered on the player.
pub fn minimap_uv_rect(uv: Vec2) -> (Vec2, Vec2) {
    (uv - Vec2::splat(MINIMAP_UV_SPAN), uv + Vec2::splat(MINIMAP_UV_SPAN))
}

/// Arrow rotation in degrees, counter-clockwise with screen Y pointing up.
pub fn arrow_rotation(yaw: f32) -> f32 {
    -yaw - 90.0
}

/// Unit direction of the minimap arrow with screen Y pointing down.
pub fn arrow_direction(yaw: f32) -> Vec2 {
    let theta = arrow_rotation(yaw).to_radians();
    // Up vector rotated CCW in Y-up space, then Y flipped.
    Vec2::new(-theta.sin(), -theta.cos())
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: u32 = 512;

    fn near(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn test_fold_examples() {
        assert!(near(fold_uv(Vec2::new(2.3, 0.5)), Vec2::new(0.3, 0.5)));
        assert!(near(fold_uv(Vec2::new(1.7, 0.5)), Vec2::new(0.3, 0.5)));
    }

    #[test]
    fn test_player_uv_folds_like_the_map() {
        let map = UVec2::splat(W);
        let at = |x: f32| fold_uv(player_uv(Vec3::new(x * W as f32, 60.0, 0.0), map));
        assert!((at(2.3).x - 0.3).abs() < 1e-4);
        assert!((at(1.7).x - 0.3).abs() < 1e-4);
        assert!(at(2.3).y.abs() < 1e-6);
    }

    #[test]
    fn test_player_uv_uses_each_axis_size() {
        let uv = player_uv(Vec3::new(256.0, 60.0, 300.0), UVec2::new(512, 600));
        assert!(near(uv, Vec2::new(0.5, 0.5)));
    }

    #[test]
    fn test_marker_centered_at_half() {
        assert!(near(full_map_marker_offset(Vec2::splat(0.5), 400.0), Vec2::ZERO));
        let off = full_map_marker_offset(Vec2::new(2.3, 1.7), 400.0);
        assert!(near(off, Vec2::new(-80.0, -80.0)));
    }

    #[test]
    fn test_marker_stays_inside_map() {
        for i in -40..40 {
            let uv = Vec2::new(i as f32 * 0.37, i as f32 * -0.53);
            let off = full_map_marker_offset(uv, 300.0);
            assert!(off.x.abs() <= 150.0 + 1e-3);
            assert!(off.y.abs() <= 150.0 + 1e-3);
        }
    }

    #[test]
    fn test_minimap_window_is_unfolded() {
        let (min, max) = minimap_uv_rect(Vec2::new(3.1, -0.2));
        assert!(near(min, Vec2::new(2.85, -0.45)));
        assert!(near(max, Vec2::new(3.35, 0.05)));
    }

    #[test]
    fn test_arrow_points_along_view() {
        // Yaw -90 looks down -Z, which is up on the map.
        assert!(near(arrow_direction(-90.0), Vec2::new(0.0, -1.0)));
        // Yaw 0 looks down +X, which is right on the map.
        assert!(near(arrow_direction(0.0), Vec2::new(1.0, 0.0)));
        assert!(near(arrow_direction(90.0), Vec2::new(0.0, 1.0)));
        assert_eq!(arrow_rotation(-90.0), 0.0);
    }
}
