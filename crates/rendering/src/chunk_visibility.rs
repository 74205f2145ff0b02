//! Range and direction culling of chunks, and the per-frame draw plan.
//!
//! A chunk is drawn when it is within the render radius (Chebyshev distance
//! in grid space from the camera's chunk) and it passes a cheap directional
//! test: not too far in the plane, and not too far behind the camera.

use bevy::prelude::*;

use worldgen::vegetation::{InstanceTable, Species};
use worldgen::{ChunkCoord, WorldConfig};

use crate::camera::CameraState;
use crate::terrain_chunks::TerrainChunk;
use crate::vegetation::{InstanceGroupEntity, VegetationInstances};

/// Bounding radius of a chunk, as a fraction of its width.
const CHUNK_RADIUS_FACTOR: f32 = 0.8;
/// Slack applied to both the distance and the behind-camera threshold.
const CULL_SLACK: f32 = 1.5;

// =============================================================================
// Pure helpers
// =============================================================================

/// Grid coordinates of the chunk under the camera, truncated toward zero.
///
/// May fall outside the grid when the camera leaves the world.
pub fn camera_chunk(position: Vec3, config: &WorldConfig) -> IVec2 {
    let origin = config.origin();
    let x = ((position.x - origin.x) / config.chunk_width as f32) as i32 + config.chunks_x as i32 / 2;
    let y = ((position.z - origin.y) / config.chunk_height as f32) as i32 + config.chunks_y as i32 / 2;
    IVec2::new(x, y)
}

/// Chebyshev distance test in grid space.
pub fn in_render_range(coord: ChunkCoord, camera_chunk: IVec2, render_distance: usize) -> bool {
    let dx = (coord.x as i64 - camera_chunk.x as i64).abs();
    let dy = (coord.y as i64 - camera_chunk.y as i64).abs();
    dx.max(dy) <= render_distance as i64
}

/// Directional heuristic. Peripheral chunks near the view edge still pass.
pub fn is_chunk_visible(coord: ChunkCoord, camera: &CameraState, config: &WorldConfig) -> bool {
    let center = config.chunk_center(coord);
    let center = Vec3::new(center.x, 0.0, center.y);
    let width = config.chunk_width as f32;
    let radius = width * CHUNK_RADIUS_FACTOR;

    let planar = Vec2::new(center.x - camera.position.x, center.z - camera.position.z);
    let max_distance = config.render_distance as f32 * width * CULL_SLACK;
    if planar.length() > max_distance {
        return false;
    }
    // Center sits at ground level; the camera keeps its height.
    camera.front.dot(center - camera.position) >= -radius * CULL_SLACK
}

pub fn should_draw_chunk(coord: ChunkCoord, camera: &CameraState, config: &WorldConfig) -> bool {
    in_render_range(coord, camera_chunk(camera.position, config), config.render_distance)
        && is_chunk_visible(coord, camera, config)
}

// =============================================================================
// Frame plan
// =============================================================================

/// One step of a frame, in submission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawCall {
    Terrain(ChunkCoord),
    Instanced {
        chunk: ChunkCoord,
        species: Species,
        instances: usize,
    },
    /// Neutral per-instance scale restored after a chunk's vegetation.
    RestorePlantScale,
    /// Blended, depth-biased water; always last.
    Water,
}

/// Ordered draw list for one frame.
///
/// Pass 1 visits every surviving chunk: terrain, then trees, then flowers,
/// then the scale reset. Pass 2 is the single water draw.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct FramePlan {
    pub calls: Vec<DrawCall>,
}

impl FramePlan {
    pub fn build(camera: &CameraState, config: &WorldConfig, tables: &[InstanceTable]) -> Self {
        let mut calls = Vec::new();
        for coord in config.chunk_coords() {
            if !should_draw_chunk(coord, camera, config) {
                continue;
            }
            calls.push(DrawCall::Terrain(coord));
            for species in Species::ALL {
                let group = tables
                    .iter()
                    .find(|t| t.species == species)
                    .and_then(|t| t.get(config, coord));
                if let Some(group) = group {
                    calls.push(DrawCall::Instanced {
                        chunk: coord,
                        species,
                        instances: group.instance_count(),
                    });
                }
            }
            calls.push(DrawCall::RestorePlantScale);
        }
        calls.push(DrawCall::Water);
        Self { calls }
    }

    pub fn terrain_chunks(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.calls.iter().filter_map(|c| match c {
            DrawCall::Terrain(coord) => Some(*coord),
            _ => None,
        })
    }

    /// Chunk and species of every instanced draw in the plan.
    pub fn instance_groups(&self) -> impl Iterator<Item = (ChunkCoord, Species)> + '_ {
        self.calls.iter().filter_map(|c| match c {
            DrawCall::Instanced { chunk, species, .. } => Some((*chunk, *species)),
            _ => None,
        })
    }
}

// =============================================================================
// Systems
// =============================================================================

fn visibility_for(visible: bool) -> Visibility {
    if visible {
        Visibility::Inherited
    } else {
        Visibility::Hidden
    }
}

/// Rebuild the frame plan and hide every chunk and instance group it skips.
///
/// Terrain entities follow the plan's `Terrain` draws and instance group
/// entities follow its `Instanced` draws. `RestorePlantScale` and `Water`
/// have no entity to toggle: plant scale lives in each instance's
/// `Transform`, and the water is always drawn. Bevy's renderer orders the
/// surviving draws itself: opaque terrain and vegetation in the main pass,
/// water in the transparent pass.
pub fn update_chunk_visibility(
    camera: Res<CameraState>,
    config: Res<WorldConfig>,
    instances: Res<VegetationInstances>,
    mut plan: ResMut<FramePlan>,
    mut chunks: Query<(&TerrainChunk, &mut Visibility), Without<InstanceGroupEntity>>,
    mut groups: Query<(&InstanceGroupEntity, &mut Visibility), Without<TerrainChunk>>,
) {
    *plan = FramePlan::build(&camera, &config, &instances.tables);
    let mut terrain = vec![false; config.chunk_count()];
    for coord in plan.terrain_chunks() {
        terrain[config.chunk_index(coord)] = true;
    }
    let mut instanced = vec![[false; 2]; config.chunk_count()];
    for (coord, species) in plan.instance_groups() {
        instanced[config.chunk_index(coord)][species.index()] = true;
    }

    for (chunk, mut vis) in chunks.iter_mut() {
        let drawn = terrain.get(config.chunk_index(chunk.coord)).copied().unwrap_or(false);
        vis.set_if_neq(visibility_for(drawn));
    }
    for (group, mut vis) in groups.iter_mut() {
        let drawn = instanced
            .get(config.chunk_index(group.chunk))
            .and_then(|slots| slots.get(group.species))
            .copied()
            .unwrap_or(false);
        vis.set_if_neq(visibility_for(drawn));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use worldgen::vegetation::{build_instance_groups, Plant};

    fn camera_at(config: &WorldConfig, coord: ChunkCoord, front: Vec3) -> CameraState {
        let c = config.chunk_center(coord);
        CameraState {
            position: Vec3::new(c.x, 60.0, c.y),
            front,
            yaw: -90.0,
        }
    }

    #[test]
    fn test_camera_at_origin_is_in_middle_chunk() {
        let config = WorldConfig::default();
        let o = config.origin();
        let chunk = camera_chunk(Vec3::new(o.x, 60.0, o.y), &config);
        assert_eq!(chunk, IVec2::new(10, 10));
    }

    #[test]
    fn test_chebyshev_range() {
        let cam = IVec2::new(10, 10);
        assert!(in_render_range(ChunkCoord::new(18, 2), cam, 8));
        assert!(!in_render_range(ChunkCoord::new(19, 10), cam, 8));
        assert!(!in_render_range(ChunkCoord::new(10, 1), cam, 8));
    }

    #[test]
    fn test_range_accepts_camera_outside_grid() {
        assert!(in_render_range(ChunkCoord::new(0, 0), IVec2::new(-3, -5), 8));
        assert!(!in_render_range(ChunkCoord::new(0, 0), IVec2::new(-9, 0), 8));
    }

    #[test]
    fn test_chunk_under_camera_is_visible_any_direction() {
        let config = WorldConfig::default();
        let coord = ChunkCoord::new(5, 5);
        for front in [Vec3::X, Vec3::NEG_X, Vec3::Z, Vec3::NEG_Z] {
            let cam = camera_at(&config, coord, front);
            assert!(is_chunk_visible(coord, &cam, &config));
        }
    }

    #[test]
    fn test_far_behind_chunk_is_culled() {
        let config = WorldConfig::default();
        let cam = camera_at(&config, ChunkCoord::new(10, 10), Vec3::NEG_Z);
        assert!(is_chunk_visible(ChunkCoord::new(10, 7), &cam, &config));
        assert!(!is_chunk_visible(ChunkCoord::new(10, 13), &cam, &config));
        // One chunk behind stays within the slack.
        assert!(is_chunk_visible(ChunkCoord::new(10, 11), &cam, &config));
    }

    #[test]
    fn test_downward_camera_keeps_chunk_just_behind() {
        let config = WorldConfig::default();
        let front = Vec3::new(0.0, -1.0, -1.0).normalize();
        let cam = camera_at(&config, ChunkCoord::new(10, 10), front);
        // Two chunks behind: the camera height pulls the dot product back
        // inside the slack.
        assert!(is_chunk_visible(ChunkCoord::new(10, 12), &cam, &config));
        assert!(!is_chunk_visible(ChunkCoord::new(10, 14), &cam, &config));
    }

    #[test]
    fn test_far_chunk_is_culled_by_distance() {
        let config = WorldConfig {
            render_distance: 2,
            ..Default::default()
        };
        let cam = camera_at(&config, ChunkCoord::new(0, 0), Vec3::X);
        assert!(is_chunk_visible(ChunkCoord::new(2, 0), &cam, &config));
        assert!(!is_chunk_visible(ChunkCoord::new(4, 0), &cam, &config));
    }

    #[test]
    fn test_frame_plan_order() {
        let config = WorldConfig {
            chunks_x: 3,
            chunks_y: 3,
            ..Default::default()
        };
        let plant = |species, x, y| Plant {
            species,
            position: Vec3::new(1.0, 20.0, 1.0),
            chunk: ChunkCoord::new(x, y),
        };
        let plants = vec![
            plant(Species::Flower, 1, 1),
            plant(Species::Tree, 1, 1),
            plant(Species::Tree, 1, 1),
        ];
        let tables = [
            build_instance_groups(Species::Tree, &plants, 10, &config),
            build_instance_groups(Species::Flower, &plants, 10, &config),
        ];
        let cam = camera_at(&config, ChunkCoord::new(1, 1), Vec3::NEG_Z);
        let plan = FramePlan::build(&cam, &config, &tables);

        assert_eq!(plan.calls.last(), Some(&DrawCall::Water));
        assert_eq!(plan.calls.iter().filter(|c| **c == DrawCall::Water).count(), 1);

        let at = plan
            .calls
            .iter()
            .position(|c| *c == DrawCall::Terrain(ChunkCoord::new(1, 1)))
            .unwrap();
        assert_eq!(
            plan.calls[at + 1],
            DrawCall::Instanced {
                chunk: ChunkCoord::new(1, 1),
                species: Species::Tree,
                instances: 2
            }
        );
        assert_eq!(
            plan.calls[at + 2],
            DrawCall::Instanced {
                chunk: ChunkCoord::new(1, 1),
                species: Species::Flower,
                instances: 1
            }
        );
        assert_eq!(plan.calls[at + 3], DrawCall::RestorePlantScale);
    }

    #[test]
    fn test_group_visibility_follows_instanced_draws() {
        let config = WorldConfig {
            chunks_x: 3,
            chunks_y: 3,
            ..Default::default()
        };
        let plants = vec![Plant {
            species: Species::Tree,
            position: Vec3::new(1.0, 20.0, 1.0),
            chunk: ChunkCoord::new(1, 1),
        }];
        let tables = vec![
            build_instance_groups(Species::Tree, &plants, 10, &config),
            build_instance_groups(Species::Flower, &plants, 10, &config),
        ];

        let mut app = App::new();
        app.insert_resource(camera_at(&config, ChunkCoord::new(1, 1), Vec3::NEG_Z))
            .insert_resource(config)
            .insert_resource(VegetationInstances { tables })
            .init_resource::<FramePlan>()
            .add_systems(Update, update_chunk_visibility);

        let coord = ChunkCoord::new(1, 1);
        let chunk = app
            .world_mut()
            .spawn((TerrainChunk { coord }, Visibility::Hidden))
            .id();
        let trees = app
            .world_mut()
            .spawn((
                InstanceGroupEntity {
                    species: Species::Tree.index(),
                    chunk: coord,
                },
                Visibility::Hidden,
            ))
            .id();
        let flowers = app
            .world_mut()
            .spawn((
                InstanceGroupEntity {
                    species: Species::Flower.index(),
                    chunk: coord,
                },
                Visibility::Inherited,
            ))
            .id();
        app.update();

        let world = app.world();
        assert_eq!(world.get::<Visibility>(chunk), Some(&Visibility::Inherited));
        assert_eq!(world.get::<Visibility>(trees), Some(&Visibility::Inherited));
        assert_eq!(world.get::<Visibility>(flowers), Some(&Visibility::Hidden));
        assert_eq!(
            world.resource::<FramePlan>().instance_groups().collect::<Vec<_>>(),
            vec![(coord, Species::Tree)]
        );
    }

    #[test]
    fn test_frame_plan_skips_absent_groups() {
        let config = WorldConfig {
            chunks_x: 2,
            chunks_y: 1,
            ..Default::default()
        };
        let tables = [
            InstanceTable::empty(Species::Tree, &config),
            InstanceTable::empty(Species::Flower, &config),
        ];
        let cam = camera_at(&config, ChunkCoord::new(0, 0), Vec3::X);
        let plan = FramePlan::build(&cam, &config, &tables);
        assert!(!plan
            .calls
            .iter()
            .any(|c| matches!(c, DrawCall::Instanced { .. })));
        assert_eq!(plan.terrain_chunks().count(), 2);
    }
}
