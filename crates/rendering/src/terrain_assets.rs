//! Startup asset requests and the loading gate.
//!
//! Every file is requested once on startup. [`poll_terrain_assets`] moves the
//! app to [`AppState::Running`] as soon as each request has either loaded or
//! failed. Failures never block startup; they are resolved to fallbacks by
//! [`resolve_heightmap`] and the consumers of [`TerrainAssets`].

use bevy::asset::{LoadState, UntypedAssetId};
use bevy::gltf::{Gltf, GltfMesh};
use bevy::image::{ImageAddressMode, ImageLoaderSettings, ImageSampler, ImageSamplerDescriptor};
use bevy::prelude::*;

use worldgen::heightmap::{HeightSampler, Heightmap};
use worldgen::vegetation::Species;
use worldgen::AppState;

pub const HEIGHTMAP_PATH: &str = "textures/heightmap.png";

/// Biome textures in binding order.
pub const TERRAIN_TEXTURE_PATHS: [&str; 6] = [
    "textures/terrain/sand.png",
    "textures/terrain/grass.png",
    "textures/terrain/gravel.png",
    "textures/terrain/moss.png",
    "textures/terrain/rock.png",
    "textures/terrain/snow.png",
];

/// Handles for every file the world needs before generation.
#[derive(Resource, Debug, Clone, Default)]
pub struct TerrainAssets {
    pub heightmap: Handle<Image>,
    pub textures: [Handle<Image>; 6],
    /// Root glTF documents, indexed by [`Species::index`].
    pub vegetation: [Handle<Gltf>; 2],
}

impl TerrainAssets {
    fn untyped_ids(&self) -> Vec<(UntypedAssetId, &'static str)> {
        let mut ids = vec![(self.heightmap.id().untyped(), HEIGHTMAP_PATH)];
        for (handle, path) in self.textures.iter().zip(TERRAIN_TEXTURE_PATHS) {
            ids.push((handle.id().untyped(), path));
        }
        for species in Species::ALL {
            ids.push((
                self.vegetation[species.index()].id().untyped(),
                species.model_path(),
            ));
        }
        ids
    }
}

/// Whether a load request has reached a final state.
pub fn is_settled(state: &LoadState) -> bool {
    matches!(state, LoadState::Loaded | LoadState::Failed(_))
}

fn repeating_sampler(settings: &mut ImageLoaderSettings) {
    settings.sampler = ImageSampler::Descriptor(ImageSamplerDescriptor {
        address_mode_u: ImageAddressMode::Repeat,
        address_mode_v: ImageAddressMode::Repeat,
        ..ImageSamplerDescriptor::linear()
    });
}

pub fn request_terrain_assets(mut commands: Commands, asset_server: Res<AssetServer>) {
    let textures = TERRAIN_TEXTURE_PATHS
        .map(|path| asset_server.load_with_settings(path, repeating_sampler));
    let vegetation = Species::ALL.map(|species| asset_server.load(species.model_path()));
    commands.insert_resource(TerrainAssets {
        heightmap: asset_server.load_with_settings(
            HEIGHTMAP_PATH,
            |settings: &mut ImageLoaderSettings| settings.is_srgb = false,
        ),
        textures,
        vegetation,
    });
}

/// Leave [`AppState::Loading`] once nothing is still in flight.
pub fn poll_terrain_assets(
    assets: Res<TerrainAssets>,
    asset_server: Res<AssetServer>,
    mut next: ResMut<NextState<AppState>>,
) {
    let mut pending = 0;
    for (id, path) in assets.untyped_ids() {
        let state = asset_server.load_state(id);
        if !is_settled(&state) {
            pending += 1;
        } else if let LoadState::Failed(err) = state {
            // Logged every poll until the rest settle; the set is tiny.
            debug!("Asset {path} failed: {err}");
        }
    }
    if pending == 0 {
        info!("All terrain assets settled");
        next.set(AppState::Running);
    }
}

/// Decode the heightmap into the sampler, or fall back to flat terrain.
pub fn resolve_heightmap(
    assets: Res<TerrainAssets>,
    images: Res<Assets<Image>>,
    mut sampler: ResMut<HeightSampler>,
) {
    let Some(image) = images.get(&assets.heightmap) else {
        error!("Heightmap {HEIGHTMAP_PATH} failed to load, using flat terrain");
        *sampler = HeightSampler::flat();
        return;
    };
    match Heightmap::from_image(image) {
        Ok(map) => {
            info!("Heightmap loaded: {}x{}", map.width(), map.height());
            *sampler = HeightSampler::new(map);
        }
        Err(err) => {
            error!("Heightmap {HEIGHTMAP_PATH} unusable ({err}), using flat terrain");
            *sampler = HeightSampler::flat();
        }
    }
}

/// Texture handle for a biome slot, or Bevy's default image if it failed.
pub fn texture_or_default(
    assets: &TerrainAssets,
    images: &Assets<Image>,
    slot: usize,
) -> Handle<Image> {
    let handle = &assets.textures[slot];
    if images.contains(handle) {
        handle.clone()
    } else {
        warn!(
            "Terrain texture {} failed to load, using default image",
            TERRAIN_TEXTURE_PATHS[slot]
        );
        Handle::default()
    }
}

/// First primitive of the first mesh in a species' glTF document.
pub fn vegetation_mesh(
    assets: &TerrainAssets,
    species: Species,
    gltfs: &Assets<Gltf>,
    gltf_meshes: &Assets<GltfMesh>,
) -> Option<Handle<Mesh>> {
    let gltf = gltfs.get(&assets.vegetation[species.index()])?;
    let mesh = gltf_meshes.get(gltf.meshes.first()?)?;
    Some(mesh.primitives.first()?.mesh.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settled_states() {
        assert!(is_settled(&LoadState::Loaded));
        assert!(!is_settled(&LoadState::Loading));
        assert!(!is_settled(&LoadState::NotLoaded));
    }

    #[test]
    fn test_texture_paths_are_distinct() {
        for (i, a) in TERRAIN_TEXTURE_PATHS.iter().enumerate() {
            for b in &TERRAIN_TEXTURE_PATHS[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_missing_texture_falls_back_to_default() {
        let assets = TerrainAssets::default();
        let images = Assets::<Image>::default();
        let handle = texture_or_default(&assets, &images, 2);
        assert_eq!(handle, Handle::<Image>::default());
    }

    #[test]
    fn test_unloaded_vegetation_has_no_mesh() {
        let assets = TerrainAssets::default();
        let gltfs = Assets::<Gltf>::default();
        let gltf_meshes = Assets::<GltfMesh>::default();
        assert!(vegetation_mesh(&assets, Species::Tree, &gltfs, &gltf_meshes).is_none());
    }
}
