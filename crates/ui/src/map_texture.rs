//! Grayscale copy of the heightmap, uploaded once for both map overlays.

use bevy::prelude::*;
use bevy_egui::egui;

use worldgen::heightmap::{HeightSampler, Heightmap};

/// Cached egui texture plus the pixel size of the source heightmap.
#[derive(Resource, Default)]
pub struct MapTexture {
    texture: Option<egui::TextureHandle>,
    size: UVec2,
}

impl MapTexture {
    pub fn size(&self) -> UVec2 {
        self.size
    }

    /// Upload on first use, then return the cached texture id.
    pub fn get_or_upload(&mut self, ctx: &egui::Context, sampler: &HeightSampler) -> egui::TextureId {
        if let Some(texture) = &self.texture {
            return texture.id();
        }
        let image = map_image(sampler.heightmap());
        self.size = UVec2::new(image.size[0] as u32, image.size[1] as u32);
        let texture = ctx.load_texture("heightmap", image, map_texture_options());
        let id = texture.id();
        self.texture = Some(texture);
        id
    }
}

/// Linear filtering with mirrored repeat, so UVs outside `[0, 1]` sample the
/// same mirror tiling the terrain uses.
pub fn map_texture_options() -> egui::TextureOptions {
    egui::TextureOptions {
        wrap_mode: egui::TextureWrapMode::MirroredRepeat,
        ..egui::TextureOptions::LINEAR
    }
}

/// Gray RGBA image of the heightmap, or a single black pixel when flat.
pub fn map_image(map: Option<&Heightmap>) -> egui::ColorImage {
    let Some(map) = map else {
        return egui::ColorImage {
            size: [1, 1],
            pixels: vec![egui::Color32::BLACK],
        };
    };
    let pixels = map
        .samples()
        .iter()
        .map(|&v| egui::Color32::from_gray(v))
        .collect();
    egui::ColorImage {
        size: [map.width(), map.height()],
        pixels,
    }
}
