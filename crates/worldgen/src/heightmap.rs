//! Heightmap sampling with mirrored wrap.
//!
//! The decoded elevation image is tiled infinitely by alternating normal and
//! mirrored copies, so any integer world coordinate maps to a pixel without a
//! seam at the image edges. The same fold is used by the map overlays.

use std::fmt;

use bevy::prelude::*;
use bevy::render::render_resource::TextureFormat;

/// Fold an integer coordinate into `[0, max)` by mirrored repetition.
///
/// `max` must be positive.
#[inline]
pub fn mirrored_coord(coord: i64, max: i64) -> i64 {
    let cycle = 2 * max;
    let v = coord.abs() % cycle;
    if v >= max {
        cycle - 1 - v
    } else {
        v
    }
}

/// Fold a normalized coordinate into `[0, 1]` with the same mirrored rule.
///
/// `[0, 2)` is reached via modulo, and the `(1, 2)` half reflects back as `2 - v`.
#[inline]
pub fn mirrored_unit(v: f32) -> f32 {
    let v = v.abs() % 2.0;
    if v > 1.0 {
        2.0 - v
    } else {
        v
    }
}

/// Errors produced while converting a decoded image into a [`Heightmap`].
#[derive(Debug, Clone, PartialEq)]
pub enum HeightmapError {
    /// Image has zero width or height.
    EmptyImage,
    /// Pixel format has no sensible elevation channel.
    UnsupportedFormat(String),
    /// Pixel buffer length disagrees with the stated dimensions.
    SizeMismatch { expected: usize, found: usize },
}

impl fmt::Display for HeightmapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeightmapError::EmptyImage => write!(f, "heightmap image is empty"),
            HeightmapError::UnsupportedFormat(format) => {
                write!(f, "unsupported heightmap pixel format: {format}")
            }
            HeightmapError::SizeMismatch { expected, found } => write!(
                f,
                "heightmap buffer size mismatch: expected {expected} bytes, found {found}"
            ),
        }
    }
}

impl std::error::Error for HeightmapError {}

/// Immutable single-channel elevation grid, one byte per sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Heightmap {
    width: usize,
    height: usize,
    samples: Vec<u8>,
}

impl Heightmap {
    /// Wrap a row-major luminance buffer.
    pub fn from_luma8(width: usize, height: usize, samples: Vec<u8>) -> Result<Self, HeightmapError> {
        if width == 0 || height == 0 {
            return Err(HeightmapError::EmptyImage);
        }
        let expected = width * height;
        if samples.len() != expected {
            return Err(HeightmapError::SizeMismatch {
                expected,
                found: samples.len(),
            });
        }
        Ok(Self {
            width,
            height,
            samples,
        })
    }

    /// Reduce a decoded Bevy image to one luminance byte per pixel.
    ///
    /// Grayscale formats take their first channel, 16-bit formats keep the
    /// high byte, and RGBA formats use the integer luma weights (77, 150, 29).
    pub fn from_image(image: &Image) -> Result<Self, HeightmapError> {
        let width = image.width() as usize;
        let height = image.height() as usize;
        if width == 0 || height == 0 {
            return Err(HeightmapError::EmptyImage);
        }
        let pixels = width * height;
        let format = image.texture_descriptor.format;
        let stride = match format {
            TextureFormat::R8Unorm | TextureFormat::R8Uint => 1,
            TextureFormat::Rg8Unorm | TextureFormat::R16Uint | TextureFormat::R16Unorm => 2,
            TextureFormat::Rgba8Unorm | TextureFormat::Rgba8UnormSrgb => 4,
            other => return Err(HeightmapError::UnsupportedFormat(format!("{other:?}"))),
        };
        let data = &image.data;
        if data.len() != pixels * stride {
            return Err(HeightmapError::SizeMismatch {
                expected: pixels * stride,
                found: data.len(),
            });
        }

        let samples = match format {
            TextureFormat::R16Uint | TextureFormat::R16Unorm => data
                .chunks_exact(2)
                .map(|px| (u16::from_le_bytes([px[0], px[1]]) >> 8) as u8)
                .collect(),
            TextureFormat::Rgba8Unorm | TextureFormat::Rgba8UnormSrgb => data
                .chunks_exact(4)
                .map(|px| {
                    let luma = px[0] as u32 * 77 + px[1] as u32 * 150 + px[2] as u32 * 29;
                    (luma >> 8) as u8
                })
                .collect(),
            _ => data.chunks_exact(stride).map(|px| px[0]).collect(),
        };
        Self::from_luma8(width, height, samples)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    /// Normalized sample at a world coordinate, folded into the image.
    #[inline]
    pub fn wrapped(&self, x: i64, y: i64) -> f32 {
        let sx = mirrored_coord(x, self.width as i64) as usize;
        let sy = mirrored_coord(y, self.height as i64) as usize;
        self.samples[sy * self.width + sx] as f32 / 255.0
    }

    /// 3x3 box-filtered elevation around a world coordinate.
    pub fn smooth(&self, x: i64, y: i64) -> f32 {
        let mut total = 0.0;
        for oy in -1..=1 {
            for ox in -1..=1 {
                total += self.wrapped(x + ox, y + oy);
            }
        }
        total / 9.0
    }
}

/// Elevation source used by chunk generation.
///
/// Holds `None` when no heightmap could be decoded, in which case every query
/// returns 0 and the terrain is flat.
#[derive(Resource, Debug, Clone, Default)]
pub struct HeightSampler {
    map: Option<Heightmap>,
}

impl HeightSampler {
    pub fn new(map: Heightmap) -> Self {
        Self { map: Some(map) }
    }

    pub fn flat() -> Self {
        Self { map: None }
    }

    pub fn heightmap(&self) -> Option<&Heightmap> {
        self.map.as_ref()
    }

    pub fn is_flat(&self) -> bool {
        self.map.is_none()
    }

    /// Normalized elevation in `[0, 1]` for any integer world coordinate.
    #[inline]
    pub fn sample(&self, x: i64, y: i64) -> f32 {
        match &self.map {
            Some(map) => map.smooth(x, y),
            None => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::render::render_asset::RenderAssetUsages;
    use bevy::render::render_resource::{Extent3d, TextureDimension};

    fn gradient(width: usize, height: usize) -> Heightmap {
        let samples = (0..width * height).map(|i| (i % 256) as u8).collect();
        Heightmap::from_luma8(width, height, samples).unwrap()
    }

    #[test]
    fn test_mirrored_coord_stays_in_range() {
        for m in 1..9 {
            for c in -50..50 {
                let v = mirrored_coord(c, m);
                assert!((0..m).contains(&v), "fold({c}, {m}) = {v}");
            }
        }
    }

    #[test]
    fn test_mirrored_coord_periodic() {
        for m in 1..9 {
            for c in -40..40 {
                assert_eq!(mirrored_coord(c, m), mirrored_coord(c + 2 * m, m));
            }
        }
    }

    #[test]
    fn test_mirrored_coord_reflects_at_boundary() {
        let m = 10;
        assert_eq!(mirrored_coord(m - 1, m), m - 1);
        assert_eq!(mirrored_coord(m, m), m - 1);
        assert_eq!(mirrored_coord(m + 1, m), m - 2);
        assert_eq!(mirrored_coord(2 * m - 1, m), 0);
    }

    #[test]
    fn test_mirrored_coord_symmetric_in_sign() {
        for c in 0..30 {
            assert_eq!(mirrored_coord(c, 7), mirrored_coord(-c, 7));
        }
    }

    #[test]
    fn test_mirrored_unit_examples() {
        assert!((mirrored_unit(2.3) - 0.3).abs() < 1e-5);
        assert!((mirrored_unit(1.7) - 0.3).abs() < 1e-5);
        assert!((mirrored_unit(-0.4) - 0.4).abs() < 1e-6);
        assert_eq!(mirrored_unit(1.0), 1.0);
        assert_eq!(mirrored_unit(0.0), 0.0);
    }

    #[test]
    fn test_flat_sampler_returns_zero() {
        let sampler = HeightSampler::flat();
        assert!(sampler.is_flat());
        for (x, y) in [(0, 0), (-500, 12), (99_999, -3)] {
            assert_eq!(sampler.sample(x, y), 0.0);
        }
    }

    #[test]
    fn test_constant_map_smooths_to_constant() {
        let map = Heightmap::from_luma8(4, 4, vec![128; 16]).unwrap();
        let sampler = HeightSampler::new(map);
        let expected = 128.0 / 255.0;
        for (x, y) in [(0, 0), (3, 3), (-7, 40), (1000, -1000)] {
            assert!((sampler.sample(x, y) - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn test_smooth_is_box_mean() {
        let map = gradient(5, 5);
        let mut total = 0.0;
        for y in 1..=3 {
            for x in 1..=3 {
                total += map.samples()[y * 5 + x] as f32 / 255.0;
            }
        }
        assert!((map.smooth(2, 2) - total / 9.0).abs() < 1e-6);
    }

    #[test]
    fn test_sampler_range_is_normalized() {
        let sampler = HeightSampler::new(gradient(16, 16));
        for y in -20..20 {
            for x in -20..20 {
                let h = sampler.sample(x, y);
                assert!((0.0..=1.0).contains(&h));
            }
        }
    }

    #[test]
    fn test_from_luma8_rejects_bad_sizes() {
        assert_eq!(
            Heightmap::from_luma8(0, 4, vec![]),
            Err(HeightmapError::EmptyImage)
        );
        assert_eq!(
            Heightmap::from_luma8(2, 2, vec![0; 3]),
            Err(HeightmapError::SizeMismatch {
                expected: 4,
                found: 3
            })
        );
    }

    fn image(format: TextureFormat, data: Vec<u8>) -> Image {
        Image::new(
            Extent3d {
                width: 2,
                height: 1,
                depth_or_array_layers: 1,
            },
            TextureDimension::D2,
            data,
            format,
            RenderAssetUsages::MAIN_WORLD,
        )
    }

    #[test]
    fn test_from_image_r8() {
        let map = Heightmap::from_image(&image(TextureFormat::R8Unorm, vec![10, 200])).unwrap();
        assert_eq!(map.samples(), &[10, 200]);
    }

    #[test]
    fn test_from_image_rgba_uses_luma() {
        let data = vec![255, 255, 255, 255, 0, 0, 0, 255];
        let map = Heightmap::from_image(&image(TextureFormat::Rgba8Unorm, data)).unwrap();
        assert_eq!(map.samples(), &[255, 0]);
    }

    #[test]
    fn test_from_image_r16_keeps_high_byte() {
        let data = [0xABCDu16, 0x0100].iter().flat_map(|v| v.to_le_bytes()).collect();
        let map = Heightmap::from_image(&image(TextureFormat::R16Uint, data)).unwrap();
        assert_eq!(map.samples(), &[0xAB, 0x01]);
    }

    #[test]
    fn test_from_image_rejects_float_format() {
        let err = Heightmap::from_image(&image(TextureFormat::R32Float, vec![0; 8])).unwrap_err();
        assert!(matches!(err, HeightmapError::UnsupportedFormat(_)));
        assert!(err.to_string().contains("R32Float"), "got: {err}");
    }
}
