//! Texture loading for materials and light probes.
//!
//! Textures are stored as row-major RGB float triples in `[0, 1]` (raster
//! images) or arbitrary HDR values (raw float streams).

use std::path::Path;

use cbox_math::Vec3;
use thiserror::Error;

/// Errors that can occur during texture loading.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image decoding error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Raw float stream is {0} bytes, not a whole number of f32 values")]
    TruncatedStream(usize),

    #[error("Raw float stream holds {0} RGB pixels, which is not a square image")]
    NotSquare(usize),

    #[error("Texture is {width}x{height} but holds {pixels} pixels")]
    SizeMismatch { width: u32, height: u32, pixels: usize },
}

pub type TextureResult<T> = Result<T, TextureError>;

/// A loaded texture with pixel data.
#[derive(Clone, Debug)]
pub struct Texture {
    /// Texture width in pixels
    pub width: u32,

    /// Texture height in pixels
    pub height: u32,

    /// Pixel data as [R, G, B] per pixel, row-major order
    pub pixels: Vec<[f32; 3]>,
}

impl Texture {
    /// Create a new texture from pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<[f32; 3]>) -> TextureResult<Self> {
        if width == 0 || height == 0 || pixels.len() != (width * height) as usize {
            return Err(TextureError::SizeMismatch {
                width,
                height,
                pixels: pixels.len(),
            });
        }

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Create a solid color texture (1x1).
    pub fn solid_color(color: Vec3) -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: vec![color.to_array()],
        }
    }

    /// Load a raster image (PNG, JPEG, ...) with channels scaled to `[0, 1]`.
    pub fn open(path: impl AsRef<Path>) -> TextureResult<Self> {
        let path = path.as_ref();
        let rgb = image::open(path)?.to_rgb8();
        let (width, height) = rgb.dimensions();

        let pixels = rgb
            .pixels()
            .map(|p| {
                [
                    p[0] as f32 / 255.0,
                    p[1] as f32 / 255.0,
                    p[2] as f32 / 255.0,
                ]
            })
            .collect();

        let texture = Self::new(width, height, pixels)?;
        log::debug!(
            "Loaded texture: {} ({}x{}, {:.1} KB)",
            path.display(),
            texture.width,
            texture.height,
            texture.size_bytes() as f32 / 1024.0
        );
        Ok(texture)
    }

    /// Load a raw little-endian `f32` RGB stream from disk.
    pub fn open_raw(path: impl AsRef<Path>) -> TextureResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let texture = Self::from_raw_bytes(&bytes)?;
        log::debug!(
            "Loaded raw float texture: {} ({}x{})",
            path.display(),
            texture.width,
            texture.height
        );
        Ok(texture)
    }

    /// Decode a raw little-endian `f32` RGB stream.
    ///
    /// The stream carries no header; the image is square with
    /// `width = height = sqrt(values / 3)`.
    pub fn from_raw_bytes(bytes: &[u8]) -> TextureResult<Self> {
        if bytes.len() % 4 != 0 {
            return Err(TextureError::TruncatedStream(bytes.len()));
        }

        let values: Vec<f32> = bytemuck::pod_collect_to_vec::<u8, u32>(bytes)
            .into_iter()
            .map(|bits| f32::from_bits(u32::from_le(bits)))
            .collect();

        let pixel_count = values.len() / 3;
        let side = (pixel_count as f64).sqrt().round() as usize;
        if values.len() % 3 != 0 || side * side != pixel_count {
            return Err(TextureError::NotSquare(pixel_count));
        }

        let pixels = values.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect();
        Self::new(side as u32, side as u32, pixels)
    }

    /// Get pixel at integer coordinates, clamped to the image.
    pub fn pixel(&self, x: i64, y: i64) -> Vec3 {
        let x = x.clamp(0, self.width as i64 - 1) as usize;
        let y = y.clamp(0, self.height as i64 - 1) as usize;
        Vec3::from_array(self.pixels[y * self.width as usize + x])
    }

    /// Nearest-pixel lookup for texture coordinates in `[0, 1]`.
    ///
    /// Coordinates outside the range (and NaN) are clamped to the border
    /// rather than rejected.
    pub fn sample(&self, u: f32, v: f32) -> Vec3 {
        let u = if u.is_finite() { u.clamp(0.0, 1.0) } else { 0.0 };
        let v = if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };

        let x = (u * (self.width - 1) as f32).round() as i64;
        let y = (v * (self.height - 1) as f32).round() as i64;
        self.pixel(x, y)
    }

    /// Get total size in bytes (approximate).
    pub fn size_bytes(&self) -> usize {
        self.pixels.len() * std::mem::size_of::<[f32; 3]>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn raw_stream(values: &[f32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    fn gradient() -> Texture {
        // 2x2: black, red / green, white
        Texture::new(
            2,
            2,
            vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [1.0, 1.0, 1.0],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_solid_color_texture() {
        let tex = Texture::solid_color(Vec3::new(1.0, 0.5, 0.0));
        assert_eq!(tex.width, 1);
        assert_eq!(tex.height, 1);

        let sample = tex.sample(0.5, 0.5);
        assert!((sample.x - 1.0).abs() < 0.001);
        assert!((sample.y - 0.5).abs() < 0.001);
        assert!((sample.z - 0.0).abs() < 0.001);
    }

    #[test]
    fn test_sample_corners() {
        let tex = gradient();
        assert_eq!(tex.sample(0.0, 0.0), Vec3::ZERO);
        assert_eq!(tex.sample(1.0, 0.0), Vec3::X);
        assert_eq!(tex.sample(0.0, 1.0), Vec3::Y);
        assert_eq!(tex.sample(1.0, 1.0), Vec3::ONE);
    }

    #[test]
    fn test_sample_clamps_out_of_range() {
        let tex = gradient();
        assert_eq!(tex.sample(-3.0, 7.0), Vec3::Y);
        assert_eq!(tex.sample(f32::NAN, f32::INFINITY), Vec3::ZERO);
    }

    #[test]
    fn test_new_rejects_mismatched_pixels() {
        assert!(matches!(
            Texture::new(2, 2, vec![[0.0; 3]; 3]),
            Err(TextureError::SizeMismatch { pixels: 3, .. })
        ));
    }

    #[test]
    fn test_raw_stream_square() {
        let mut values = Vec::new();
        for i in 0..4 {
            values.extend_from_slice(&[i as f32, 0.5, 2.0]);
        }
        let tex = Texture::from_raw_bytes(&raw_stream(&values)).unwrap();

        assert_eq!((tex.width, tex.height), (2, 2));
        assert_eq!(tex.pixel(1, 1), Vec3::new(3.0, 0.5, 2.0));
    }

    #[test]
    fn test_raw_stream_not_square() {
        let values = vec![0.0f32; 3 * 3];
        assert!(matches!(
            Texture::from_raw_bytes(&raw_stream(&values)),
            Err(TextureError::NotSquare(3))
        ));
    }

    #[test]
    fn test_raw_stream_truncated() {
        assert!(matches!(
            Texture::from_raw_bytes(&[0u8; 6]),
            Err(TextureError::TruncatedStream(6))
        ));
    }

    #[test]
    fn test_open_raw_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&raw_stream(&[0.25; 3])).unwrap();

        let tex = Texture::open_raw(file.path()).unwrap();
        assert_eq!((tex.width, tex.height), (1, 1));
        assert_eq!(tex.pixel(0, 0), Vec3::splat(0.25));
    }

    #[test]
    fn test_open_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checker.png");
        let img = image::RgbImage::from_fn(2, 1, |x, _| {
            if x == 0 {
                image::Rgb([255, 0, 0])
            } else {
                image::Rgb([0, 0, 255])
            }
        });
        img.save(&path).unwrap();

        let tex = Texture::open(&path).unwrap();
        assert_eq!((tex.width, tex.height), (2, 1));
        assert_eq!(tex.pixel(0, 0), Vec3::X);
        assert_eq!(tex.pixel(1, 0), Vec3::Z);
    }
}
