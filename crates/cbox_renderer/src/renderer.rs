//! Image rendering.
//!
//! Picks a pixel sampling strategy (single ray, jittered supersampling,
//! Gaussian offsets or lens samples), traces every sample with the chosen
//! integrator and averages. Whole images are rendered row by row on the
//! rayon thread pool and can be cancelled between rows.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::session::DEFAULT_SAMPLE_TABLE_SIZE;
use crate::{
    Camera, Color, PathIntegrator, RenderSession, Scene, WhittedOptions, WhittedTracer,
    DEFAULT_PATH_SAMPLES,
};
use cbox_math::Ray;

/// Grid size of jittered supersampling (`SUPERSAMPLE_GRID²` rays).
pub const SUPERSAMPLE_GRID: u32 = 5;

/// Samples per pixel for Gaussian anti-aliasing.
pub const GAUSSIAN_SAMPLES: u32 = 20;

/// Lens samples per pixel when the aperture is open.
pub const LENS_SAMPLES: u32 = 1000;

const GAUSSIAN_SIGMA: f32 = 0.5;
const GAUSSIAN_MEAN: f32 = 1.0;

/// Pixel anti-aliasing strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AntiAliasing {
    /// One ray per pixel.
    #[default]
    None,
    /// Jittered 5x5 grid.
    Supersample,
    /// Gaussian-weighted offsets from the sample table.
    Gaussian,
}

/// Light transport algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Integrator {
    #[default]
    Whitted,
    PathTracing,
}

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub integrator: Integrator,
    /// Whitted feature switches
    pub whitted: WhittedOptions,
    /// Hemisphere samples at the primary hit of the path integrator
    pub path_samples: u32,
    pub anti_aliasing: AntiAliasing,
    /// Lens radius; zero disables depth of field
    pub aperture: f32,
    /// Seed of the session generator and sample table
    pub seed: u64,
    pub sample_table_size: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 400,
            height: 400,
            integrator: Integrator::Whitted,
            whitted: WhittedOptions::default(),
            path_samples: DEFAULT_PATH_SAMPLES,
            anti_aliasing: AntiAliasing::None,
            aperture: 0.0,
            seed: 0,
            sample_table_size: DEFAULT_SAMPLE_TABLE_SIZE,
        }
    }
}

impl RenderConfig {
    /// Session seeded from this configuration.
    pub fn session(&self) -> RenderSession {
        RenderSession::with_table_size(self.seed, self.sample_table_size)
    }
}

/// Radiance along one ray with the configured integrator.
pub fn trace_ray(scene: &Scene, session: &RenderSession, ray: &Ray, config: &RenderConfig) -> Color {
    match config.integrator {
        Integrator::Whitted => WhittedTracer::new(scene, config.whitted).trace(ray),
        Integrator::PathTracing => {
            PathIntegrator::with_samples(scene, session, config.path_samples).trace(ray)
        }
    }
}

/// Gaussian density with the anti-aliasing sigma and mean.
fn gaussian_offset(x: f32) -> f32 {
    let norm = 1.0 / (GAUSSIAN_SIGMA * std::f32::consts::TAU.sqrt());
    let z = (x - GAUSSIAN_MEAN) / GAUSSIAN_SIGMA;
    norm * (-0.5 * z * z).exp()
}

/// Render a single pixel, averaging all of its samples.
pub fn render_pixel(
    scene: &Scene,
    camera: &Camera,
    session: &RenderSession,
    x: u32,
    y: u32,
    config: &RenderConfig,
) -> Color {
    let (px, py) = (x as f32, y as f32);
    let trace = |sx: f32, sy: f32| {
        let ray = camera.primary_ray(sx, sy, session);
        trace_ray(scene, session, &ray, config)
    };

    match config.anti_aliasing {
        AntiAliasing::Supersample => {
            let n = SUPERSAMPLE_GRID;
            let mut sum = Color::ZERO;
            for i in 0..n {
                for j in 0..n {
                    let dx = (i as f32 + session.uniform(0.0..1.0)) / n as f32 - 0.5;
                    let dy = (j as f32 + session.uniform(0.0..1.0)) / n as f32 - 0.5;
                    sum += trace(px + dx, py + dy);
                }
            }
            sum / (n * n) as f32
        }

        AntiAliasing::Gaussian => {
            let mut sum = Color::ZERO;
            for _ in 0..GAUSSIAN_SAMPLES {
                let dx = gaussian_offset(session.next_sample());
                let dy = gaussian_offset(session.next_sample());
                sum += trace(px + dx, py + dy);
            }
            sum / GAUSSIAN_SAMPLES as f32
        }

        AntiAliasing::None if camera.aperture() > 0.0 => {
            let mut sum = Color::ZERO;
            for _ in 0..LENS_SAMPLES {
                sum += trace(px, py);
            }
            sum / LENS_SAMPLES as f32
        }

        AntiAliasing::None => trace(px, py),
    }
}

/// Clamp a value to [0, 1] range.
#[inline]
pub fn clamp_01(x: f32) -> f32 {
    x.clamp(0.0, 1.0)
}

/// Convert a linear color to 8-bit RGBA, clamping each channel.
pub fn color_to_rgba(color: Color) -> [u8; 4] {
    let to_byte = |c: f32| (255.0 * clamp_01(c)).round() as u8;
    [to_byte(color.x), to_byte(color.y), to_byte(color.z), 255]
}

/// Pixels in a `width` x `height` image, computed without `u32` overflow.
#[inline]
fn pixel_count(width: u32, height: u32) -> usize {
    width as usize * height as usize
}

/// Simple image buffer for storing render output.
#[derive(Debug, Clone)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; pixel_count(width, height)],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    /// Convert to RGBA bytes (for display or saving).
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for color in &self.pixels {
            bytes.extend_from_slice(&color_to_rgba(*color));
        }
        bytes
    }
}

/// Result of a render pass.
#[derive(Debug, Clone)]
pub struct RenderOutput {
    pub image: ImageBuffer,
    /// False if the pass was cancelled before every row was rendered
    pub completed: bool,
}

/// Render the scene in parallel, one row per task.
///
/// `cancel` is checked before each row; rows already rendered are kept.
pub fn render(scene: &Scene, config: &RenderConfig, cancel: &AtomicBool) -> RenderOutput {
    let start = Instant::now();
    let width = config.width.max(1);
    let height = config.height.max(1);

    let camera = scene.camera(width, height).with_aperture(config.aperture);
    let session = config.session();
    let mut image = ImageBuffer::new(width, height);
    let rows_done = AtomicUsize::new(0);

    image
        .pixels
        .par_chunks_mut(width as usize)
        .enumerate()
        .for_each(|(y, row)| {
            if cancel.load(Ordering::Relaxed) {
                return;
            }
            for (x, pixel) in row.iter_mut().enumerate() {
                *pixel = render_pixel(scene, &camera, &session, x as u32, y as u32, config);
            }
            rows_done.fetch_add(1, Ordering::Relaxed);
        });

    let completed = rows_done.load(Ordering::Relaxed) == height as usize;
    if completed {
        log::info!(
            "Rendered {}x{} ({:?}, {:?}) in {:.2?}",
            width,
            height,
            config.integrator,
            config.anti_aliasing,
            start.elapsed()
        );
    } else {
        log::warn!(
            "Render cancelled after {:.2?}: {}/{} rows",
            start.elapsed(),
            rows_done.load(Ordering::Relaxed),
            height
        );
    }

    RenderOutput { image, completed }
}
