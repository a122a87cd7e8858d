//! Monte Carlo path integrator.
//!
//! Emissive surfaces return their radiance; everything else gathers light
//! from a handful of hemisphere directions per hit, recursing a few levels.
//! Samples are uniform hemisphere directions weighted with a fixed
//! `1 / (2π)` pdf, so inside a uniformly emissive enclosure the estimate
//! converges to `π · albedo · E` rather than `albedo · E`.

use std::f32::consts::TAU;

use cbox_math::Ray;

use crate::{Color, RenderSession, Scene};

/// Path recursion stops at this depth.
pub const MAX_PATH_DEPTH: u32 = 3;

/// Hemisphere samples at the primary hit.
pub const DEFAULT_PATH_SAMPLES: u32 = 5;

/// Hemisphere samples at every deeper hit.
pub const SECONDARY_PATH_SAMPLES: u32 = 4;

const PATH_BIAS: f32 = 1e-4;

pub struct PathIntegrator<'a> {
    scene: &'a Scene,
    session: &'a RenderSession,
    samples: u32,
}

impl<'a> PathIntegrator<'a> {
    pub fn new(scene: &'a Scene, session: &'a RenderSession) -> Self {
        Self::with_samples(scene, session, DEFAULT_PATH_SAMPLES)
    }

    /// Integrator drawing `samples` directions at the primary hit.
    pub fn with_samples(scene: &'a Scene, session: &'a RenderSession, samples: u32) -> Self {
        Self {
            scene,
            session,
            samples: samples.max(1),
        }
    }

    /// Estimated radiance arriving along `ray`.
    pub fn trace(&self, ray: &Ray) -> Color {
        self.radiance(ray, self.samples, 0)
    }

    fn radiance(&self, ray: &Ray, samples: u32, depth: u32) -> Color {
        let Some(hit) = self.scene.closest_hit(ray) else {
            return Color::ZERO;
        };

        let primitive = self.scene.primitive(hit.id);
        let material = primitive.material();
        let point = ray.at(hit.lambda);
        let albedo = material.albedo(primitive.to_local_normalized(point));

        let emitted = albedo * material.emission;
        if emitted != Color::ZERO {
            return emitted;
        }

        if depth >= MAX_PATH_DEPTH {
            return Color::ZERO;
        }

        let normal = primitive.normal_at(point);
        let mut sum = Color::ZERO;

        for _ in 0..samples {
            let dir = self.session.hemisphere_direction(normal);
            let bounce = Ray::new(point + dir * PATH_BIAS, dir);
            let incoming = self.radiance(&bounce, SECONDARY_PATH_SAMPLES, depth + 1);

            // Divide by pdf = 1 / (2π)
            sum += incoming * dir.dot(normal) * albedo * TAU;
        }

        sum / samples as f32
    }
}
