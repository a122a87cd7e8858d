//! Surface materials.
//!
//! A material either carries a solid colour or samples a texture through one
//! of the projection modes. The projection turns a primitive's normalized
//! local coordinates into texture coordinates in `[-1, 1]`, which are then
//! tiled and looked up in the texture.

use std::f32::consts::PI;
use std::sync::Arc;

use cbox_core::Texture;
use cbox_math::{Vec2, Vec3};
use thiserror::Error;

/// RGB color type (linear space, unclamped).
pub type Color = Vec3;

/// Errors raised when constructing a material.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialError {
    #[error("{0:?} projection is not supported")]
    UnsupportedProjection(ProjectionMode),

    #[error("{0:?} projection requires a texture")]
    MissingTexture(ProjectionMode),
}

/// How local surface coordinates map onto the texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionMode {
    /// Constant material colour, no texture.
    SolidColor,
    /// In-plane `(x, y)` coordinates.
    Planar,
    /// Longitude/latitude around the local origin.
    Spherical,
    /// Cube mapping. Declared but not implemented; rejected at construction.
    Cubic,
    /// Angular map of an environment light probe.
    LightProbe,
}

impl ProjectionMode {
    fn needs_texture(self) -> bool {
        !matches!(self, ProjectionMode::SolidColor)
    }
}

/// Texture coordinate scale and offset applied before sampling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tiling {
    pub scale: Vec2,
    pub offset: Vec2,
}

impl Tiling {
    pub fn new(scale: Vec2, offset: Vec2) -> Self {
        Self { scale, offset }
    }

    /// Map `[0, 1]` coordinates through the tiling, wrapping repeats back
    /// into the unit square.
    fn apply(&self, s: f32, t: f32) -> (f32, f32) {
        let wrap = |x: f32| {
            if (0.0..=1.0).contains(&x) {
                x
            } else {
                x.rem_euclid(1.0)
            }
        };
        (
            wrap(s * self.scale.x + self.offset.x),
            wrap(t * self.scale.y + self.offset.y),
        )
    }
}

impl Default for Tiling {
    fn default() -> Self {
        Self {
            scale: Vec2::ONE,
            offset: Vec2::ZERO,
        }
    }
}

/// Surface appearance and shading coefficients.
///
/// Textures are shared through `Arc`, so cloning a material (for example
/// once per mesh triangle) is cheap.
#[derive(Debug, Clone)]
pub struct Material {
    projection: ProjectionMode,
    color: Color,
    texture: Option<Arc<Texture>>,
    tiling: Tiling,

    /// Mirror reflectivity in `[0, 1]`
    pub reflectivity: f32,
    /// Phong specular exponent
    pub specular_exponent: i32,
    /// Diffuse weight. Stored for completeness; the Whitted tracer does not
    /// scale the diffuse term by it.
    pub diffuse_coefficient: f32,
    /// Specular weight
    pub specular_coefficient: f32,
    /// Emitted radiance scale (path integrator and light probes)
    pub emission: f32,
}

impl Material {
    /// Solid colour material.
    pub fn solid(color: Color) -> Self {
        Self {
            projection: ProjectionMode::SolidColor,
            color,
            texture: None,
            tiling: Tiling::default(),
            reflectivity: 0.0,
            specular_exponent: 10,
            diffuse_coefficient: 2.0,
            specular_coefficient: 1.0,
            emission: 0.0,
        }
    }

    /// Textured material using the given projection.
    pub fn textured(
        texture: Arc<Texture>,
        projection: ProjectionMode,
        tiling: Tiling,
    ) -> Result<Self, MaterialError> {
        Self::new(projection, Some(texture), tiling)
    }

    /// General constructor, validating the projection against the texture.
    pub fn new(
        projection: ProjectionMode,
        texture: Option<Arc<Texture>>,
        tiling: Tiling,
    ) -> Result<Self, MaterialError> {
        if projection == ProjectionMode::Cubic {
            return Err(MaterialError::UnsupportedProjection(projection));
        }
        if projection.needs_texture() && texture.is_none() {
            return Err(MaterialError::MissingTexture(projection));
        }

        Ok(Self {
            projection,
            color: Color::ONE,
            texture,
            tiling,
            reflectivity: 0.0,
            specular_exponent: 10,
            diffuse_coefficient: 2.0,
            specular_coefficient: 0.5,
            emission: 0.0,
        })
    }

    /// Emissive-only material for a light probe.
    pub fn light_probe(texture: Arc<Texture>) -> Self {
        Self {
            projection: ProjectionMode::LightProbe,
            color: Color::ONE,
            texture: Some(texture),
            tiling: Tiling::default(),
            reflectivity: 0.0,
            specular_exponent: 0,
            diffuse_coefficient: 0.0,
            specular_coefficient: 0.0,
            emission: 1.0,
        }
    }

    /// Set the solid colour.
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Set mirror reflectivity.
    pub fn with_reflectivity(mut self, reflectivity: f32) -> Self {
        self.reflectivity = reflectivity;
        self
    }

    /// Set the Phong exponent and specular weight.
    pub fn with_specular(mut self, exponent: i32, coefficient: f32) -> Self {
        self.specular_exponent = exponent;
        self.specular_coefficient = coefficient;
        self
    }

    /// Set the diffuse weight.
    pub fn with_diffuse(mut self, coefficient: f32) -> Self {
        self.diffuse_coefficient = coefficient;
        self
    }

    /// Set the emission scale.
    pub fn with_emission(mut self, emission: f32) -> Self {
        self.emission = emission;
        self
    }

    pub fn projection(&self) -> ProjectionMode {
        self.projection
    }

    pub fn tiling(&self) -> Tiling {
        self.tiling
    }

    /// Surface colour for a normalized local coordinate.
    pub fn albedo(&self, local: Vec3) -> Color {
        let texture = match (&self.texture, self.projection) {
            (Some(texture), mode) if mode.needs_texture() => texture,
            _ => return self.color,
        };

        let (u, v) = match self.projection {
            ProjectionMode::Planar => (local.x, local.y),
            ProjectionMode::Spherical => spherical_uv(local),
            ProjectionMode::LightProbe => light_probe_uv(local),
            ProjectionMode::SolidColor | ProjectionMode::Cubic => return self.color,
        };

        // [-1, 1] -> [0, 1]
        let (s, t) = self.tiling.apply((u + 1.0) * 0.5, (v + 1.0) * 0.5);
        texture.sample(s, t)
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::solid(Color::ONE)
    }
}

fn spherical_uv(local: Vec3) -> (f32, f32) {
    let u = local.x.atan2(local.z) / (2.0 * PI);
    let v = local.y.clamp(-1.0, 1.0).acos() / (2.0 * PI);
    (u, v)
}

/// Angular map: the radius from the image centre grows linearly with the
/// angle from +Z.
fn light_probe_uv(local: Vec3) -> (f32, f32) {
    let planar = (local.x * local.x + local.y * local.y).sqrt();
    if planar <= f32::EPSILON {
        // Looking straight down +Z (centre) or -Z (rim, direction undefined)
        return (0.0, 0.0);
    }

    let r = local.z.clamp(-1.0, 1.0).acos() / PI / planar;
    (-local.x * r, -local.y * r)
}
