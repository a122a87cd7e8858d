//! Environment light probe.
//!
//! A large sphere around the scene whose inside shows an angular-map
//! environment texture. It only emits; it is never lit and never casts or
//! receives shadows.

use std::sync::Arc;

use cbox_core::Texture;
use cbox_math::{BoundingSphere, Ray, Vec3};

use crate::sphere::intersect_sphere;
use crate::Material;

#[derive(Debug, Clone)]
pub struct LightProbe {
    center: Vec3,
    radius: f32,
    material: Material,
}

impl LightProbe {
    pub fn new(center: Vec3, radius: f32, texture: Arc<Texture>) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
            material: Material::light_probe(texture),
        }
    }

    pub fn closest_hit(&self, ray: &Ray) -> Option<f32> {
        intersect_sphere(ray, self.center, self.radius)
    }

    /// Normals face inward, toward the scene.
    pub fn normal_at(&self, p: Vec3) -> Vec3 {
        (self.center - p) / self.radius
    }

    pub fn to_local(&self, p: Vec3) -> Vec3 {
        p - self.center
    }

    pub fn to_local_normalized(&self, p: Vec3) -> Vec3 {
        (p - self.center).normalize_or_zero()
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn bounds(&self) -> BoundingSphere {
        BoundingSphere::new(self.center, self.radius)
    }
}
