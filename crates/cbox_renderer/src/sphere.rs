//! Sphere primitive for ray tracing.

use cbox_math::{BoundingSphere, Ray, Vec3};

use crate::Material;

/// A solid sphere.
#[derive(Debug, Clone)]
pub struct Sphere {
    center: Vec3,
    radius: f32,
    material: Material,
}

impl Sphere {
    /// Create a new sphere.
    pub fn new(center: Vec3, radius: f32, material: Material) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
            material,
        }
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn closest_hit(&self, ray: &Ray) -> Option<f32> {
        intersect_sphere(ray, self.center, self.radius)
    }

    pub fn normal_at(&self, p: Vec3) -> Vec3 {
        (p - self.center) / self.radius
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

/// Smallest strictly positive ray parameter where `ray` meets the sphere.
///
/// Assumes a unit-length ray direction, which `Ray` guarantees.
pub(crate) fn intersect_sphere(ray: &Ray, center: Vec3, radius: f32) -> Option<f32> {
    let ce = ray.origin() - center;
    let b = ray.direction().dot(ce);
    let disc = b * b - ce.length_squared() + radius * radius;

    if disc < 0.0 {
        return None;
    }

    let sqrt = disc.sqrt();
    let near = -b - sqrt;
    let far = -b + sqrt;

    if near > 0.0 {
        Some(near)
    } else if far > 0.0 {
        Some(far)
    } else {
        None
    }
}
