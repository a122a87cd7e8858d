//! Infinite plane primitive.
//!
//! Planes have no finite bounds, so they never enter the bounding-sphere
//! hierarchy and are always tested linearly.

use cbox_math::{Ray, Vec3, EPSILON};

use crate::Material;

/// Tolerance for treating a plane as horizontal.
const HORIZONTAL_TOLERANCE: f32 = 1e-6;

/// An infinite plane through `point` with unit normal `normal`.
#[derive(Debug, Clone)]
pub struct Plane {
    normal: Vec3,
    point: Vec3,
    d0: f32,
    material: Material,
}

impl Plane {
    /// Create a plane. The normal is normalized.
    pub fn new(normal: Vec3, point: Vec3, material: Material) -> Self {
        let normal = normal.normalize();
        Self {
            normal,
            point,
            d0: point.dot(normal),
            material,
        }
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    pub fn closest_hit(&self, ray: &Ray) -> Option<f32> {
        let denom = ray.direction().dot(self.normal);
        if denom.abs() < EPSILON {
            return None;
        }

        let lambda = (self.d0 - ray.origin().dot(self.normal)) / denom;
        (lambda >= 0.0).then_some(lambda)
    }

    pub fn normal_at(&self, _p: Vec3) -> Vec3 {
        self.normal
    }

    pub fn to_local(&self, p: Vec3) -> Vec3 {
        p - self.point
    }

    /// In-plane coordinates wrapped to `(-1, 1)`.
    ///
    /// Horizontal planes use the world X and Z axes directly (mirrored for
    /// downward-facing normals); other orientations derive an in-plane basis
    /// from the normal.
    pub fn to_local_normalized(&self, p: Vec3) -> Vec3 {
        let up = self.normal.dot(Vec3::Y);

        if (up - 1.0).abs() < HORIZONTAL_TOLERANCE {
            return Vec3::new(p.x % 1.0, p.z % 1.0, 0.0);
        }
        if (up + 1.0).abs() < HORIZONTAL_TOLERANCE {
            return Vec3::new(-p.x % 1.0, -p.z % 1.0, 0.0);
        }

        let right = (-Vec3::Y).cross(self.normal).normalize();
        let in_plane_up = right.cross(self.normal).normalize();
        Vec3::new(p.dot(right) % 1.0, p.dot(in_plane_up) % 1.0, 0.0)
    }

    pub fn material(&self) -> &Material {
        &self.material
    }
}
