//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.
//! Triangles are flat shaded with the first vertex normal.

use cbox_math::{BoundingSphere, Ray, Vec3, EPSILON};

use crate::Material;

/// A triangle with per-vertex normals.
#[derive(Debug, Clone)]
pub struct Triangle {
    vertices: [Vec3; 3],
    normals: [Vec3; 3],
    /// Pre-computed edges from the first vertex
    edge1: Vec3,
    edge2: Vec3,
    material: Material,
}

impl Triangle {
    /// Create a triangle from `(position, normal)` corners.
    pub fn new(corners: [(Vec3, Vec3); 3], material: Material) -> Self {
        let vertices = [corners[0].0, corners[1].0, corners[2].0];
        let normals = [corners[0].1, corners[1].1, corners[2].1];

        Self {
            vertices,
            normals,
            edge1: vertices[1] - vertices[0],
            edge2: vertices[2] - vertices[0],
            material,
        }
    }

    /// Create a triangle sharing one normal across all three vertices.
    pub fn with_normal(v0: Vec3, v1: Vec3, v2: Vec3, normal: Vec3, material: Material) -> Self {
        Self::new([(v0, normal), (v1, normal), (v2, normal)], material)
    }

    pub fn vertices(&self) -> [Vec3; 3] {
        self.vertices
    }

    /// Möller-Trumbore intersection, without backface culling.
    pub fn closest_hit(&self, ray: &Ray) -> Option<f32> {
        let h = ray.direction().cross(self.edge2);
        let a = self.edge1.dot(h);

        // Ray is parallel to triangle
        if a.abs() < EPSILON {
            return None;
        }

        let f = 1.0 / a;
        let s = ray.origin() - self.vertices[0];
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(self.edge1);
        let v = f * ray.direction().dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * self.edge2.dot(q);
        (t > EPSILON).then_some(t)
    }

    pub fn normal_at(&self, _p: Vec3) -> Vec3 {
        self.normals[0]
    }

    pub fn to_local(&self, p: Vec3) -> Vec3 {
        p - self.vertices[0]
    }

    pub fn to_local_normalized(&self, p: Vec3) -> Vec3 {
        (p - self.vertices[0]).normalize_or_zero()
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn bounds(&self) -> BoundingSphere {
        let [v0, v1, v2] = self.vertices;
        BoundingSphere::from_triangle(v0, v1, v2)
    }
}
