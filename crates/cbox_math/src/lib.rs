// Re-export glam for convenience
pub use glam::*;

// Cornell box math types
mod bounding_sphere;
mod ray;
pub use bounding_sphere::BoundingSphere;
pub use ray::Ray;

/// Tolerance for parallel-ray and self-intersection tests.
pub const EPSILON: f32 = 1e-7;

/// Reflect `v` about the normal `n` (`v - 2(v·n)n`).
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}
