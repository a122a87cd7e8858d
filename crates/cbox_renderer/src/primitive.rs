//! Primitive enum and ray-hit records.
//!
//! All shapes live in one arena owned by the scene and are addressed by
//! `PrimitiveId`. Dispatch goes through the `Primitive` enum rather than
//! trait objects.

use cbox_math::{BoundingSphere, Ray, Vec3};

use crate::{LightProbe, Material, Plane, Sphere, Triangle};

/// Index of a primitive in the scene arena.
pub type PrimitiveId = usize;

/// Record of the closest intersection along a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Ray parameter of the intersection
    pub lambda: f32,
    /// Primitive that was hit
    pub id: PrimitiveId,
}

impl Hit {
    /// Pick the nearer of two optional hits. Equal distances go to the
    /// smaller id, so the result does not depend on visiting order.
    #[inline]
    pub fn nearest(a: Option<Hit>, b: Option<Hit>) -> Option<Hit> {
        match (a, b) {
            (Some(a), Some(b)) => {
                let b_first = b.lambda < a.lambda || (b.lambda == a.lambda && b.id < a.id);
                Some(if b_first { b } else { a })
            }
            (a, None) => a,
            (None, b) => b,
        }
    }
}

/// Any shape the tracer can intersect.
#[derive(Debug, Clone)]
pub enum Primitive {
    Sphere(Sphere),
    Plane(Plane),
    Triangle(Triangle),
    LightProbe(LightProbe),
}

impl Primitive {
    /// Smallest positive ray parameter of an intersection, if any.
    pub fn closest_hit(&self, ray: &Ray) -> Option<f32> {
        match self {
            Primitive::Sphere(s) => s.closest_hit(ray),
            Primitive::Plane(p) => p.closest_hit(ray),
            Primitive::Triangle(t) => t.closest_hit(ray),
            Primitive::LightProbe(l) => l.closest_hit(ray),
        }
    }

    pub fn normal_at(&self, p: Vec3) -> Vec3 {
        match self {
            Primitive::Sphere(s) => s.normal_at(p),
            Primitive::Plane(pl) => pl.normal_at(p),
            Primitive::Triangle(t) => t.normal_at(p),
            Primitive::LightProbe(l) => l.normal_at(p),
        }
    }

    /// Offset of `p` from the primitive's local origin.
    pub fn to_local(&self, p: Vec3) -> Vec3 {
        match self {
            Primitive::Sphere(s) => s.to_local(p),
            Primitive::Plane(pl) => pl.to_local(p),
            Primitive::Triangle(t) => t.to_local(p),
            Primitive::LightProbe(l) => l.to_local(p),
        }
    }

    /// Local coordinates fed to the material projection.
    pub fn to_local_normalized(&self, p: Vec3) -> Vec3 {
        match self {
            Primitive::Sphere(s) => s.to_local_normalized(p),
            Primitive::Plane(pl) => pl.to_local_normalized(p),
            Primitive::Triangle(t) => t.to_local_normalized(p),
            Primitive::LightProbe(l) => l.to_local_normalized(p),
        }
    }

    pub fn material(&self) -> &Material {
        match self {
            Primitive::Sphere(s) => s.material(),
            Primitive::Plane(p) => p.material(),
            Primitive::Triangle(t) => t.material(),
            Primitive::LightProbe(l) => l.material(),
        }
    }

    /// Bounding sphere, or `None` for unbounded planes.
    pub fn bounds(&self) -> Option<BoundingSphere> {
        match self {
            Primitive::Sphere(s) => Some(s.bounds()),
            Primitive::Plane(_) => None,
            Primitive::Triangle(t) => Some(t.bounds()),
            Primitive::LightProbe(l) => Some(l.bounds()),
        }
    }

    pub fn is_light_probe(&self) -> bool {
        matches!(self, Primitive::LightProbe(_))
    }
}

impl From<Sphere> for Primitive {
    fn from(s: Sphere) -> Self {
        Primitive::Sphere(s)
    }
}

impl From<Plane> for Primitive {
    fn from(p: Plane) -> Self {
        Primitive::Plane(p)
    }
}

impl From<Triangle> for Primitive {
    fn from(t: Triangle) -> Self {
        Primitive::Triangle(t)
    }
}

impl From<LightProbe> for Primitive {
    fn from(l: LightProbe) -> Self {
        Primitive::LightProbe(l)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearest_prefers_smaller_lambda() {
        let a = Some(Hit { lambda: 2.0, id: 0 });
        let b = Some(Hit { lambda: 1.0, id: 1 });

        assert_eq!(Hit::nearest(a, b), b);
        assert_eq!(Hit::nearest(a, None), a);
        assert_eq!(Hit::nearest(None, b), b);
        assert_eq!(Hit::nearest(None, None), None);
    }

    #[test]
    fn test_nearest_tie_prefers_smaller_id() {
        let a = Some(Hit { lambda: 1.0, id: 0 });
        let b = Some(Hit { lambda: 1.0, id: 1 });
        assert_eq!(Hit::nearest(a, b), a);
        assert_eq!(Hit::nearest(b, a), a);
    }

    #[test]
    fn test_planes_are_unbounded() {
        let plane: Primitive = Plane::new(Vec3::Y, Vec3::ZERO, Material::default()).into();
        let sphere: Primitive = Sphere::new(Vec3::ZERO, 1.0, Material::default()).into();

        assert!(plane.bounds().is_none());
        assert_eq!(sphere.bounds(), Some(BoundingSphere::new(Vec3::ZERO, 1.0)));
        assert!(!sphere.is_light_probe());
    }
}
