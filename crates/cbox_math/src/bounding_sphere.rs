use crate::{Ray, Vec3};

/// A bounding sphere used by the acceleration hierarchy.
///
/// Every bounded primitive exposes one, and every internal hierarchy node
/// stores the smallest sphere enclosing both of its children.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl BoundingSphere {
    /// Create a new bounding sphere.
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
        }
    }

    /// Minimal sphere around a triangle.
    ///
    /// Obtuse (and right or degenerate) triangles are bounded by the sphere
    /// whose diameter is the longest side. Acute triangles use the
    /// circumcenter; the radius is measured to the farthest vertex so the
    /// vertices are contained even under rounding.
    pub fn from_triangle(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        // (side length squared, endpoints) with the opposite vertex implied
        let mut sides = [
            (v0.distance_squared(v1), v0, v1),
            (v1.distance_squared(v2), v1, v2),
            (v2.distance_squared(v0), v2, v0),
        ];
        sides.sort_by(|a, b| b.0.total_cmp(&a.0));

        let (longest_sq, a, b) = sides[0];
        if longest_sq >= sides[1].0 + sides[2].0 {
            return Self::new((a + b) * 0.5, longest_sq.sqrt() * 0.5);
        }

        // http://en.wikipedia.org/wiki/Circumscribed_circle
        let alpha = v0 - v2;
        let beta = v1 - v2;
        let axb = alpha.cross(beta);
        let numerator = (beta * alpha.length_squared() - alpha * beta.length_squared()).cross(axb);
        let center = numerator / (2.0 * axb.length_squared()) + v2;

        let radius = center
            .distance(v0)
            .max(center.distance(v1))
            .max(center.distance(v2));
        Self::new(center, radius)
    }

    /// Smallest sphere enclosing two spheres.
    ///
    /// If one sphere already contains the other, the larger one is reused.
    pub fn merge(first: &BoundingSphere, second: &BoundingSphere) -> Self {
        let offset = second.center - first.center;
        let d = offset.length();

        if d + first.radius <= second.radius {
            return *second;
        }
        if d + second.radius <= first.radius {
            return *first;
        }

        let radius = (d + first.radius + second.radius) / 2.0;
        let center = first.center + offset / d * (radius - first.radius);
        Self { center, radius }
    }

    /// Returns true if `other` lies entirely inside this sphere.
    pub fn contains(&self, other: &BoundingSphere) -> bool {
        self.center.distance(other.center) + other.radius <= self.radius + 1e-4
    }

    /// Returns true if the point lies inside (or on) this sphere.
    pub fn contains_point(&self, p: Vec3) -> bool {
        self.center.distance(p) <= self.radius + 1e-4
    }

    /// Conservative ray test.
    ///
    /// Rejects the sphere only when the ray's line misses it or the sphere lies
    /// entirely behind the ray origin (both roots negative).
    pub fn may_intersect(&self, ray: &Ray) -> bool {
        let ce = ray.origin() - self.center;
        let b = ray.direction().dot(ce);
        let disc = b * b - ce.length_squared() + self.radius * self.radius;

        if disc < 0.0 {
            return false;
        }

        let sqrt = disc.sqrt();
        -b + sqrt > 0.0 || -b - sqrt > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_disjoint_spheres() {
        let a = BoundingSphere::new(Vec3::ZERO, 1.0);
        let b = BoundingSphere::new(Vec3::new(4.0, 0.0, 0.0), 1.0);
        let merged = BoundingSphere::merge(&a, &b);

        assert!((merged.radius - 3.0).abs() < 1e-6);
        assert!((merged.center - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-6);
        assert!(merged.contains(&a));
        assert!(merged.contains(&b));
    }

    #[test]
    fn test_merge_uneven_spheres() {
        let a = BoundingSphere::new(Vec3::ZERO, 0.5);
        let b = BoundingSphere::new(Vec3::new(0.0, 3.0, 0.0), 2.0);
        let merged = BoundingSphere::merge(&a, &b);

        // (d + r1 + r2) / 2 = (3 + 0.5 + 2) / 2
        assert!((merged.radius - 2.75).abs() < 1e-6);
        assert!((merged.center - Vec3::new(0.0, 2.25, 0.0)).length() < 1e-6);
        assert!(merged.contains(&a));
        assert!(merged.contains(&b));
    }

    #[test]
    fn test_merge_reuses_containing_sphere() {
        let big = BoundingSphere::new(Vec3::ZERO, 5.0);
        let small = BoundingSphere::new(Vec3::new(1.0, 1.0, 0.0), 1.0);

        assert_eq!(BoundingSphere::merge(&big, &small), big);
        assert_eq!(BoundingSphere::merge(&small, &big), big);
    }

    #[test]
    fn test_merge_concentric_equal_spheres() {
        let a = BoundingSphere::new(Vec3::ONE, 1.0);
        let merged = BoundingSphere::merge(&a, &a);
        assert!(merged.center.is_finite());
        assert_eq!(merged, a);
    }

    #[test]
    fn test_obtuse_triangle_uses_longest_side() {
        let sphere = BoundingSphere::from_triangle(
            Vec3::new(-2.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(0.0, 0.5, 0.0),
        );

        assert!((sphere.center - Vec3::ZERO).length() < 1e-6);
        assert!((sphere.radius - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_acute_triangle_uses_circumcircle() {
        // Equilateral triangle around the origin with circumradius 1
        let v0 = Vec3::new(1.0, 0.0, 0.0);
        let v1 = Vec3::new(-0.5, 0.75f32.sqrt(), 0.0);
        let v2 = Vec3::new(-0.5, -(0.75f32.sqrt()), 0.0);
        let sphere = BoundingSphere::from_triangle(v0, v1, v2);

        assert!(sphere.center.length() < 1e-5);
        assert!((sphere.radius - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_triangle_sphere_contains_vertices() {
        let triangles = [
            [Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.1, 0.3), Vec3::new(0.4, 1.2, -0.2)],
            [Vec3::new(3.0, 1.0, 2.0), Vec3::new(3.5, 1.0, 2.0), Vec3::new(3.2, 1.4, 2.1)],
            [Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0)],
        ];

        for [v0, v1, v2] in triangles {
            let sphere = BoundingSphere::from_triangle(v0, v1, v2);
            assert!(sphere.contains_point(v0));
            assert!(sphere.contains_point(v1));
            assert!(sphere.contains_point(v2));
        }
    }

    #[test]
    fn test_may_intersect() {
        let sphere = BoundingSphere::new(Vec3::new(0.0, 0.0, 5.0), 1.0);

        assert!(sphere.may_intersect(&Ray::new(Vec3::ZERO, Vec3::Z)));
        // Behind the origin
        assert!(!sphere.may_intersect(&Ray::new(Vec3::ZERO, -Vec3::Z)));
        // Line misses
        assert!(!sphere.may_intersect(&Ray::new(Vec3::new(3.0, 0.0, 0.0), Vec3::Z)));
        // Origin inside
        assert!(sphere.may_intersect(&Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::X)));
    }
}
