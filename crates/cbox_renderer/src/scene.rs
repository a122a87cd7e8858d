//! Scene assembly and closest-hit queries.
//!
//! A `SceneDescription` is the plain input: objects, planes, meshes, lights
//! and camera placement. `Scene::build` flattens meshes into triangles,
//! stores everything in one primitive arena and, when acceleration is on,
//! builds the bounding sphere hierarchy over the bounded primitives.

use std::time::Instant;

use cbox_core::{MeshData, MeshError, TextureError};
use cbox_math::{Ray, Vec3};
use thiserror::Error;

use crate::{BvhNode, Camera, Color, Hit, Light, Material, MaterialError, Plane, Primitive, PrimitiveId, Triangle};

/// Errors raised while assembling a scene.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Mesh error: {0}")]
    Mesh(#[from] MeshError),

    #[error("Texture error: {0}")]
    Texture(#[from] TextureError),

    #[error("Material error: {0}")]
    Material(#[from] MaterialError),
}

pub type SceneResult<T> = Result<T, SceneError>;

/// A mesh together with the material of all its faces.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub data: MeshData,
    pub material: Material,
}

impl Mesh {
    pub fn new(data: MeshData, material: Material) -> Self {
        Self { data, material }
    }
}

/// Everything needed to build a scene.
#[derive(Debug, Clone)]
pub struct SceneDescription {
    pub objects: Vec<Primitive>,
    pub planes: Vec<Plane>,
    pub meshes: Vec<Mesh>,
    pub lights: Vec<Light>,
    /// Ambient radiance added to every lit hit
    pub environment: Color,
    pub eye: Vec3,
    pub look_at: Vec3,
    /// Field of view in degrees
    pub fov: f32,
    /// Use the bounding sphere hierarchy instead of a linear scan
    pub use_acceleration: bool,
}

impl Default for SceneDescription {
    fn default() -> Self {
        Self {
            objects: Vec::new(),
            planes: Vec::new(),
            meshes: Vec::new(),
            lights: Vec::new(),
            environment: Color::ZERO,
            eye: Vec3::new(0.0, 0.0, -4.0),
            look_at: Vec3::new(0.0, 0.0, 6.0),
            fov: 36.0,
            use_acceleration: true,
        }
    }
}

/// A built, render-ready scene.
#[derive(Debug)]
pub struct Scene {
    primitives: Vec<Primitive>,
    /// Bounded primitives, scanned linearly when there is no hierarchy
    bounded: Vec<PrimitiveId>,
    /// Unbounded primitives, always scanned linearly
    unbounded: Vec<PrimitiveId>,
    hierarchy: Option<BvhNode>,
    lights: Vec<Light>,
    environment: Color,
    eye: Vec3,
    look_at: Vec3,
    fov: f32,
}

impl Scene {
    /// Assemble a scene, flattening meshes and building the hierarchy.
    pub fn build(desc: SceneDescription) -> SceneResult<Self> {
        let start = Instant::now();

        let mut primitives = desc.objects;
        for mesh in &desc.meshes {
            for corners in mesh.data.triangles()? {
                primitives.push(Triangle::new(corners, mesh.material.clone()).into());
            }
        }
        primitives.extend(desc.planes.into_iter().map(Primitive::from));

        let (bounded, unbounded): (Vec<PrimitiveId>, Vec<PrimitiveId>) =
            (0..primitives.len()).partition(|&id| primitives[id].bounds().is_some());

        let hierarchy = if desc.use_acceleration {
            let bvh_start = Instant::now();
            let leaves = bounded
                .iter()
                .filter_map(|&id| primitives[id].bounds().map(|b| BvhNode::leaf(id, b)))
                .collect();
            let hierarchy = BvhNode::build(leaves);

            if let Some(root) = &hierarchy {
                let stats = root.stats();
                log::info!(
                    "Hierarchy built in {:.2?}: {} nodes, {} leaves, depth {}",
                    bvh_start.elapsed(),
                    stats.nodes,
                    stats.leaves,
                    stats.depth
                );
            }
            hierarchy
        } else {
            None
        };

        log::info!(
            "Scene built in {:.2?}: {} primitives ({} bounded, {} planes), {} lights",
            start.elapsed(),
            primitives.len(),
            bounded.len(),
            unbounded.len(),
            desc.lights.len()
        );

        Ok(Self {
            primitives,
            bounded,
            unbounded,
            hierarchy,
            lights: desc.lights,
            environment: desc.environment,
            eye: desc.eye,
            look_at: desc.look_at,
            fov: desc.fov,
        })
    }

    /// Closest intersection along `ray`, through the hierarchy if one was
    /// built.
    pub fn closest_hit(&self, ray: &Ray) -> Option<Hit> {
        let bounded = match &self.hierarchy {
            Some(root) => root.closest_hit(ray, &self.primitives),
            None => self.scan(&self.bounded, ray),
        };
        Hit::nearest(bounded, self.scan(&self.unbounded, ray))
    }

    /// Closest intersection by testing every primitive.
    pub fn closest_hit_linear(&self, ray: &Ray) -> Option<Hit> {
        Hit::nearest(self.scan(&self.bounded, ray), self.scan(&self.unbounded, ray))
    }

    fn scan(&self, ids: &[PrimitiveId], ray: &Ray) -> Option<Hit> {
        ids.iter().fold(None, |best, &id| {
            let hit = self.primitives[id]
                .closest_hit(ray)
                .map(|lambda| Hit { lambda, id });
            Hit::nearest(best, hit)
        })
    }

    pub fn primitive(&self, id: PrimitiveId) -> &Primitive {
        &self.primitives[id]
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn hierarchy(&self) -> Option<&BvhNode> {
        self.hierarchy.as_ref()
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn environment(&self) -> Color {
        self.environment
    }

    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    pub fn look_at(&self) -> Vec3 {
        self.look_at
    }

    pub fn fov(&self) -> f32 {
        self.fov
    }

    /// Point the camera somewhere else between render passes.
    pub fn set_look_at(&mut self, look_at: Vec3) {
        self.look_at = look_at;
    }

    /// Camera for an image of the given size.
    pub fn camera(&self, width: u32, height: u32) -> Camera {
        Camera::new(self.eye, self.look_at, self.fov, width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Sphere;
    use cbox_core::Face;

    fn two_spheres(use_acceleration: bool) -> SceneDescription {
        SceneDescription {
            objects: vec![
                Sphere::new(Vec3::new(0.0, 0.0, 5.0), 1.0, Material::default()).into(),
                Sphere::new(Vec3::new(0.0, 0.0, 10.0), 1.0, Material::default()).into(),
            ],
            planes: vec![Plane::new(-Vec3::Z, Vec3::new(0.0, 0.0, 20.0), Material::default())],
            use_acceleration,
            ..Default::default()
        }
    }

    #[test]
    fn test_closest_hit_prefers_nearest() {
        for accel in [true, false] {
            let scene = Scene::build(two_spheres(accel)).unwrap();
            let hit = scene.closest_hit(&Ray::new(Vec3::ZERO, Vec3::Z)).unwrap();
            assert_eq!(hit.id, 0);
            assert!((hit.lambda - 4.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_plane_behind_bounded_objects() {
        let scene = Scene::build(two_spheres(true)).unwrap();

        // Miss both spheres, hit the back plane
        let hit = scene.closest_hit(&Ray::new(Vec3::new(3.0, 0.0, 0.0), Vec3::Z)).unwrap();
        assert_eq!(hit.id, 2);
        assert!(matches!(scene.primitive(hit.id), Primitive::Plane(_)));
        assert!((hit.lambda - 20.0).abs() < 1e-4);
    }

    #[test]
    fn test_flat_scan_has_no_hierarchy() {
        let scene = Scene::build(two_spheres(false)).unwrap();
        assert!(scene.hierarchy().is_none());

        let scene = Scene::build(two_spheres(true)).unwrap();
        assert_eq!(scene.hierarchy().unwrap().stats().leaves, 2);
    }

    #[test]
    fn test_mesh_flattened_into_triangles() {
        let data = MeshData::new(
            vec![
                Vec3::new(-1.0, -1.0, 3.0),
                Vec3::new(1.0, -1.0, 3.0),
                Vec3::new(1.0, 1.0, 3.0),
                Vec3::new(-1.0, 1.0, 3.0),
            ],
            vec![-Vec3::Z],
            vec![Face::new([1, 2, 3], [1, 1, 1]), Face::new([1, 3, 4], [1, 1, 1])],
        );
        let desc = SceneDescription {
            meshes: vec![Mesh::new(data, Material::default())],
            ..Default::default()
        };
        let scene = Scene::build(desc).unwrap();

        assert_eq!(scene.primitives().len(), 2);
        let hit = scene.closest_hit(&Ray::new(Vec3::new(-0.5, 0.5, 0.0), Vec3::Z)).unwrap();
        assert!((hit.lambda - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_bad_mesh_index_is_an_error() {
        let data = MeshData::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            vec![Vec3::Z],
            vec![Face::new([1, 2, 9], [1, 1, 1])],
        );
        let desc = SceneDescription {
            meshes: vec![Mesh::new(data, Material::default())],
            ..Default::default()
        };

        assert!(matches!(
            Scene::build(desc),
            Err(SceneError::Mesh(MeshError::VertexOutOfRange { index: 9, .. }))
        ));
    }

    #[test]
    fn test_set_look_at_moves_camera() {
        let mut scene = Scene::build(SceneDescription::default()).unwrap();
        scene.set_look_at(Vec3::new(1.0, 0.0, 6.0));

        let camera = scene.camera(10, 10);
        assert_eq!(camera.look_at(), Vec3::new(1.0, 0.0, 6.0));
        assert!(scene.closest_hit(&Ray::new(Vec3::ZERO, Vec3::Z)).is_none());
    }
}
