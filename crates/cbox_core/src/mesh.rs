//! Mesh geometry as handed to the ray tracer.
//!
//! A mesh is a set of vertex positions, vertex normals and triangular faces.
//! Faces reference positions and normals through separate 1-based indices,
//! matching the Wavefront OBJ `f v//vn` convention. The renderer flattens a
//! mesh into individual triangle primitives when the scene is built.

use std::io::BufRead;
use std::path::Path;

use cbox_math::Vec3;
use thiserror::Error;

/// Errors that can occur while loading or flattening a mesh.
#[derive(Error, Debug)]
pub enum MeshError {
    #[error("Failed to load OBJ {path}: {source}")]
    Obj {
        path: String,
        #[source]
        source: tobj::LoadError,
    },

    #[error("Face {face} references vertex {index}, mesh has {count} vertices")]
    VertexOutOfRange { face: usize, index: u32, count: usize },

    #[error("Face {face} references normal {index}, mesh has {count} normals")]
    NormalOutOfRange { face: usize, index: u32, count: usize },
}

pub type MeshResult<T> = Result<T, MeshError>;

/// A triangular face with 1-based vertex and normal indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Face {
    pub vertices: [u32; 3],
    pub normals: [u32; 3],
}

impl Face {
    pub fn new(vertices: [u32; 3], normals: [u32; 3]) -> Self {
        Self { vertices, normals }
    }
}

/// Vertex, normal and face arrays of a triangle mesh.
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    /// Vertex positions
    pub positions: Vec<Vec3>,

    /// Vertex normals (indexed independently of positions)
    pub normals: Vec<Vec3>,

    /// Triangular faces, 1-based indices into `positions` and `normals`
    pub faces: Vec<Face>,
}

impl MeshData {
    /// Create a new mesh from its arrays.
    pub fn new(positions: Vec<Vec3>, normals: Vec<Vec3>, faces: Vec<Face>) -> Self {
        Self {
            positions,
            normals,
            faces,
        }
    }

    /// Load a mesh from a Wavefront OBJ file.
    ///
    /// Polygons are triangulated and all objects in the file are merged into
    /// one mesh. Materials referenced by the file are ignored.
    pub fn load_obj(path: impl AsRef<Path>) -> MeshResult<Self> {
        let path = path.as_ref();
        let (models, _) = tobj::load_obj(path, &load_options()).map_err(|source| MeshError::Obj {
            path: path.display().to_string(),
            source,
        })?;

        let mesh = Self::from_models(&models);
        log::debug!(
            "Loaded mesh: {} ({} vertices, {} faces)",
            path.display(),
            mesh.vertex_count(),
            mesh.face_count()
        );
        Ok(mesh)
    }

    /// Parse a mesh from OBJ text held in memory.
    pub fn from_obj_reader(reader: &mut impl BufRead) -> MeshResult<Self> {
        let (models, _) = tobj::load_obj_buf(reader, &load_options(), |_| {
            Err(tobj::LoadError::OpenFileFailed)
        })
        .map_err(|source| MeshError::Obj {
            path: "<memory>".to_string(),
            source,
        })?;

        Ok(Self::from_models(&models))
    }

    fn from_models(models: &[tobj::Model]) -> Self {
        let mut mesh = MeshData::default();

        for model in models {
            let m = &model.mesh;
            let position_base = mesh.positions.len() as u32;
            let normal_base = mesh.normals.len() as u32;

            mesh.positions.extend(
                m.positions
                    .chunks_exact(3)
                    .map(|p| Vec3::new(p[0], p[1], p[2])),
            );
            mesh.normals.extend(
                m.normals
                    .chunks_exact(3)
                    .map(|n| Vec3::new(n[0], n[1], n[2])),
            );

            let has_normals = m.normal_indices.len() == m.indices.len();

            for (i, tri) in m.indices.chunks_exact(3).enumerate() {
                let vertices = [
                    position_base + tri[0] + 1,
                    position_base + tri[1] + 1,
                    position_base + tri[2] + 1,
                ];

                let normals = if has_normals {
                    let n = &m.normal_indices[i * 3..i * 3 + 3];
                    [
                        normal_base + n[0] + 1,
                        normal_base + n[1] + 1,
                        normal_base + n[2] + 1,
                    ]
                } else {
                    // No normals in the file: one face normal shared by all corners
                    let index = mesh.push_face_normal(vertices);
                    [index; 3]
                };

                mesh.faces.push(Face::new(vertices, normals));
            }
        }

        mesh
    }

    /// Append the geometric normal of a face and return its 1-based index.
    fn push_face_normal(&mut self, vertices: [u32; 3]) -> u32 {
        let p = |i: u32| {
            self.positions
                .get(i as usize - 1)
                .copied()
                .unwrap_or(Vec3::ZERO)
        };
        let (p0, p1, p2) = (p(vertices[0]), p(vertices[1]), p(vertices[2]));

        let normal = (p1 - p0).cross(p2 - p0).normalize_or_zero();
        let normal = if normal == Vec3::ZERO {
            log::warn!("Degenerate face at vertices {:?}", vertices);
            Vec3::Y
        } else {
            normal
        };

        self.normals.push(normal);
        self.normals.len() as u32
    }

    /// Get the number of faces in the mesh.
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Get the number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Resolve every face into its three `(position, normal)` corners.
    ///
    /// Fails on the first index that is zero or past the end of its array.
    pub fn triangles(&self) -> MeshResult<Vec<[(Vec3, Vec3); 3]>> {
        let mut triangles = Vec::with_capacity(self.faces.len());

        for (face_index, face) in self.faces.iter().enumerate() {
            let mut corners = [(Vec3::ZERO, Vec3::ZERO); 3];

            for (corner, (&v, &n)) in corners
                .iter_mut()
                .zip(face.vertices.iter().zip(face.normals.iter()))
            {
                let position = lookup(&self.positions, v).ok_or(MeshError::VertexOutOfRange {
                    face: face_index,
                    index: v,
                    count: self.positions.len(),
                })?;
                let normal = lookup(&self.normals, n).ok_or(MeshError::NormalOutOfRange {
                    face: face_index,
                    index: n,
                    count: self.normals.len(),
                })?;
                *corner = (position, normal);
            }

            triangles.push(corners);
        }

        Ok(triangles)
    }

    /// Center of the vertex positions' bounding box.
    pub fn center(&self) -> Vec3 {
        if self.positions.is_empty() {
            return Vec3::ZERO;
        }

        let (min, max) = self.positions.iter().fold(
            (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
            |(min, max), p| (min.min(*p), max.max(*p)),
        );
        (min + max) * 0.5
    }
}

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        triangulate: true,
        single_index: false,
        ..Default::default()
    }
}

/// 1-based lookup.
fn lookup(values: &[Vec3], index: u32) -> Option<Vec3> {
    index
        .checked_sub(1)
        .and_then(|i| values.get(i as usize))
        .copied()
}
