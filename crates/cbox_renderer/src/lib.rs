//! Cornell Box Renderer - CPU ray tracing
//!
//! An offline ray tracer with two integrators:
//!
//! - **Whitted**: point lights, Phong specular, hard shadows and recursive
//!   mirror reflection
//! - **Path tracing**: a small-sample Monte Carlo estimator for emissive
//!   scenes
//!
//! Scenes hold spheres, infinite planes, triangle meshes and light probes.
//! Bounded primitives are organised in a bounding sphere hierarchy built by
//! sweep merging closest pairs.

mod bvh;
mod camera;
mod light;
mod light_probe;
mod material;
mod path;
mod plane;
mod primitive;
mod renderer;
mod scene;
mod session;
mod sphere;
mod triangle;
mod whitted;

pub use bvh::{BvhNode, BvhStats};
pub use camera::Camera;
pub use light::{Light, DEFAULT_ATTENUATION};
pub use light_probe::LightProbe;
pub use material::{Color, Material, MaterialError, ProjectionMode, Tiling};
pub use path::{PathIntegrator, DEFAULT_PATH_SAMPLES, MAX_PATH_DEPTH, SECONDARY_PATH_SAMPLES};
pub use plane::Plane;
pub use primitive::{Hit, Primitive, PrimitiveId};
pub use renderer::{
    color_to_rgba, render, render_pixel, trace_ray, AntiAliasing, ImageBuffer, Integrator,
    RenderConfig, RenderOutput, GAUSSIAN_SAMPLES, LENS_SAMPLES, SUPERSAMPLE_GRID,
};
pub use scene::{Mesh, Scene, SceneDescription, SceneError, SceneResult};
pub use session::{RenderSession, DEFAULT_SAMPLE_TABLE_SIZE};
pub use sphere::Sphere;
pub use triangle::Triangle;
pub use whitted::{WhittedOptions, WhittedTracer, MAX_REFLECTION_DEPTH, SHADOW_FACTOR};

/// Re-export math types from cbox_math
pub use cbox_math::{BoundingSphere, Ray, Vec2, Vec3};
