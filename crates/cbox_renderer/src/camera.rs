//! Camera for ray generation.
//!
//! A pinhole camera looking from `eye` toward `look_at` with world up `+Y`.
//! The image plane sits at the look-at distance, so depth of field keeps
//! the look-at point in focus.

use cbox_math::{Quat, Ray, Vec3};

use crate::RenderSession;

/// Camera for generating rays into the scene.
#[derive(Debug, Clone)]
pub struct Camera {
    pub image_width: u32,
    pub image_height: u32,

    eye: Vec3,
    look_at: Vec3,
    fov: f32,
    aperture: f32,

    // Cached basis
    to_target: Vec3,
    right: Vec3,
    up: Vec3,
    plane_size: f32,
}

impl Camera {
    /// Create a camera with a field of view in degrees.
    pub fn new(eye: Vec3, look_at: Vec3, fov: f32, image_width: u32, image_height: u32) -> Self {
        let to_target = look_at - eye;
        let forward = to_target.normalize();
        let right = Vec3::Y.cross(forward);
        let up = -right.cross(forward);
        let plane_size = 2.0 * (fov.to_radians() / 2.0).tan() * to_target.length();

        Self {
            image_width: image_width.max(1),
            image_height: image_height.max(1),
            eye,
            look_at,
            fov,
            aperture: 0.0,
            to_target,
            right,
            up,
            plane_size,
        }
    }

    /// Set the lens aperture radius. Zero disables depth of field.
    pub fn with_aperture(mut self, aperture: f32) -> Self {
        self.aperture = aperture.max(0.0);
        self
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

    pub fn aperture(&self) -> f32 {
        self.aperture
    }

    /// Unnormalized direction through image position `(px, py)`.
    ///
    /// Pixel coordinates map linearly onto the image plane with `(0, 0)` at
    /// one corner and `(width, height)` at the other.
    pub fn direction(&self, px: f32, py: f32) -> Vec3 {
        let h = self.plane_size;
        let x = px * h / self.image_width as f32 - h / 2.0;
        let y = py * h / self.image_height as f32 - h / 2.0;
        self.to_target + self.right * x + self.up * y
    }

    /// Primary ray through `(px, py)`, with a lens sample when the aperture
    /// is open.
    pub fn primary_ray(&self, px: f32, py: f32, session: &RenderSession) -> Ray {
        let d = self.direction(px, py);
        if self.aperture > 0.0 {
            self.depth_of_field(d, session)
        } else {
            Ray::new(self.eye, d)
        }
    }

    /// Offset the ray origin across the lens while keeping the point at the
    /// look-at distance fixed.
    fn depth_of_field(&self, d: Vec3, session: &RenderSession) -> Ray {
        let (r, theta) = session.disk_sample();
        let x = r * theta.sin() * self.aperture;
        let y = r * theta.cos() * self.aperture;

        let forward = self.to_target.normalize();
        let nx = Vec3::Y.cross(forward).normalize();
        let ny = nx.cross(forward).normalize();

        let origin = self.eye + nx * x + ny * y;
        let focus = self.eye + d;
        Ray::new(origin, focus - origin)
    }

    /// Rotate the initial view vector about X by `elevation` then about Y
    /// by `azimuth` (radians) and return the resulting look-at point.
    pub fn orbit(eye: Vec3, initial_look_at: Vec3, elevation: f32, azimuth: f32) -> Vec3 {
        let rotation = Quat::from_rotation_y(azimuth) * Quat::from_rotation_x(elevation);
        eye + rotation * (initial_look_at - eye)
    }
}
