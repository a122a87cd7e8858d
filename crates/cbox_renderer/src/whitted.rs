//! Whitted-style recursive ray tracer.
//!
//! Direct lighting from point lights with Phong specular, hard shadows and
//! mirror reflection with a Schlick-style weight. Deterministic: no random
//! sampling happens here.

use cbox_math::{reflect, Ray, Vec3};
use serde::{Deserialize, Serialize};

use crate::{Color, Light, Scene};

/// Reflection rays stop at this recursion depth.
pub const MAX_REFLECTION_DEPTH: u32 = 3;

/// Light fraction that reaches a shadowed point.
pub const SHADOW_FACTOR: f32 = 0.2;

const SHADOW_BIAS: f32 = 1e-4;
const REFLECTION_BIAS: f32 = 1e-3;

/// Feature switches for the Whitted tracer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WhittedOptions {
    pub diffuse: bool,
    pub specular: bool,
    pub reflection: bool,
    pub shadows: bool,
}

impl Default for WhittedOptions {
    fn default() -> Self {
        Self {
            diffuse: true,
            specular: true,
            reflection: true,
            shadows: true,
        }
    }
}

/// Whitted tracer over a built scene.
pub struct WhittedTracer<'a> {
    scene: &'a Scene,
    options: WhittedOptions,
}

impl<'a> WhittedTracer<'a> {
    pub fn new(scene: &'a Scene, options: WhittedOptions) -> Self {
        Self { scene, options }
    }

    /// Radiance arriving along `ray`.
    pub fn trace(&self, ray: &Ray) -> Color {
        self.shade(ray, 0).0
    }

    /// Radiance along `ray` and the deepest reflection level reached.
    pub fn trace_with_depth(&self, ray: &Ray) -> (Color, u32) {
        self.shade(ray, 0)
    }

    fn shade(&self, ray: &Ray, depth: u32) -> (Color, u32) {
        let Some(hit) = self.scene.closest_hit(ray) else {
            return (Color::ZERO, depth);
        };

        let primitive = self.scene.primitive(hit.id);
        let material = primitive.material();
        let point = ray.at(hit.lambda);
        let albedo = material.albedo(primitive.to_local_normalized(point));
        let environment = self.scene.environment();

        if primitive.is_light_probe() {
            return (environment + albedo * material.emission, depth);
        }

        let normal = primitive.normal_at(point);
        let mut diffuse = Color::ZERO;
        let mut specular = Color::ZERO;

        for light in self.scene.lights() {
            let to_light = light.position - point;
            let l = to_light.normalize();
            let falloff = light.falloff(to_light.length_squared());
            let shadow = if self.options.shadows {
                self.shadow_factor(point, normal, l, light)
            } else {
                1.0
            };

            let n_dot_l = normal.dot(l).max(0.0);
            let radiance = light.color * light.intensity;

            if self.options.diffuse {
                diffuse += radiance * n_dot_l * shadow * albedo / falloff;
            }

            if self.options.specular {
                let mirrored = (2.0 * n_dot_l * normal - l).normalize_or_zero();
                let phong = mirrored
                    .dot(-ray.direction())
                    .max(0.0)
                    .powi(material.specular_exponent);
                specular += radiance * phong * shadow * material.specular_coefficient / falloff;
            }
        }

        let mut color = environment + diffuse + specular;
        let mut deepest = depth;

        if self.options.reflection
            && depth < MAX_REFLECTION_DEPTH
            && material.reflectivity > 0.0
        {
            let r = reflect(ray.direction(), normal).normalize();
            let kr = material.reflectivity;
            let weight = kr + (1.0 - kr) * (1.0 - normal.dot(r)).powi(5);

            let bounce = Ray::new(point + r * REFLECTION_BIAS, r);
            let (reflected, level) = self.shade(&bounce, depth + 1);
            color += reflected * weight;
            deepest = level;
        }

        (color, deepest)
    }

    /// `SHADOW_FACTOR` if a non-probe primitive sits between `point` and the
    /// light, otherwise 1.
    fn shadow_factor(&self, point: Vec3, normal: Vec3, l: Vec3, light: &Light) -> f32 {
        let origin = point + l * SHADOW_BIAS + normal * SHADOW_BIAS;
        let ray = Ray::new(origin, l);

        match self.scene.closest_hit(&ray) {
            Some(hit)
                if !self.scene.primitive(hit.id).is_light_probe()
                    && hit.lambda * hit.lambda < light.position.distance_squared(point) =>
            {
                SHADOW_FACTOR
            }
            _ => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LightProbe, Material, Plane, Primitive, SceneDescription, Sphere};
    use cbox_core::Texture;
    use std::sync::Arc;

    fn lit_floor(with_occluder: bool) -> Scene {
        let mut objects = Vec::new();
        if with_occluder {
            objects.push(Sphere::new(Vec3::new(0.0, 2.5, 0.0), 0.5, Material::default()).into());
        }
        floor_with(objects)
    }

    fn floor_with(objects: Vec<Primitive>) -> Scene {
        Scene::build(SceneDescription {
            objects,
            planes: vec![Plane::new(Vec3::Y, Vec3::ZERO, Material::solid(Color::new(0.8, 0.6, 0.4)))],
            lights: vec![Light::new(Vec3::new(0.0, 5.0, 0.0), Color::ONE, 1.0)],
            ..Default::default()
        })
        .unwrap()
    }

    fn diffuse_only() -> WhittedOptions {
        WhittedOptions {
            diffuse: true,
            specular: false,
            reflection: false,
            shadows: true,
        }
    }

    #[test]
    fn test_miss_is_black() {
        let scene = Scene::build(SceneDescription::default()).unwrap();
        let tracer = WhittedTracer::new(&scene, WhittedOptions::default());
        assert_eq!(tracer.trace(&Ray::new(Vec3::ZERO, Vec3::Z)), Color::ZERO);
    }

    #[test]
    fn test_shadow_scales_diffuse() {
        // Aim at the floor origin from the side, below the occluder
        let ray = Ray::new(Vec3::new(3.0, 1.0, 0.0), Vec3::new(-3.0, -1.0, 0.0));

        let lit = lit_floor(false);
        let shadowed = lit_floor(true);
        let lit = WhittedTracer::new(&lit, diffuse_only()).trace(&ray);
        let shadowed = WhittedTracer::new(&shadowed, diffuse_only()).trace(&ray);

        assert!(lit.x > 0.0);
        assert!((shadowed - lit * SHADOW_FACTOR).abs().max_element() < 1e-6);
    }

    #[test]
    fn test_shadows_disabled() {
        let ray = Ray::new(Vec3::new(3.0, 1.0, 0.0), Vec3::new(-3.0, -1.0, 0.0));
        let options = WhittedOptions {
            shadows: false,
            ..diffuse_only()
        };

        let lit = lit_floor(false);
        let occluded = lit_floor(true);
        assert_eq!(
            WhittedTracer::new(&lit, options).trace(&ray),
            WhittedTracer::new(&occluded, options).trace(&ray)
        );
    }

    #[test]
    fn test_reflection_depth_is_bounded() {
        let mirror = Material::solid(Color::ONE).with_reflectivity(1.0);
        let scene = Scene::build(SceneDescription {
            planes: vec![
                Plane::new(Vec3::Z, Vec3::new(0.0, 0.0, -1.0), mirror.clone()),
                Plane::new(-Vec3::Z, Vec3::new(0.0, 0.0, 1.0), mirror),
            ],
            lights: vec![Light::new(Vec3::ZERO, Color::ONE, 1.0)],
            ..Default::default()
        })
        .unwrap();

        let tracer = WhittedTracer::new(&scene, WhittedOptions::default());
        let (color, depth) = tracer.trace_with_depth(&Ray::new(Vec3::ZERO, Vec3::Z));
        assert_eq!(depth, MAX_REFLECTION_DEPTH);
        assert!(color.is_finite());
    }

    #[test]
    fn test_light_probe_casts_no_shadow() {
        // Small probe between the floor origin and the light
        let center = Vec3::new(0.0, 4.5, 0.0);
        let texture = Arc::new(Texture::solid_color(Vec3::splat(0.5)));
        let with_probe = floor_with(vec![LightProbe::new(center, 0.2, texture).into()]);
        let with_sphere = floor_with(vec![Sphere::new(center, 0.2, Material::default()).into()]);
        let open = floor_with(Vec::new());

        let light = with_probe.lights()[0];
        let tracer = WhittedTracer::new(&with_probe, diffuse_only());
        assert_eq!(tracer.shadow_factor(Vec3::ZERO, Vec3::Y, Vec3::Y, &light), 1.0);

        let blocked = WhittedTracer::new(&with_sphere, diffuse_only());
        assert_eq!(blocked.shadow_factor(Vec3::ZERO, Vec3::Y, Vec3::Y, &light), SHADOW_FACTOR);

        let ray = Ray::new(Vec3::new(3.0, 1.0, 0.0), Vec3::new(-3.0, -1.0, 0.0));
        assert_eq!(
            tracer.trace(&ray),
            WhittedTracer::new(&open, diffuse_only()).trace(&ray)
        );
    }

    #[test]
    fn test_light_probe_hit_ignores_lights() {
        let probe_color = Color::new(0.3, 0.5, 0.7);
        let environment = Color::splat(0.1);
        let probe_scene = |lights: Vec<Light>| {
            let texture = Arc::new(Texture::solid_color(probe_color));
            Scene::build(SceneDescription {
                objects: vec![
                    LightProbe::new(Vec3::ZERO, 10.0, texture).into(),
                    // Sits between the lights and the probe wall
                    Sphere::new(Vec3::new(0.0, 8.0, 0.0), 1.0, Material::default()).into(),
                ],
                lights,
                environment,
                ..Default::default()
            })
            .unwrap()
        };

        let dark = probe_scene(Vec::new());
        let lit = probe_scene(vec![
            Light::new(Vec3::new(0.0, 9.5, 0.0), Color::ONE, 1.0),
            Light::new(Vec3::new(2.0, 0.0, 0.0), Color::new(1.0, 0.0, 0.0), 2.0),
            Light::new(Vec3::new(0.0, 0.0, -3.0), Color::ONE, 0.5),
        ]);

        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        let expected = environment + probe_color;
        for scene in [&dark, &lit] {
            let c = WhittedTracer::new(scene, WhittedOptions::default()).trace(&ray);
            assert!((c - expected).abs().max_element() < 1e-6, "{c}");
        }
    }
}
