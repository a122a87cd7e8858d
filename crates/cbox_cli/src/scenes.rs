//! Built-in demo scenes.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use cbox_core::{MeshData, Texture};
use cbox_math::{Vec2, Vec3};
use cbox_renderer::{
    Color, Light, LightProbe, Material, Mesh, Plane, Primitive, ProjectionMode, SceneDescription,
    Sphere, Tiling,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SPHERE_COUNT: usize = 1024;

/// Image files looked up in the `--textures` directory.
pub const TEXTURE_FILES: [&str; 5] = [
    "stone.png",
    "wood.png",
    "brick.png",
    "gravel.png",
    "checkerboard.png",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinScene {
    /// Two spheres in a six-wall box under three coloured lights
    Cornell,
    /// Cornell box lit by an emissive sphere, meant for path tracing
    CornellPath,
    /// Many small random spheres
    Spheres,
    /// A row of spheres receding in depth
    DepthOfField,
    /// An OBJ mesh placed in the Cornell box
    Mesh,
    /// Cornell box with textured walls and spheres
    CornellTextured,
    /// Two spheres over a floor inside an environment light probe
    Skybox,
    /// Checkerboard floor for comparing anti-aliasing modes
    Checkerboard,
}

impl BuiltinScene {
    pub const NAMES: [&'static str; 8] = [
        "cornell",
        "cornell-path",
        "spheres",
        "dof",
        "mesh",
        "cornell-textured",
        "skybox",
        "checkerboard",
    ];
}

/// Files on disk that some scenes are built from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneAssets {
    /// OBJ file for the mesh scene
    pub mesh: Option<PathBuf>,
    /// Raw float angular map for the skybox scene
    pub probe: Option<PathBuf>,
    /// Directory holding `TEXTURE_FILES`
    pub textures: Option<PathBuf>,
}

impl SceneAssets {
    fn texture(&self, name: &str) -> Result<Arc<Texture>> {
        let dir = self
            .textures
            .as_deref()
            .context("this scene needs --textures <dir>")?;
        let path = dir.join(name);
        let texture = Texture::open(&path)
            .with_context(|| format!("loading texture {}", path.display()))?;
        Ok(Arc::new(texture))
    }
}

impl FromStr for BuiltinScene {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "cornell" => BuiltinScene::Cornell,
            "cornell-path" => BuiltinScene::CornellPath,
            "spheres" => BuiltinScene::Spheres,
            "dof" => BuiltinScene::DepthOfField,
            "mesh" => BuiltinScene::Mesh,
            "cornell-textured" => BuiltinScene::CornellTextured,
            "skybox" => BuiltinScene::Skybox,
            "checkerboard" => BuiltinScene::Checkerboard,
            other => bail!(
                "unknown scene '{}', expected one of: {}",
                other,
                BuiltinScene::NAMES.join(", ")
            ),
        })
    }
}

/// 8-bit sRGB-style triple to a linear `[0, 1]` colour.
fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::new(r as f32, g as f32, b as f32) / 255.0
}

/// Describe a built-in scene. `seed` drives random placement; the mesh,
/// skybox and textured scenes read their files from `assets`.
pub fn describe(scene: BuiltinScene, seed: u64, assets: &SceneAssets) -> Result<SceneDescription> {
    Ok(match scene {
        BuiltinScene::Cornell => cornell(),
        BuiltinScene::CornellPath => cornell_path(),
        BuiltinScene::Spheres => random_spheres(seed),
        BuiltinScene::DepthOfField => depth_of_field(),
        BuiltinScene::Mesh => {
            let path = assets
                .mesh
                .as_deref()
                .context("the mesh scene needs --mesh <file.obj>")?;
            mesh_in_box(path)?
        }
        BuiltinScene::CornellTextured => cornell_textured(assets)?,
        BuiltinScene::Skybox => {
            let path = assets
                .probe
                .as_deref()
                .context("the skybox scene needs --probe <file.float>")?;
            skybox(path)?
        }
        BuiltinScene::Checkerboard => checkerboard(assets)?,
    })
}

fn cornell_walls() -> Vec<Plane> {
    let wall = Material::solid(rgb(230, 225, 215));
    vec![
        Plane::new(Vec3::X, Vec3::new(-1.0, 0.0, 0.0), Material::solid(rgb(200, 50, 50))),
        Plane::new(-Vec3::X, Vec3::new(1.0, 0.0, 0.0), Material::solid(rgb(30, 144, 255))),
        Plane::new(-Vec3::Z, Vec3::new(0.0, 0.0, 1.0), wall.clone()),
        Plane::new(Vec3::Z, Vec3::new(0.0, 0.0, -4.1), wall),
        Plane::new(-Vec3::Y, Vec3::new(0.0, 1.0, 0.0), Material::solid(rgb(150, 140, 130))),
        Plane::new(Vec3::Y, Vec3::new(0.0, -1.0, 0.0), Material::solid(Color::ONE)),
    ]
}

fn cornell_lights() -> Vec<Light> {
    vec![
        Light::new(Vec3::new(0.0, -0.98, -0.8), rgb(255, 255, 0), 1.0),
        Light::new(Vec3::new(0.7, -0.98, 0.8), rgb(0, 255, 255), 1.0),
        Light::new(Vec3::new(-0.7, -0.98, 0.8), rgb(138, 43, 226), 1.0),
    ]
}

fn cornell_spheres() -> Vec<Primitive> {
    let polished = Material::solid(rgb(224, 255, 255))
        .with_reflectivity(0.1)
        .with_specular(10, 0.5)
        .with_diffuse(1.5);

    vec![
        Sphere::new(Vec3::new(-0.6, 0.7, -0.6), 0.3, Material::solid(rgb(170, 165, 160))).into(),
        Sphere::new(Vec3::new(0.3, 0.4, 0.3), 0.6, polished).into(),
    ]
}

fn cornell() -> SceneDescription {
    SceneDescription {
        objects: cornell_spheres(),
        planes: cornell_walls(),
        lights: cornell_lights(),
        eye: Vec3::new(0.0, 0.0, -4.0),
        look_at: Vec3::new(0.0, 0.0, 6.0),
        fov: 36.0,
        ..Default::default()
    }
}

fn cornell_path() -> SceneDescription {
    let mut objects = cornell_spheres();
    objects.push(
        Sphere::new(
            Vec3::new(0.0, -0.98, 0.0),
            0.5,
            Material::solid(Color::ONE).with_emission(1.0),
        )
        .into(),
    );

    SceneDescription {
        objects,
        environment: Color::splat(0.1),
        ..cornell()
    }
}

fn random_spheres(seed: u64) -> SceneDescription {
    let mut rng = StdRng::seed_from_u64(seed);
    let eye = Vec3::new(0.0, 3.0, -4.0);

    let objects = (0..SPHERE_COUNT)
        .map(|_| {
            let center = Vec3::new(
                rng.gen_range(-2.0..2.0),
                rng.gen_range(-2.0..2.0),
                rng.gen_range(1.0..2.0),
            );
            let radius = rng.gen_range(0.5..1.5) / 8.0;
            let color = rgb(rng.gen(), rng.gen(), rng.gen());
            Sphere::new(center, radius, Material::solid(color)).into()
        })
        .collect();

    SceneDescription {
        objects,
        lights: vec![Light::new(eye, Color::ONE, 0.6)],
        eye,
        look_at: Vec3::new(0.0, -2.0, 6.0),
        fov: 36.0,
        ..Default::default()
    }
}

fn depth_of_field() -> SceneDescription {
    let colors = [
        rgb(255, 255, 0),
        rgb(0, 0, 255),
        rgb(255, 0, 0),
        rgb(0, 100, 0),
        rgb(60, 179, 113),
        rgb(128, 0, 0),
    ];

    let objects = colors
        .iter()
        .enumerate()
        .map(|(i, &color)| {
            let material = Material::solid(color)
                .with_reflectivity(0.2)
                .with_specular(50, 1.0);
            Sphere::new(Vec3::new(0.0, 0.0, i as f32 - 2.0), 0.3, material).into()
        })
        .collect();

    let floor = Material::solid(Color::ONE)
        .with_reflectivity(0.05)
        .with_specular(20, 1.0);

    SceneDescription {
        objects,
        planes: vec![Plane::new(Vec3::new(0.0, -2.0, 0.0), Vec3::new(0.0, 0.3, 0.0), floor)],
        lights: vec![
            Light::new(Vec3::new(-3.0, -4.0, -2.0), Color::ONE, 1.0),
            Light::new(Vec3::new(-1.0, -4.0, -4.0), Color::ONE, 0.2),
            Light::new(Vec3::new(2.0, -4.0, 3.0), Color::ONE, 0.2),
        ],
        eye: Vec3::new(2.0, 0.0, -4.0),
        look_at: Vec3::ZERO,
        fov: 36.0,
        ..Default::default()
    }
}

fn mesh_in_box(path: &Path) -> Result<SceneDescription> {
    let mut data = MeshData::load_obj(path)
        .with_context(|| format!("loading mesh {}", path.display()))?;

    // Centre the mesh in the box
    let offset = data.center();
    for p in &mut data.positions {
        *p -= offset;
    }
    log::info!(
        "Mesh {}: {} faces, recentred by {}",
        path.display(),
        data.face_count(),
        offset
    );

    let material = Material::solid(rgb(210, 210, 220)).with_specular(20, 0.5);

    Ok(SceneDescription {
        objects: Vec::new(),
        meshes: vec![Mesh::new(data, material)],
        ..cornell()
    })
}

fn cornell_textured(assets: &SceneAssets) -> Result<SceneDescription> {
    let stone = Material::textured(
        assets.texture("stone.png")?,
        ProjectionMode::Spherical,
        Tiling::default(),
    )?
    .with_emission(1.0);

    let wood = Material::textured(
        assets.texture("wood.png")?,
        ProjectionMode::Spherical,
        Tiling::new(Vec2::splat(2.0), Vec2::ZERO),
    )?
    .with_reflectivity(0.1)
    .with_specular(10, 0.5)
    .with_diffuse(1.5)
    .with_emission(0.5);

    let wall = Material::textured(
        assets.texture("brick.png")?,
        ProjectionMode::Planar,
        Tiling::default(),
    )?;
    let ground = Material::textured(
        assets.texture("gravel.png")?,
        ProjectionMode::Planar,
        Tiling::new(Vec2::splat(0.6), Vec2::ZERO),
    )?;

    Ok(SceneDescription {
        objects: vec![
            Sphere::new(Vec3::new(-0.6, 0.7, -0.6), 0.3, stone).into(),
            Sphere::new(Vec3::new(0.3, 0.4, 0.3), 0.6, wood).into(),
        ],
        planes: vec![
            Plane::new(Vec3::X, Vec3::new(-1.0, 0.0, 0.0), wall.clone()),
            Plane::new(-Vec3::X, Vec3::new(1.0, 0.0, 0.0), wall.clone()),
            Plane::new(-Vec3::Z, Vec3::new(0.0, 0.0, 1.0), wall.clone()),
            Plane::new(Vec3::Z, Vec3::new(0.0, 0.0, -4.1), wall),
            Plane::new(-Vec3::Y, Vec3::new(0.0, 1.0, 0.0), ground),
            Plane::new(Vec3::Y, Vec3::new(0.0, -1.0, 0.0), Material::solid(Color::ONE)),
        ],
        ..cornell()
    })
}

/// Lights shared by the open floor scenes.
fn floor_lights() -> Vec<Light> {
    vec![
        Light::new(Vec3::new(-3.0, -4.0, -2.0), Color::ONE, 0.5),
        Light::new(Vec3::new(-1.0, -4.0, -4.0), Color::ONE, 0.2),
        Light::new(Vec3::new(2.0, -4.0, 3.0), Color::ONE, 0.2),
    ]
}

fn skybox(probe: &Path) -> Result<SceneDescription> {
    let texture = Texture::open_raw(probe)
        .with_context(|| format!("loading light probe {}", probe.display()))?;
    log::info!(
        "Light probe {}: {}x{}",
        probe.display(),
        texture.width,
        texture.height
    );

    let shiny = Material::solid(Color::ONE)
        .with_reflectivity(0.2)
        .with_specular(50, 1.0);
    let floor = Material::solid(Color::ONE)
        .with_reflectivity(0.1)
        .with_specular(20, 1.0);

    Ok(SceneDescription {
        objects: vec![
            Sphere::new(Vec3::new(0.6, -0.3, 0.0), 0.6, shiny.clone()).into(),
            Sphere::new(Vec3::new(-0.8, -0.15, -1.0), 0.3, shiny.with_color(Color::ZERO)).into(),
            LightProbe::new(Vec3::ZERO, 10.0, Arc::new(texture)).into(),
        ],
        planes: vec![Plane::new(-Vec3::Y, Vec3::new(0.0, 0.3, 0.0), floor)],
        lights: floor_lights(),
        eye: Vec3::new(-1.0, -2.0, -4.0),
        look_at: Vec3::ZERO,
        fov: 36.0,
        ..Default::default()
    })
}

fn checkerboard(assets: &SceneAssets) -> Result<SceneDescription> {
    let board = Material::textured(
        assets.texture("checkerboard.png")?,
        ProjectionMode::Planar,
        Tiling::default(),
    )?;

    Ok(SceneDescription {
        planes: vec![Plane::new(-Vec3::Y, Vec3::new(0.0, 0.3, 0.0), board)],
        lights: floor_lights(),
        environment: Color::splat(0.5),
        eye: Vec3::new(0.0, -0.3, 0.0),
        look_at: Vec3::new(-1.0, 0.0, 1.0),
        fov: 36.0,
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cbox_renderer::Scene;
    use std::io::Write;

    #[test]
    fn test_parse_scene_names() {
        for name in BuiltinScene::NAMES {
            assert!(name.parse::<BuiltinScene>().is_ok(), "{name}");
        }
        assert!("kitchen".parse::<BuiltinScene>().is_err());
    }

    #[test]
    fn test_builtin_scenes_build() {
        for scene in [
            BuiltinScene::Cornell,
            BuiltinScene::CornellPath,
            BuiltinScene::Spheres,
            BuiltinScene::DepthOfField,
        ] {
            let desc = describe(scene, 1, &SceneAssets::default()).unwrap();
            assert!(Scene::build(desc).is_ok(), "{scene:?}");
        }
    }

    #[test]
    fn test_random_spheres_are_seeded() {
        let a = random_spheres(5);
        let b = random_spheres(5);
        assert_eq!(a.objects.len(), SPHERE_COUNT);

        let bounds = |d: &SceneDescription| -> Vec<_> { d.objects.iter().map(|o| o.bounds()).collect() };
        assert_eq!(bounds(&a), bounds(&b));
    }

    #[test]
    fn test_mesh_scene_requires_path() {
        assert!(describe(BuiltinScene::Mesh, 0, &SceneAssets::default()).is_err());
        assert!(describe(BuiltinScene::Skybox, 0, &SceneAssets::default()).is_err());
        assert!(describe(BuiltinScene::CornellTextured, 0, &SceneAssets::default()).is_err());
        assert!(describe(BuiltinScene::Checkerboard, 0, &SceneAssets::default()).is_err());
    }

    #[test]
    fn test_mesh_scene_recentres() {
        let mut file = tempfile::Builder::new().suffix(".obj").tempfile().unwrap();
        write!(file, "v 2 2 2\nv 4 2 2\nv 2 4 2\nvn 0 0 -1\nf 1//1 2//1 3//1\n").unwrap();

        let assets = SceneAssets {
            mesh: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        let desc = describe(BuiltinScene::Mesh, 0, &assets).unwrap();
        let center = desc.meshes[0].data.center();
        assert!(center.length() < 1e-6);
        assert!(Scene::build(desc).is_ok());
    }

    #[test]
    fn test_textured_scenes_load_textures() {
        let dir = tempfile::tempdir().unwrap();
        for name in TEXTURE_FILES {
            let img = image::RgbImage::from_fn(2, 2, |x, y| {
                if (x + y) % 2 == 0 {
                    image::Rgb([255, 255, 255])
                } else {
                    image::Rgb([0, 0, 0])
                }
            });
            img.save(dir.path().join(name)).unwrap();
        }
        let assets = SceneAssets {
            textures: Some(dir.path().to_path_buf()),
            ..Default::default()
        };

        let desc = describe(BuiltinScene::CornellTextured, 0, &assets).unwrap();
        assert!(desc
            .planes
            .iter()
            .take(5)
            .all(|p| p.material().projection() == ProjectionMode::Planar));
        assert_eq!(
            desc.planes[4].material().tiling(),
            Tiling::new(Vec2::splat(0.6), Vec2::ZERO)
        );
        match &desc.objects[1] {
            Primitive::Sphere(s) => {
                assert_eq!(s.material().projection(), ProjectionMode::Spherical)
            }
            other => panic!("unexpected primitive {other:?}"),
        }
        assert!(Scene::build(desc).is_ok());

        let desc = describe(BuiltinScene::Checkerboard, 0, &assets).unwrap();
        assert!(Scene::build(desc).is_ok());
    }

    #[test]
    fn test_textured_scene_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let assets = SceneAssets {
            textures: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        let err = describe(BuiltinScene::CornellTextured, 0, &assets).unwrap_err();
        assert!(format!("{err:#}").contains("stone.png"));
    }

    #[test]
    fn test_skybox_loads_light_probe() {
        let mut file = tempfile::Builder::new().suffix(".float").tempfile().unwrap();
        // 2x2 RGB floats
        let values = [0.25f32; 12];
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        file.write_all(&bytes).unwrap();

        let assets = SceneAssets {
            probe: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        let desc = describe(BuiltinScene::Skybox, 0, &assets).unwrap();
        assert_eq!(desc.objects.iter().filter(|o| o.is_light_probe()).count(), 1);

        let scene = Scene::build(desc).unwrap();
        // Straight up from the floor, past both spheres, lands on the probe
        let hit = scene
            .closest_hit(&cbox_renderer::Ray::new(Vec3::new(-3.0, 0.0, 0.0), -Vec3::Y))
            .unwrap();
        assert!(scene.primitive(hit.id).is_light_probe());
    }
}
