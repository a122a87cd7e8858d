//! Cornell Box CLI - render a built-in scene to a PNG file.

mod scenes;

use std::env;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;

use anyhow::{bail, Context, Result};
use cbox_renderer::{render, AntiAliasing, ImageBuffer, Integrator, RenderConfig, Scene};

use scenes::{BuiltinScene, SceneAssets, TEXTURE_FILES};

/// Command line options. Every `Option` overrides the configuration file.
#[derive(Debug, Clone, PartialEq)]
struct Options {
    config: Option<PathBuf>,
    scene: BuiltinScene,
    size: Option<(u32, u32)>,
    output: PathBuf,
    path_tracing: bool,
    anti_aliasing: Option<AntiAliasing>,
    aperture: Option<f32>,
    no_accel: bool,
    seed: Option<u64>,
    assets: SceneAssets,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            config: None,
            scene: BuiltinScene::Cornell,
            size: None,
            output: PathBuf::from("render.png"),
            path_tracing: false,
            anti_aliasing: None,
            aperture: None,
            no_accel: false,
            seed: None,
            assets: SceneAssets::default(),
        }
    }
}

impl Options {
    /// Parse arguments (without the program name). Returns `None` when help
    /// was requested.
    fn parse(args: &[String]) -> Result<Option<Self>> {
        let mut options = Options::default();
        let mut iter = args.iter();

        while let Some(arg) = iter.next() {
            let mut value = || {
                iter.next()
                    .map(String::as_str)
                    .with_context(|| format!("missing value for {}", arg))
            };

            match arg.as_str() {
                "-h" | "--help" => return Ok(None),
                "--config" | "-c" => options.config = Some(PathBuf::from(value()?)),
                "--scene" | "-s" => options.scene = value()?.parse()?,
                "--size" => options.size = Some(parse_size(value()?)?),
                "--output" | "-o" => options.output = PathBuf::from(value()?),
                "--path-tracing" => options.path_tracing = true,
                "--aa" => options.anti_aliasing = Some(parse_anti_aliasing(value()?)?),
                "--aperture" => {
                    let v = value()?;
                    options.aperture = Some(v.parse().with_context(|| format!("invalid aperture '{}'", v))?);
                }
                "--no-accel" => options.no_accel = true,
                "--seed" => {
                    let v = value()?;
                    options.seed = Some(v.parse().with_context(|| format!("invalid seed '{}'", v))?);
                }
                "--mesh" => options.assets.mesh = Some(PathBuf::from(value()?)),
                "--probe" => options.assets.probe = Some(PathBuf::from(value()?)),
                "--textures" => options.assets.textures = Some(PathBuf::from(value()?)),
                other => bail!("unknown argument '{}' (see --help)", other),
            }
        }

        Ok(Some(options))
    }

    /// Apply command line overrides on top of a configuration.
    fn apply(&self, config: &mut RenderConfig) {
        if let Some((width, height)) = self.size {
            config.width = width;
            config.height = height;
        }
        if self.path_tracing || self.scene == BuiltinScene::CornellPath {
            config.integrator = Integrator::PathTracing;
        }
        if let Some(aa) = self.anti_aliasing {
            config.anti_aliasing = aa;
        }
        if let Some(aperture) = self.aperture {
            config.aperture = aperture;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
    }
}

fn parse_size(s: &str) -> Result<(u32, u32)> {
    let (w, h) = s
        .split_once('x')
        .with_context(|| format!("invalid size '{}', expected WIDTHxHEIGHT", s))?;
    let width: u32 = w.parse().with_context(|| format!("invalid width '{}'", w))?;
    let height: u32 = h.parse().with_context(|| format!("invalid height '{}'", h))?;
    if width == 0 || height == 0 {
        bail!("image size must be non-zero, got {}x{}", width, height);
    }
    Ok((width, height))
}

fn parse_anti_aliasing(s: &str) -> Result<AntiAliasing> {
    Ok(match s {
        "none" => AntiAliasing::None,
        "supersample" | "ss" => AntiAliasing::Supersample,
        "gaussian" | "gauss" => AntiAliasing::Gaussian,
        other => bail!("unknown anti-aliasing mode '{}'", other),
    })
}

fn load_config(path: &Path) -> Result<RenderConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config = serde_json::from_str(&text)
        .with_context(|| format!("parsing config {}", path.display()))?;
    log::info!("Loaded render config from {}", path.display());
    Ok(config)
}

fn save_png(image: &ImageBuffer, path: &Path) -> Result<()> {
    let rgba = image::RgbaImage::from_raw(image.width, image.height, image.to_rgba())
        .context("image buffer size does not match its dimensions")?;
    rgba.save(path)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

fn print_help() {
    println!("Cornell Box ray tracer");
    println!();
    println!("Usage: cbox [options]");
    println!();
    println!("Options:");
    println!("  -c, --config <file.json>   Render configuration (JSON)");
    println!("  -s, --scene <name>         {} (default: cornell)", BuiltinScene::NAMES.join(", "));
    println!("      --size <WxH>           Image size (default: 400x400)");
    println!("  -o, --output <file.png>    Output image (default: render.png)");
    println!("      --path-tracing         Use the path integrator instead of Whitted");
    println!("      --aa <mode>            none, supersample or gaussian");
    println!("      --aperture <radius>    Lens radius for depth of field");
    println!("      --no-accel             Disable the bounding sphere hierarchy");
    println!("      --seed <n>             Random seed");
    println!("      --mesh <file.obj>      Mesh for the mesh scene");
    println!("      --probe <file.float>   Raw float light probe for the skybox scene");
    println!("      --textures <dir>       Directory with {}", TEXTURE_FILES.join(", "));
    println!("  -h, --help                 Show this help");
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(options) = Options::parse(&args)? else {
        print_help();
        return Ok(());
    };

    let mut config = match &options.config {
        Some(path) => load_config(path)?,
        None => RenderConfig::default(),
    };
    options.apply(&mut config);

    log::info!(
        "Rendering {:?} at {}x{} with {:?}",
        options.scene,
        config.width,
        config.height,
        config.integrator
    );

    let mut desc = scenes::describe(options.scene, config.seed, &options.assets)?;
    desc.use_acceleration = !options.no_accel;
    let scene = Scene::build(desc).context("building scene")?;

    let output = render(&scene, &config, &AtomicBool::new(false));
    save_png(&output.image, &options.output)?;
    log::info!("Saved {}", options.output.display());

    Ok(())
}
