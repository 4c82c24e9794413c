use anyhow::{Context, Result};
use clap::Parser;
use whitted_core::{load_obj, LoadOptions, SceneConfig};
use whitted_renderer::{render_image, Camera, Culling, RenderConfig, RenderMode};

mod cli;

use cli::{config_dir, image_path, Args};

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(args.log_level.into())
        .init();

    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to configure the worker pool")?;
    }

    let mut config = SceneConfig::load(&args.config)
        .with_context(|| format!("Failed to read configuration {}", args.config.display()))?;
    let dir = config_dir(&args.config);
    if let Some(depth) = args.depth {
        config.depth = depth;
    }
    if !config.comment.is_empty() {
        log::info!("{}", config.comment);
    }

    if let Some(path) = &args.save_config {
        config
            .rebased(dir, config_dir(path))
            .save(path)
            .with_context(|| format!("Failed to write configuration {}", path.display()))?;
        log::info!("Saved configuration to {}", path.display());
    }

    let options = LoadOptions {
        normalize: !args.no_normalize,
    };
    let obj_path = config.obj_path_in(dir);
    let loaded = load_obj(&obj_path, &config.lights, options)
        .with_context(|| format!("Failed to load scene {}", obj_path.display()))?;

    let camera = Camera::look_at(
        loaded.to_scene_space(config.eye),
        loaded.to_scene_space(config.look_at),
        config.up,
        config.yview,
        config.xres,
        config.yres,
    )?;

    let render_config = RenderConfig::default()
        .with_max_depth(config.depth)
        .with_mode(if args.preview {
            RenderMode::Preview
        } else {
            RenderMode::Full
        })
        .with_calibration(args.calibration.into())
        .with_culling(if args.cull {
            Culling::BackFace
        } else {
            Culling::DoubleSided
        })
        .with_distance_bound(loaded.distance_bound());

    let image = render_image(&loaded.scene, &camera, &render_config)?;

    // An explicit --output is taken relative to the working directory
    let output = match &args.output {
        Some(path) => image_path(path),
        None => image_path(&config.output_path_in(dir)),
    };
    image
        .save(&output)
        .with_context(|| format!("Failed to write image {}", output.display()))?;

    Ok(())
}
