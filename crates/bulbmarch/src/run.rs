use std::path::Path;

use anyhow::{Context, Result};
use renderer::{GpuPowerPreference, Renderer, RendererConfig};
use settings::{BulbConfig, PowerPreference};
use tracing_subscriber::EnvFilter;

use crate::cli::RunArgs;

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

pub fn load_config(path: &Path) -> Result<BulbConfig> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file; using defaults");
    }
    BulbConfig::load(path).with_context(|| format!("failed to load config {}", path.display()))
}

/// Merges the config file with command-line overrides.
pub fn renderer_config(config: &BulbConfig, args: &RunArgs) -> RendererConfig {
    let surface_size = args
        .size
        .map(|size| (size.width, size.height))
        .unwrap_or((config.window.width, config.window.height));
    let target_fps = match args.fps {
        Some(fps) if fps > 0.0 => Some(fps),
        Some(_) => None,
        None => config.animation.fps_cap(),
    };
    let gpu_power = match args.gpu_power.unwrap_or(config.gpu.power) {
        PowerPreference::Low => GpuPowerPreference::Low,
        PowerPreference::High => GpuPowerPreference::High,
    };

    RendererConfig {
        surface_size,
        title: config.window.title.clone(),
        time_divisor: args.time_divisor.unwrap_or(config.animation.time_divisor),
        target_fps,
        vsync: config.gpu.vsync && !args.no_vsync,
        gpu_power,
        track_pointer: config.animation.track_pointer && !args.ignore_pointer,
        run_for: args.run_for.or(config.animation.run_for),
        frozen_timestamp: args.freeze,
    }
}

pub fn run(config: &BulbConfig, args: RunArgs) -> Result<()> {
    let renderer_config = renderer_config(config, &args);
    tracing::debug!(?renderer_config, "resolved renderer configuration");
    let mut renderer = Renderer::new(renderer_config);
    renderer.run()
}
