use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use image::ImageFormat;
use raymarch::{software, FrameUniforms, Vec2};
use settings::BulbConfig;

use crate::cli::StillArgs;

/// Fully resolved still export.
#[derive(Debug, Clone, PartialEq)]
pub struct StillRequest {
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub timestamp: Duration,
    pub pointer: Vec2,
    pub time_divisor: f32,
}

impl StillRequest {
    pub fn resolve(config: &BulbConfig, args: StillArgs) -> Self {
        let (width, height) = args
            .size
            .map(|size| (size.width, size.height))
            .unwrap_or((config.still.width, config.still.height));
        let [x, y] = args.pointer.unwrap_or(config.still.pointer);
        Self {
            output: args.output,
            width,
            height,
            timestamp: args.timestamp.unwrap_or(config.still.timestamp),
            pointer: Vec2::new(x, y),
            time_divisor: args
                .time_divisor
                .unwrap_or(config.animation.time_divisor),
        }
    }

    pub fn uniforms(&self) -> FrameUniforms {
        FrameUniforms::from_timestamp(
            self.width,
            self.height,
            self.timestamp.as_secs_f64() * 1000.0,
            self.time_divisor,
        )
        .with_pointer(self.pointer)
    }
}

/// Renders the frame on the CPU and writes it as PNG.
pub fn export(request: &StillRequest) -> Result<()> {
    let uniforms = request.uniforms();
    let started = Instant::now();
    let image = software::render(&uniforms);

    if let Some(parent) = request.output.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    if !request
        .output
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
    {
        tracing::warn!(path = %request.output.display(), "output has no .png extension; writing PNG anyway");
    }
    image
        .save_with_format(&request.output, ImageFormat::Png)
        .with_context(|| format!("failed to write {}", request.output.display()))?;

    tracing::info!(
        path = %request.output.display(),
        width = request.width,
        height = request.height,
        time = uniforms.elapsed_time,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "still frame exported"
    );
    Ok(())
}
