//! CPU fallback that evaluates the raymarcher for every pixel in parallel.
//!
//! Rows are independent, so the frame is split into scanlines and shaded with
//! rayon. Fragment coordinates follow the GPU convention (pixel centres,
//! bottom-left origin) while the returned image stores row 0 at the top.

use std::time::Instant;

use glam::{Vec2, Vec4};
use image::RgbaImage;
use rayon::prelude::*;

use crate::shade::Raymarcher;
use crate::uniforms::FrameUniforms;

/// Renders one frame at the uniforms' resolution.
pub fn render(uniforms: &FrameUniforms) -> RgbaImage {
    let started = Instant::now();
    let (width, height) = uniforms.dimensions();
    let marcher = Raymarcher::new(uniforms);
    let mut image = RgbaImage::new(width, height);
    let stride = width as usize * 4;

    image
        .par_chunks_mut(stride)
        .enumerate()
        .for_each(|(row, pixels)| {
            let frag_y = (height as usize - 1 - row) as f32 + 0.5;
            for (column, pixel) in pixels.chunks_exact_mut(4).enumerate() {
                let frag_coord = Vec2::new(column as f32 + 0.5, frag_y);
                pixel.copy_from_slice(&to_rgba8(marcher.shade(frag_coord)));
            }
        });

    tracing::debug!(
        width,
        height,
        time = uniforms.elapsed_time,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "software frame rendered"
    );
    image
}

/// Quantizes a shader colour to 8-bit channels; non-finite values become 0.
pub fn to_rgba8(color: Vec4) -> [u8; 4] {
    color.to_array().map(|channel| {
        if channel.is_finite() {
            (channel.clamp(0.0, 1.0) * 255.0).round() as u8
        } else {
            0
        }
    })
}
