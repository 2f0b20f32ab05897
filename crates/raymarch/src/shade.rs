use glam::{Vec2, Vec4};

use crate::camera::Camera;
use crate::estimator::Mandelbulb;
use crate::march::{trace, TraceResult};
use crate::palette::palette;
use crate::uniforms::FrameUniforms;

pub const FOG_DENSITY: f32 = 0.1;

/// Rational falloff by marched distance; exactly 1 at the camera.
pub fn fog(distance: f32) -> f32 {
    1.0 / (1.0 + distance * distance * FOG_DENSITY)
}

/// Per-frame shading context.
///
/// Camera placement and the bulb's power depend only on the uniforms, so they
/// are derived once per frame and shared by every pixel.
#[derive(Debug, Clone, Copy)]
pub struct Raymarcher {
    uniforms: FrameUniforms,
    camera: Camera,
    bulb: Mandelbulb,
}

impl Raymarcher {
    pub fn new(uniforms: &FrameUniforms) -> Self {
        Self {
            uniforms: *uniforms,
            camera: Camera::from_uniforms(uniforms),
            bulb: Mandelbulb::at_time(uniforms.elapsed_time),
        }
    }

    pub fn trace(&self, frag_coord: Vec2) -> TraceResult {
        let ray = self.camera.ray(frag_coord, &self.uniforms);
        trace(&self.bulb, self.camera.origin, ray)
    }

    /// RGBA for a fragment coordinate (pixel units, bottom-left origin).
    pub fn shade(&self, frag_coord: Vec2) -> Vec4 {
        let depth = self.trace(frag_coord);
        let color = palette(depth.signal) * fog(depth.distance);
        color.extend(1.0)
    }
}

/// Shades one pixel without reusing any per-frame state.
pub fn shade_pixel(frag_coord: Vec2, uniforms: &FrameUniforms) -> Vec4 {
    Raymarcher::new(uniforms).shade(frag_coord)
}
