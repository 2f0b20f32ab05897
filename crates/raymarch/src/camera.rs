use glam::{Vec2, Vec3};

use crate::uniforms::FrameUniforms;

/// Orbit radius scale; the pointer's vertical position picks a fraction of it.
pub const CAMERA_DISTANCE: f32 = 3.0;
/// Fraction of [`CAMERA_DISTANCE`] used while the pointer sits at the origin.
pub const IDLE_DISTANCE_FACTOR: f32 = 0.55;

pub const BASE_ANGLE: f32 = 0.3;
/// Shader seconds per radian of orbit.
pub const TIME_TO_ANGLE: f32 = 40.0;
/// Orbit turn across the full surface width.
pub const POINTER_TURN: f32 = 6.28;

/// Virtual camera orbiting the fractal in the XZ plane.
///
/// Rebuilt from scratch every frame; it holds no state of its own.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub origin: Vec3,
    pub angle: f32,
    pub distance: f32,
}

impl Camera {
    pub fn from_uniforms(uniforms: &FrameUniforms) -> Self {
        let angle = orbit_angle(uniforms);
        let distance = camera_distance(uniforms);
        Self {
            origin: Vec3::new(distance * angle.sin(), 0.0, -distance * angle.cos()),
            angle,
            distance,
        }
    }

    /// Unit view ray for a fragment coordinate (bottom-left origin, pixel units).
    pub fn ray(&self, frag_coord: Vec2, uniforms: &FrameUniforms) -> Vec3 {
        let mut uv = frag_coord / uniforms.resolution * 2.0 - Vec2::ONE;
        uv.x *= uniforms.resolution.x / uniforms.resolution.y;
        let ray = Vec3::new(uv.x, uv.y, 1.0).normalize();
        rotate_xz(ray, self.angle)
    }
}

/// Azimuth of the camera: a slow time-driven spin plus a pointer offset.
pub fn orbit_angle(uniforms: &FrameUniforms) -> f32 {
    BASE_ANGLE
        + uniforms.elapsed_time / TIME_TO_ANGLE
        + POINTER_TURN * uniforms.pointer.x / uniforms.resolution.x
}

pub fn camera_distance(uniforms: &FrameUniforms) -> f32 {
    if uniforms.pointer_at_origin() {
        CAMERA_DISTANCE * IDLE_DISTANCE_FACTOR
    } else {
        CAMERA_DISTANCE * uniforms.pointer.y / uniforms.resolution.y
    }
}

// Row-vector times mat2(cos, -sin, sin, cos), as the fragment shader writes it.
fn rotate_xz(ray: Vec3, angle: f32) -> Vec3 {
    let (sin, cos) = angle.sin_cos();
    Vec3::new(ray.x * cos - ray.z * sin, ray.y, ray.x * sin + ray.z * cos)
}
