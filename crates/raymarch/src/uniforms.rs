use glam::Vec2;

/// Host timestamps (milliseconds) are divided by this to obtain `iTime`.
pub const DEFAULT_TIME_DIVISOR: f32 = 1500.0;

/// Per-frame parameters pushed into the shading stage.
///
/// Mirrors the `iResolution`, `iTime`, and `iMouse` uniforms. Nothing here
/// survives a frame; the host rebuilds it before every draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUniforms {
    /// Viewport size in physical pixels.
    pub resolution: Vec2,
    /// Slowed-down elapsed time in seconds.
    pub elapsed_time: f32,
    /// Last known pointer position in pixels, bottom-left origin.
    pub pointer: Vec2,
}

impl FrameUniforms {
    /// Uniforms for a viewport with the pointer parked at the origin.
    pub fn new(width: u32, height: u32, elapsed_time: f32) -> Self {
        Self {
            resolution: Vec2::new(width as f32, height as f32),
            elapsed_time,
            pointer: Vec2::ZERO,
        }
    }

    /// Builds uniforms straight from a host frame timestamp in milliseconds.
    pub fn from_timestamp(width: u32, height: u32, timestamp_ms: f64, divisor: f32) -> Self {
        Self::new(width, height, elapsed_time(timestamp_ms, divisor))
    }

    pub fn with_pointer(mut self, pointer: Vec2) -> Self {
        self.pointer = pointer;
        self
    }

    /// True when the pointer never moved away from the origin.
    ///
    /// A genuine pointer event at `(0, 0)` is indistinguishable from "no
    /// interaction"; both select the idle camera distance.
    pub fn pointer_at_origin(&self) -> bool {
        self.pointer == Vec2::ZERO
    }

    /// Integer viewport dimensions, never smaller than one pixel.
    pub fn dimensions(&self) -> (u32, u32) {
        (
            self.resolution.x.max(1.0) as u32,
            self.resolution.y.max(1.0) as u32,
        )
    }
}

/// Converts a host timestamp in milliseconds to shader seconds.
///
/// The division happens in double precision before narrowing, matching a host
/// that keeps its clock as `f64` and uploads a 32-bit float.
pub fn elapsed_time(timestamp_ms: f64, divisor: f32) -> f32 {
    (timestamp_ms / f64::from(divisor)) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_is_scaled_by_divisor() {
        assert_eq!(elapsed_time(0.0, DEFAULT_TIME_DIVISOR), 0.0);
        assert_eq!(elapsed_time(1500.0, DEFAULT_TIME_DIVISOR), 1.0);
        assert_eq!(elapsed_time(4500.0, DEFAULT_TIME_DIVISOR), 3.0);
        assert_eq!(elapsed_time(1000.0, 1000.0), 1.0);
    }

    #[test]
    fn pointer_defaults_to_origin() {
        let uniforms = FrameUniforms::new(640, 480, 2.0);
        assert!(uniforms.pointer_at_origin());
        assert_eq!(uniforms.resolution, Vec2::new(640.0, 480.0));

        let moved = uniforms.with_pointer(Vec2::new(0.0, 1.0));
        assert!(!moved.pointer_at_origin());
    }

    #[test]
    fn dimensions_never_collapse_to_zero() {
        let uniforms = FrameUniforms::new(0, 0, 0.0);
        assert_eq!(uniforms.dimensions(), (1, 1));
        assert_eq!(FrameUniforms::new(100, 50, 0.0).dimensions(), (100, 50));
    }
}
