//! Numerical core of bulbmarch: the Mandelbulb raymarcher evaluated per pixel.
//!
//! Everything in this crate is a pure function of the per-frame uniforms, so
//! the same code drives unit tests, the CPU software rasterizer, and serves as
//! the reference the GLSL program in the `renderer` crate mirrors line for line.
//!
//! ```text
//!   FrameUniforms ──▶ Raymarcher::new ──▶ Camera (origin, orbit angle)
//!                           │          └─▶ Mandelbulb (power from time)
//!                           ▼
//!   fragCoord ──▶ Camera::ray ──▶ trace(field) ──▶ fog × palette ──▶ RGBA
//! ```
//!
//! The distance field is a trait seam ([`DistanceField`]) so the sphere tracer
//! can be exercised against degenerate fields in tests.

pub mod camera;
pub mod estimator;
pub mod march;
pub mod palette;
pub mod shade;
pub mod software;
pub mod uniforms;

pub use camera::Camera;
pub use estimator::{DistanceField, FieldSample, Mandelbulb};
pub use march::{trace, TraceResult};
pub use palette::{palette, CosinePalette};
pub use shade::{fog, shade_pixel, Raymarcher};
pub use uniforms::{elapsed_time, FrameUniforms, DEFAULT_TIME_DIVISOR};

pub use glam::{Vec2, Vec3, Vec4};
