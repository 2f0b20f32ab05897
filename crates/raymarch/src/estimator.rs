//! Mandelbulb distance estimator.
//!
//! Iterates `z ← z^Power + pos` in spherical coordinates while tracking the
//! running derivative `dr`, then applies the usual escape-time estimate
//! `0.5·ln(r)·r/dr`. Alongside the distance it reports a "step signal"
//! derived from `dr` that the shading stage only uses as a palette index.

use glam::Vec3;

use crate::march::MARCH_STEPS;

/// Radius past which the iteration is considered escaped.
pub const ESCAPE_RADIUS: f32 = 1.5;
/// Upper bound on recurrence iterations per sample.
pub const ITERATIONS: u32 = 64;
/// Floor applied to the radius before dividing by it or taking its log.
pub const MIN_RADIUS: f32 = 1e-6;

/// Step signal reported when `dr` is 1.
pub const SIGNAL_SCALE: f32 = 50.0;
/// Exponent applied to `dr` across a whole march, spread over its steps.
pub const SIGNAL_SPREAD: f32 = 0.128;

const SIGNAL_EXPONENT: f32 = SIGNAL_SPREAD / MARCH_STEPS as f32;

/// One evaluation of a distance field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSample {
    /// Conservative estimate of the distance to the surface.
    pub distance: f32,
    /// Convergence proxy consumed as a colour index.
    pub step_signal: f32,
}

/// Anything the sphere tracer can march against.
pub trait DistanceField {
    fn sample(&self, pos: Vec3) -> FieldSample;
}

/// Power fractal whose exponent is derived from elapsed time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mandelbulb {
    pub power: f32,
}

impl Mandelbulb {
    pub fn new(power: f32) -> Self {
        Self { power }
    }

    /// The bulb as it looks at `elapsed_time`; the power breathes between 3 and 11.
    pub fn at_time(elapsed_time: f32) -> Self {
        Self::new(power_at(elapsed_time))
    }
}

pub fn power_at(elapsed_time: f32) -> f32 {
    3.0 + 4.0 * ((elapsed_time / 30.0).sin() + 1.0)
}

impl DistanceField for Mandelbulb {
    fn sample(&self, pos: Vec3) -> FieldSample {
        let power = self.power;
        let mut z = pos;
        let mut dr = 1.0_f32;
        let mut r = 0.0_f32;

        for _ in 0..ITERATIONS {
            r = z.length();
            if r > ESCAPE_RADIUS {
                break;
            }

            let radius = r.max(MIN_RADIUS);
            let theta = (z.z / radius).clamp(-1.0, 1.0).acos() * power;
            let phi = z.y.atan2(z.x) * power;
            dr = radius.powf(power - 1.0) * power * dr + 1.0;

            let zr = radius.powf(power);
            z = zr
                * Vec3::new(
                    theta.sin() * phi.cos(),
                    phi.sin() * theta.sin(),
                    theta.cos(),
                )
                + pos;
        }

        let radius = r.max(MIN_RADIUS);
        FieldSample {
            distance: 0.5 * radius.ln() * radius / dr,
            step_signal: SIGNAL_SCALE * dr.powf(SIGNAL_EXPONENT),
        }
    }
}
