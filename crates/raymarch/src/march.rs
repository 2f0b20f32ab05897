use glam::Vec3;

use crate::estimator::DistanceField;

/// Iteration budget of the sphere tracer.
pub const MARCH_STEPS: u32 = 64;
/// Fraction of the estimated distance taken on each step.
pub const STEP_SCALE: f32 = 0.5;
/// A step signal below this counts as converged.
pub const CONVERGENCE_SIGNAL: f32 = 0.1;

/// Outcome of marching a single ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceResult {
    /// Distance travelled along the ray.
    pub distance: f32,
    /// Sum of the step signals collected on the way; feeds the palette.
    pub signal: f32,
    /// Number of field evaluations performed.
    pub steps: u32,
}

/// Sphere-traces `field` from `origin` along the unit vector `ray`.
///
/// Runs at most [`MARCH_STEPS`] iterations and exits early only once a sample
/// reports a step signal under [`CONVERGENCE_SIGNAL`].
pub fn trace<F>(field: &F, origin: Vec3, ray: Vec3) -> TraceResult
where
    F: DistanceField + ?Sized,
{
    let mut t = 0.0_f32;
    let mut signal = 0.0_f32;
    let mut steps = 0;

    while steps < MARCH_STEPS {
        let sample = field.sample(origin + ray * t);
        steps += 1;

        t += STEP_SCALE * sample.distance;
        signal += sample.step_signal;
        if sample.step_signal < CONVERGENCE_SIGNAL {
            break;
        }
    }

    TraceResult {
        distance: t,
        signal,
        steps,
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::estimator::{FieldSample, Mandelbulb};

    struct Constant {
        sample: FieldSample,
        calls: Cell<u32>,
    }

    impl Constant {
        fn new(distance: f32, step_signal: f32) -> Self {
            Self {
                sample: FieldSample {
                    distance,
                    step_signal,
                },
                calls: Cell::new(0),
            }
        }
    }

    impl DistanceField for Constant {
        fn sample(&self, _pos: Vec3) -> FieldSample {
            self.calls.set(self.calls.get() + 1);
            self.sample
        }
    }

    #[test]
    fn converged_field_exits_after_first_step() {
        let field = Constant::new(2.0, 0.0);
        let result = trace(&field, Vec3::ZERO, Vec3::Z);
        assert_eq!(result.steps, 1);
        assert_eq!(field.calls.get(), 1);
        assert_eq!(result.distance, 1.0);
        assert_eq!(result.signal, 0.0);
    }

    #[test]
    fn unconverged_field_uses_full_budget() {
        let field = Constant::new(0.25, 1.0);
        let result = trace(&field, Vec3::ZERO, Vec3::X);
        assert_eq!(result.steps, MARCH_STEPS);
        assert_eq!(field.calls.get(), MARCH_STEPS);
        assert_eq!(result.distance, 8.0);
        assert_eq!(result.signal, 64.0);
    }

    #[test]
    fn threshold_is_strict() {
        let field = Constant::new(1.0, CONVERGENCE_SIGNAL);
        assert_eq!(trace(&field, Vec3::ZERO, Vec3::Y).steps, MARCH_STEPS);
    }

    #[test]
    fn marching_samples_along_the_ray() {
        struct Recorder(std::cell::RefCell<Vec<Vec3>>);
        impl DistanceField for Recorder {
            fn sample(&self, pos: Vec3) -> FieldSample {
                let mut seen = self.0.borrow_mut();
                seen.push(pos);
                FieldSample {
                    distance: 2.0,
                    step_signal: if seen.len() == 3 { 0.0 } else { 1.0 },
                }
            }
        }

        let recorder = Recorder(Default::default());
        let origin = Vec3::new(1.0, 0.0, 0.0);
        let result = trace(&recorder, origin, Vec3::Z);
        assert_eq!(result.steps, 3);
        assert_eq!(
            recorder.0.into_inner(),
            vec![origin, origin + Vec3::Z, origin + Vec3::Z * 2.0]
        );
    }

    #[test]
    fn mandelbulb_trace_stays_within_budget() {
        let bulb = Mandelbulb::at_time(0.0);
        let result = trace(&bulb, Vec3::new(0.0, 0.0, -1.65), Vec3::Z);
        assert!(result.steps <= MARCH_STEPS);
        assert!(result.distance > 0.0);
    }
}
