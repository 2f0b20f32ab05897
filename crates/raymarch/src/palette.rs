use glam::Vec3;

pub const TWO_PI: f32 = 6.28318;

/// Cosine gradient `a + b·cos(2π·(c·t + d))`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CosinePalette {
    pub offset: Vec3,
    pub amplitude: Vec3,
    pub frequency: Vec3,
    pub phase: Vec3,
}

impl CosinePalette {
    /// Slow grey-to-rainbow ramp used to colour the accumulated step signal.
    pub const BULB: Self = Self {
        offset: Vec3::splat(0.5),
        amplitude: Vec3::splat(0.5),
        frequency: Vec3::splat(0.01),
        phase: Vec3::new(0.0, 0.10, 0.20),
    };

    pub fn sample(&self, t: f32) -> Vec3 {
        let angle = (self.frequency * t + self.phase) * TWO_PI;
        self.offset + self.amplitude * Vec3::new(angle.x.cos(), angle.y.cos(), angle.z.cos())
    }
}

pub fn palette(t: f32) -> Vec3 {
    CosinePalette::BULB.sample(t)
}
