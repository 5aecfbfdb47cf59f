//! First-order all-pass ("phase shifter")

/// Largest coefficient magnitude accepted before the pole gets too close to
/// the unit circle
const MAX_COEFFICIENT: f32 = 0.99;

/// First-order all-pass: `y = -c·x + x[n-1] + c·y[n-1]`
///
/// Unity magnitude at every frequency; only the phase changes.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhaseShifter {
    coefficient: f32,
    x1: f32,
    y1: f32,
}

impl PhaseShifter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the coefficient, clamped to [-0.99, 0.99]
    pub fn set_coefficient(&mut self, coefficient: f32) {
        self.coefficient = coefficient.clamp(-MAX_COEFFICIENT, MAX_COEFFICIENT);
    }

    pub fn coefficient(&self) -> f32 {
        self.coefficient
    }

    #[inline]
    pub fn process(&mut self, sample: f32) -> f32 {
        let out = (-self.coefficient * sample) + self.x1 + (self.coefficient * self.y1);
        self.x1 = sample;
        self.y1 = out;
        out
    }

    pub fn reset(&mut self) {
        self.x1 = 0.0;
        self.y1 = 0.0;
    }
}
