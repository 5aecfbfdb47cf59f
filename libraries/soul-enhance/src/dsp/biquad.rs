//! Second-order sections
//!
//! Two fixed topologies, both computed in f64:
//! - `HighShelf`: cookbook shelving filter used by the clarity "ozone" mode
//! - `ParametricHighPass`: shelving-derived high-pass with gain and Q used to
//!   isolate the side-channel enhancement term in the depth stage

use std::f64::consts::PI;

/// High-shelf biquad
#[derive(Debug, Clone)]
pub struct HighShelf {
    frequency: f32,
    gain_db: f64,
    x1: f64,
    x2: f64,
    y1: f64,
    y2: f64,
    b0: f64,
    b1: f64,
    b2: f64,
    a0: f64,
    a1: f64,
    a2: f64,
}

impl Default for HighShelf {
    fn default() -> Self {
        Self {
            frequency: 8250.0,
            gain_db: 0.0,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
            b0: 0.0,
            b1: 0.0,
            b2: 0.0,
            a0: 1.0,
            a1: 0.0,
            a2: 0.0,
        }
    }
}

impl HighShelf {
    pub fn new() -> Self {
        Self::default()
    }

    /// Corner frequency in Hz. Takes effect on the next `configure`.
    pub fn set_frequency(&mut self, frequency: f32) {
        self.frequency = frequency;
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Shelf gain from a linear factor. Takes effect on the next `configure`.
    ///
    /// Non-positive factors are floored at the smallest positive float.
    pub fn set_gain_linear(&mut self, gain: f32) {
        let safe = gain.max(f32::MIN_POSITIVE);
        self.gain_db = 20.0 * f64::from(safe).log10();
    }

    pub fn gain_db(&self) -> f64 {
        self.gain_db
    }

    /// Recompute coefficients for `sample_rate` and zero the history
    pub fn configure(&mut self, sample_rate: u32) {
        let omega = (2.0 * PI * f64::from(self.frequency)) / f64::from(sample_rate.max(1));
        let (sin_w, cos_w) = omega.sin_cos();
        let a = 10.0_f64.powf(self.gain_db / 40.0);

        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;

        let beta = (a * 2.0).sqrt() * sin_w;
        let am1_cos = (a - 1.0) * cos_w;
        let ap1_cos = (a + 1.0) * cos_w;
        let den = (a + 1.0) - am1_cos;
        let num = (a + 1.0) + am1_cos;

        self.a0 = 1.0 / (beta + den);
        self.a1 = ((a - 1.0) - ap1_cos) * 2.0;
        self.a2 = den - beta;
        self.b0 = (num + beta) * a;
        self.b1 = -a * 2.0 * ((a - 1.0) + ap1_cos);
        self.b2 = (num - beta) * a;
    }

    #[inline]
    pub fn process(&mut self, sample: f32) -> f32 {
        let x = f64::from(sample);
        let out = (((self.x1 * self.b1 + x * self.b0 + self.b2 * self.x2) - self.y1 * self.a1)
            - self.a2 * self.y2)
            * self.a0;
        self.y2 = self.y1;
        self.y1 = out;
        self.x2 = self.x1;
        self.x1 = x;
        out as f32
    }

    pub fn reset(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }
}

/// Biquad with normalized coefficients and the recursion
/// `y = b0·x + b1·x1 + b2·x2 + a1·y1 + a2·y2` (feedback signs folded in)
#[derive(Debug, Clone)]
pub struct ParametricHighPass {
    x1: f64,
    x2: f64,
    y1: f64,
    y2: f64,
    a1: f64,
    a2: f64,
    b0: f64,
    b1: f64,
    b2: f64,
}

impl Default for ParametricHighPass {
    fn default() -> Self {
        let mut filter = Self {
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
            a1: 0.0,
            a2: 0.0,
            b0: 0.0,
            b1: 0.0,
            b2: 0.0,
        };
        filter.set_identity();
        filter
    }
}

impl ParametricHighPass {
    /// Identity section until configured
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }

    /// Configure the high-pass and zero the history
    ///
    /// A zero sample rate leaves the section as an identity pass-through.
    pub fn configure(&mut self, frequency: f32, sample_rate: u32, gain_db: f64, q: f32) {
        if sample_rate == 0 {
            self.set_identity();
            return;
        }

        let omega = (2.0 * PI * f64::from(frequency)) / f64::from(sample_rate);
        let (sin_w, cos_w) = omega.sin_cos();

        let a = 10.0_f64.powf(gain_db / 40.0);
        let sqrt_a = a.sqrt();
        let z = sin_w / 2.0 * ((1.0 / a + a) * (1.0 / f64::from(q) - 1.0) + 2.0).sqrt();

        let a0 = (a + 1.0) - (a - 1.0) * cos_w + 2.0 * sqrt_a * z;
        let a1 = 2.0 * ((a - 1.0) - (a + 1.0) * cos_w);
        let a2 = (a + 1.0) - (a - 1.0) * cos_w - 2.0 * sqrt_a * z;
        // Numerator keeps the extra A·ω scale of the reference tuning
        let b0 = ((a + 1.0) + (a - 1.0) * cos_w + 2.0 * sqrt_a * z) * a * omega;
        let b1 = -2.0 * a * ((a - 1.0) + (a + 1.0) * cos_w) * omega;
        let b2 = ((a + 1.0) + (a - 1.0) * cos_w - 2.0 * sqrt_a * z) * a * omega;

        self.set_coefficients(a0, a1, a2, b0, b1, b2);
    }

    fn set_identity(&mut self) {
        self.set_coefficients(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
    }

    fn set_coefficients(&mut self, a0: f64, a1: f64, a2: f64, b0: f64, b1: f64, b2: f64) {
        self.reset();

        // Degenerate or non-finite normalizer: fall back to pass-through
        if !a0.is_finite() || a0.abs() < 1.0e-12 {
            self.a1 = 0.0;
            self.a2 = 0.0;
            self.b0 = 1.0;
            self.b1 = 0.0;
            self.b2 = 0.0;
            return;
        }

        self.a1 = -(a1 / a0);
        self.a2 = -(a2 / a0);
        self.b0 = b0 / a0;
        self.b1 = b1 / a0;
        self.b2 = b2 / a0;
    }

    #[inline]
    pub fn process(&mut self, sample: f32) -> f32 {
        let x = f64::from(sample);
        let out = x * self.b0 + self.x1 * self.b1 + self.x2 * self.b2 + self.y1 * self.a1
            + self.y2 * self.a2;
        self.x2 = self.x1;
        self.x1 = x;
        self.y2 = self.y1;
        self.y1 = out;
        out as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: u32 = 44100;

    fn sine_peak(filter: &mut impl FnMut(f32) -> f32, freq: f32) -> f32 {
        let mut peak = 0.0f32;
        let total = SAMPLE_RATE as usize;
        for i in 0..total {
            let t = i as f32 / SAMPLE_RATE as f32;
            let y = filter((2.0 * std::f32::consts::PI * freq * t).sin());
            if i > total / 2 {
                peak = peak.max(y.abs());
            }
        }
        peak
    }

    #[test]
    fn unity_shelf_is_transparent() {
        let mut shelf = HighShelf::new();
        shelf.set_gain_linear(1.0);
        shelf.configure(SAMPLE_RATE);
        for &x in &[0.5, -0.25, 1.0, 0.0, 0.75] {
            let y = shelf.process(x);
            assert!((y - x).abs() < 1e-6, "expected {} got {}", x, y);
        }
    }

    #[test]
    fn shelf_boosts_highs_not_lows() {
        let mut shelf = HighShelf::new();
        shelf.set_frequency(4000.0);
        shelf.set_gain_linear(2.0);
        shelf.configure(SAMPLE_RATE);
        let high = sine_peak(&mut |x| shelf.process(x), 15000.0);

        shelf.configure(SAMPLE_RATE);
        let low = sine_peak(&mut |x| shelf.process(x), 100.0);

        assert!(high > 1.8, "high band should be boosted ~6 dB, got {}", high);
        assert!((low - 1.0).abs() < 0.05, "low band should be untouched, got {}", low);
    }

    #[test]
    fn shelf_gain_floor_avoids_infinity() {
        let mut shelf = HighShelf::new();
        shelf.set_gain_linear(0.0);
        assert!(shelf.gain_db().is_finite());
        shelf.set_gain_linear(-3.0);
        assert!(shelf.gain_db().is_finite());
    }

    #[test]
    fn parametric_identity_by_default() {
        let mut filter = ParametricHighPass::new();
        assert_eq!(filter.process(0.3), 0.3);
        assert_eq!(filter.process(-0.7), -0.7);
    }

    #[test]
    fn parametric_zero_rate_is_identity() {
        let mut filter = ParametricHighPass::new();
        filter.configure(800.0, 0, -11.0, 0.72);
        assert_eq!(filter.process(0.42), 0.42);
    }

    #[test]
    fn parametric_high_pass_is_stable() {
        let mut filter = ParametricHighPass::new();
        filter.configure(800.0, SAMPLE_RATE, -11.0, 0.72);
        let peak = sine_peak(&mut |x| filter.process(x), 5000.0);
        assert!(peak.is_finite());
        assert!(peak < 10.0);
    }
}
