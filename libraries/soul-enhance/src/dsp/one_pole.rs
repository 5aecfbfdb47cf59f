//! First-order IIR sections designed with the bilinear transform
//!
//! Provides:
//! - `OnePole`: single real pole, low-pass or high-pass
//! - `OnePoleCascade`: N identical sections in series
//! - `BandPassCascade`: a low-pass cascade followed by a high-pass cascade
//!
//! The per-sample recurrence keeps a single history value and is not the
//! canonical direct form. The clarity exciter's band balance depends on its
//! exact numerical behaviour, so keep the operation order as written.

use std::f32::consts::PI;

/// Single-pole filter section
#[derive(Debug, Clone, Copy, Default)]
pub struct OnePole {
    pub(crate) b0: f32,
    pub(crate) b1: f32,
    pub(crate) a1: f32,
    pub(crate) prev: f32,
}

impl OnePole {
    /// Create a section with zeroed coefficients (outputs silence until configured)
    pub fn new() -> Self {
        Self::default()
    }

    /// Low-pass section with the given cutoff
    pub fn low_pass(frequency: f32, sample_rate: u32) -> Self {
        let mut filter = Self::new();
        filter.set_low_pass(frequency, sample_rate);
        filter
    }

    /// High-pass section with the given cutoff
    pub fn high_pass(frequency: f32, sample_rate: u32) -> Self {
        let mut filter = Self::new();
        filter.set_high_pass(frequency, sample_rate);
        filter
    }

    /// Configure as a Butterworth low-pass
    ///
    /// Coefficients only; the history is left as is.
    pub fn set_low_pass(&mut self, frequency: f32, sample_rate: u32) {
        let t = prewarp(frequency, sample_rate);
        self.a1 = (1.0 - t) / (1.0 + t);
        self.b0 = t / (1.0 + t);
        self.b1 = self.b0;
    }

    /// Configure as a Butterworth high-pass
    pub fn set_high_pass(&mut self, frequency: f32, sample_rate: u32) {
        let t = prewarp(frequency, sample_rate);
        self.b0 = 1.0 / (1.0 + t);
        self.b1 = -self.b0;
        self.a1 = (1.0 - t) / (1.0 + t);
    }

    /// Zero the history, keep the coefficients
    pub fn mute(&mut self) {
        self.prev = 0.0;
    }

    #[inline]
    pub fn process(&mut self, sample: f32) -> f32 {
        let hist = sample * self.b1;
        let out = self.prev + sample * self.b0;
        self.prev = out * self.a1 + hist;
        out
    }

    /// Current stored history value
    pub fn history(&self) -> f32 {
        self.prev
    }
}

/// `tan(π·f/fs)`, the bilinear prewarp term
#[inline]
fn prewarp(frequency: f32, sample_rate: u32) -> f32 {
    let omega = PI * frequency / sample_rate.max(1) as f32;
    omega.tan()
}

/// Which response a cascade is configured for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    LowPass,
    HighPass,
}

/// N identical one-pole sections at one cutoff, applied in series
#[derive(Debug, Clone)]
pub struct OnePoleCascade {
    sections: Vec<OnePole>,
}

impl OnePoleCascade {
    /// Create a cascade of `order` sections (at least one)
    pub fn new(order: usize) -> Self {
        Self {
            sections: vec![OnePole::new(); order.max(1)],
        }
    }

    pub fn order(&self) -> usize {
        self.sections.len()
    }

    /// Recompute every section for `kind` at `frequency` and zero all histories
    pub fn configure(&mut self, kind: PassKind, frequency: f32, sample_rate: u32) {
        for section in &mut self.sections {
            match kind {
                PassKind::LowPass => section.set_low_pass(frequency, sample_rate),
                PassKind::HighPass => section.set_high_pass(frequency, sample_rate),
            }
            section.mute();
        }
    }

    pub fn mute(&mut self) {
        for section in &mut self.sections {
            section.mute();
        }
    }

    #[inline]
    pub fn process(&mut self, sample: f32) -> f32 {
        self.sections
            .iter_mut()
            .fold(sample, |acc, section| section.process(acc))
    }
}

/// Band-pass built from a low-pass cascade (upper edge) followed by a
/// high-pass cascade (lower edge)
#[derive(Debug, Clone)]
pub struct BandPassCascade {
    low_pass: OnePoleCascade,
    high_pass: OnePoleCascade,
}

impl BandPassCascade {
    pub fn new(order: usize) -> Self {
        Self::with_orders(order, order)
    }

    /// Independent orders for the two halves
    pub fn with_orders(low_pass_order: usize, high_pass_order: usize) -> Self {
        Self {
            low_pass: OnePoleCascade::new(low_pass_order),
            high_pass: OnePoleCascade::new(high_pass_order),
        }
    }

    /// Set the band edges and zero all histories
    pub fn configure(&mut self, low_cut: f32, high_cut: f32, sample_rate: u32) {
        self.low_pass
            .configure(PassKind::LowPass, high_cut, sample_rate);
        self.high_pass
            .configure(PassKind::HighPass, low_cut, sample_rate);
    }

    pub fn mute(&mut self) {
        self.low_pass.mute();
        self.high_pass.mute();
    }

    #[inline]
    pub fn process(&mut self, sample: f32) -> f32 {
        let sample = self.low_pass.process(sample);
        self.high_pass.process(sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: u32 = 44100;

    fn settle_dc(filter: &mut impl FnMut(f32) -> f32, value: f32, samples: usize) -> f32 {
        let mut out = 0.0;
        for _ in 0..samples {
            out = filter(value);
        }
        out
    }

    #[test]
    fn low_pass_coefficients_match_bilinear_design() {
        let filter = OnePole::low_pass(1000.0, SAMPLE_RATE);
        let t = (PI * 1000.0 / SAMPLE_RATE as f32).tan();
        assert!((filter.a1 - (1.0 - t) / (1.0 + t)).abs() < 1e-7);
        assert!((filter.b0 - t / (1.0 + t)).abs() < 1e-7);
        assert_eq!(filter.b0, filter.b1);
    }

    #[test]
    fn high_pass_coefficients_are_antisymmetric() {
        let filter = OnePole::high_pass(1000.0, SAMPLE_RATE);
        assert_eq!(filter.b1, -filter.b0);
    }

    #[test]
    fn recurrence_first_samples() {
        let mut filter = OnePole {
            b0: 0.5,
            b1: 0.25,
            a1: 0.1,
            prev: 0.0,
        };
        // y = prev + x*b0; prev = y*a1 + x*b1
        assert!((filter.process(1.0) - 0.5).abs() < 1e-7);
        assert!((filter.history() - 0.3).abs() < 1e-7);
        assert!((filter.process(0.0) - 0.3).abs() < 1e-7);
    }

    #[test]
    fn low_pass_passes_dc() {
        let mut filter = OnePole::low_pass(500.0, SAMPLE_RATE);
        let out = settle_dc(&mut |x| filter.process(x), 1.0, 10_000);
        assert!((out - 1.0).abs() < 1e-3, "DC gain should be unity, got {}", out);
    }

    #[test]
    fn high_pass_blocks_dc() {
        let mut filter = OnePole::high_pass(500.0, SAMPLE_RATE);
        let out = settle_dc(&mut |x| filter.process(x), 1.0, 10_000);
        assert!(out.abs() < 1e-3, "DC should be removed, got {}", out);
    }

    #[test]
    fn mute_keeps_coefficients() {
        let mut filter = OnePole::low_pass(500.0, SAMPLE_RATE);
        let b0 = filter.b0;
        filter.process(1.0);
        assert!(filter.history() != 0.0);
        filter.mute();
        assert_eq!(filter.history(), 0.0);
        assert_eq!(filter.b0, b0);
    }

    #[test]
    fn cascade_order_is_at_least_one() {
        assert_eq!(OnePoleCascade::new(0).order(), 1);
        assert_eq!(OnePoleCascade::new(3).order(), 3);
    }

    #[test]
    fn cascade_matches_sections_in_series() {
        let mut cascade = OnePoleCascade::new(3);
        cascade.configure(PassKind::HighPass, 1200.0, SAMPLE_RATE);
        let mut sections = [OnePole::high_pass(1200.0, SAMPLE_RATE); 3];

        for i in 0..64 {
            let x = ((i * 7) % 11) as f32 / 11.0 - 0.5;
            let expected = sections.iter_mut().fold(x, |acc, s| s.process(acc));
            assert_eq!(cascade.process(x), expected);
        }
    }

    #[test]
    fn band_pass_rejects_dc() {
        let mut band = BandPassCascade::new(3);
        band.configure(120.0, 1200.0, SAMPLE_RATE);
        let out = settle_dc(&mut |x| band.process(x), 1.0, 20_000);
        assert!(out.abs() < 1e-3);
    }
}
