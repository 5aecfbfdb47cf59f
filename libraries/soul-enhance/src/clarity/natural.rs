//! Natural mode: treble sharpening
//!
//! Each channel gets a first-difference pre-emphasis
//! `x + (x - x_prev) * gain`, then a one-pole low-pass placed just under
//! Nyquist to take the edge off the boosted top octave.

use crate::dsp::OnePole;

/// Smallest cutoff handed to the low-pass when the offset reaches Nyquist
const MIN_CUTOFF_HZ: f32 = 1.0e-3;

#[derive(Debug, Clone)]
pub struct NoiseSharpening {
    filters: [OnePole; 2],
    prev_in: [f32; 2],
    sample_rate: u32,
    gain: f32,
    nyquist_offset_hz: f32,
}

impl NoiseSharpening {
    pub fn new(sample_rate: u32, gain: f32, nyquist_offset_hz: f32) -> Self {
        let mut natural = Self {
            filters: [OnePole::new(); 2],
            prev_in: [0.0; 2],
            sample_rate,
            gain,
            nyquist_offset_hz,
        };
        natural.reset();
        natural
    }

    pub fn set_sample_rate(&mut self, sample_rate: u32) {
        if self.sample_rate != sample_rate {
            self.sample_rate = sample_rate;
            self.reset();
        }
    }

    pub fn set_gain(&mut self, gain: f32) {
        self.gain = gain;
    }

    /// Distance of the low-pass cutoff below Nyquist
    pub fn set_nyquist_offset(&mut self, hz: f32) {
        if self.nyquist_offset_hz != hz {
            self.nyquist_offset_hz = hz;
            self.reset();
        }
    }

    /// Low-pass cutoff actually in use
    pub fn cutoff_hz(&self) -> f32 {
        (self.sample_rate as f32 * 0.5 - self.nyquist_offset_hz).max(MIN_CUTOFF_HZ)
    }

    pub fn reset(&mut self) {
        let cutoff = self.cutoff_hz();
        for filter in &mut self.filters {
            filter.set_low_pass(cutoff, self.sample_rate);
            filter.mute();
        }
        self.prev_in = [0.0; 2];
    }

    pub fn process(&mut self, samples: &mut [f32]) {
        for frame in samples.chunks_exact_mut(2) {
            for (ch, sample) in frame.iter_mut().enumerate() {
                let x = *sample;
                let prev = self.prev_in[ch];
                self.prev_in[ch] = x;
                let emphasized = x + (x - prev) * self.gain;
                *sample = self.filters[ch].process(emphasized);
            }
        }
    }
}
