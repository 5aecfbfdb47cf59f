//! XHiFi mode: three-band exciter
//!
//! Every sample is split into a low-pass, a high-pass and a band-pass branch.
//! The high-pass branch stays at zero latency; the band-pass and low-pass
//! branches are held back by `sample_rate / divisor` frames so the bands line
//! up again before they are summed:
//!
//! ```text
//! out = hp·gain·hp_mix + bp[n - d_bp]·gain·bp_mix + lp[n - d_lp]
//! ```
//!
//! The low band is added back unscaled so the body of the signal keeps its
//! level while only the upper bands are excited.

use crate::dsp::{BandPassCascade, OnePoleCascade, PassKind, WaveBuffer};
use serde::{Deserialize, Serialize};

/// Frames pre-allocated in each delay branch
const INITIAL_CAPACITY_FRAMES: usize = 0x800;

/// Typical host block; reserved on reset so steady-state processing does not
/// reallocate
const RESERVED_BLOCK_FRAMES: usize = 4096;

const LOW_PASS_ORDER: usize = 1;
const HIGH_PASS_ORDER: usize = 3;
const BAND_PASS_ORDER: usize = 3;

/// XHiFi tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct XHiFiSettings {
    /// Low-pass cutoff and band-pass lower edge
    pub low_cut_hz: i32,
    /// High-pass cutoff and band-pass upper edge
    pub high_cut_hz: i32,
    pub hp_mix: f32,
    pub bp_mix: f32,
    /// Band-pass delay is `sample_rate / bp_delay_divisor` frames
    pub bp_delay_divisor: i32,
    /// Low-pass delay is `sample_rate / lp_delay_divisor` frames
    pub lp_delay_divisor: i32,
}

impl Default for XHiFiSettings {
    fn default() -> Self {
        Self {
            low_cut_hz: 120,
            high_cut_hz: 1200,
            hp_mix: 1.2,
            bp_mix: 1.0,
            bp_delay_divisor: 400,
            lp_delay_divisor: 200,
        }
    }
}

#[derive(Debug, Clone)]
struct ChannelFilters {
    low_pass: OnePoleCascade,
    high_pass: OnePoleCascade,
    band_pass: BandPassCascade,
}

impl ChannelFilters {
    fn new() -> Self {
        Self {
            low_pass: OnePoleCascade::new(LOW_PASS_ORDER),
            high_pass: OnePoleCascade::new(HIGH_PASS_ORDER),
            band_pass: BandPassCascade::new(BAND_PASS_ORDER),
        }
    }
}

/// Three-band exciter with delay-matched low and band branches
#[derive(Debug, Clone)]
pub struct HiFi {
    bp_buffer: WaveBuffer,
    lp_buffer: WaveBuffer,
    filters: [ChannelFilters; 2],
    gain: f32,
    sample_rate: u32,
    low_cut_hz: f32,
    high_cut_hz: f32,
    hp_mix: f32,
    bp_mix: f32,
    bp_delay_divisor: u32,
    lp_delay_divisor: u32,
}

impl HiFi {
    pub fn new(sample_rate: u32, gain: f32, settings: &XHiFiSettings) -> Self {
        let mut hifi = Self {
            bp_buffer: WaveBuffer::new(2, INITIAL_CAPACITY_FRAMES),
            lp_buffer: WaveBuffer::new(2, INITIAL_CAPACITY_FRAMES),
            filters: [ChannelFilters::new(), ChannelFilters::new()],
            gain,
            sample_rate,
            low_cut_hz: settings.low_cut_hz as f32,
            high_cut_hz: settings.high_cut_hz as f32,
            hp_mix: settings.hp_mix,
            bp_mix: settings.bp_mix,
            bp_delay_divisor: safe_divisor(settings.bp_delay_divisor),
            lp_delay_divisor: safe_divisor(settings.lp_delay_divisor),
        };
        hifi.reset();
        hifi
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

    pub fn set_low_cut_hz(&mut self, hz: f32) {
        if self.low_cut_hz != hz {
            self.low_cut_hz = hz;
            self.reset();
        }
    }

    pub fn set_high_cut_hz(&mut self, hz: f32) {
        if self.high_cut_hz != hz {
            self.high_cut_hz = hz;
            self.reset();
        }
    }

    pub fn set_hp_mix(&mut self, mix: f32) {
        self.hp_mix = mix;
    }

    pub fn set_bp_mix(&mut self, mix: f32) {
        self.bp_mix = mix;
    }

    /// Divisors below one are treated as one
    pub fn set_bp_delay_divisor(&mut self, divisor: i32) {
        let divisor = safe_divisor(divisor);
        if self.bp_delay_divisor != divisor {
            self.bp_delay_divisor = divisor;
            self.reset();
        }
    }

    pub fn set_lp_delay_divisor(&mut self, divisor: i32) {
        let divisor = safe_divisor(divisor);
        if self.lp_delay_divisor != divisor {
            self.lp_delay_divisor = divisor;
            self.reset();
        }
    }

    /// Apply every XHiFi parameter; structural changes reset once each
    pub fn apply(&mut self, settings: &XHiFiSettings) {
        self.set_low_cut_hz(settings.low_cut_hz as f32);
        self.set_high_cut_hz(settings.high_cut_hz as f32);
        self.set_hp_mix(settings.hp_mix);
        self.set_bp_mix(settings.bp_mix);
        self.set_bp_delay_divisor(settings.bp_delay_divisor);
        self.set_lp_delay_divisor(settings.lp_delay_divisor);
    }

    /// Band-pass branch latency in frames
    pub fn bp_delay_frames(&self) -> usize {
        (self.sample_rate / self.bp_delay_divisor) as usize
    }

    /// Low-pass branch latency in frames
    pub fn lp_delay_frames(&self) -> usize {
        (self.sample_rate / self.lp_delay_divisor) as usize
    }

    /// Recompute all filters, zero their state and refill both delay
    /// branches with silence
    pub fn reset(&mut self) {
        for channel in &mut self.filters {
            channel
                .low_pass
                .configure(PassKind::LowPass, self.low_cut_hz, self.sample_rate);
            channel
                .high_pass
                .configure(PassKind::HighPass, self.high_cut_hz, self.sample_rate);
            channel
                .band_pass
                .configure(self.low_cut_hz, self.high_cut_hz, self.sample_rate);
        }

        let bp_delay = self.bp_delay_frames();
        let lp_delay = self.lp_delay_frames();

        self.bp_buffer.clear();
        self.bp_buffer.reserve_frames(bp_delay + RESERVED_BLOCK_FRAMES);
        self.bp_buffer.push_zeros(bp_delay);

        self.lp_buffer.clear();
        self.lp_buffer.reserve_frames(lp_delay + RESERVED_BLOCK_FRAMES);
        self.lp_buffer.push_zeros(lp_delay);
    }

    pub fn process(&mut self, samples: &mut [f32]) {
        let frames = samples.len() / 2;
        if frames == 0 {
            return;
        }
        let samples = &mut samples[..frames * 2];

        {
            let mut bp_write = self.bp_buffer.push_zeros_region(frames);
            let mut lp_write = self.lp_buffer.push_zeros_region(frames);

            for (i, sample) in samples.iter_mut().enumerate() {
                let channel = &mut self.filters[i % 2];
                let x = *sample;
                let lp = channel.low_pass.process(x);
                let hp = channel.high_pass.process(x);
                let bp = channel.band_pass.process(x);
                *sample = hp;
                lp_write[i] = lp;
                bp_write[i] = bp;
            }
        }

        for (i, sample) in samples.iter_mut().enumerate() {
            let hp = *sample * self.gain * self.hp_mix;
            let bp = self.bp_buffer[i] * self.gain * self.bp_mix;
            *sample = hp + bp + self.lp_buffer[i];
        }

        self.bp_buffer.pop_frames(frames);
        self.lp_buffer.pop_frames(frames);
    }
}

fn safe_divisor(divisor: i32) -> u32 {
    divisor.max(1) as u32
}
