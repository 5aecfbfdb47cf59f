//! Virtual depth via cross-fed delay lines
//!
//! Each channel is delayed and fed into the other channel's delay input, so a
//! decaying ping-pong of early reflections builds up behind the dry signal.
//! Once the strength reaches the branch threshold the right feedback path is
//! inverted, which pushes the reflections out of phase and widens the room
//! instead of thickening the centre.
//!
//! After the feedback is mixed in, the side channel is split with a parametric
//! high-pass and only the part the filter rejects is kept as side:
//! `side = diff - hp(diff)`.

use crate::dsp::{ParametricHighPass, TimeConstDelay};

/// Delay, filter and gain-model parameters of the depth stage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthParams {
    pub delay_left_ms: f32,
    pub delay_right_ms: f32,
    pub highpass_freq_hz: f32,
    pub highpass_gain_db: f32,
    pub highpass_q: f32,
    /// Strengths at or above this invert the right feedback path
    pub branch_threshold: i32,
    pub gain_scale_db: f32,
    pub gain_offset_db: f32,
    /// Upper bound of the linear feedback gain
    pub gain_cap: f32,
}

impl Default for DepthParams {
    fn default() -> Self {
        Self {
            delay_left_ms: 20.0,
            delay_right_ms: 14.0,
            highpass_freq_hz: 800.0,
            highpass_gain_db: -11.0,
            highpass_q: 0.72,
            branch_threshold: 500,
            gain_scale_db: 10.0,
            gain_offset_db: -15.0,
            gain_cap: 1.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DepthSurround {
    params: DepthParams,
    sample_rate: u32,
    delays: [TimeConstDelay; 2],
    highpass: ParametricHighPass,
    strength: i16,
    enabled: bool,
    invert_right: bool,
    gain: f32,
    prev: [f32; 2],
}

impl DepthSurround {
    pub fn new(sample_rate: u32) -> Self {
        let mut depth = Self {
            params: DepthParams::default(),
            sample_rate,
            delays: [TimeConstDelay::default(), TimeConstDelay::default()],
            highpass: ParametricHighPass::new(),
            strength: 0,
            enabled: false,
            invert_right: false,
            gain: 0.0,
            prev: [0.0; 2],
        };
        depth.configure_filters();
        depth.refresh_strength();
        depth
    }

    /// Always rebuilds the delay lines and the side filter
    pub fn set_sample_rate(&mut self, sample_rate: u32) {
        self.sample_rate = sample_rate;
        self.configure_filters();
    }

    pub fn set_strength(&mut self, strength: i16) {
        self.strength = strength;
        self.refresh_strength();
    }

    pub fn strength(&self) -> i16 {
        self.strength
    }

    /// Any non-zero strength enables the stage, negative ones included
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Current linear feedback gain
    pub fn gain(&self) -> f32 {
        self.gain
    }

    pub fn is_right_inverted(&self) -> bool {
        self.invert_right
    }

    pub fn params(&self) -> &DepthParams {
        &self.params
    }

    /// Delay lengths in samples, left then right
    pub fn delay_samples(&self) -> (usize, usize) {
        (self.delays[0].len(), self.delays[1].len())
    }

    pub fn set_delay_ms(&mut self, left_ms: f32, right_ms: f32) {
        if self.params.delay_left_ms == left_ms && self.params.delay_right_ms == right_ms {
            return;
        }
        self.params.delay_left_ms = left_ms;
        self.params.delay_right_ms = right_ms;
        self.configure_filters();
    }

    pub fn set_high_pass(&mut self, frequency_hz: f32, gain_db: f32, q: f32) {
        let p = &self.params;
        if p.highpass_freq_hz == frequency_hz && p.highpass_gain_db == gain_db && p.highpass_q == q
        {
            return;
        }
        self.params.highpass_freq_hz = frequency_hz;
        self.params.highpass_gain_db = gain_db;
        self.params.highpass_q = q;
        self.configure_filters();
    }

    pub fn set_branch_threshold(&mut self, threshold: i32) {
        if self.params.branch_threshold == threshold {
            return;
        }
        self.params.branch_threshold = threshold;
        self.refresh_strength();
    }

    pub fn set_gain_model(&mut self, scale_db: f32, offset_db: f32, cap: f32) {
        let p = &self.params;
        if p.gain_scale_db == scale_db && p.gain_offset_db == offset_db && p.gain_cap == cap {
            return;
        }
        self.params.gain_scale_db = scale_db;
        self.params.gain_offset_db = offset_db;
        self.params.gain_cap = cap;
        self.refresh_strength();
    }

    /// Apply all parameters; each group only reconfigures when it changed
    pub fn apply_params(&mut self, params: &DepthParams) {
        self.set_delay_ms(params.delay_left_ms, params.delay_right_ms);
        self.set_high_pass(params.highpass_freq_hz, params.highpass_gain_db, params.highpass_q);
        self.set_branch_threshold(params.branch_threshold);
        self.set_gain_model(params.gain_scale_db, params.gain_offset_db, params.gain_cap);
    }

    /// Zero the feedback memory
    pub fn reset(&mut self) {
        self.prev = [0.0; 2];
    }

    fn configure_filters(&mut self) {
        tracing::debug!(
            sample_rate = self.sample_rate,
            left_ms = self.params.delay_left_ms,
            right_ms = self.params.delay_right_ms,
            "depth delays reconfigured"
        );
        self.delays[0].configure(self.sample_rate, self.params.delay_left_ms / 1000.0);
        self.delays[1].configure(self.sample_rate, self.params.delay_right_ms / 1000.0);
        self.highpass.configure(
            self.params.highpass_freq_hz,
            self.sample_rate,
            f64::from(self.params.highpass_gain_db),
            self.params.highpass_q,
        );
        self.reset();
    }

    fn refresh_strength(&mut self) {
        self.invert_right = i32::from(self.strength) >= self.params.branch_threshold;
        self.enabled = self.strength != 0;

        if !self.enabled {
            self.gain = 0.0;
            return;
        }

        let db = (f32::from(self.strength) / 1000.0) * self.params.gain_scale_db
            + self.params.gain_offset_db;
        let computed = 10.0_f32.powf(db / 20.0).max(0.0);
        self.gain = computed.min(self.params.gain_cap).max(0.0);
    }

    pub fn process(&mut self, samples: &mut [f32]) {
        if !self.enabled {
            return;
        }

        for frame in samples.chunks_exact_mut(2) {
            let dry_left = frame[0];
            let dry_right = frame[1];

            self.prev[0] = self.gain * self.delays[0].process(dry_left + self.prev[1]);
            let right = self.gain * self.delays[1].process(dry_right + self.prev[0]);
            self.prev[1] = if self.invert_right { -right } else { right };

            let l = self.prev[0] + dry_left;
            let r = self.prev[1] + dry_right;

            let diff = (l - r) * 0.5;
            let avg = (l + r) * 0.5;
            let side = diff - self.highpass.process(diff);

            frame[0] = avg + side;
            frame[1] = avg - side;
        }
    }
}
