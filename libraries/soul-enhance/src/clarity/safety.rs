//! Safety limiter for the clarity output
//!
//! Feed-forward peak limiter with no lookahead. A single envelope tracks the
//! interleaved stream, so both channels always receive the same gain
//! reduction and the stereo image does not shift under asymmetric peaks.

use crate::dsp::db_to_linear;
use serde::{Deserialize, Serialize};

/// Lowest linear threshold accepted
const MIN_THRESHOLD: f32 = 1e-6;

/// Shortest release accepted, in seconds
const MIN_RELEASE_SECONDS: f32 = 0.001;

/// Safety limiter settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetySettings {
    pub enabled: bool,
    /// Threshold in dBFS
    pub threshold_db: f32,
    /// Release time in milliseconds
    pub release_ms: f32,
}

impl Default for SafetySettings {
    fn default() -> Self {
        Self {
            enabled: false,
            threshold_db: -0.8,
            release_ms: 60.0,
        }
    }
}

impl SafetySettings {
    /// Brick-wall style protection just under full scale
    pub fn protective() -> Self {
        Self {
            enabled: true,
            threshold_db: -0.3,
            release_ms: 100.0,
        }
    }
}

/// Peak-envelope limiter shared across both channels
#[derive(Debug, Clone)]
pub struct SafetyLimiter {
    settings: SafetySettings,
    threshold_linear: f32,
    release_coeff: f32,
    envelope: f32,
    sample_rate: u32,
}

impl SafetyLimiter {
    pub fn new(sample_rate: u32) -> Self {
        let settings = SafetySettings::default();
        let mut limiter = Self {
            settings,
            threshold_linear: db_to_linear(settings.threshold_db),
            release_coeff: 0.0,
            envelope: 0.0,
            sample_rate,
        };
        limiter.update_release_coeff();
        limiter
    }

    /// Update all settings at once
    ///
    /// Any change restarts the envelope from silence. Unchanged settings are
    /// ignored so repeated host pushes do not disturb limiting.
    pub fn configure(&mut self, enabled: bool, threshold_db: f32, release_ms: f32) {
        let threshold_linear = db_to_linear(threshold_db);
        let changed = self.settings.enabled != enabled
            || self.threshold_linear != threshold_linear
            || self.settings.release_ms != release_ms;
        if !changed {
            return;
        }

        self.settings = SafetySettings {
            enabled,
            threshold_db,
            release_ms,
        };
        self.threshold_linear = threshold_linear;
        self.envelope = 0.0;
        self.update_release_coeff();
    }

    pub fn set_sample_rate(&mut self, sample_rate: u32) {
        self.sample_rate = sample_rate;
        self.update_release_coeff();
    }

    pub fn settings(&self) -> SafetySettings {
        self.settings
    }

    pub fn is_enabled(&self) -> bool {
        self.settings.enabled
    }

    /// Current envelope level (linear)
    pub fn envelope(&self) -> f32 {
        self.envelope
    }

    pub fn release_coeff(&self) -> f32 {
        self.release_coeff
    }

    pub fn reset(&mut self) {
        self.envelope = 0.0;
    }

    fn update_release_coeff(&mut self) {
        let release_seconds = (self.settings.release_ms / 1000.0).max(MIN_RELEASE_SECONDS);
        let sample_rate = (self.sample_rate as f32).max(1.0);
        self.release_coeff = (-1.0 / (release_seconds * sample_rate)).exp();
    }

    /// Limit one sample and advance the shared envelope
    #[inline]
    pub fn process_sample(&mut self, sample: f32) -> f32 {
        self.envelope = sample.abs().max(self.envelope * self.release_coeff);
        let threshold = self.threshold_linear.max(MIN_THRESHOLD);
        if self.envelope > threshold {
            sample * (threshold / self.envelope)
        } else {
            sample
        }
    }
}
