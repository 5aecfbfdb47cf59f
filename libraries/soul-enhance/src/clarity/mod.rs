//! Clarity enhancer
//!
//! One of three interchangeable algorithms runs on the stereo stream, followed
//! by an optional post gain and an optional safety limiter:
//!
//! ```text
//! ┌──────────────────────────┐   ┌───────────┐   ┌────────────────┐
//! │ Natural | Ozone | XHiFi  │ → │ post gain │ → │ safety limiter │
//! └──────────────────────────┘   └───────────┘   └────────────────┘
//! ```
//!
//! Switching mode, changing the sample rate or enabling the processor throws
//! away all filter and delay state.

mod hifi;
mod natural;
mod safety;
mod settings;

pub use hifi::{HiFi, XHiFiSettings};
pub use natural::NoiseSharpening;
pub use safety::{SafetyLimiter, SafetySettings};
pub use settings::{
    max_linear_gain, ClarityMode, ClaritySettings, ClarityStrength, MAX_GAIN_DB,
    MAX_GAIN_PERCENT, MIN_GAIN_DB,
};

use crate::dsp::{db_to_linear, sanitize, HighShelf};
use crate::effects::AudioEffect;

/// Post gain closer to unity than this is skipped
const UNITY_EPSILON: f32 = 1e-7;

/// State of the active algorithm
///
/// Only the running mode owns filter memory; a mode switch builds a fresh
/// engine.
#[derive(Debug, Clone)]
enum ModeEngine {
    Natural(NoiseSharpening),
    Ozone([HighShelf; 2]),
    XHiFi(Box<HiFi>),
}

impl ModeEngine {
    fn build(settings: &ClaritySettings, sample_rate: u32) -> Self {
        match settings.mode {
            ClarityMode::Natural => Self::Natural(NoiseSharpening::new(
                sample_rate,
                settings.gain,
                settings.natural_lpf_offset_hz as f32,
            )),
            ClarityMode::Ozone => {
                let mut shelves = [HighShelf::new(), HighShelf::new()];
                for shelf in &mut shelves {
                    shelf.set_frequency(settings.ozone_freq_hz as f32);
                    shelf.set_gain_linear(settings.gain + 1.0);
                    shelf.configure(sample_rate);
                }
                Self::Ozone(shelves)
            }
            ClarityMode::XHiFi => Self::XHiFi(Box::new(HiFi::new(
                sample_rate,
                settings.gain + 1.0,
                &settings.xhifi,
            ))),
        }
    }

    fn mode(&self) -> ClarityMode {
        match self {
            Self::Natural(_) => ClarityMode::Natural,
            Self::Ozone(_) => ClarityMode::Ozone,
            Self::XHiFi(_) => ClarityMode::XHiFi,
        }
    }

    fn process(&mut self, samples: &mut [f32]) {
        match self {
            Self::Natural(natural) => natural.process(samples),
            Self::Ozone([left, right]) => {
                for frame in samples.chunks_exact_mut(2) {
                    frame[0] = left.process(frame[0]);
                    frame[1] = right.process(frame[1]);
                }
            }
            Self::XHiFi(hifi) => hifi.process(samples),
        }
    }
}

/// Stereo clarity enhancer
///
/// # Real-Time Safety
/// `process` never allocates once the XHiFi delay branches have reached the
/// host block size; every other method may allocate and should run off the
/// audio thread or between blocks.
///
/// # Example
/// ```
/// use soul_enhance::{ClarityMode, ClarityProcessor};
///
/// let mut clarity = ClarityProcessor::new(48000);
/// clarity.set_mode(ClarityMode::Ozone);
/// clarity.set_gain_linear(1.5);
/// clarity.set_enabled(true);
///
/// let mut block = vec![0.1f32; 512];
/// clarity.process(&mut block);
/// ```
#[derive(Debug, Clone)]
pub struct ClarityProcessor {
    settings: ClaritySettings,
    sample_rate: u32,
    engine: ModeEngine,
    post_gain_linear: f32,
    limiter: SafetyLimiter,
}

impl ClarityProcessor {
    /// Disabled processor with default settings
    pub fn new(sample_rate: u32) -> Self {
        Self::with_settings(sample_rate, &ClaritySettings::default())
    }

    /// Processor built from `settings`, clamped into host ranges
    pub fn with_settings(sample_rate: u32, settings: &ClaritySettings) -> Self {
        let settings = settings.clamped();
        let mut limiter = SafetyLimiter::new(sample_rate);
        limiter.configure(
            settings.safety.enabled,
            settings.safety.threshold_db,
            settings.safety.release_ms,
        );
        Self {
            engine: ModeEngine::build(&settings, sample_rate),
            post_gain_linear: db_to_linear(settings.post_gain_db),
            limiter,
            sample_rate,
            settings,
        }
    }

    pub fn settings(&self) -> &ClaritySettings {
        &self.settings
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn mode(&self) -> ClarityMode {
        self.engine.mode()
    }

    pub fn is_enabled(&self) -> bool {
        self.settings.enabled
    }

    pub fn gain(&self) -> f32 {
        self.settings.gain
    }

    pub fn post_gain_linear(&self) -> f32 {
        self.post_gain_linear
    }

    pub fn limiter(&self) -> &SafetyLimiter {
        &self.limiter
    }

    pub fn set_sample_rate(&mut self, sample_rate: u32) {
        if self.sample_rate == sample_rate {
            return;
        }
        tracing::debug!(
            from = self.sample_rate,
            to = sample_rate,
            "clarity sample rate changed"
        );
        self.sample_rate = sample_rate;
        self.limiter.set_sample_rate(sample_rate);
        self.reset();
    }

    /// Enabling starts from a clean state; disabling keeps it
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.settings.enabled == enabled {
            return;
        }
        if enabled {
            self.reset();
        }
        self.settings.enabled = enabled;
    }

    pub fn set_mode(&mut self, mode: ClarityMode) {
        if self.settings.mode == mode {
            return;
        }
        tracing::debug!(
            from = self.settings.mode.name(),
            to = mode.name(),
            "clarity mode changed"
        );
        self.settings.mode = mode;
        self.reset();
    }

    /// Host mode index; values outside 0..=2 are clamped
    pub fn set_mode_index(&mut self, index: i32) {
        self.set_mode(ClarityMode::from_index(index));
    }

    /// Linear enhancement amount
    ///
    /// In Ozone mode the shelf has to be redesigned, so this resets.
    pub fn set_gain_linear(&mut self, gain: f32) {
        let gain = sanitize("gain", gain, 0.0);
        if self.settings.gain == gain {
            return;
        }
        self.settings.gain = gain;
        if self.settings.mode == ClarityMode::Ozone {
            self.reset();
        } else {
            self.sync_gain();
        }
    }

    pub fn set_strength(&mut self, strength: ClarityStrength) {
        self.set_gain_linear(strength.to_linear());
    }

    pub fn set_post_gain_db(&mut self, db: f32) {
        let db = sanitize("post_gain_db", db, 0.0);
        self.settings.post_gain_db = db;
        self.post_gain_linear = db_to_linear(db);
    }

    /// Configure the output limiter; any change restarts its envelope
    pub fn set_safety(&mut self, enabled: bool, threshold_db: f32, release_ms: f32) {
        let defaults = SafetySettings::default();
        let threshold_db = sanitize("safety_threshold_db", threshold_db, defaults.threshold_db);
        let release_ms = sanitize("safety_release_ms", release_ms, defaults.release_ms);
        self.limiter.configure(enabled, threshold_db, release_ms);
        self.settings.safety = self.limiter.settings();
    }

    /// Natural-mode low-pass distance below Nyquist, clamped to 200..=5000 Hz
    pub fn set_natural_lpf_offset_hz(&mut self, hz: i32) {
        let hz = hz.clamp(settings::NATURAL_OFFSET_HZ.0, settings::NATURAL_OFFSET_HZ.1);
        self.settings.natural_lpf_offset_hz = hz;
        if let ModeEngine::Natural(natural) = &mut self.engine {
            natural.set_nyquist_offset(hz as f32);
        }
    }

    /// Shelf corner, clamped to 2000..=16000 Hz
    pub fn set_ozone_freq_hz(&mut self, hz: i32) {
        let hz = hz.clamp(settings::OZONE_FREQ_HZ.0, settings::OZONE_FREQ_HZ.1);
        if self.settings.ozone_freq_hz == hz {
            return;
        }
        self.settings.ozone_freq_hz = hz;
        if let ModeEngine::Ozone(shelves) = &mut self.engine {
            for shelf in shelves {
                shelf.set_frequency(hz as f32);
                shelf.configure(self.sample_rate);
            }
        }
    }

    pub fn set_xhifi_params(&mut self, params: &XHiFiSettings) {
        let params = params.clamped();
        self.settings.xhifi = params;
        if let ModeEngine::XHiFi(hifi) = &mut self.engine {
            hifi.apply(&params);
        }
    }

    /// Apply a complete configuration in one step
    ///
    /// Values are clamped into host ranges first. Structural changes reset
    /// the same way the individual setters do.
    pub fn apply_settings(&mut self, settings: &ClaritySettings) {
        let settings = settings.clamped();
        self.set_mode(settings.mode);
        self.set_gain_linear(settings.gain);
        self.set_post_gain_db(settings.post_gain_db);
        self.set_safety(
            settings.safety.enabled,
            settings.safety.threshold_db,
            settings.safety.release_ms,
        );
        self.set_natural_lpf_offset_hz(settings.natural_lpf_offset_hz);
        self.set_ozone_freq_hz(settings.ozone_freq_hz);
        self.set_xhifi_params(&settings.xhifi);
        self.set_enabled(settings.enabled);
    }

    /// Rebuild the active algorithm and clear the limiter envelope
    pub fn reset(&mut self) {
        tracing::debug!(
            mode = self.settings.mode.name(),
            sample_rate = self.sample_rate,
            "clarity reset"
        );
        self.engine = ModeEngine::build(&self.settings, self.sample_rate);
        self.limiter.reset();
    }

    fn sync_gain(&mut self) {
        let gain = self.settings.gain;
        match &mut self.engine {
            ModeEngine::Natural(natural) => natural.set_gain(gain),
            ModeEngine::Ozone(shelves) => {
                for shelf in shelves {
                    shelf.set_gain_linear(gain + 1.0);
                }
            }
            ModeEngine::XHiFi(hifi) => hifi.set_gain(gain + 1.0),
        }
    }

    /// Process interleaved stereo in place
    ///
    /// Only complete frames are touched; a trailing odd sample is left as is.
    pub fn process(&mut self, buffer: &mut [f32]) {
        if !self.settings.enabled {
            return;
        }
        let frames = buffer.len() / 2;
        if frames == 0 {
            return;
        }
        let samples = &mut buffer[..frames * 2];

        self.engine.process(samples);
        self.apply_post_gain_and_safety(samples);
    }

    fn apply_post_gain_and_safety(&mut self, samples: &mut [f32]) {
        let post_gain = self.post_gain_linear;
        let apply_gain = (post_gain - 1.0).abs() > UNITY_EPSILON;
        let limit = self.limiter.is_enabled();
        if !apply_gain && !limit {
            return;
        }

        for sample in samples.iter_mut() {
            let mut x = if apply_gain { *sample * post_gain } else { *sample };
            if limit {
                x = self.limiter.process_sample(x);
            }
            *sample = x;
        }
    }
}

impl Default for ClarityProcessor {
    fn default() -> Self {
        Self::new(crate::DEFAULT_SAMPLE_RATE)
    }
}

impl AudioEffect for ClarityProcessor {
    fn process(&mut self, buffer: &mut [f32], sample_rate: u32) {
        self.set_sample_rate(sample_rate);
        ClarityProcessor::process(self, buffer);
    }

    fn reset(&mut self) {
        ClarityProcessor::reset(self);
    }

    fn set_enabled(&mut self, enabled: bool) {
        ClarityProcessor::set_enabled(self, enabled);
    }

    fn is_enabled(&self) -> bool {
        self.settings.enabled
    }

    fn name(&self) -> &str {
        "Clarity"
    }
}
