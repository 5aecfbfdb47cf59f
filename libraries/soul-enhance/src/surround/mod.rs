//! Field surround: depth, widening and stereo image shaping
//!
//! Stages always run in this order, each one skipped when it has nothing to
//! do:
//!
//! 1. depth (cross-fed delays, skipped at strength 0)
//! 2. widening matrix (always on, identity at defaults)
//! 3. phase offset all-pass pair (skipped at offset 0)
//! 4. output fold to side-only or mid-only mono (skipped in `Normal`)
//! 5. mono-sum blend with pan (skipped at mix 0)

mod depth;
mod mapping;
mod settings;
mod widen;

pub use depth::{DepthParams, DepthSurround};
pub use mapping::{direct_depth_strength, wrapper_compat_depth_strength};
pub use settings::{AdvancedSettings, FieldSurroundSettings, OutputMode};
pub use widen::Stereo3DSurround;

use crate::dsp::PhaseShifter;
use crate::effects::AudioEffect;

/// Largest all-pass coefficient derived from the phase offset
const MAX_PHASE_COEFFICIENT: f32 = 0.95;

/// Stereo field processor
///
/// Host parameters arrive as integers (`*_from_param`), mirroring the
/// control values a player UI exposes; [`FieldSurroundSettings`] bundles the
/// same values for presets.
#[derive(Debug, Clone)]
pub struct FieldSurroundProcessor {
    settings: FieldSurroundSettings,
    sample_rate: u32,
    depth: DepthSurround,
    widen: Stereo3DSurround,
    phase_shifters: [PhaseShifter; 2],
    phase_offset: f32,
    mono_sum_mix: f32,
    mono_sum_pan: f32,
}

impl FieldSurroundProcessor {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            settings: FieldSurroundSettings::default(),
            sample_rate,
            depth: DepthSurround::new(sample_rate),
            widen: Stereo3DSurround::new(),
            phase_shifters: [PhaseShifter::new(); 2],
            phase_offset: 0.0,
            mono_sum_mix: 0.0,
            mono_sum_pan: 0.0,
        }
    }

    /// Processor configured from `settings` (clamped into host ranges)
    pub fn with_settings(sample_rate: u32, settings: &FieldSurroundSettings) -> Self {
        let mut processor = Self::new(sample_rate);
        processor.apply_settings(settings);
        processor
    }

    pub fn settings(&self) -> &FieldSurroundSettings {
        &self.settings
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn is_enabled(&self) -> bool {
        self.settings.enabled
    }

    pub fn output_mode(&self) -> OutputMode {
        self.settings.output_mode
    }

    pub fn depth(&self) -> &DepthSurround {
        &self.depth
    }

    pub fn widening(&self) -> &Stereo3DSurround {
        &self.widen
    }

    pub fn phase_offset(&self) -> f32 {
        self.phase_offset
    }

    pub fn mono_sum_mix(&self) -> f32 {
        self.mono_sum_mix
    }

    pub fn mono_sum_pan(&self) -> f32 {
        self.mono_sum_pan
    }

    /// Only a changed rate rebuilds the depth stage
    pub fn set_sample_rate(&mut self, sample_rate: u32) {
        if self.sample_rate == sample_rate {
            return;
        }
        tracing::debug!(
            from = self.sample_rate,
            to = sample_rate,
            "field surround sample rate changed"
        );
        self.sample_rate = sample_rate;
        self.depth.set_sample_rate(sample_rate);
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

    pub fn set_output_mode(&mut self, mode: OutputMode) {
        self.settings.output_mode = mode;
    }

    pub fn set_output_mode_from_param(&mut self, value: i32) {
        self.set_output_mode(OutputMode::from_index(value));
    }

    /// Widening in percent (100 = +1.0)
    pub fn set_widen_from_param(&mut self, value: i32) {
        self.settings.widen = value;
        self.widen.set_stereo_widen(value as f32 / 100.0);
    }

    /// Mid image in percent (100 = unity)
    pub fn set_mid_from_param(&mut self, value: i32) {
        self.settings.mid_image = value;
        self.widen.set_middle_image(value as f32 / 100.0);
    }

    /// Depth strength, saturated into `i16`
    pub fn set_depth_from_param(&mut self, value: i32) {
        self.settings.depth = value;
        self.depth.set_strength(direct_depth_strength(value));
    }

    /// Phase offset in percent, clamped to ±100
    pub fn set_phase_offset_from_param(&mut self, value: i32) {
        let value = value.clamp(-100, 100);
        self.settings.phase_offset = value;
        self.phase_offset = value as f32 / 100.0;
        self.configure_phase_shifters();
    }

    /// Mono-sum blend in percent, clamped to 0..=100
    pub fn set_mono_sum_mix_from_param(&mut self, value: i32) {
        let value = value.clamp(0, 100);
        self.settings.mono_sum_mix = value;
        self.mono_sum_mix = value as f32 / 100.0;
    }

    /// Mono-sum pan in percent, clamped to ±100; positive pans right
    pub fn set_mono_sum_pan_from_param(&mut self, value: i32) {
        let value = value.clamp(-100, 100);
        self.settings.mono_sum_pan = value;
        self.mono_sum_pan = value as f32 / 100.0;
    }

    /// Depth tuning and widening normalization
    pub fn set_advanced(&mut self, advanced: &AdvancedSettings) {
        self.settings.advanced = *advanced;
        self.depth.apply_params(&advanced.depth_params());
        self.widen
            .set_normalization(advanced.stereo_floor, advanced.stereo_fallback);
    }

    /// Apply a complete configuration in one step, clamped into host ranges
    pub fn apply_settings(&mut self, settings: &FieldSurroundSettings) {
        let settings = settings.clamped();
        self.set_advanced(&settings.advanced);
        self.set_output_mode(settings.output_mode);
        self.set_widen_from_param(settings.widen);
        self.set_mid_from_param(settings.mid_image);
        self.set_depth_from_param(settings.depth);
        self.set_phase_offset_from_param(settings.phase_offset);
        self.set_mono_sum_mix_from_param(settings.mono_sum_mix);
        self.set_mono_sum_pan_from_param(settings.mono_sum_pan);
        self.set_enabled(settings.enabled);
    }

    /// Rebuild the depth stage and clear the all-pass memory
    pub fn reset(&mut self) {
        tracing::debug!(sample_rate = self.sample_rate, "field surround reset");
        self.depth.set_sample_rate(self.sample_rate);
        for shifter in &mut self.phase_shifters {
            shifter.reset();
        }
        self.configure_phase_shifters();
    }

    fn configure_phase_shifters(&mut self) {
        let coefficient = (self.phase_offset * MAX_PHASE_COEFFICIENT)
            .clamp(-MAX_PHASE_COEFFICIENT, MAX_PHASE_COEFFICIENT);
        self.phase_shifters[0].set_coefficient(coefficient);
        self.phase_shifters[1].set_coefficient(-coefficient);
    }

    /// Process interleaved stereo in place
    pub fn process(&mut self, buffer: &mut [f32]) {
        if !self.settings.enabled {
            return;
        }
        let frames = buffer.len() / 2;
        if frames == 0 {
            return;
        }
        let samples = &mut buffer[..frames * 2];

        self.depth.process(samples);
        self.widen.process(samples);

        if self.phase_offset != 0.0 {
            let [left, right] = &mut self.phase_shifters;
            for frame in samples.chunks_exact_mut(2) {
                frame[0] = left.process(frame[0]);
                frame[1] = right.process(frame[1]);
            }
        }

        match self.settings.output_mode {
            OutputMode::Normal => {}
            OutputMode::PureSideMono => fold(samples, |l, r| (r - l) * 0.5),
            OutputMode::MidOnlyMono => fold(samples, |l, r| (l + r) * 0.5),
        }

        if self.mono_sum_mix > 0.0 {
            self.apply_mono_sum(samples);
        }
    }

    fn apply_mono_sum(&self, samples: &mut [f32]) {
        let mix = self.mono_sum_mix;
        let dry = 1.0 - mix;
        // Panning only ever attenuates the opposite side
        let left_weight = 1.0 - self.mono_sum_pan.max(0.0);
        let right_weight = 1.0 + self.mono_sum_pan.min(0.0);

        for frame in samples.chunks_exact_mut(2) {
            let (left, right) = (frame[0], frame[1]);
            let mono = (left + right) * 0.5;
            frame[0] = dry * left + mix * mono * left_weight;
            frame[1] = dry * right + mix * mono * right_weight;
        }
    }
}

fn fold(samples: &mut [f32], derive: impl Fn(f32, f32) -> f32) {
    for frame in samples.chunks_exact_mut(2) {
        let mono = derive(frame[0], frame[1]);
        frame[0] = mono;
        frame[1] = mono;
    }
}

impl Default for FieldSurroundProcessor {
    fn default() -> Self {
        Self::new(crate::DEFAULT_SAMPLE_RATE)
    }
}

impl AudioEffect for FieldSurroundProcessor {
    fn process(&mut self, buffer: &mut [f32], sample_rate: u32) {
        self.set_sample_rate(sample_rate);
        FieldSurroundProcessor::process(self, buffer);
    }

    fn reset(&mut self) {
        FieldSurroundProcessor::reset(self);
    }

    fn set_enabled(&mut self, enabled: bool) {
        FieldSurroundProcessor::set_enabled(self, enabled);
    }

    fn is_enabled(&self) -> bool {
        self.settings.enabled
    }

    fn name(&self) -> &str {
        "Field Surround"
    }
}
