//! Field-surround configuration in host units

use super::depth::DepthParams;
use crate::dsp::sanitize;
use crate::error::{check_range, check_range_i32, Result};
use serde::{Deserialize, Serialize};

const IMAGE_PERCENT: (i32, i32) = (0, 800);
const DEPTH_STRENGTH: (i32, i32) = (0, 800);
const PHASE_OFFSET: (i32, i32) = (-100, 100);
const MONO_SUM_MIX: (i32, i32) = (0, 100);
const MONO_SUM_PAN: (i32, i32) = (-100, 100);
const DELAY_MS: (f32, f32) = (1.0, 100.0);
const HIGHPASS_HZ: (f32, f32) = (20.0, 4000.0);
const HIGHPASS_GAIN_DB: (f32, f32) = (-30.0, 12.0);
const HIGHPASS_Q: (f32, f32) = (0.1, 3.0);
const BRANCH_THRESHOLD: (i32, i32) = (0, 2000);
const GAIN_SCALE_DB: (f32, f32) = (0.0, 30.0);
const GAIN_OFFSET_DB: (f32, f32) = (-40.0, 20.0);
const GAIN_CAP: (f32, f32) = (0.1, 2.0);
const STEREO_FLOOR: (f32, f32) = (0.1, 5.0);
const STEREO_FALLBACK: (f32, f32) = (0.1, 2.0);

/// Final fold applied to the processed stereo pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    #[default]
    Normal,
    /// Both channels carry `(R - L) / 2`
    PureSideMono,
    /// Both channels carry `(L + R) / 2`
    MidOnlyMono,
}

impl OutputMode {
    /// Host index, clamped into 0..=2
    pub fn from_index(index: i32) -> Self {
        match index.clamp(0, 2) {
            0 => Self::Normal,
            1 => Self::PureSideMono,
            _ => Self::MidOnlyMono,
        }
    }

    pub fn index(self) -> i32 {
        match self {
            Self::Normal => 0,
            Self::PureSideMono => 1,
            Self::MidOnlyMono => 2,
        }
    }
}

/// Depth and normalization tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvancedSettings {
    pub delay_left_ms: f32,
    pub delay_right_ms: f32,
    pub highpass_freq_hz: f32,
    pub highpass_gain_db: f32,
    pub highpass_q: f32,
    pub branch_threshold: i32,
    pub gain_scale_db: f32,
    pub gain_offset_db: f32,
    pub gain_cap: f32,
    /// Widening denominators below this use `stereo_fallback`
    pub stereo_floor: f32,
    pub stereo_fallback: f32,
}

impl Default for AdvancedSettings {
    fn default() -> Self {
        let depth = DepthParams::default();
        Self {
            delay_left_ms: depth.delay_left_ms,
            delay_right_ms: depth.delay_right_ms,
            highpass_freq_hz: depth.highpass_freq_hz,
            highpass_gain_db: depth.highpass_gain_db,
            highpass_q: depth.highpass_q,
            branch_threshold: depth.branch_threshold,
            gain_scale_db: depth.gain_scale_db,
            gain_offset_db: depth.gain_offset_db,
            gain_cap: depth.gain_cap,
            stereo_floor: 2.0,
            stereo_fallback: 0.5,
        }
    }
}

impl AdvancedSettings {
    pub fn depth_params(&self) -> DepthParams {
        DepthParams {
            delay_left_ms: self.delay_left_ms,
            delay_right_ms: self.delay_right_ms,
            highpass_freq_hz: self.highpass_freq_hz,
            highpass_gain_db: self.highpass_gain_db,
            highpass_q: self.highpass_q,
            branch_threshold: self.branch_threshold,
            gain_scale_db: self.gain_scale_db,
            gain_offset_db: self.gain_offset_db,
            gain_cap: self.gain_cap,
        }
    }

    pub fn clamped(&self) -> Self {
        let d = Self::default();
        Self {
            delay_left_ms: fit("delay_left_ms", self.delay_left_ms, d.delay_left_ms, DELAY_MS),
            delay_right_ms: fit("delay_right_ms", self.delay_right_ms, d.delay_right_ms, DELAY_MS),
            highpass_freq_hz: fit(
                "highpass_freq_hz",
                self.highpass_freq_hz,
                d.highpass_freq_hz,
                HIGHPASS_HZ,
            ),
            highpass_gain_db: fit(
                "highpass_gain_db",
                self.highpass_gain_db,
                d.highpass_gain_db,
                HIGHPASS_GAIN_DB,
            ),
            highpass_q: fit("highpass_q", self.highpass_q, d.highpass_q, HIGHPASS_Q),
            branch_threshold: self
                .branch_threshold
                .clamp(BRANCH_THRESHOLD.0, BRANCH_THRESHOLD.1),
            gain_scale_db: fit(
                "gain_scale_db",
                self.gain_scale_db,
                d.gain_scale_db,
                GAIN_SCALE_DB,
            ),
            gain_offset_db: fit(
                "gain_offset_db",
                self.gain_offset_db,
                d.gain_offset_db,
                GAIN_OFFSET_DB,
            ),
            gain_cap: fit("gain_cap", self.gain_cap, d.gain_cap, GAIN_CAP),
            stereo_floor: fit("stereo_floor", self.stereo_floor, d.stereo_floor, STEREO_FLOOR),
            stereo_fallback: fit(
                "stereo_fallback",
                self.stereo_fallback,
                d.stereo_fallback,
                STEREO_FALLBACK,
            ),
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_f32("delay_left_ms", self.delay_left_ms, DELAY_MS)?;
        check_f32("delay_right_ms", self.delay_right_ms, DELAY_MS)?;
        check_f32("highpass_freq_hz", self.highpass_freq_hz, HIGHPASS_HZ)?;
        check_f32("highpass_gain_db", self.highpass_gain_db, HIGHPASS_GAIN_DB)?;
        check_f32("highpass_q", self.highpass_q, HIGHPASS_Q)?;
        check_i32("branch_threshold", self.branch_threshold, BRANCH_THRESHOLD)?;
        check_f32("gain_scale_db", self.gain_scale_db, GAIN_SCALE_DB)?;
        check_f32("gain_offset_db", self.gain_offset_db, GAIN_OFFSET_DB)?;
        check_f32("gain_cap", self.gain_cap, GAIN_CAP)?;
        check_f32("stereo_floor", self.stereo_floor, STEREO_FLOOR)?;
        check_f32("stereo_fallback", self.stereo_fallback, STEREO_FALLBACK)
    }
}

/// Complete field-surround configuration
///
/// Image, depth, phase and mix values use the host's integer units
/// (percent for widening, mid image, phase, mix and pan).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSurroundSettings {
    pub enabled: bool,
    pub output_mode: OutputMode,
    /// Extra side gain in percent; 0 leaves the image untouched
    pub widen: i32,
    /// Mid level in percent; 100 leaves the centre untouched
    pub mid_image: i32,
    /// Depth strength, 0 disables the depth stage
    pub depth: i32,
    pub phase_offset: i32,
    pub mono_sum_mix: i32,
    pub mono_sum_pan: i32,
    pub advanced: AdvancedSettings,
}

impl Default for FieldSurroundSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            output_mode: OutputMode::Normal,
            widen: 0,
            mid_image: 100,
            depth: 0,
            phase_offset: 0,
            mono_sum_mix: 0,
            mono_sum_pan: 0,
            advanced: AdvancedSettings::default(),
        }
    }
}

impl FieldSurroundSettings {
    /// Moderate widening with a touch of depth
    pub fn wide() -> Self {
        Self {
            enabled: true,
            widen: 60,
            depth: 300,
            ..Self::default()
        }
    }

    /// Strong depth past the branch threshold with phase spread
    pub fn immersive() -> Self {
        Self {
            enabled: true,
            widen: 100,
            depth: 650,
            phase_offset: 30,
            ..Self::default()
        }
    }

    pub fn clamped(&self) -> Self {
        Self {
            enabled: self.enabled,
            output_mode: self.output_mode,
            widen: self.widen.clamp(IMAGE_PERCENT.0, IMAGE_PERCENT.1),
            mid_image: self.mid_image.clamp(IMAGE_PERCENT.0, IMAGE_PERCENT.1),
            depth: self.depth.clamp(DEPTH_STRENGTH.0, DEPTH_STRENGTH.1),
            phase_offset: self.phase_offset.clamp(PHASE_OFFSET.0, PHASE_OFFSET.1),
            mono_sum_mix: self.mono_sum_mix.clamp(MONO_SUM_MIX.0, MONO_SUM_MIX.1),
            mono_sum_pan: self.mono_sum_pan.clamp(MONO_SUM_PAN.0, MONO_SUM_PAN.1),
            advanced: self.advanced.clamped(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_i32("widen", self.widen, IMAGE_PERCENT)?;
        check_i32("mid_image", self.mid_image, IMAGE_PERCENT)?;
        check_i32("depth", self.depth, DEPTH_STRENGTH)?;
        check_i32("phase_offset", self.phase_offset, PHASE_OFFSET)?;
        check_i32("mono_sum_mix", self.mono_sum_mix, MONO_SUM_MIX)?;
        check_i32("mono_sum_pan", self.mono_sum_pan, MONO_SUM_PAN)?;
        self.advanced.validate()
    }
}

fn fit(name: &'static str, value: f32, default: f32, (min, max): (f32, f32)) -> f32 {
    sanitize(name, value, default).clamp(min, max)
}

fn check_f32(name: &'static str, value: f32, (min, max): (f32, f32)) -> Result<()> {
    check_range(name, value, min, max)
}

fn check_i32(name: &'static str, value: i32, (min, max): (i32, i32)) -> Result<()> {
    check_range_i32(name, value, min, max)
}
