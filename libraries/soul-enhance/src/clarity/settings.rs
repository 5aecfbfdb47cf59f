//! Clarity configuration types and host parameter ranges

use super::hifi::XHiFiSettings;
use super::safety::SafetySettings;
use crate::dsp::{db_to_linear, sanitize};
use crate::error::{check_range, check_range_i32, Result};
use serde::{Deserialize, Serialize};

/// Strongest boost accepted, in dB
pub const MAX_GAIN_DB: f32 = 16.0;
/// Weakest boost accepted, in dB
pub const MIN_GAIN_DB: f32 = -40.0;
/// Largest percentage accepted by [`ClarityStrength::Percent`]
pub const MAX_GAIN_PERCENT: f32 = 631.0;

/// Largest linear gain, `10^(16/20)`
pub fn max_linear_gain() -> f32 {
    db_to_linear(MAX_GAIN_DB)
}

const POST_GAIN_DB: (f32, f32) = (-24.0, 16.0);
const SAFETY_THRESHOLD_DB: (f32, f32) = (-12.0, 0.0);
const SAFETY_RELEASE_MS: (f32, f32) = (1.5, 500.0);
pub(crate) const NATURAL_OFFSET_HZ: (i32, i32) = (200, 5000);
pub(crate) const OZONE_FREQ_HZ: (i32, i32) = (2000, 16000);
const XHIFI_LOW_CUT_HZ: (i32, i32) = (40, 400);
const XHIFI_HIGH_CUT_HZ: (i32, i32) = (400, 6000);
const XHIFI_MIX: (f32, f32) = (0.0, 2.5);
const XHIFI_DIVISOR: (i32, i32) = (80, 1200);

/// Enhancement algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClarityMode {
    /// Differenced treble sharpening
    #[default]
    Natural,
    /// High-shelf boost
    Ozone,
    /// Three-band delay-matched exciter
    #[serde(rename = "xhifi")]
    XHiFi,
}

impl ClarityMode {
    /// Map a host mode index, clamping anything outside 0..=2
    pub fn from_index(index: i32) -> Self {
        let clamped = index.clamp(0, 2);
        if clamped != index {
            tracing::warn!(index, clamped, "clarity mode index out of range");
        }
        match clamped {
            0 => Self::Natural,
            1 => Self::Ozone,
            _ => Self::XHiFi,
        }
    }

    pub fn index(self) -> i32 {
        match self {
            Self::Natural => 0,
            Self::Ozone => 1,
            Self::XHiFi => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Natural => "Natural",
            Self::Ozone => "Ozone",
            Self::XHiFi => "XHiFi",
        }
    }
}

/// Enhancement amount as the host expresses it
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClarityStrength {
    /// 0..=631 percent, 100 % being a linear gain of 1.0
    Percent(f32),
    /// Decibels, -40..=16
    Db(f32),
}

impl ClarityStrength {
    /// Linear gain in `[0, 10^(16/20)]`; non-finite input gives 0.0
    pub fn to_linear(self) -> f32 {
        let linear = match self {
            Self::Percent(percent) => {
                sanitize("clarity_percent", percent, 0.0).clamp(0.0, MAX_GAIN_PERCENT) / 100.0
            }
            Self::Db(db) => {
                if !db.is_finite() {
                    tracing::warn!(?db, "non-finite clarity strength replaced");
                    return 0.0;
                }
                db_to_linear(db.clamp(MIN_GAIN_DB, MAX_GAIN_DB))
            }
        };
        linear.clamp(0.0, max_linear_gain())
    }
}

/// Complete clarity configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaritySettings {
    pub enabled: bool,
    pub mode: ClarityMode,
    /// Linear enhancement amount; Natural uses it as-is, Ozone and XHiFi as `gain + 1`
    pub gain: f32,
    /// Output trim in dB applied after the mode algorithm
    pub post_gain_db: f32,
    /// Natural mode low-pass sits this far below Nyquist
    pub natural_lpf_offset_hz: i32,
    /// Ozone shelf corner
    pub ozone_freq_hz: i32,
    pub xhifi: XHiFiSettings,
    pub safety: SafetySettings,
}

impl Default for ClaritySettings {
    fn default() -> Self {
        Self {
            enabled: false,
            mode: ClarityMode::Natural,
            gain: 0.0,
            post_gain_db: 0.0,
            natural_lpf_offset_hz: 1000,
            ozone_freq_hz: 8250,
            xhifi: XHiFiSettings::default(),
            safety: SafetySettings::default(),
        }
    }
}

impl ClaritySettings {
    /// Light treble lift
    pub fn gentle() -> Self {
        Self {
            enabled: true,
            gain: 0.5,
            ..Self::default()
        }
    }

    /// Full exciter with the limiter guarding the output
    pub fn hifi() -> Self {
        Self {
            enabled: true,
            mode: ClarityMode::XHiFi,
            gain: 1.0,
            safety: SafetySettings::protective(),
            ..Self::default()
        }
    }

    /// Copy with every value forced into its host range
    ///
    /// Non-finite values are replaced by their defaults first.
    pub fn clamped(&self) -> Self {
        let defaults = Self::default();
        Self {
            enabled: self.enabled,
            mode: self.mode,
            gain: sanitize("gain", self.gain, defaults.gain).clamp(0.0, max_linear_gain()),
            post_gain_db: fit(
                "post_gain_db",
                self.post_gain_db,
                defaults.post_gain_db,
                POST_GAIN_DB,
            ),
            natural_lpf_offset_hz: clamp_i32(self.natural_lpf_offset_hz, NATURAL_OFFSET_HZ),
            ozone_freq_hz: clamp_i32(self.ozone_freq_hz, OZONE_FREQ_HZ),
            xhifi: self.xhifi.clamped(),
            safety: self.safety.clamped(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_range("gain", self.gain, 0.0, max_linear_gain())?;
        check_range("post_gain_db", self.post_gain_db, POST_GAIN_DB.0, POST_GAIN_DB.1)?;
        check_range_i32(
            "natural_lpf_offset_hz",
            self.natural_lpf_offset_hz,
            NATURAL_OFFSET_HZ.0,
            NATURAL_OFFSET_HZ.1,
        )?;
        check_range_i32(
            "ozone_freq_hz",
            self.ozone_freq_hz,
            OZONE_FREQ_HZ.0,
            OZONE_FREQ_HZ.1,
        )?;
        self.xhifi.validate()?;
        self.safety.validate()
    }
}

impl XHiFiSettings {
    pub fn clamped(&self) -> Self {
        let defaults = Self::default();
        Self {
            low_cut_hz: clamp_i32(self.low_cut_hz, XHIFI_LOW_CUT_HZ),
            high_cut_hz: clamp_i32(self.high_cut_hz, XHIFI_HIGH_CUT_HZ),
            hp_mix: fit("xhifi_hp_mix", self.hp_mix, defaults.hp_mix, XHIFI_MIX),
            bp_mix: fit("xhifi_bp_mix", self.bp_mix, defaults.bp_mix, XHIFI_MIX),
            bp_delay_divisor: clamp_i32(self.bp_delay_divisor, XHIFI_DIVISOR),
            lp_delay_divisor: clamp_i32(self.lp_delay_divisor, XHIFI_DIVISOR),
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_range_i32(
            "xhifi_low_cut_hz",
            self.low_cut_hz,
            XHIFI_LOW_CUT_HZ.0,
            XHIFI_LOW_CUT_HZ.1,
        )?;
        check_range_i32(
            "xhifi_high_cut_hz",
            self.high_cut_hz,
            XHIFI_HIGH_CUT_HZ.0,
            XHIFI_HIGH_CUT_HZ.1,
        )?;
        check_range("xhifi_hp_mix", self.hp_mix, XHIFI_MIX.0, XHIFI_MIX.1)?;
        check_range("xhifi_bp_mix", self.bp_mix, XHIFI_MIX.0, XHIFI_MIX.1)?;
        check_range_i32(
            "xhifi_bp_delay_divisor",
            self.bp_delay_divisor,
            XHIFI_DIVISOR.0,
            XHIFI_DIVISOR.1,
        )?;
        check_range_i32(
            "xhifi_lp_delay_divisor",
            self.lp_delay_divisor,
            XHIFI_DIVISOR.0,
            XHIFI_DIVISOR.1,
        )
    }
}

impl SafetySettings {
    pub fn clamped(&self) -> Self {
        let defaults = Self::default();
        Self {
            enabled: self.enabled,
            threshold_db: fit(
                "safety_threshold_db",
                self.threshold_db,
                defaults.threshold_db,
                SAFETY_THRESHOLD_DB,
            ),
            release_ms: fit(
                "safety_release_ms",
                self.release_ms,
                defaults.release_ms,
                SAFETY_RELEASE_MS,
            ),
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_range(
            "safety_threshold_db",
            self.threshold_db,
            SAFETY_THRESHOLD_DB.0,
            SAFETY_THRESHOLD_DB.1,
        )?;
        check_range(
            "safety_release_ms",
            self.release_ms,
            SAFETY_RELEASE_MS.0,
            SAFETY_RELEASE_MS.1,
        )
    }
}

fn fit(name: &'static str, value: f32, default: f32, (min, max): (f32, f32)) -> f32 {
    sanitize(name, value, default).clamp(min, max)
}

fn clamp_i32(value: i32, (min, max): (i32, i32)) -> i32 {
    value.clamp(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_index_is_clamped() {
        assert_eq!(ClarityMode::from_index(-3), ClarityMode::Natural);
        assert_eq!(ClarityMode::from_index(1), ClarityMode::Ozone);
        assert_eq!(ClarityMode::from_index(9), ClarityMode::XHiFi);
        assert_eq!(ClarityMode::XHiFi.index(), 2);
    }

    #[test]
    fn strength_percent() {
        assert_eq!(ClarityStrength::Percent(100.0).to_linear(), 1.0);
        assert_eq!(ClarityStrength::Percent(-20.0).to_linear(), 0.0);
        assert_eq!(ClarityStrength::Percent(f32::NAN).to_linear(), 0.0);
        // 631 % is just above the 16 dB ceiling
        assert_eq!(ClarityStrength::Percent(900.0).to_linear(), max_linear_gain());
    }

    #[test]
    fn strength_db() {
        assert!((ClarityStrength::Db(0.0).to_linear() - 1.0).abs() < 1e-6);
        assert!((ClarityStrength::Db(40.0).to_linear() - max_linear_gain()).abs() < 1e-6);
        assert!(ClarityStrength::Db(-100.0).to_linear() <= 0.011);
        assert_eq!(ClarityStrength::Db(f32::INFINITY).to_linear(), 0.0);
    }

    #[test]
    fn defaults_validate() {
        assert!(ClaritySettings::default().validate().is_ok());
        assert!(ClaritySettings::gentle().validate().is_ok());
        assert!(ClaritySettings::hifi().validate().is_ok());
    }

    #[test]
    fn clamped_forces_ranges() {
        let settings = ClaritySettings {
            gain: 50.0,
            post_gain_db: -90.0,
            natural_lpf_offset_hz: 10,
            ozone_freq_hz: 30_000,
            xhifi: XHiFiSettings {
                low_cut_hz: 1,
                high_cut_hz: 9000,
                hp_mix: 3.0,
                bp_mix: -1.0,
                bp_delay_divisor: 0,
                lp_delay_divisor: 5000,
            },
            safety: SafetySettings {
                enabled: true,
                threshold_db: 3.0,
                release_ms: 0.0,
            },
            ..ClaritySettings::default()
        };
        assert!(settings.validate().is_err());

        let clamped = settings.clamped();
        assert!(clamped.validate().is_ok());
        assert_eq!(clamped.gain, max_linear_gain());
        assert_eq!(clamped.post_gain_db, -24.0);
        assert_eq!(clamped.natural_lpf_offset_hz, 200);
        assert_eq!(clamped.ozone_freq_hz, 16000);
        assert_eq!(clamped.xhifi.low_cut_hz, 40);
        assert_eq!(clamped.xhifi.high_cut_hz, 6000);
        assert_eq!(clamped.xhifi.hp_mix, 2.5);
        assert_eq!(clamped.xhifi.bp_mix, 0.0);
        assert_eq!(clamped.xhifi.bp_delay_divisor, 80);
        assert_eq!(clamped.xhifi.lp_delay_divisor, 1200);
        assert_eq!(clamped.safety.threshold_db, 0.0);
        assert_eq!(clamped.safety.release_ms, 1.5);
    }

    #[test]
    fn non_finite_values_fall_back_to_defaults() {
        let settings = ClaritySettings {
            gain: f32::NAN,
            post_gain_db: f32::INFINITY,
            safety: SafetySettings {
                enabled: true,
                threshold_db: f32::NAN,
                release_ms: f32::NEG_INFINITY,
            },
            ..ClaritySettings::default()
        };
        let clamped = settings.clamped();
        assert_eq!(clamped.gain, 0.0);
        assert_eq!(clamped.post_gain_db, 0.0);
        assert_eq!(clamped.safety.threshold_db, -0.8);
        assert_eq!(clamped.safety.release_ms, 60.0);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let settings: ClaritySettings =
            serde_json::from_str(r#"{"enabled": true, "mode": "xhifi"}"#).unwrap();
        assert!(settings.enabled);
        assert_eq!(settings.mode, ClarityMode::XHiFi);
        assert_eq!(settings.ozone_freq_hz, 8250);
        assert_eq!(settings.xhifi, XHiFiSettings::default());
    }
}
