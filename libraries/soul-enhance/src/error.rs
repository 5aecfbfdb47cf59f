//! Error types for enhancer configuration

use thiserror::Error;

/// Result type for enhancer configuration
pub type Result<T> = std::result::Result<T, EnhanceError>;

/// Errors raised while validating or loading settings
///
/// Audio processing itself never fails; these only come out of the
/// configuration layer.
#[derive(Error, Debug)]
pub enum EnhanceError {
    /// Parameter is non-finite or outside its accepted range
    #[error("Invalid parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    /// Preset document is structurally fine but unusable
    #[error("Invalid preset: {0}")]
    InvalidPreset(String),

    /// Preset JSON could not be parsed or written
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EnhanceError {
    pub(crate) fn invalid(name: &'static str, value: impl Into<f64>) -> Self {
        Self::InvalidParameter {
            name,
            value: value.into(),
        }
    }
}

/// Fail with `InvalidParameter` unless `value` is finite and within `[min, max]`
pub(crate) fn check_range(name: &'static str, value: f32, min: f32, max: f32) -> Result<()> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(EnhanceError::invalid(name, value))
    }
}

/// Integer flavour of [`check_range`]
pub(crate) fn check_range_i32(name: &'static str, value: i32, min: i32, max: i32) -> Result<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(EnhanceError::invalid(name, value))
    }
}
