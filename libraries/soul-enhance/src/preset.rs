//! Named enhancer presets stored as JSON

use crate::clarity::{ClarityProcessor, ClaritySettings};
use crate::error::{EnhanceError, Result};
use crate::surround::{FieldSurroundProcessor, FieldSurroundSettings};
use serde::{Deserialize, Serialize};

/// Settings for both pipelines under one name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhancerPreset {
    pub name: String,
    #[serde(default)]
    pub clarity: ClaritySettings,
    #[serde(default)]
    pub field_surround: FieldSurroundSettings,
}

impl EnhancerPreset {
    pub fn new(
        name: impl Into<String>,
        clarity: ClaritySettings,
        field_surround: FieldSurroundSettings,
    ) -> Self {
        Self {
            name: name.into(),
            clarity,
            field_surround,
        }
    }

    /// Both pipelines off
    pub fn flat() -> Self {
        Self::new(
            "Flat",
            ClaritySettings::default(),
            FieldSurroundSettings::default(),
        )
    }

    /// Gentle treble lift with a slightly wider image
    pub fn headphones() -> Self {
        Self::new("Headphones", ClaritySettings::gentle(), FieldSurroundSettings::wide())
    }

    /// Full exciter and deep surround
    pub fn immersive() -> Self {
        Self::new(
            "Immersive",
            ClaritySettings::hifi(),
            FieldSurroundSettings::immersive(),
        )
    }

    /// Built-in presets
    pub fn builtin() -> Vec<Self> {
        vec![Self::flat(), Self::headphones(), Self::immersive()]
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(EnhanceError::InvalidPreset(
                "preset name must not be empty".to_string(),
            ));
        }
        self.clarity.validate()?;
        self.field_surround.validate()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse and validate a preset document
    ///
    /// Missing sections and fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let preset: Self = serde_json::from_str(json)?;
        preset.validate()?;
        tracing::debug!(name = %preset.name, "loaded enhancer preset");
        Ok(preset)
    }

    /// Push both settings blocks into running processors
    pub fn apply(&self, clarity: &mut ClarityProcessor, field_surround: &mut FieldSurroundProcessor) {
        clarity.apply_settings(&self.clarity);
        field_surround.apply_settings(&self.field_surround);
    }
}
