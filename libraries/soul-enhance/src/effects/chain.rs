//! Ordered processing of enhancement stages
//!
//! Both processors implement [`AudioEffect`], so a host can drive clarity and
//! field surround (or its own stages) through one [`EffectChain`].

/// Stage that processes interleaved stereo in place
///
/// Implementations must not allocate or block inside `process` once warmed
/// up, and must be `Send` so the chain can move to the audio thread.
pub trait AudioEffect: Send {
    /// Process `buffer` (L, R, L, R, ...) recorded at `sample_rate`
    ///
    /// A rate different from the previous call reconfigures the effect first.
    fn process(&mut self, buffer: &mut [f32], sample_rate: u32);

    /// Drop all filter and delay memory
    fn reset(&mut self);

    fn set_enabled(&mut self, enabled: bool);

    fn is_enabled(&self) -> bool;

    /// Display name
    fn name(&self) -> &str;
}

/// Effects run front to back; disabled ones are skipped
#[derive(Default)]
pub struct EffectChain {
    effects: Vec<Box<dyn AudioEffect>>,
}

impl EffectChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `effect` after the existing stages
    pub fn add_effect(&mut self, effect: Box<dyn AudioEffect>) {
        self.effects.push(effect);
    }

    pub fn process(&mut self, buffer: &mut [f32], sample_rate: u32) {
        for effect in self.effects.iter_mut().filter(|e| e.is_enabled()) {
            effect.process(buffer, sample_rate);
        }
    }

    pub fn reset(&mut self) {
        for effect in &mut self.effects {
            effect.reset();
        }
    }

    pub fn clear(&mut self) {
        self.effects.clear();
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn get_effect(&self, index: usize) -> Option<&dyn AudioEffect> {
        self.effects.get(index).map(|e| e.as_ref())
    }

    pub fn get_effect_mut(&mut self, index: usize) -> Option<&mut dyn AudioEffect> {
        match self.effects.get_mut(index) {
            Some(effect) => Some(effect.as_mut()),
            None => None,
        }
    }

    /// Stage names in processing order
    pub fn names(&self) -> Vec<&str> {
        self.effects.iter().map(|e| e.name()).collect()
    }

    /// Enable or disable every stage
    pub fn set_enabled(&mut self, enabled: bool) {
        for effect in &mut self.effects {
            effect.set_enabled(enabled);
        }
    }
}

impl std::fmt::Debug for EffectChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectChain")
            .field("effects", &self.names())
            .finish()
    }
}
