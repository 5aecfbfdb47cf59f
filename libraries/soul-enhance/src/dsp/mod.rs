//! DSP building blocks shared by the clarity and field-surround pipelines
//!
//! All filters own their history; stereo users keep one instance per channel.

mod biquad;
mod delay;
mod one_pole;
mod phase_shifter;
mod wave_buffer;

pub use biquad::{HighShelf, ParametricHighPass};
pub use delay::{TimeConstDelay, MAX_DELAY_SECONDS};
pub use one_pole::{BandPassCascade, OnePole, OnePoleCascade, PassKind};
pub use phase_shifter::PhaseShifter;
pub use wave_buffer::{RegionMut, WaveBuffer};

/// Convert dB to a linear gain factor
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

/// Replace a non-finite value with `fallback`, logging the substitution
pub(crate) fn sanitize(name: &'static str, value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        tracing::warn!(parameter = name, ?value, fallback, "non-finite parameter replaced");
        fallback
    }
}
