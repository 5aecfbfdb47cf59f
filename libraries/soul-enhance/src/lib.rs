//! Real-time stereo enhancement for Soul Player
//!
//! This crate provides two independent processors that work in place on
//! interleaved stereo `f32` buffers:
//! - **Clarity**: treble sharpening, shelf boost or a three-band exciter,
//!   followed by post gain and a safety limiter
//! - **Field surround**: cross-fed depth, mid/side widening, phase offset,
//!   mono folding and mono-sum panning
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌────────────────────┐     ┌──────────────────────────┐
//! │ Audio Block │ ──► │ ClarityProcessor   │ ──► │ FieldSurroundProcessor   │
//! └─────────────┘     └────────────────────┘     └──────────────────────────┘
//!                              │                              │
//!                              └──────── dsp primitives ──────┘
//! ```
//!
//! Processors are configured through setters or a complete settings struct.
//! Setters take `&mut self`, so a configuration can never be observed half
//! applied by `process`; hosts that configure from another thread share the
//! processor behind a `Mutex`.
//!
//! # Example
//!
//! ```
//! use soul_enhance::{ClarityProcessor, EnhancerPreset, FieldSurroundProcessor};
//!
//! let mut clarity = ClarityProcessor::new(44100);
//! let mut surround = FieldSurroundProcessor::new(44100);
//! EnhancerPreset::headphones().apply(&mut clarity, &mut surround);
//!
//! let mut block = vec![0.0f32; 1024];
//! clarity.process(&mut block);
//! surround.process(&mut block);
//! ```

#![forbid(unsafe_code)]

pub mod clarity;
pub mod dsp;
pub mod effects;
mod error;
mod preset;
pub mod surround;

pub use clarity::{ClarityMode, ClarityProcessor, ClaritySettings, ClarityStrength, XHiFiSettings};
pub use effects::{AudioEffect, EffectChain};
pub use error::{EnhanceError, Result};
pub use preset::EnhancerPreset;
pub use surround::{AdvancedSettings, FieldSurroundProcessor, FieldSurroundSettings, OutputMode};

/// Nominal sample rate both processors start from
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;
