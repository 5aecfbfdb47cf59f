//! Effect chain plumbing shared by both processors

mod chain;

pub use chain::{AudioEffect, EffectChain};
