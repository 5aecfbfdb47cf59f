//! Field surround stage behaviour
//!
//! Checks each stage through the public processor API and the fixed stage
//! order: depth, widening, phase offset, output fold, mono sum.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use soul_enhance::surround::{direct_depth_strength, wrapper_compat_depth_strength};
use soul_enhance::{
    AdvancedSettings, AudioEffect, FieldSurroundProcessor, FieldSurroundSettings, OutputMode,
};

const SAMPLE_RATE: u32 = 44100;

// ============================================================================
// HELPERS
// ============================================================================

fn enabled_surround() -> FieldSurroundProcessor {
    let mut surround = FieldSurroundProcessor::new(SAMPLE_RATE);
    surround.set_enabled(true);
    surround
}

fn stereo_noise(seed: u64, frames: usize) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..frames * 2).map(|_| rng.gen_range(-0.5f32..0.5)).collect()
}

fn assert_close(actual: &[f32], expected: &[f32], tolerance: f32) {
    assert_eq!(actual.len(), expected.len());
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!(
            (a - e).abs() <= tolerance,
            "sample {}: expected {}, got {}",
            i,
            e,
            a
        );
    }
}

// ============================================================================
// BYPASS AND DEFAULTS
// ============================================================================

#[test]
fn disabled_processor_is_bypass() {
    let mut surround = FieldSurroundProcessor::with_settings(
        SAMPLE_RATE,
        &FieldSurroundSettings {
            enabled: false,
            ..FieldSurroundSettings::immersive()
        },
    );
    let input = stereo_noise(1, 512);
    let mut buffer = input.clone();
    surround.process(&mut buffer);
    assert_eq!(buffer, input);
}

#[test]
fn default_widening_is_identity() {
    let mut surround = enabled_surround();
    let mut buffer = vec![1.0, -0.5];
    surround.process(&mut buffer);
    assert_close(&buffer, &[1.0, -0.5], 1e-6);
}

#[test]
fn odd_trailing_sample_is_untouched() {
    let mut surround = enabled_surround();
    surround.set_output_mode(OutputMode::MidOnlyMono);
    let mut buffer = vec![0.2, 0.6, 0.9];
    surround.process(&mut buffer);
    assert_close(&buffer[..2], &[0.4, 0.4], 1e-6);
    assert_eq!(buffer[2], 0.9);
}

// ============================================================================
// WIDENING
// ============================================================================

#[test]
fn widening_scales_side_and_mid() {
    let mut surround = enabled_surround();
    surround.set_widen_from_param(200);
    let (mid, side) = surround.widening().coefficients();
    assert!((mid - 0.25).abs() < 1e-6);
    assert!((side - 0.75).abs() < 1e-6);

    // Pure centre content only sees the mid coefficient
    let mut buffer = vec![0.8, 0.8];
    surround.process(&mut buffer);
    assert_close(&buffer, &[0.4, 0.4], 1e-6);
}

#[test]
fn zero_mid_image_leaves_only_side() {
    let mut surround = enabled_surround();
    surround.set_mid_from_param(0);
    let mut buffer = vec![0.5, 0.5, 0.5, -0.5];
    surround.process(&mut buffer);
    assert_close(&buffer, &[0.0, 0.0, 0.5, -0.5], 1e-6);
}

// ============================================================================
// OUTPUT FOLD AND MONO SUM
// ============================================================================

#[test]
fn side_fold_of_opposite_channels() {
    let mut surround = enabled_surround();
    surround.set_output_mode_from_param(1);
    assert_eq!(surround.output_mode(), OutputMode::PureSideMono);

    let mut buffer = vec![1.0, -1.0];
    surround.process(&mut buffer);
    assert_close(&buffer, &[-1.0, -1.0], 1e-6);
}

#[test]
fn mid_fold_averages_channels() {
    let mut surround = enabled_surround();
    surround.set_output_mode(OutputMode::MidOnlyMono);
    let mut buffer = vec![0.8, 0.2, -0.4, 0.0];
    surround.process(&mut buffer);
    assert_close(&buffer, &[0.5, 0.5, -0.2, -0.2], 1e-6);
}

#[test]
fn mono_sum_runs_after_fold() {
    let mut surround = enabled_surround();
    surround.set_output_mode(OutputMode::MidOnlyMono);
    surround.set_mono_sum_mix_from_param(50);
    surround.set_mono_sum_pan_from_param(100);

    // Fold gives 0.5/0.5; full right pan removes the mono share from the left
    let mut buffer = vec![0.8, 0.2];
    surround.process(&mut buffer);
    assert_close(&buffer, &[0.25, 0.5], 1e-6);
}

#[test]
fn mono_sum_pan_left() {
    let mut surround = enabled_surround();
    surround.set_mono_sum_mix_from_param(100);
    surround.set_mono_sum_pan_from_param(-100);

    let mut buffer = vec![0.8, 0.2];
    surround.process(&mut buffer);
    assert_close(&buffer, &[0.5, 0.0], 1e-6);
}

#[test]
fn mono_sum_params_clamp() {
    let mut surround = enabled_surround();
    surround.set_mono_sum_mix_from_param(250);
    surround.set_mono_sum_pan_from_param(-400);
    assert_eq!(surround.mono_sum_mix(), 1.0);
    assert_eq!(surround.mono_sum_pan(), -1.0);
    assert_eq!(surround.settings().mono_sum_mix, 100);
    assert_eq!(surround.settings().mono_sum_pan, -100);
}

// ============================================================================
// PHASE OFFSET
// ============================================================================

#[test]
fn zero_phase_offset_is_skipped() {
    let mut surround = enabled_surround();
    surround.set_phase_offset_from_param(60);
    surround.set_phase_offset_from_param(0);
    assert_eq!(surround.phase_offset(), 0.0);

    let input = stereo_noise(2, 256);
    let mut buffer = input.clone();
    surround.process(&mut buffer);
    assert_close(&buffer, &input, 1e-6);
}

#[test]
fn phase_offset_decorrelates_channels() {
    let mut surround = enabled_surround();
    surround.set_phase_offset_from_param(80);

    let mono: Vec<f32> = stereo_noise(3, 1024)
        .chunks(2)
        .flat_map(|f| [f[0], f[0]])
        .collect();
    let mut buffer = mono.clone();
    surround.process(&mut buffer);

    let differing = buffer.chunks(2).filter(|f| (f[0] - f[1]).abs() > 1e-4).count();
    assert!(differing > 512, "opposite all-pass coefficients should split the channels");
    assert!(buffer.iter().all(|s| s.is_finite()));
}

// ============================================================================
// DEPTH
// ============================================================================

#[test]
fn depth_branch_follows_threshold() {
    let mut surround = enabled_surround();
    surround.set_depth_from_param(300);
    assert!(surround.depth().is_enabled());
    assert!(!surround.depth().is_right_inverted());

    surround.set_depth_from_param(650);
    assert!(surround.depth().is_right_inverted());

    surround.set_depth_from_param(0);
    assert!(!surround.depth().is_enabled());
}

#[test]
fn depth_adds_delayed_reflections() {
    let mut surround = enabled_surround();
    surround.set_depth_from_param(600);
    let (left_delay, _) = surround.depth().delay_samples();

    let frames = left_delay * 3;
    let mut buffer = vec![0.0f32; frames * 2];
    buffer[0] = 1.0;
    surround.process(&mut buffer);

    let tail_energy: f32 = buffer[(left_delay + 1) * 2..].iter().map(|s| s * s).sum();
    assert!(tail_energy > 1e-4, "impulse should echo after the delay");
    assert!(buffer.iter().all(|s| s.is_finite()));
}

#[test]
fn strongest_default_depth_stays_bounded() {
    let mut surround = enabled_surround();
    surround.set_depth_from_param(800);
    surround.set_widen_from_param(100);

    let mut buffer = stereo_noise(4, SAMPLE_RATE as usize * 2);
    surround.process(&mut buffer);
    let peak = buffer.iter().fold(0.0f32, |m, s| m.max(s.abs()));
    assert!(peak.is_finite());
    assert!(peak < 4.0, "feedback grew to {}", peak);
}

#[test]
fn advanced_settings_reach_depth_stage() {
    let mut surround = enabled_surround();
    let advanced = AdvancedSettings {
        delay_left_ms: 30.0,
        delay_right_ms: 10.0,
        branch_threshold: 100,
        ..AdvancedSettings::default()
    };
    surround.set_advanced(&advanced);
    surround.set_depth_from_param(150);

    let params = surround.depth().params();
    assert_eq!(params.delay_left_ms, 30.0);
    assert_eq!(params.branch_threshold, 100);
    assert!(surround.depth().is_right_inverted());
    assert_eq!(surround.settings().advanced, advanced);
}

#[test]
fn depth_strength_mappings() {
    assert_eq!(direct_depth_strength(650), 650);
    assert_eq!(direct_depth_strength(1 << 20), i16::MAX);
    assert_eq!(wrapper_compat_depth_strength(0), 200);
    assert_eq!(wrapper_compat_depth_strength(32767), 800);
}

// ============================================================================
// SAMPLE RATE AND SETTINGS
// ============================================================================

#[test]
fn sample_rate_change_rebuilds_delays() {
    let mut surround = enabled_surround();
    surround.set_depth_from_param(400);
    let before = surround.depth().delay_samples();

    let mut buffer = stereo_noise(5, 64);
    AudioEffect::process(&mut surround, &mut buffer, 96000);
    assert_eq!(surround.sample_rate(), 96000);

    let after = surround.depth().delay_samples();
    assert!(after.0 > before.0);
    assert!(after.1 > before.1);
}

#[test]
fn apply_settings_clamps_and_enables() {
    let mut surround = FieldSurroundProcessor::new(SAMPLE_RATE);
    surround.apply_settings(&FieldSurroundSettings {
        enabled: true,
        widen: 5000,
        depth: -20,
        phase_offset: 300,
        ..FieldSurroundSettings::default()
    });

    assert!(surround.is_enabled());
    let settings = surround.settings();
    assert_eq!(settings.widen, 800);
    assert_eq!(settings.depth, 0);
    assert_eq!(settings.phase_offset, 100);
    assert!(settings.validate().is_ok());
}

#[test]
fn with_settings_matches_apply_settings() {
    let target = FieldSurroundSettings::immersive();
    let mut built = FieldSurroundProcessor::with_settings(SAMPLE_RATE, &target);
    let mut applied = FieldSurroundProcessor::new(SAMPLE_RATE);
    applied.apply_settings(&target);

    let mut a = stereo_noise(6, 2048);
    let mut b = a.clone();
    built.process(&mut a);
    applied.process(&mut b);
    assert_eq!(a, b);
}
