//! Performance benchmarks for the enhancement processors
//!
//! Run with: cargo bench -p soul-enhance --bench enhance_benchmark

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use soul_enhance::{
    ClarityMode, ClarityProcessor, EffectChain, EnhancerPreset, FieldSurroundProcessor,
    OutputMode,
};
use std::f32::consts::PI;

const SAMPLE_RATE: u32 = 48000;

/// Generate a stereo test signal (1kHz + 7kHz)
fn generate_test_signal(num_frames: usize) -> Vec<f32> {
    let mut samples = Vec::with_capacity(num_frames * 2);
    for i in 0..num_frames {
        let t = i as f32 / SAMPLE_RATE as f32;
        let value = 0.4 * (2.0 * PI * 1000.0 * t).sin() + 0.2 * (2.0 * PI * 7000.0 * t).sin();
        samples.push(value);
        samples.push(value * 0.8);
    }
    samples
}

fn bench_clarity_modes(c: &mut Criterion) {
    let mut group = c.benchmark_group("clarity_mode");
    let block_frames = 512;
    let input = generate_test_signal(block_frames);
    group.throughput(Throughput::Elements(block_frames as u64));

    for mode in [ClarityMode::Natural, ClarityMode::Ozone, ClarityMode::XHiFi] {
        group.bench_with_input(BenchmarkId::from_parameter(mode.name()), &input, |b, input| {
            let mut clarity = ClarityProcessor::new(SAMPLE_RATE);
            clarity.set_mode(mode);
            clarity.set_gain_linear(1.0);
            clarity.set_safety(true, -0.8, 60.0);
            clarity.set_enabled(true);
            let mut buffer = input.clone();

            b.iter(|| {
                buffer.copy_from_slice(input);
                clarity.process(black_box(&mut buffer));
            });
        });
    }

    group.finish();
}

fn bench_field_surround(c: &mut Criterion) {
    let mut group = c.benchmark_group("field_surround");
    let block_frames = 512;
    let input = generate_test_signal(block_frames);
    group.throughput(Throughput::Elements(block_frames as u64));

    let configs: [(&str, i32, i32, OutputMode, i32); 3] = [
        ("widen_only", 0, 0, OutputMode::Normal, 0),
        ("depth_phase", 600, 40, OutputMode::Normal, 0),
        ("full", 700, 60, OutputMode::MidOnlyMono, 50),
    ];

    for (name, depth, phase, output_mode, mono_mix) in configs {
        group.bench_with_input(BenchmarkId::from_parameter(name), &input, |b, input| {
            let mut surround = FieldSurroundProcessor::new(SAMPLE_RATE);
            surround.set_widen_from_param(150);
            surround.set_depth_from_param(depth);
            surround.set_phase_offset_from_param(phase);
            surround.set_output_mode(output_mode);
            surround.set_mono_sum_mix_from_param(mono_mix);
            surround.set_enabled(true);
            let mut buffer = input.clone();

            b.iter(|| {
                buffer.copy_from_slice(input);
                surround.process(black_box(&mut buffer));
            });
        });
    }

    group.finish();
}

fn bench_block_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("preset_chain_block_size");

    for block_frames in [64usize, 256, 1024, 4096] {
        let input = generate_test_signal(block_frames);
        group.throughput(Throughput::Elements(block_frames as u64));

        group.bench_with_input(
            BenchmarkId::from_parameter(block_frames),
            &input,
            |b, input| {
                let mut clarity = ClarityProcessor::new(SAMPLE_RATE);
                let mut surround = FieldSurroundProcessor::new(SAMPLE_RATE);
                EnhancerPreset::immersive().apply(&mut clarity, &mut surround);

                let mut chain = EffectChain::new();
                chain.add_effect(Box::new(clarity));
                chain.add_effect(Box::new(surround));
                let mut buffer = input.clone();

                b.iter(|| {
                    buffer.copy_from_slice(input);
                    chain.process(black_box(&mut buffer), SAMPLE_RATE);
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_clarity_modes,
    bench_field_surround,
    bench_block_sizes
);
criterion_main!(benches);
