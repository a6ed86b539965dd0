//! Benchmarks for FFT convolution reverb.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_synth::dsp::reverb::apply_reverb;

use crate::{DURATIONS, SAMPLE_RATE};

/// Exponentially decaying noise-like tail, `seconds` long.
fn synthetic_impulse(seconds: f64) -> Vec<f64> {
    let len = (seconds * SAMPLE_RATE) as usize;
    let mut state: u32 = 0x1234_5678;
    (0..len)
        .map(|i| {
            // xorshift32
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            let noise = state as f64 / u32::MAX as f64 * 2.0 - 1.0;
            noise * (-6.0 * i as f64 / len as f64).exp()
        })
        .collect()
}

pub fn bench_reverb(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/reverb");
    group.sample_size(20);

    let small_room = synthetic_impulse(0.3);
    let hall = synthetic_impulse(2.0);

    for &duration in DURATIONS {
        let len = (duration * SAMPLE_RATE) as usize;
        let input: Vec<f64> = (0..len).map(|i| (i as f64 * 0.03).sin()).collect();

        group.bench_with_input(BenchmarkId::new("room_300ms", len), &input, |b, input| {
            b.iter(|| apply_reverb(black_box(input), &small_room, 0.5).unwrap())
        });

        group.bench_with_input(BenchmarkId::new("hall_2s", len), &input, |b, input| {
            b.iter(|| apply_reverb(black_box(input), &hall, 0.5).unwrap())
        });
    }

    group.finish();
}
