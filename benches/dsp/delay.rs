//! Benchmarks for the single-tap delay.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_synth::dsp::delay::apply_delay;

use crate::{DURATIONS, SAMPLE_RATE};

pub fn bench_delay(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/delay");

    for &duration in DURATIONS {
        let len = (duration * SAMPLE_RATE) as usize;
        let input: Vec<f64> = (0..len).map(|i| (i as f64 * 0.01).sin()).collect();

        // Slapback
        group.bench_with_input(BenchmarkId::new("80ms", len), &input, |b, input| {
            b.iter(|| apply_delay(black_box(input), 80.0, 0.4, SAMPLE_RATE).unwrap())
        });

        // Long echo - output is mostly tail
        group.bench_with_input(BenchmarkId::new("500ms", len), &input, |b, input| {
            b.iter(|| apply_delay(black_box(input), 500.0, 0.4, SAMPLE_RATE).unwrap())
        });
    }

    group.finish();
}
