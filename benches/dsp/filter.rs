//! Benchmarks for zero-phase Butterworth filtering.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_synth::{
    dsp::filter::{apply_filter, FilterSpec},
    synthesize, Waveform, WaveformRequest,
};

use crate::{DURATIONS, SAMPLE_RATE};

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    for &duration in DURATIONS {
        let input = synthesize(&WaveformRequest::new(Waveform::Saw, 220.0, duration)).unwrap();
        let len = input.len();

        // Design cost is negligible next to the two passes
        let lowpass = FilterSpec::lowpass(1_000.0);
        group.bench_with_input(BenchmarkId::new("lowpass_order5", len), &input, |b, input| {
            b.iter(|| apply_filter(black_box(input), &lowpass, SAMPLE_RATE).unwrap())
        });

        let highpass = FilterSpec::highpass(1_000.0).with_order(2);
        group.bench_with_input(BenchmarkId::new("highpass_order2", len), &input, |b, input| {
            b.iter(|| apply_filter(black_box(input), &highpass, SAMPLE_RATE).unwrap())
        });

        let steep = FilterSpec::lowpass(1_000.0).with_order(6);
        group.bench_with_input(BenchmarkId::new("lowpass_order6", len), &input, |b, input| {
            b.iter(|| apply_filter(black_box(input), &steep, SAMPLE_RATE).unwrap())
        });
    }

    group.finish();
}
