//! Benchmarks for additive waveform generation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_synth::{synthesize, Waveform, WaveformRequest};

use crate::{DURATIONS, SAMPLE_RATE};

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");

    for &duration in DURATIONS {
        let len = (duration * SAMPLE_RATE) as usize;

        // Sine - one partial
        // Square/triangle - odd partials only, half the work of saw
        // Saw - every partial up to Nyquist (50 at 440Hz)
        for waveform in Waveform::ALL {
            let request = WaveformRequest::new(waveform, 440.0, duration);
            group.bench_with_input(BenchmarkId::new(waveform.name(), len), &request, |b, req| {
                b.iter(|| synthesize(black_box(req)).unwrap())
            });
        }

        // Low saw - partial count dominates (500 at 44Hz)
        let request = WaveformRequest::new(Waveform::Saw, 44.0, duration);
        group.bench_with_input(BenchmarkId::new("saw_44hz", len), &request, |b, req| {
            b.iter(|| synthesize(black_box(req)).unwrap())
        });
    }

    group.finish();
}
