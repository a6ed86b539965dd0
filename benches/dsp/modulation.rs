//! Benchmarks for amplitude and phase modulation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_synth::{amplitude_modulate, phase_modulate, ModulationRequest, Waveform, WaveformRequest};

use crate::DURATIONS;

pub fn bench_modulation(c: &mut Criterion) {
    let mut group = c.benchmark_group("synth/modulation");

    for &duration in DURATIONS {
        let carrier = WaveformRequest::new(Waveform::Square, 220.0, duration);
        let len = carrier.len();

        // AM - two oscillators and a multiply
        let am = ModulationRequest::new(carrier, Waveform::Sine, 0.5, 0.8);
        group.bench_with_input(BenchmarkId::new("am", len), &am, |b, req| {
            b.iter(|| amplitude_modulate(black_box(req)).unwrap())
        });

        // PM - per-partial phase offset, no shortcut through a lookup
        let pm = ModulationRequest::new(carrier, Waveform::Sine, 2.0, 1.5);
        group.bench_with_input(BenchmarkId::new("pm", len), &pm, |b, req| {
            b.iter(|| phase_modulate(black_box(req)).unwrap())
        });
    }

    group.finish();
}
