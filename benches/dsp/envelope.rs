//! Benchmarks for the ADSR envelope.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_synth::{apply_envelope, dsp::envelope::envelope_curve, EnvelopeSpec};

use crate::{DURATIONS, SAMPLE_RATE};

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    let adsr = EnvelopeSpec::adsr(10.0, 20.0, 0.7, 30.0);
    let ar = EnvelopeSpec::attack_release(5.0, 60.0);

    for &duration in DURATIONS {
        let len = (duration * SAMPLE_RATE) as usize;
        let input = vec![0.5; len];

        // Curve only - segment maths plus ramps
        group.bench_with_input(BenchmarkId::new("curve_adsr", len), &len, |b, &len| {
            b.iter(|| envelope_curve(black_box(&adsr), len, SAMPLE_RATE).unwrap())
        });

        // Curve plus multiply
        group.bench_with_input(BenchmarkId::new("apply_adsr", len), &input, |b, input| {
            b.iter(|| apply_envelope(black_box(input.clone()), &adsr, SAMPLE_RATE).unwrap())
        });

        // No sustain - silence tail
        group.bench_with_input(BenchmarkId::new("apply_ar", len), &input, |b, input| {
            b.iter(|| apply_envelope(black_box(input.clone()), &ar, SAMPLE_RATE).unwrap())
        });
    }

    group.finish();
}
