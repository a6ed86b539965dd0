//! Reverb - Room Simulation via Convolution
//!
//! An impulse response (IR) is a recording of how a space answers a single
//! click. Convolving any dry signal with it places that signal in the same
//! space:
//!
//! ```text
//! y[n] = Σ_k x[k] · h[n − k]
//! ```
//!
//! The output is `len(x) + len(h) − 1` samples long: the tail of the last
//! input sample rings out for the full length of the IR.
//!
//! # FFT Convolution
//!
//! Direct convolution costs `len(x) × len(h)` multiplies, which is slow for
//! second-long IRs. Convolution in time is multiplication in frequency, so
//! we zero-pad both signals to a common power-of-two length, FFT them,
//! multiply the spectra bin by bin and inverse-FFT the product.
//!
//! # Dry/Wet
//!
//! `dry_wet` scales the impulse response, so it scales the whole convolved
//! result. There is no separate dry path: at `dry_wet = 1` the output is the
//! fully reverberant signal, at 0 it is silence.

use rustfft::{num_complex::Complex64, FftPlanner};

use crate::{
    error::{Result, SynthError},
    SampleBuffer,
};

/// Full linear convolution of `signal` and `kernel`.
pub fn convolve(signal: &[f64], kernel: &[f64]) -> SampleBuffer {
    if signal.is_empty() || kernel.is_empty() {
        return Vec::new();
    }
    let out_len = signal.len() + kernel.len() - 1;
    let fft_len = out_len.next_power_of_two();

    let mut planner = FftPlanner::<f64>::new();
    let forward = planner.plan_fft_forward(fft_len);
    let inverse = planner.plan_fft_inverse(fft_len);

    let to_spectrum = |samples: &[f64]| {
        let mut bins: Vec<Complex64> = samples.iter().map(|&s| Complex64::new(s, 0.0)).collect();
        bins.resize(fft_len, Complex64::new(0.0, 0.0));
        forward.process(&mut bins);
        bins
    };

    let mut product = to_spectrum(signal);
    let kernel_bins = to_spectrum(kernel);
    for (a, b) in product.iter_mut().zip(&kernel_bins) {
        *a *= *b;
    }
    inverse.process(&mut product);

    // rustfft leaves the inverse unnormalised
    let norm = 1.0 / fft_len as f64;
    product[..out_len].iter().map(|c| c.re * norm).collect()
}

/// Convolve `input` with `impulse` scaled by `dry_wet`.
pub fn apply_reverb(input: &[f64], impulse: &[f64], dry_wet: f64) -> Result<SampleBuffer> {
    if !(0.0..=1.0).contains(&dry_wet) {
        return Err(SynthError::effect(format!(
            "dry/wet must be between 0 and 1, got {dry_wet}"
        )));
    }
    if impulse.is_empty() {
        return Err(SynthError::effect("impulse response is empty"));
    }

    tracing::debug!(input = input.len(), impulse = impulse.len(), dry_wet, "convolution reverb");
    let mut out = convolve(input, impulse);
    for sample in out.iter_mut() {
        *sample *= dry_wet;
    }
    Ok(out)
}
