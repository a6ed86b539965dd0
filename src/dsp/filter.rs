use std::{f64::consts::PI, str::FromStr};

use rustfft::num_complex::Complex64;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::oscillator::nyquist,
    error::{Result, SynthError},
    SampleBuffer,
};

/*
Butterworth Filtering
=====================

| type      | passes       | rejects      | zeros at |
| --------- | ------------ | ------------ | -------- |
| low-pass  | below cutoff | above cutoff | z = -1   |
| high-pass | above cutoff | below cutoff | z = +1   |

A Butterworth filter is maximally flat in the passband: no ripple, just a
smooth roll-off of 6 dB/octave per order past the cutoff.


Design
------

1. Pre-warp the cutoff so the digital filter hits it exactly:

       ωc = 2·fs·tan(π·fc / fs)

2. Place the analog prototype poles on the left half of a circle:

       p_k = -sin θ_k + j·cos θ_k,   θ_k = π(2k + 1) / 2N

   Low-pass scales them by ωc; high-pass inverts them (ωc / p_k).

3. Map each pole to the z-plane with the bilinear transform:

       z = (2·fs + s) / (2·fs − s)

4. Group conjugate pole pairs into second-order sections (biquads). An odd
   order leaves one real pole, which becomes a first-order section. Each
   section is normalised to unit gain in its passband (DC for low-pass,
   Nyquist for high-pass).

Cascading sections instead of expanding one big polynomial keeps the
coefficients well-conditioned at higher orders.


Zero-Phase Application
----------------------

Any causal IIR filter delays different frequencies by different amounts.
Running the cascade forward, then again over the time-reversed result,
cancels the phase shift exactly and squares the magnitude response.

The edges are padded with an odd reflection of the signal (2·x₀ − x[i]) and
each section starts from its steady state for the first padded sample, so
the filter does not ring up from zero at either end.
*/

/// Maximum supported Butterworth order.
pub const MAX_ORDER: usize = 6;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    LowPass,
    HighPass,
}

impl FromStr for FilterType {
    type Err = SynthError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lowpass" => Ok(FilterType::LowPass),
            "highpass" => Ok(FilterType::HighPass),
            _ => Err(SynthError::filter(format!(
                "'{s}' is not a filter type; type must be lowpass or highpass"
            ))),
        }
    }
}

/// One second-order section, `a0` normalised to 1.
///
/// First-order sections leave `b2` and `a2` at zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Biquad {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

impl Biquad {
    /// Gain at DC (z = 1).
    pub fn dc_gain(&self) -> f64 {
        (self.b0 + self.b1 + self.b2) / (1.0 + self.a1 + self.a2)
    }

    /// Transposed direct form II state for a constant input `x`.
    fn steady_state(&self, x: f64) -> [f64; 2] {
        let y = self.dc_gain() * x;
        [y - self.b0 * x, self.b2 * x - self.a2 * y]
    }

    /// Filter `buffer` in place starting from `state`.
    fn run(&self, buffer: &mut [f64], mut state: [f64; 2]) {
        for sample in buffer.iter_mut() {
            let x = *sample;
            let y = self.b0 * x + state[0];
            state[0] = self.b1 * x - self.a1 * y + state[1];
            state[1] = self.b2 * x - self.a2 * y;
            *sample = y;
        }
    }

    fn from_pole_pair(pole: Complex64, filter_type: FilterType) -> Self {
        let a1 = -2.0 * pole.re;
        let a2 = pole.norm_sqr();
        match filter_type {
            FilterType::LowPass => {
                let g = (1.0 + a1 + a2) / 4.0;
                Self { b0: g, b1: 2.0 * g, b2: g, a1, a2 }
            }
            FilterType::HighPass => {
                let g = (1.0 - a1 + a2) / 4.0;
                Self { b0: g, b1: -2.0 * g, b2: g, a1, a2 }
            }
        }
    }

    fn from_real_pole(pole: f64, filter_type: FilterType) -> Self {
        let a1 = -pole;
        match filter_type {
            FilterType::LowPass => {
                let g = (1.0 + a1) / 2.0;
                Self { b0: g, b1: g, b2: 0.0, a1, a2: 0.0 }
            }
            FilterType::HighPass => {
                let g = (1.0 - a1) / 2.0;
                Self { b0: g, b1: -g, b2: 0.0, a1, a2: 0.0 }
            }
        }
    }
}

/// Which filter to run, and how steep.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterSpec {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub filter_type: FilterType,
    pub cutoff_hz: f64,
    #[cfg_attr(feature = "serde", serde(default = "default_order"))]
    pub order: usize,
}

#[cfg(feature = "serde")]
fn default_order() -> usize {
    5
}

impl FilterSpec {
    pub fn lowpass(cutoff_hz: f64) -> Self {
        Self {
            filter_type: FilterType::LowPass,
            cutoff_hz,
            order: 5,
        }
    }

    pub fn highpass(cutoff_hz: f64) -> Self {
        Self {
            filter_type: FilterType::HighPass,
            cutoff_hz,
            order: 5,
        }
    }

    pub fn with_order(mut self, order: usize) -> Self {
        self.order = order;
        self
    }
}

/// Butterworth filter as a cascade of second-order sections.
///
/// Checks run in order: cutoff ≤ 0, sample rate ≤ 0, order outside 1..=6,
/// cutoff at or above Nyquist.
pub fn design_butterworth(
    order: usize,
    cutoff_hz: f64,
    sample_rate: f64,
    filter_type: FilterType,
) -> Result<Vec<Biquad>> {
    if !(cutoff_hz > 0.0) {
        return Err(SynthError::filter(format!(
            "cutoff frequency must be greater than 0, got {cutoff_hz}"
        )));
    }
    if !(sample_rate > 0.0 && sample_rate.is_finite()) {
        return Err(SynthError::filter(format!(
            "sampling frequency must be a finite value greater than 0, got {sample_rate}"
        )));
    }
    if !(1..=MAX_ORDER).contains(&order) {
        return Err(SynthError::filter(format!(
            "order must be between 1 and {MAX_ORDER}, got {order}"
        )));
    }
    if cutoff_hz >= nyquist(sample_rate) {
        return Err(SynthError::filter(format!(
            "cutoff {cutoff_hz} Hz must be below Nyquist ({} Hz)",
            nyquist(sample_rate)
        )));
    }

    let warped = 2.0 * sample_rate * (PI * cutoff_hz / sample_rate).tan();
    let two_fs = Complex64::new(2.0 * sample_rate, 0.0);
    let bilinear = |s: Complex64| (two_fs + s) / (two_fs - s);

    let mut sections = Vec::with_capacity(order.div_ceil(2));
    for k in 0..order / 2 {
        let theta = PI * (2 * k + 1) as f64 / (2 * order) as f64;
        let prototype = Complex64::new(-theta.sin(), theta.cos());
        let analog = match filter_type {
            FilterType::LowPass => prototype * warped,
            FilterType::HighPass => Complex64::new(warped, 0.0) / prototype,
        };
        sections.push(Biquad::from_pole_pair(bilinear(analog), filter_type));
    }
    if order % 2 == 1 {
        // prototype pole at -1 maps to -ωc for both responses
        let pole = bilinear(Complex64::new(-warped, 0.0)).re;
        sections.push(Biquad::from_real_pole(pole, filter_type));
    }

    tracing::debug!(order, cutoff_hz, ?filter_type, sections = sections.len(), "butterworth design");
    Ok(sections)
}

fn run_cascade(buffer: &mut [f64], sections: &[Biquad]) {
    let Some(&first) = buffer.first() else {
        return;
    };
    let mut x0 = first;
    for section in sections {
        let state = section.steady_state(x0);
        section.run(buffer, state);
        x0 = section.dc_gain() * x0;
    }
}

/// Forward-backward filtering through `sections`: no phase shift, squared
/// magnitude response.
pub fn filter_zero_phase(input: &[f64], sections: &[Biquad]) -> SampleBuffer {
    let n = input.len();
    if n == 0 || sections.is_empty() {
        return input.to_vec();
    }

    // 3 × (filter length), capped so the reflection stays inside the signal
    let pad = (3 * (2 * sections.len() + 1)).min(n - 1);
    let (first, last) = (input[0], input[n - 1]);

    let mut ext = Vec::with_capacity(n + 2 * pad);
    ext.extend((1..=pad).rev().map(|i| 2.0 * first - input[i]));
    ext.extend_from_slice(input);
    ext.extend((1..=pad).map(|i| 2.0 * last - input[n - 1 - i]));

    run_cascade(&mut ext, sections);
    ext.reverse();
    run_cascade(&mut ext, sections);
    ext.reverse();

    ext.drain(..pad);
    ext.truncate(n);
    ext
}

/// Design a Butterworth filter for `spec` and apply it with zero phase.
pub fn apply_filter(buffer: &[f64], spec: &FilterSpec, sample_rate: f64) -> Result<SampleBuffer> {
    let sections = design_butterworth(spec.order, spec.cutoff_hz, sample_rate, spec.filter_type)?;
    Ok(filter_zero_phase(buffer, &sections))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::oscillator::generate_sine;

    const SAMPLE_RATE: f64 = 44_100.0;

    fn peak(buffer: &[f64]) -> f64 {
        buffer.iter().fold(0.0, |acc, &x| acc.max(x.abs()))
    }

    #[test]
    fn lowpass_has_unity_dc_gain() {
        for order in 1..=MAX_ORDER {
            let sections = design_butterworth(order, 1_000.0, SAMPLE_RATE, FilterType::LowPass).unwrap();
            let gain: f64 = sections.iter().map(Biquad::dc_gain).product();
            assert!((gain - 1.0).abs() < 1e-9, "order {order}: {gain}");
        }
    }

    #[test]
    fn section_count_follows_order() {
        let count = |order| {
            design_butterworth(order, 500.0, SAMPLE_RATE, FilterType::HighPass)
                .unwrap()
                .len()
        };
        assert_eq!(count(1), 1);
        assert_eq!(count(4), 2);
        assert_eq!(count(5), 3);
    }

    #[test]
    fn lowpass_passes_constant() {
        let out = apply_filter(&[0.5; 256], &FilterSpec::lowpass(1_000.0), SAMPLE_RATE).unwrap();
        assert!(out.iter().all(|&s| (s - 0.5).abs() < 1e-6));
    }

    #[test]
    fn highpass_removes_constant() {
        let out = apply_filter(&[0.5; 256], &FilterSpec::highpass(1_000.0), SAMPLE_RATE).unwrap();
        assert!(peak(&out) < 1e-6, "peak {}", peak(&out));
    }

    #[test]
    fn lowpass_rejects_high_frequencies() {
        let tone = generate_sine(15_000.0, 0.1, SAMPLE_RATE, 1.0, 0.0).unwrap();
        let out = apply_filter(&tone, &FilterSpec::lowpass(500.0).with_order(4), SAMPLE_RATE).unwrap();
        assert!(peak(&out[500..3_900]) < 1e-4, "peak {}", peak(&out[500..3_900]));
    }

    #[test]
    fn passband_keeps_amplitude_and_phase() {
        let tone = generate_sine(100.0, 0.2, SAMPLE_RATE, 1.0, 0.0).unwrap();
        let out = apply_filter(&tone, &FilterSpec::lowpass(4_000.0).with_order(4), SAMPLE_RATE).unwrap();
        assert_eq!(out.len(), tone.len());
        for i in 2_000..6_000 {
            assert!((out[i] - tone[i]).abs() < 1e-3, "sample {i}");
        }
    }

    #[test]
    fn short_buffers_are_handled() {
        let spec = FilterSpec::lowpass(1_000.0);
        assert!(apply_filter(&[], &spec, SAMPLE_RATE).unwrap().is_empty());
        assert_eq!(apply_filter(&[1.0], &spec, SAMPLE_RATE).unwrap().len(), 1);
        assert_eq!(apply_filter(&[1.0, -1.0, 0.5], &spec, SAMPLE_RATE).unwrap().len(), 3);
    }

    #[test]
    fn invalid_parameters_follow_precedence() {
        let err = |order, cutoff, sr| design_butterworth(order, cutoff, sr, FilterType::LowPass).unwrap_err();
        assert!(err(0, -1.0, -1.0).to_string().contains("cutoff frequency"));
        assert!(err(0, 100.0, -1.0).to_string().contains("sampling frequency"));
        assert!(err(2, 100.0, f64::INFINITY).to_string().contains("sampling frequency"));
        assert!(err(7, 100.0, SAMPLE_RATE).to_string().contains("order"));
        assert!(err(2, 30_000.0, SAMPLE_RATE).to_string().contains("Nyquist"));
    }

    #[test]
    fn filter_type_parses() {
        assert_eq!("highpass".parse::<FilterType>().unwrap(), FilterType::HighPass);
        assert!(matches!(
            "bandpass".parse::<FilterType>(),
            Err(SynthError::InvalidFilterParams(_))
        ));
    }
}
