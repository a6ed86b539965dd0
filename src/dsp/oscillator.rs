use std::{f64::consts::TAU, fmt, str::FromStr};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    error::{Result, SynthError},
    SampleBuffer,
};

/*
Band-Limited Oscillators
========================

Every waveform here is built from sines. A sine is the one waveform with a
single frequency; everything else is a sum of sines at integer multiples of
the fundamental (the harmonics).

Vocabulary
----------

  fundamental   The base frequency f. Harmonic k sits at k × f.

  harmonic      The k-th partial, a sine at k × f with its own weight.

  Nyquist       sample_rate / 2. The highest frequency a sampled signal can
                represent. Anything above it folds back down (aliases) and
                shows up as an inharmonic tone.


Harmonic Recipes
----------------

  | waveform | harmonics used | weight of harmonic k |
  | -------- | -------------- | -------------------- |
  | sine     | k = 1          | A                    |
  | saw      | all k          | A / k                |
  | square   | odd k          | A / k                |
  | triangle | odd k          | A / k²               |

All harmonics start at the same initial phase.


Why Additive?
-------------

A naive saw (a ramp that resets every period) contains harmonics all the way
up, far beyond Nyquist. Summing only the harmonics below Nyquist gives a
band-limited shape: a little ripple near the corners (Gibbs), but no
aliasing. This is also why the fundamental must sit strictly below Nyquist:
at or above it there is no harmonic to sum and the shape degenerates.

    k_max = floor((sample_rate / 2) / f)

and any harmonic landing exactly on Nyquist is dropped too.


Phase Accuracy
--------------

The sample index grows without bound, so the phase argument
2π·f·n/sample_rate would too. We wrap the cycle count to its fractional
part before multiplying by 2π, keeping sin() in its accurate range even for
long buffers and high harmonics.
*/

/// Waveform shapes the synthesizer can generate.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Waveform {
    Sine,
    Square,
    #[cfg_attr(feature = "serde", serde(alias = "sawtooth"))]
    Saw,
    Triangle,
}

impl Waveform {
    pub const ALL: [Waveform; 4] = [
        Waveform::Sine,
        Waveform::Square,
        Waveform::Saw,
        Waveform::Triangle,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Square => "square",
            Waveform::Saw => "saw",
            Waveform::Triangle => "triangle",
        }
    }

    /// Whether harmonic `k` (1-based) is part of this waveform.
    pub fn includes_harmonic(self, k: usize) -> bool {
        match self {
            Waveform::Sine => k == 1,
            Waveform::Saw => k >= 1,
            Waveform::Square | Waveform::Triangle => k % 2 == 1,
        }
    }

    /// Weight of harmonic `k` for a waveform of the given amplitude.
    pub fn harmonic_weight(self, k: usize, amplitude: f64) -> f64 {
        let k = k as f64;
        match self {
            Waveform::Sine => amplitude,
            Waveform::Saw | Waveform::Square => amplitude / k,
            Waveform::Triangle => amplitude / (k * k),
        }
    }
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Waveform {
    type Err = SynthError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sine" => Ok(Waveform::Sine),
            "square" => Ok(Waveform::Square),
            "saw" | "sawtooth" => Ok(Waveform::Saw),
            "triangle" => Ok(Waveform::Triangle),
            _ => Err(SynthError::InvalidType(format!(
                "'{s}' is not a waveform; type must be sine, square, saw, or triangle"
            ))),
        }
    }
}

/// Number of samples produced for `duration` seconds at `sample_rate`.
#[inline]
pub fn sample_count(duration: f64, sample_rate: f64) -> usize {
    (duration * sample_rate).round() as usize
}

#[inline]
pub fn nyquist(sample_rate: f64) -> f64 {
    sample_rate / 2.0
}

/// Highest harmonic index strictly below Nyquist for fundamental `freq`.
///
/// Returns 0 when even the fundamental would alias.
pub fn harmonic_limit(freq: f64, sample_rate: f64) -> usize {
    let nyquist = nyquist(sample_rate);
    if !(freq > 0.0) || !(freq < nyquist) {
        return 0;
    }
    let mut k = (nyquist / freq).floor() as usize;
    while k > 0 && k as f64 * freq >= nyquist {
        k -= 1;
    }
    k
}

/// Check generation parameters in reporting order: aliasing, non-positive
/// frequency, negative amplitude, non-positive duration, non-positive sample
/// rate. Only the first violation is returned.
///
/// Comparisons are written so NaN fails them; infinite amplitude, duration
/// and sample rate fail too.
pub fn validate_params(freq: f64, duration: f64, sample_rate: f64, amplitude: f64) -> Result<()> {
    if !(freq < nyquist(sample_rate)) {
        return Err(SynthError::frequency(format!(
            "{freq} Hz will cause aliasing at a sample rate of {sample_rate} Hz"
        )));
    }
    if !(freq > 0.0) {
        return Err(SynthError::frequency(format!(
            "frequency must be greater than 0, got {freq}"
        )));
    }
    if !(amplitude >= 0.0 && amplitude.is_finite()) {
        return Err(SynthError::InvalidAmplitude(format!(
            "amplitude must be a finite value greater than or equal to 0, got {amplitude}"
        )));
    }
    if !(duration > 0.0 && duration.is_finite()) {
        return Err(SynthError::InvalidDuration(format!(
            "duration must be a finite value greater than 0, got {duration}"
        )));
    }
    if !(sample_rate > 0.0 && sample_rate.is_finite()) {
        return Err(SynthError::InvalidSampleRate(format!(
            "sample rate must be a finite value greater than 0, got {sample_rate}"
        )));
    }
    Ok(())
}

/// Add one weighted sine partial into `out`.
///
/// `phase_offsets`, when present, shifts the instantaneous phase of sample n
/// by `scale * phase_offsets[n]`.
fn add_partial(
    out: &mut [f64],
    freq: f64,
    sample_rate: f64,
    weight: f64,
    phase: f64,
    phase_offsets: Option<(&[f64], f64)>,
) {
    let cycles_per_sample = freq / sample_rate;
    match phase_offsets {
        None => {
            for (n, sample) in out.iter_mut().enumerate() {
                let cycles = (cycles_per_sample * n as f64).fract();
                *sample += weight * (TAU * cycles + phase).sin();
            }
        }
        Some((offsets, scale)) => {
            for (n, (sample, &offset)) in out.iter_mut().zip(offsets).enumerate() {
                let cycles = (cycles_per_sample * n as f64).fract();
                *sample += weight * (TAU * cycles + phase + scale * offset).sin();
            }
        }
    }
}

/// Harmonic count above which a render is logged as unusually expensive.
const PARTIAL_WARN_THRESHOLD: usize = 10_000;

/// Sum the selected harmonics of `freq` into a fresh buffer of `len` samples.
///
/// Parameters are assumed validated.
#[allow(clippy::too_many_arguments)]
pub(crate) fn render_partials(
    len: usize,
    freq: f64,
    sample_rate: f64,
    amplitude: f64,
    phase: f64,
    selector: impl Fn(usize) -> bool,
    weight: impl Fn(usize, f64) -> f64,
    phase_offsets: Option<&[f64]>,
) -> SampleBuffer {
    let mut out = vec![0.0; len];
    let limit = harmonic_limit(freq, sample_rate);
    if limit > PARTIAL_WARN_THRESHOLD {
        tracing::debug!(
            freq,
            sample_rate,
            partials = limit,
            samples = len,
            "very low fundamental; additive render will be slow"
        );
    }
    for k in (1..=limit).filter(|&k| selector(k)) {
        let offsets = phase_offsets.map(|offsets| (offsets, k as f64));
        add_partial(
            &mut out,
            freq * k as f64,
            sample_rate,
            weight(k, amplitude),
            phase,
            offsets,
        );
    }
    out
}

/// A single sinusoid: `amplitude·sin(2π·freq·n/sample_rate + phase)`.
pub fn generate_sine(
    freq: f64,
    duration: f64,
    sample_rate: f64,
    amplitude: f64,
    phase: f64,
) -> Result<SampleBuffer> {
    validate_params(freq, duration, sample_rate, amplitude)?;
    let mut out = vec![0.0; sample_count(duration, sample_rate)];
    add_partial(&mut out, freq, sample_rate, amplitude, phase, None);
    Ok(out)
}

/// Additive synthesis over every harmonic below Nyquist that `selector`
/// accepts, each weighted by `weight(k, amplitude)`.
///
/// ```
/// use saavy_synth::dsp::oscillator::generate_harmonic_wave;
///
/// // Square: odd harmonics at 1/k
/// let square = generate_harmonic_wave(
///     100.0, 0.01, 8_000.0, 1.0, 0.0,
///     |k| k % 2 == 1,
///     |k, amp| amp / k as f64,
/// )
/// .unwrap();
/// assert_eq!(square.len(), 80);
/// ```
pub fn generate_harmonic_wave(
    freq: f64,
    duration: f64,
    sample_rate: f64,
    amplitude: f64,
    phase: f64,
    selector: impl Fn(usize) -> bool,
    weight: impl Fn(usize, f64) -> f64,
) -> Result<SampleBuffer> {
    validate_params(freq, duration, sample_rate, amplitude)?;
    Ok(render_partials(
        sample_count(duration, sample_rate),
        freq,
        sample_rate,
        amplitude,
        phase,
        selector,
        weight,
        None,
    ))
}

/// Generate `waveform` with its standard harmonic recipe.
pub fn generate(
    waveform: Waveform,
    freq: f64,
    duration: f64,
    sample_rate: f64,
    amplitude: f64,
    phase: f64,
) -> Result<SampleBuffer> {
    match waveform {
        Waveform::Sine => generate_sine(freq, duration, sample_rate, amplitude, phase),
        Waveform::Saw | Waveform::Square | Waveform::Triangle => generate_harmonic_wave(
            freq,
            duration,
            sample_rate,
            amplitude,
            phase,
            |k| waveform.includes_harmonic(k),
            |k, amp| waveform.harmonic_weight(k, amp),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn valid_sine() {
        let sample_rate = 48_000.0;
        let freq = 440.0;
        let buffer = generate_sine(freq, 0.01, sample_rate, 1.0, 0.0).unwrap();

        let sample_index = 12;
        let expected = (TAU * freq * sample_index as f64 / sample_rate).sin();
        let actual = buffer[sample_index];
        assert!(
            (actual - expected).abs() < 1e-12,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn sine_starts_at_amp_sin_phase() {
        let buffer = generate_sine(220.0, 0.1, 44_100.0, 0.8, FRAC_PI_2).unwrap();
        assert!((buffer[0] - 0.8).abs() < 1e-12);
    }

    #[test]
    fn harmonic_limit_excludes_nyquist() {
        // 100 Hz at 1 kHz: Nyquist is 500, harmonic 5 lands on it exactly
        assert_eq!(harmonic_limit(100.0, 1_000.0), 4);
        assert_eq!(harmonic_limit(110.0, 1_000.0), 4);
        assert_eq!(harmonic_limit(500.0, 1_000.0), 0);
        assert_eq!(harmonic_limit(0.0, 1_000.0), 0);
    }

    #[test]
    fn square_sums_odd_harmonics() {
        let (freq, sr) = (100.0, 1_000.0);
        let square = generate(Waveform::Square, freq, 0.1, sr, 1.0, 0.0).unwrap();
        // harmonics 1 and 3 only (5 sits on Nyquist)
        for (n, &s) in square.iter().enumerate() {
            let t = n as f64 / sr;
            let expected = (TAU * freq * t).sin() + (TAU * 3.0 * freq * t).sin() / 3.0;
            assert!((s - expected).abs() < 1e-9, "sample {n}");
        }
    }

    #[test]
    fn triangle_uses_inverse_square_weights() {
        let (freq, sr) = (100.0, 1_000.0);
        let tri = generate(Waveform::Triangle, freq, 0.1, sr, 2.0, 0.0).unwrap();
        for (n, &s) in tri.iter().enumerate() {
            let t = n as f64 / sr;
            let expected = 2.0 * (TAU * freq * t).sin() + 2.0 / 9.0 * (TAU * 3.0 * freq * t).sin();
            assert!((s - expected).abs() < 1e-9, "sample {n}");
        }
    }

    #[test]
    fn saw_includes_every_harmonic() {
        let (freq, sr) = (100.0, 1_000.0);
        let saw = generate(Waveform::Saw, freq, 0.05, sr, 1.0, 0.0).unwrap();
        for (n, &s) in saw.iter().enumerate() {
            let t = n as f64 / sr;
            let expected: f64 = (1..=4)
                .map(|k| (TAU * k as f64 * freq * t).sin() / k as f64)
                .sum();
            assert!((s - expected).abs() < 1e-9, "sample {n}");
        }
    }

    #[test]
    fn parse_rejects_unknown_names() {
        assert_eq!("Triangle".parse::<Waveform>().unwrap(), Waveform::Triangle);
        assert!(matches!(
            "noise".parse::<Waveform>(),
            Err(SynthError::InvalidType(_))
        ));
    }

    #[test]
    fn infinite_parameters_are_rejected() {
        let inf = f64::INFINITY;
        assert!(matches!(
            generate_sine(440.0, inf, 44_100.0, 1.0, 0.0),
            Err(SynthError::InvalidDuration(_))
        ));
        assert!(matches!(
            generate_sine(440.0, 1.0, inf, 1.0, 0.0),
            Err(SynthError::InvalidSampleRate(_))
        ));
        assert!(matches!(
            generate(Waveform::Saw, 440.0, 1.0, 44_100.0, inf, 0.0),
            Err(SynthError::InvalidAmplitude(_))
        ));
        assert!(matches!(
            generate_sine(inf, 1.0, 44_100.0, 1.0, 0.0),
            Err(SynthError::InvalidFrequency(_))
        ));
    }

    #[test]
    fn infinite_amplitude_reported_before_infinite_duration() {
        assert!(matches!(
            validate_params(440.0, f64::INFINITY, 44_100.0, f64::INFINITY),
            Err(SynthError::InvalidAmplitude(_))
        ));
    }

    #[test]
    fn one_hertz_saw_renders_every_partial_below_nyquist() {
        assert!(harmonic_limit(1.0, 44_100.0) > PARTIAL_WARN_THRESHOLD);
        let saw = generate(Waveform::Saw, 1.0, 0.0002, 44_100.0, 1.0, 0.0).unwrap();
        assert_eq!(saw.len(), 9);
        assert!(saw.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn nan_frequency_is_rejected() {
        assert!(matches!(
            generate_sine(f64::NAN, 1.0, 44_100.0, 1.0, 0.0),
            Err(SynthError::InvalidFrequency(_))
        ));
    }
}
