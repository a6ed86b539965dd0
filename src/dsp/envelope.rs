use std::iter;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    error::{Result, SynthError},
    SampleBuffer,
};

/*
ADSR Envelope Shaping
=====================

This module shapes a finished buffer with a linear ADSR envelope. Unlike a
gate-driven envelope, the whole note is known up front, so every stage is
given as a PERCENTAGE of the buffer's length and the envelope is laid out in
one pass.

Vocabulary
----------

  attack      Ramp 0 → 1 at the start of the note.

  decay       Ramp 1 → sustain level after the attack.

  sustain     Constant level held until the release. When no sustain level is
              given the note is attack/release only (see below).

  release     Ramp sustain → 0 at the end of the note.

  segment     The integer sample count of one stage. Segments always add up
              to the buffer length exactly.


The Shape
---------

  Level
    1.0 ┐     ╱╲
        │    ╱  ╲___________
    S   │   ╱               ╲
        │  ╱                 ╲
    0.0 └─╱───────────────────╲──→ Samples
        Attack Decay  Sustain  Release

Without a sustain level:

    1.0 ┐   ╱╲
        │  ╱  ╲
    0.0 └─╱────╲______________──→ Samples
        Attack Release  Silence

Decay is skipped and everything after the release is exactly zero.


Percentages to Samples
----------------------

    t_ms       = len / sample_rate × 1000
    stage_ms   = pct / 100 × t_ms
    stage_samp = floor(stage_ms × sample_rate / 1000)

Two clamps run before the conversion:

  1. Release. If the attack ends within 20 ms of the end of the buffer, the
     release takes exactly the time that is left. Otherwise a release shorter
     than 20 ms is stretched to 20 ms, which is long enough to avoid a click.
     Both rules are skipped only when attack, decay and release are all 0%,
     so a full-sustain envelope with no stages leaves the buffer untouched.

  2. Overflow. If attack + decay + release no longer fit in the buffer, all
     three are reset to one fifth of the buffer. This throws away the
     requested proportions rather than scaling them, and is logged.

Each floor() can drop up to one sample, so the segments rarely sum to the
buffer length on their own. The shortfall is folded into the sustain
segment (or the silence tail without sustain), which makes the sum exact.


Ramps
-----

Ramps include both endpoints, so an attack of N samples runs
0, 1/(N-1), ..., 1. A one-sample ramp is just its start value and an empty
ramp contributes nothing.
*/

/// Release floor, unless the attack runs into the end of the buffer.
pub const MIN_RELEASE_MS: f64 = 20.0;

/// ADSR parameters as percentages of the note length.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeSpec {
    /// Attack length, 0-100 % of the buffer.
    pub attack: f64,
    /// Decay length, 0-100 % of the buffer.
    pub decay: f64,
    /// Sustain level 0-1, or `None` for an attack/release-only envelope.
    #[cfg_attr(feature = "serde", serde(default))]
    pub sustain: Option<f64>,
    /// Release length, 0-100 % of the buffer.
    pub release: f64,
}

impl EnvelopeSpec {
    pub fn adsr(attack: f64, decay: f64, sustain: f64, release: f64) -> Self {
        Self {
            attack,
            decay,
            sustain: Some(sustain),
            release,
        }
    }

    /// Attack/release only; the rest of the buffer is silenced.
    pub fn attack_release(attack: f64, release: f64) -> Self {
        Self {
            attack,
            decay: 0.0,
            sustain: None,
            release,
        }
    }

    /// No attack, decay or release at all.
    fn is_flat(&self) -> bool {
        self.attack == 0.0 && self.decay == 0.0 && self.release == 0.0
    }

    pub fn validate(&self) -> Result<()> {
        for (name, pct) in [
            ("attack", self.attack),
            ("decay", self.decay),
            ("release", self.release),
        ] {
            if !(0.0..=100.0).contains(&pct) {
                return Err(SynthError::envelope(format!(
                    "{name} must be a percentage between 0 and 100, got {pct}"
                )));
            }
        }
        if let Some(level) = self.sustain {
            if !(0.0..=1.0).contains(&level) {
                return Err(SynthError::envelope(format!(
                    "sustain level must be between 0 and 1, got {level}"
                )));
            }
        }
        Ok(())
    }
}

/// Sample counts for each envelope stage.
///
/// `attack + decay + sustain + release + silence` always equals the buffer
/// length the segments were computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EnvelopeSegments {
    pub attack: usize,
    pub decay: usize,
    pub sustain: usize,
    pub release: usize,
    /// Zero tail used when there is no sustain level.
    pub silence: usize,
}

impl EnvelopeSegments {
    /// Lay out `spec` over a buffer of `len` samples.
    pub fn compute(spec: &EnvelopeSpec, len: usize, sample_rate: f64) -> Result<Self> {
        spec.validate()?;
        if !(sample_rate > 0.0 && sample_rate.is_finite()) {
            return Err(SynthError::InvalidSampleRate(format!(
                "sample rate must be a finite value greater than 0, got {sample_rate}"
            )));
        }

        let total_ms = len as f64 / sample_rate * 1000.0;
        let (attack_ms, decay_ms, release_ms) = stage_times(spec, total_ms);

        let to_samples = |ms: f64| (ms * sample_rate / 1000.0).floor() as usize;
        let mut attack = to_samples(attack_ms);
        let mut decay = if spec.sustain.is_some() {
            to_samples(decay_ms)
        } else {
            0
        };
        let mut release = to_samples(release_ms);

        // Flooring cannot overshoot in exact arithmetic; the ms round trip can
        // by a sample, so trim from the end of the note.
        let mut overflow = (attack + decay + release).saturating_sub(len);
        for segment in [&mut release, &mut decay, &mut attack] {
            let cut = overflow.min(*segment);
            *segment -= cut;
            overflow -= cut;
        }

        let remaining = len - attack - decay - release;
        let segments = match spec.sustain {
            Some(_) => Self {
                attack,
                decay,
                sustain: remaining,
                release,
                silence: 0,
            },
            None => Self {
                attack,
                decay,
                sustain: 0,
                release,
                silence: remaining,
            },
        };

        tracing::debug!(?segments, len, "envelope segments");
        Ok(segments)
    }

    pub fn total(&self) -> usize {
        self.attack + self.decay + self.sustain + self.release + self.silence
    }
}

/// Stage lengths in ms after the release and overflow clamps.
fn stage_times(spec: &EnvelopeSpec, total_ms: f64) -> (f64, f64, f64) {
    let pct_to_ms = |pct: f64| pct / 100.0 * total_ms;
    let mut attack = pct_to_ms(spec.attack);
    let mut decay = pct_to_ms(spec.decay);
    let mut release = pct_to_ms(spec.release);

    if !spec.is_flat() {
        if total_ms - MIN_RELEASE_MS <= attack && attack <= total_ms {
            release = total_ms - attack;
            tracing::debug!(
                release_ms = release,
                "attack runs into the last 20ms; release takes the remaining time"
            );
        } else if release < MIN_RELEASE_MS {
            tracing::debug!(
                requested_ms = release,
                "release shorter than 20ms; using 20ms"
            );
            release = MIN_RELEASE_MS;
        }
    }

    if attack + decay + release > total_ms {
        let fifth = total_ms / 5.0;
        tracing::warn!(
            attack_ms = attack,
            decay_ms = decay,
            release_ms = release,
            total_ms,
            "attack, decay and release exceed the note length; each reset to 1/5 of it"
        );
        attack = fifth;
        decay = fifth;
        release = fifth;
    }

    (attack, decay, release)
}

/// Append `n` evenly spaced values from `start` to `end`, both included.
fn push_ramp(out: &mut Vec<f64>, start: f64, end: f64, n: usize) {
    match n {
        0 => {}
        1 => out.push(start),
        _ => {
            let step = (end - start) / (n - 1) as f64;
            out.extend((0..n).map(|i| start + step * i as f64));
            // exact endpoint regardless of accumulated rounding
            if let Some(last) = out.last_mut() {
                *last = end;
            }
        }
    }
}

/// The envelope `apply_envelope` would multiply a `len`-sample buffer by.
pub fn envelope_curve(spec: &EnvelopeSpec, len: usize, sample_rate: f64) -> Result<Vec<f64>> {
    let segments = EnvelopeSegments::compute(spec, len, sample_rate)?;
    let mut env = Vec::with_capacity(len);

    match spec.sustain {
        None => {
            push_ramp(&mut env, 0.0, 1.0, segments.attack);
            push_ramp(&mut env, 1.0, 0.0, segments.release);
            env.extend(iter::repeat(0.0).take(segments.silence));
        }
        Some(level) => {
            push_ramp(&mut env, 0.0, 1.0, segments.attack);
            push_ramp(&mut env, 1.0, level, segments.decay);
            env.extend(iter::repeat(level).take(segments.sustain));
            push_ramp(&mut env, level, 0.0, segments.release);
        }
    }

    debug_assert_eq!(env.len(), len);
    Ok(env)
}

/// Shape `buffer` with `spec`. The returned buffer has the same length.
///
/// ```
/// use saavy_synth::{apply_envelope, EnvelopeSpec};
///
/// let flat = vec![1.0; 4_410];
/// let shaped = apply_envelope(flat, &EnvelopeSpec::adsr(10.0, 10.0, 0.5, 10.0), 44_100.0).unwrap();
/// assert_eq!(shaped.len(), 4_410);
/// assert_eq!(shaped[0], 0.0);
/// ```
pub fn apply_envelope(
    mut buffer: SampleBuffer,
    spec: &EnvelopeSpec,
    sample_rate: f64,
) -> Result<SampleBuffer> {
    let env = envelope_curve(spec, buffer.len(), sample_rate)?;
    for (sample, gain) in buffer.iter_mut().zip(env) {
        *sample *= gain;
    }
    Ok(buffer)
}
