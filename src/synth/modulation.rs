#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::oscillator::{self, Waveform},
    error::{Result, SynthError},
    synth::waveform::{synthesize, WaveformRequest},
    SampleBuffer,
};

/*
Two-Operator Modulation
=======================

A carrier is the waveform you hear; a modulator is a second waveform that
changes something about the carrier over time. Both come from the same
dispatcher, and the modulator's pitch is tied to the carrier's:

    modulator_freq = carrier_freq × ratio

Integer ratios (1, 2, 3) keep the result harmonic; anything else produces
clangorous, bell-like spectra.


Amplitude Modulation
--------------------

The modulator is lifted to sit around 1 and then scales the carrier:

    out[n] = carrier[n] × depth × (1 + modulator[n])

With a sine modulator this adds sidebands at carrier ± modulator. Depth
scales the whole product, so a depth of 0 silences the output entirely.


Phase Modulation
----------------

The modulator pushes the carrier's instantaneous phase around:

    out[n] = Σ_k w_k · sin(2π·k·f·n/fs + φ + k·index·m[n])

Each carrier harmonic k is shifted by k times the fundamental's offset, so
the composite waveform is displaced in time as a unit instead of having its
partials smeared independently. For a sine carrier this is the classic
sin(ωn + φ + I·m[n]).
*/

/// A carrier plus the modulator that acts on it.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModulationRequest {
    pub carrier: WaveformRequest,
    pub modulator: Waveform,
    /// Modulator frequency as a multiple of the carrier frequency.
    pub ratio: f64,
    /// Depth for AM, index (radians) for PM.
    pub amount: f64,
}

impl ModulationRequest {
    pub fn new(carrier: WaveformRequest, modulator: Waveform, ratio: f64, amount: f64) -> Self {
        Self {
            carrier,
            modulator,
            ratio,
            amount,
        }
    }

    pub fn modulator_frequency(&self) -> f64 {
        self.carrier.frequency * self.ratio
    }

    /// Unit-amplitude, zero-phase modulator sharing the carrier's timing.
    pub fn modulator_request(&self) -> WaveformRequest {
        self.carrier
            .retuned(self.modulator, self.modulator_frequency())
            .with_amplitude(1.0)
            .with_phase(0.0)
    }

    /// Amount first, then ratio.
    fn validate(&self, amount_name: &str) -> Result<()> {
        if !(self.amount >= 0.0 && self.amount.is_finite()) {
            return Err(SynthError::modulation(format!(
                "{amount_name} must be a finite value greater than or equal to 0, got {}",
                self.amount
            )));
        }
        if !(self.ratio > 0.0) {
            return Err(SynthError::modulation(format!(
                "modulation ratio must be greater than 0, got {}",
                self.ratio
            )));
        }
        Ok(())
    }
}

/// `carrier × depth × (1 + modulator)`, sample by sample.
///
/// ```
/// use saavy_synth::{amplitude_modulate, ModulationRequest, Waveform, WaveformRequest};
///
/// let carrier = WaveformRequest::new(Waveform::Sine, 440.0, 0.1);
/// let silent = amplitude_modulate(&ModulationRequest::new(carrier, Waveform::Sine, 1.0, 0.0)).unwrap();
/// assert!(silent.iter().all(|&s| s == 0.0));
/// ```
pub fn amplitude_modulate(request: &ModulationRequest) -> Result<SampleBuffer> {
    request.validate("modulation depth")?;

    let mut carrier = synthesize(&request.carrier)?;
    let modulator = synthesize(&request.modulator_request())?;

    let depth = request.amount;
    for (c, m) in carrier.iter_mut().zip(&modulator) {
        *c *= depth * (1.0 + m);
    }
    Ok(carrier)
}

/// Carrier whose instantaneous phase is offset by `index × modulator`.
pub fn phase_modulate(request: &ModulationRequest) -> Result<SampleBuffer> {
    request.validate("modulation index")?;

    let carrier = &request.carrier;
    carrier.validate()?;
    let mut offsets = synthesize(&request.modulator_request())?;
    for offset in offsets.iter_mut() {
        *offset *= request.amount;
    }

    let waveform = carrier.waveform;
    Ok(oscillator::render_partials(
        carrier.len(),
        carrier.frequency,
        carrier.sample_rate,
        carrier.amplitude,
        carrier.phase,
        |k| waveform.includes_harmonic(k),
        |k, amp| waveform.harmonic_weight(k, amp),
        Some(offsets.as_slice()),
    ))
}
