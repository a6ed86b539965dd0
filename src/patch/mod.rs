//! Declarative render recipes.
//!
//! A [`Patch`] describes one note end to end: the source waveform, an
//! optional modulator, an optional envelope and an ordered effect chain. With
//! the `serde` feature it round-trips through TOML:
//!
//! ```toml
//! name = "bell"
//!
//! [waveform]
//! waveform = "sine"
//! frequency = 440.0
//! duration = 2.0
//!
//! [modulation]
//! kind = "pm"
//! modulator = "sine"
//! ratio = 3.5
//! amount = 2.0
//!
//! [envelope]
//! attack = 1.0
//! decay = 30.0
//! sustain = 0.2
//! release = 40.0
//!
//! [[effects]]
//! effect = "filter"
//! type = "lowpass"
//! cutoff_hz = 4000.0
//! order = 4
//! ```

use std::path::PathBuf;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::{
        delay::apply_delay,
        envelope::{apply_envelope, EnvelopeSpec},
        filter::{apply_filter, FilterSpec},
        oscillator::Waveform,
        reverb::apply_reverb,
    },
    io::{self, load_mono_samples},
    synth::{
        modulation::{amplitude_modulate, phase_modulate, ModulationRequest},
        waveform::{synthesize, WaveformRequest},
    },
    SampleBuffer,
};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    pub name: String,
    pub waveform: WaveformRequest,
    #[cfg_attr(feature = "serde", serde(default))]
    pub modulation: Option<ModulationDescriptor>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub envelope: Option<EnvelopeSpec>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub effects: Vec<EffectDescriptor>,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModulationKind {
    /// Amplitude modulation; `amount` is the depth.
    Am,
    /// Phase modulation; `amount` is the index in radians.
    Pm,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModulationDescriptor {
    pub kind: ModulationKind,
    pub modulator: Waveform,
    pub ratio: f64,
    pub amount: f64,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "effect", rename_all = "lowercase"))]
#[derive(Debug, Clone, PartialEq)]
pub enum EffectDescriptor {
    Filter(FilterSpec),
    Delay { delay_ms: f64, dry_wet: f64 },
    /// Impulse response loaded from a WAV file.
    Reverb { impulse: PathBuf, dry_wet: f64 },
}

impl Patch {
    pub fn new(name: impl Into<String>, waveform: WaveformRequest) -> Self {
        Self {
            name: name.into(),
            waveform,
            modulation: None,
            envelope: None,
            effects: Vec::new(),
        }
    }

    pub fn modulate(mut self, kind: ModulationKind, modulator: Waveform, ratio: f64, amount: f64) -> Self {
        self.modulation = Some(ModulationDescriptor {
            kind,
            modulator,
            ratio,
            amount,
        });
        self
    }

    pub fn envelope(mut self, envelope: EnvelopeSpec) -> Self {
        self.envelope = Some(envelope);
        self
    }

    pub fn effect(mut self, effect: EffectDescriptor) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn sample_rate(&self) -> f64 {
        self.waveform.sample_rate
    }

    /// Source, then envelope, then each effect in order.
    pub fn render(&self) -> io::Result<SampleBuffer> {
        let sample_rate = self.sample_rate();

        let mut buffer = match self.modulation {
            None => synthesize(&self.waveform)?,
            Some(m) => {
                let request = ModulationRequest::new(self.waveform, m.modulator, m.ratio, m.amount);
                match m.kind {
                    ModulationKind::Am => amplitude_modulate(&request)?,
                    ModulationKind::Pm => phase_modulate(&request)?,
                }
            }
        };

        if let Some(envelope) = &self.envelope {
            buffer = apply_envelope(buffer, envelope, sample_rate)?;
        }

        for effect in &self.effects {
            buffer = match effect {
                EffectDescriptor::Filter(spec) => apply_filter(&buffer, spec, sample_rate)?,
                EffectDescriptor::Delay { delay_ms, dry_wet } => {
                    apply_delay(&buffer, *delay_ms, *dry_wet, sample_rate)?
                }
                EffectDescriptor::Reverb { impulse, dry_wet } => {
                    let (ir, ir_rate) = load_mono_samples(impulse)?;
                    if (ir_rate as f64 - sample_rate).abs() > f64::EPSILON {
                        tracing::warn!(
                            impulse = %impulse.display(),
                            ir_rate,
                            sample_rate,
                            "impulse response sample rate differs from the patch; using it unresampled"
                        );
                    }
                    apply_reverb(&buffer, &ir, *dry_wet)?
                }
            };
        }

        tracing::info!(patch = %self.name, samples = buffer.len(), "rendered patch");
        Ok(buffer)
    }
}

#[cfg(feature = "serde")]
impl Patch {
    pub fn from_toml(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(self)
    }
}
