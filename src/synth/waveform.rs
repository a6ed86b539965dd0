#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::oscillator::{self, Waveform},
    error::Result,
    SampleBuffer, DEFAULT_SAMPLE_RATE,
};

/// Everything needed to render one waveform buffer.
///
/// Built once per call and consumed by [`synthesize`]. Use [`WaveformRequest::new`]
/// for the common case; it fills in a 44.1 kHz sample rate, unit amplitude
/// and zero phase.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveformRequest {
    pub waveform: Waveform,
    /// Fundamental frequency in Hz. Must stay below Nyquist.
    pub frequency: f64,
    /// Length in seconds.
    pub duration: f64,
    pub sample_rate: f64,
    pub amplitude: f64,
    /// Initial phase in radians.
    pub phase: f64,
}

impl WaveformRequest {
    pub fn new(waveform: Waveform, frequency: f64, duration: f64) -> Self {
        Self {
            waveform,
            frequency,
            duration,
            sample_rate: DEFAULT_SAMPLE_RATE,
            amplitude: 1.0,
            phase: 0.0,
        }
    }

    /// Parse the waveform name first so an unknown type is reported before
    /// any numeric problem.
    pub fn named(waveform: &str, frequency: f64, duration: f64) -> Result<Self> {
        Ok(Self::new(waveform.parse()?, frequency, duration))
    }

    pub fn with_sample_rate(mut self, sample_rate: f64) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_amplitude(mut self, amplitude: f64) -> Self {
        self.amplitude = amplitude;
        self
    }

    pub fn with_phase(mut self, phase: f64) -> Self {
        self.phase = phase;
        self
    }

    /// Same timing and sample rate, different waveform and frequency.
    pub fn retuned(&self, waveform: Waveform, frequency: f64) -> Self {
        Self {
            waveform,
            frequency,
            ..*self
        }
    }

    pub fn validate(&self) -> Result<()> {
        oscillator::validate_params(self.frequency, self.duration, self.sample_rate, self.amplitude)
    }

    /// Number of samples [`synthesize`] will produce.
    pub fn len(&self) -> usize {
        oscillator::sample_count(self.duration, self.sample_rate)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for WaveformRequest {
    fn default() -> Self {
        Self::new(Waveform::Sine, 440.0, 1.0)
    }
}

/// Validate `request` and render it.
///
/// Errors follow a fixed precedence (aliasing, non-positive frequency,
/// negative amplitude, non-positive duration, non-positive sample rate) and
/// only the first is reported.
///
/// ```
/// use saavy_synth::{synthesize, Waveform, WaveformRequest};
///
/// let req = WaveformRequest::new(Waveform::Sine, 440.0, 1.0);
/// let buffer = synthesize(&req).unwrap();
/// assert_eq!(buffer.len(), 44_100);
/// assert_eq!(buffer[0], 0.0);
/// ```
pub fn synthesize(request: &WaveformRequest) -> Result<SampleBuffer> {
    request.validate()?;
    let WaveformRequest {
        waveform,
        frequency,
        duration,
        sample_rate,
        amplitude,
        phase,
    } = *request;

    tracing::trace!(%waveform, frequency, duration, sample_rate, "synthesize");

    oscillator::generate(waveform, frequency, duration, sample_rate, amplitude, phase)
}

/// [`synthesize`] for a waveform given by name; an unknown name is reported
/// as [`SynthError::InvalidType`](crate::SynthError::InvalidType) ahead of
/// every numeric check.
pub fn synthesize_named(
    waveform: &str,
    frequency: f64,
    duration: f64,
    sample_rate: f64,
    amplitude: f64,
    phase: f64,
) -> Result<SampleBuffer> {
    let request = WaveformRequest::named(waveform, frequency, duration)?
        .with_sample_rate(sample_rate)
        .with_amplitude(amplitude)
        .with_phase(phase);
    synthesize(&request)
}
