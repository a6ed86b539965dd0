pub mod dsp; // Oscillators, envelope and effects
pub mod error;
pub mod io;
pub mod patch; // Declarative render recipes
pub mod synth; // Request dispatch and modulation

pub use dsp::envelope::{apply_envelope, EnvelopeSegments, EnvelopeSpec};
pub use dsp::oscillator::Waveform;
pub use error::SynthError;
pub use patch::Patch;
pub use synth::modulation::{amplitude_modulate, phase_modulate, ModulationRequest};
pub use synth::waveform::{synthesize, synthesize_named, WaveformRequest};

/// Rendered audio, one `f64` per sample.
pub type SampleBuffer = Vec<f64>;

pub const DEFAULT_SAMPLE_RATE: f64 = 44_100.0;
