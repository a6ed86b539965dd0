//! Error types for synthesis and effect parameter validation.

use thiserror::Error;

/// Every way a synthesis, envelope, modulation or effect call can reject its
/// input.
///
/// All of these are deterministic: a request that fails once will always
/// fail, so callers should report rather than retry. No buffer is ever
/// returned alongside an error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SynthError {
    /// Unknown waveform or filter name.
    #[error("invalid type: {0}")]
    InvalidType(String),

    /// Frequency is non-positive or at/above Nyquist (would alias).
    #[error("invalid frequency: {0}")]
    InvalidFrequency(String),

    /// Amplitude is negative.
    #[error("invalid amplitude: {0}")]
    InvalidAmplitude(String),

    /// Duration is non-positive.
    #[error("invalid duration: {0}")]
    InvalidDuration(String),

    /// Sample rate is non-positive.
    #[error("invalid sample rate: {0}")]
    InvalidSampleRate(String),

    /// ADSR percentages or sustain level out of range.
    #[error("invalid envelope: {0}")]
    InvalidEnvelope(String),

    /// Modulation depth/index or ratio out of range.
    #[error("invalid modulation: {0}")]
    InvalidModulation(String),

    /// Butterworth design parameters out of range.
    #[error("invalid filter parameters: {0}")]
    InvalidFilterParams(String),

    /// Delay or reverb parameters out of range.
    #[error("invalid effect parameters: {0}")]
    InvalidEffectParams(String),
}

impl SynthError {
    pub(crate) fn frequency(reason: impl Into<String>) -> Self {
        Self::InvalidFrequency(reason.into())
    }

    pub(crate) fn envelope(reason: impl Into<String>) -> Self {
        Self::InvalidEnvelope(reason.into())
    }

    pub(crate) fn modulation(reason: impl Into<String>) -> Self {
        Self::InvalidModulation(reason.into())
    }

    pub(crate) fn filter(reason: impl Into<String>) -> Self {
        Self::InvalidFilterParams(reason.into())
    }

    pub(crate) fn effect(reason: impl Into<String>) -> Self {
        Self::InvalidEffectParams(reason.into())
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SynthError>;
