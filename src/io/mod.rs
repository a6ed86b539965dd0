//! File I/O: reading impulse responses and writing rendered audio.

mod wav;

pub use wav::{load_mono_samples, pcm_to_float, write_samples};

/// Errors from loading or saving audio.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Sample rate cannot be stored in a WAV header.
    #[error("unsupported sample rate: {0}")]
    UnsupportedSampleRate(f64),

    /// The rendered or loaded audio was rejected by the synthesis layer.
    #[error(transparent)]
    Synth(#[from] crate::SynthError),
}

/// Convenience result type for audio I/O operations.
pub type Result<T> = std::result::Result<T, Error>;
